use itertools::Itertools;
use oas3_compose_core::{ComposeError, HttpMethod, find_reference_nodes, resolve};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
  /// Where in the document the issue was found.
  pub path: String,
  pub message: String,
}

impl ValidationIssue {
  pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      message: message.into(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
  pub errors: Vec<ValidationIssue>,
  pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }

  pub fn is_clean(&self) -> bool {
    self.errors.is_empty() && self.warnings.is_empty()
  }
}

/// Checks `doc` against the OpenAPI 3 object model and for broken internal references.
///
/// A document that does not deserialize as an `oas3::Spec` yields a single error at the failing
/// field. Unresolvable `#/...` references are errors, missing and duplicated `operationId`s are
/// warnings.
pub fn validate(doc: &Value) -> ValidationReport {
  let mut report = ValidationReport::default();

  if let Err(err) = serde_path_to_error::deserialize::<_, oas3::Spec>(doc) {
    report
      .errors
      .push(ValidationIssue::new(err.path().to_string(), err.inner().to_string()));
  }

  for site in find_reference_nodes(doc) {
    match resolve(doc, &site.pointer) {
      Ok(_) => {}
      Err(ComposeError::ExternalReference { pointer }) => report.warnings.push(ValidationIssue::new(
        site.location_pointer(),
        format!("external reference '{pointer}' is not checked"),
      )),
      Err(err) => report
        .errors
        .push(ValidationIssue::new(site.location_pointer(), err.to_string())),
    }
  }

  let operations = operations(doc);
  for (location, operation_id) in &operations {
    if operation_id.is_none() {
      report
        .warnings
        .push(ValidationIssue::new(location.clone(), "operation has no operationId"));
    }
  }
  for duplicate in operations.iter().filter_map(|(_, id)| *id).duplicates() {
    report.warnings.push(ValidationIssue::new(
      "#/paths",
      format!("operationId '{duplicate}' is used by more than one operation"),
    ));
  }

  report
}

/// Every operation of `doc` as its escaped location and its `operationId`.
fn operations(doc: &Value) -> Vec<(String, Option<&str>)> {
  let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
    return Vec::new();
  };

  paths
    .iter()
    .filter_map(|(path, item)| item.as_object().map(|item| (path, item)))
    .flat_map(|(path, item)| {
      item
        .iter()
        .filter(|(key, operation)| key.parse::<HttpMethod>().is_ok() && operation.is_object())
        .map(move |(method, operation)| {
          let location = format!("#/paths/{}/{method}", path.replace('~', "~0").replace('/', "~1"));
          (location, operation.get("operationId").and_then(Value::as_str))
        })
    })
    .collect()
}
