use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{ComposeError, Result};

/// Per-path directives keyed by the path as it appears in the source document.
pub type PathsConfig = IndexMap<String, PathConfig>;

/// The operation keys of an OpenAPI path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum HttpMethod {
  Get,
  Put,
  Post,
  Delete,
  Options,
  Head,
  Patch,
  Trace,
}

/// How a single path is imported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct PathConfig {
  /// Key the path item is imported under instead of its original path.
  #[builder(into)]
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub new_name: Option<String>,
  /// Tags that replace the tags of every operation under the path.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tags: Option<Vec<String>>,
  /// Hooks run in order on the final path item, after retagging and renaming.
  #[builder(default)]
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub on_path_complete: Vec<PathHook>,
}

/// Named transformations that can be run on an imported path item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "hook", rename_all = "camelCase", rename_all_fields = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PathHook {
  /// Prepends `prefix` to the `summary` of every operation that has one.
  SetSummaryPrefix { prefix: String },
  /// Sets an `x-` vendor extension on the path item.
  SetExtension { name: String, value: Value },
  /// Drops the parameter `name` located `in` from the path item and from every operation.
  RemoveParameter {
    name: String,
    #[serde(rename = "in")]
    location: String,
  },
  /// Fails the import when an operation under the path has no `operationId`.
  RequireOperationId,
  /// Prepends `prefix` to every `operationId`.
  PrefixOperationIds { prefix: String },
}

/// Outcome of [`select_paths`]: the transformed path items plus what happened to the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSelection {
  pub paths: Map<String, Value>,
  pub dropped: Vec<String>,
  pub renamed: Vec<(String, String)>,
}

impl PathHook {
  pub fn name(&self) -> &'static str {
    self.into()
  }

  /// Runs the hook against `item`, the path item imported under `path`.
  pub fn apply(&self, path: &str, item: &mut Value) -> Result<()> {
    let Value::Object(item) = item else {
      return Err(self.failure(path, "path item is not an object"));
    };

    match self {
      Self::SetSummaryPrefix { prefix } => {
        for operation in operations_mut(item) {
          if let Some(Value::String(summary)) = operation.get_mut("summary") {
            summary.insert_str(0, prefix);
          }
        }
      }
      Self::SetExtension { name, value } => {
        if !name.starts_with("x-") {
          return Err(self.failure(path, &format!("extension '{name}' must start with 'x-'")));
        }
        item.insert(name.clone(), value.clone());
      }
      Self::RemoveParameter { name, location } => {
        let matches = |parameter: &Value| {
          parameter.get("name").and_then(Value::as_str) == Some(name.as_str())
            && parameter.get("in").and_then(Value::as_str) == Some(location.as_str())
        };
        if let Some(Value::Array(parameters)) = item.get_mut("parameters") {
          parameters.retain(|parameter| !matches(parameter));
        }
        for operation in operations_mut(item) {
          if let Some(Value::Array(parameters)) = operation.get_mut("parameters") {
            parameters.retain(|parameter| !matches(parameter));
          }
        }
      }
      Self::RequireOperationId => {
        for method in HttpMethod::iter() {
          if let Some(Value::Object(operation)) = item.get(&method.to_string())
            && !operation.get("operationId").is_some_and(Value::is_string)
          {
            return Err(self.failure(path, &format!("'{method}' operation has no operationId")));
          }
        }
      }
      Self::PrefixOperationIds { prefix } => {
        for operation in operations_mut(item) {
          if let Some(Value::String(id)) = operation.get_mut("operationId") {
            id.insert_str(0, prefix);
          }
        }
      }
    }

    Ok(())
  }

  fn failure(&self, path: &str, message: &str) -> ComposeError {
    ComposeError::PathHookFailed {
      path: path.to_string(),
      message: format!("{}: {message}", self.name()),
    }
  }
}

/// Selects, retags, renames and post-processes the path items of a document.
///
/// Without a configuration (or with an empty one) every path is kept untouched. Otherwise paths
/// missing from `config` are dropped; for the rest, configured tags overwrite the tags of every
/// operation present, then the item is moved to its new name (appended at the end), then its
/// hooks run on the final item. A failing hook fails the whole selection.
pub fn select_paths(all_paths: &Map<String, Value>, config: Option<&PathsConfig>) -> Result<PathSelection> {
  let Some(config) = config.filter(|config| !config.is_empty()) else {
    return Ok(PathSelection {
      paths: all_paths.clone(),
      ..PathSelection::default()
    });
  };

  let mut selection = PathSelection::default();
  for (path, item) in all_paths {
    let Some(path_config) = config.get(path) else {
      selection.dropped.push(path.clone());
      continue;
    };

    let mut item = item.clone();
    if let Some(tags) = &path_config.tags {
      retag(&mut item, tags);
    }
    selection.paths.insert(path.clone(), item);
  }

  let retained: Vec<String> = selection.paths.keys().cloned().collect();
  for path in retained {
    let Some(path_config) = config.get(&path) else {
      continue;
    };

    let final_key = match &path_config.new_name {
      Some(new_name) if *new_name != path => {
        if let Some(item) = selection.paths.shift_remove(&path) {
          selection.paths.shift_remove(new_name);
          selection.paths.insert(new_name.clone(), item);
        }
        selection.renamed.push((path.clone(), new_name.clone()));
        new_name.clone()
      }
      _ => path,
    };

    if let Some(item) = selection.paths.get_mut(&final_key) {
      for hook in &path_config.on_path_complete {
        hook.apply(&final_key, item)?;
      }
    }
  }

  Ok(selection)
}

fn retag(item: &mut Value, tags: &[String]) {
  let Value::Object(item) = item else {
    return;
  };
  for operation in operations_mut(item) {
    operation.insert(
      "tags".to_string(),
      Value::Array(tags.iter().cloned().map(Value::String).collect()),
    );
  }
}

/// The operation objects of a path item, in method order; absent methods are skipped.
fn operations_mut(item: &mut Map<String, Value>) -> impl Iterator<Item = &mut Map<String, Value>> {
  item.iter_mut().filter_map(|(key, value)| {
    let is_method = key.parse::<HttpMethod>().is_ok();
    match value {
      Value::Object(operation) if is_method => Some(operation),
      _ => None,
    }
  })
}
