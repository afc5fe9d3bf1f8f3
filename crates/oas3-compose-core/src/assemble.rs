use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  closure::compute_closure,
  error::Result,
  repack::repack,
  rewrite::{RewriteReport, rewrite},
  selector::{PathsConfig, select_paths},
};

/// How one source document is imported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, bon::Builder)]
#[serde(rename_all = "camelCase")]
pub struct DocConfig {
  /// Paths to import; absent or empty imports every path unchanged.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub paths: Option<PathsConfig>,
  /// Prefix for the names of every component this document contributes.
  #[builder(into)]
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub component_path_prefix: Option<String>,
}

/// The importable part of one source document: `{ paths, components }` with namespaced references.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFragment {
  tree: Value,
}

impl ImportFragment {
  pub fn paths(&self) -> &Value {
    &self.tree["paths"]
  }

  pub fn components(&self) -> &Value {
    &self.tree["components"]
  }

  pub fn as_value(&self) -> &Value {
    &self.tree
  }

  pub fn into_value(self) -> Value {
    self.tree
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedComponent {
  pub pointer: String,
  pub depth: usize,
}

/// What happened while assembling one fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
  pub paths_imported: usize,
  pub dropped_paths: Vec<String>,
  pub renamed_paths: Vec<(String, String)>,
  pub captured: Vec<CapturedComponent>,
  pub rewrite: RewriteReport,
}

/// Assembles the import fragment of `doc`.
pub fn assemble(doc: &Value, config: &DocConfig) -> Result<ImportFragment> {
  assemble_with_report(doc, config).map(|(fragment, _)| fragment)
}

/// Runs the import pipeline for one document: select paths, compute the reference closure of the
/// selected path items, repack the closure into a components tree and namespace the references.
///
/// `doc` is only read. Any failing stage aborts the assembly.
pub fn assemble_with_report(doc: &Value, config: &DocConfig) -> Result<(ImportFragment, AssemblyReport)> {
  let empty = Map::new();
  let all_paths = doc.get("paths").and_then(Value::as_object).unwrap_or(&empty);

  let selection = select_paths(all_paths, config.paths.as_ref())?;

  let closure = compute_closure(doc, selection.paths.values())?;
  let captured = closure
    .iter()
    .map(|entry| CapturedComponent {
      pointer: entry.pointer.as_str().to_string(),
      depth: entry.depth,
    })
    .collect();
  let components = repack(&closure)?;

  let paths_imported = selection.paths.len();
  let mut root = Map::new();
  root.insert("paths".to_string(), Value::Object(selection.paths));
  root.insert("components".to_string(), components);
  let mut tree = Value::Object(root);
  let rewrite_report = rewrite(&mut tree, config.component_path_prefix.as_deref())?;

  let report = AssemblyReport {
    paths_imported,
    dropped_paths: selection.dropped,
    renamed_paths: selection.renamed,
    captured,
    rewrite: rewrite_report,
  };

  Ok((ImportFragment { tree }, report))
}
