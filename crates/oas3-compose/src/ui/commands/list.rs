use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use oas3_compose_core::{HttpMethod, PathConfig, PathsConfig, compute_closure, select_paths};
use serde_json::{Map, Value};
use strum::IntoEnumIterator;

use crate::{
  sources::{DocumentLoader, to_v3},
  ui::{Colors, Role, term_width},
};

/// One operation row of `list paths`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OperationRow {
  path: String,
  method: HttpMethod,
  operation_id: String,
  tags: String,
}

fn operation_rows(doc: &Value) -> Vec<OperationRow> {
  let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
    return Vec::new();
  };

  let mut rows = Vec::new();
  for (path, item) in paths {
    for method in HttpMethod::iter() {
      let Some(operation) = item.get(method.to_string()).filter(|operation| operation.is_object()) else {
        continue;
      };
      let tags = operation
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| tags.iter().filter_map(Value::as_str).collect::<Vec<_>>().join(", "))
        .unwrap_or_default();

      rows.push(OperationRow {
        path: path.clone(),
        method,
        operation_id: operation
          .get("operationId")
          .and_then(Value::as_str)
          .unwrap_or("-")
          .to_string(),
        tags,
      });
    }
  }
  rows
}

fn new_table(headers: &[&str], colors: &Colors) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  for header in headers {
    row.add_cell(Cell::new(header).fg(colors.table_color(Role::Label)));
  }
  table.set_header(row);
  table
}

async fn load_source(input: &str) -> anyhow::Result<Value> {
  let raw = DocumentLoader::new().fetch(input).await?;
  Ok(to_v3(input, raw)?.document)
}

pub async fn list_paths(input: &str, colors: &Colors) -> anyhow::Result<()> {
  let doc = load_source(input).await?;

  let mut table = new_table(&["PATH", "METHOD", "OPERATION ID", "TAGS"], colors);
  for operation in operation_rows(&doc) {
    let mut row = Row::new();
    row.add_cell(Cell::new(operation.path).fg(colors.table_color(Role::Primary)));
    row.add_cell(
      Cell::new(operation.method.to_string().to_uppercase())
        .fg(colors.table_color(Role::Accent))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(
      Cell::new(operation.operation_id)
        .fg(colors.table_color(Role::Value))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(Cell::new(operation.tags).fg(colors.table_color(Role::Label)));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}

/// Prints the components the given paths transitively reference, nearest first.
pub async fn list_refs(input: &str, paths: &[String], colors: &Colors) -> anyhow::Result<()> {
  let doc = load_source(input).await?;

  let selection: PathsConfig = paths
    .iter()
    .map(|path| (path.clone(), PathConfig::default()))
    .collect();
  let empty = Map::new();
  let all_paths = doc.get("paths").and_then(Value::as_object).unwrap_or(&empty);

  if let Some(missing) = paths.iter().find(|path| !all_paths.contains_key(*path)) {
    anyhow::bail!("path '{missing}' is not present in '{input}'");
  }
  let selected = select_paths(all_paths, Some(&selection))?;
  let closure = compute_closure(&doc, selected.paths.values())?;

  let mut table = new_table(&["DEPTH", "COMPONENT"], colors);
  for entry in closure.iter() {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(entry.depth)
        .fg(colors.table_color(Role::Accent))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(entry.pointer.as_str()).fg(colors.table_color(Role::Value)));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}
