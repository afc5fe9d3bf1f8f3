use std::collections::HashMap;

use indexmap::IndexSet;
use serde_json::Value;

use crate::{error::Result, index::distinct_pointers, pointer::JsonPointer};

/// A component captured by the closure, borrowed from the source document.
#[derive(Debug, Clone)]
pub struct ClosureEntry<'a> {
  pub pointer: JsonPointer,
  pub component: &'a Value,
  /// Number of reference hops from the seeds: `0` for components the seeds reference directly.
  pub depth: usize,
}

/// Every component transitively reachable from a set of seeds, each captured exactly once.
///
/// Entries live in an append-only arena in discovery order; a side index maps the raw pointer
/// string to its arena slot for membership tests.
#[derive(Debug, Default)]
pub struct ReferenceClosure<'a> {
  entries: Vec<ClosureEntry<'a>>,
  index: HashMap<String, usize>,
}

impl<'a> ReferenceClosure<'a> {
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains(&self, pointer: &str) -> bool {
    self.index.contains_key(pointer)
  }

  pub fn get(&self, pointer: &str) -> Option<&'a Value> {
    self.index.get(pointer).map(|&slot| self.entries[slot].component)
  }

  pub fn iter(&self) -> impl Iterator<Item = &ClosureEntry<'a>> {
    self.entries.iter()
  }

  pub fn pointers(&self) -> impl Iterator<Item = &str> {
    self.entries.iter().map(|entry| entry.pointer.as_str())
  }

  fn record(&mut self, entry: ClosureEntry<'a>) {
    self.index.insert(entry.pointer.as_str().to_string(), self.entries.len());
    self.entries.push(entry);
  }
}

/// Computes the reference closure of `seeds` against `root`.
///
/// Breadth-first fixed point: the first frontier is the distinct pointers found directly in the
/// seeds, every frontier pointer is resolved against `root`, and the pointers nested in the newly
/// resolved components that are not yet captured form the next frontier. The loop ends when a
/// frontier comes up empty. A pointer is never captured twice, which also makes cyclic references
/// terminate. A pointer that does not resolve is an error, not a gap in the result.
pub fn compute_closure<'a, 's>(
  root: &'a Value,
  seeds: impl IntoIterator<Item = &'s Value>,
) -> Result<ReferenceClosure<'a>> {
  let mut closure = ReferenceClosure::default();

  let mut frontier: IndexSet<String> = seeds.into_iter().flat_map(distinct_pointers).collect();
  let mut depth = 0;

  while !frontier.is_empty() {
    let first_new = closure.len();
    for raw in frontier {
      let pointer = JsonPointer::parse(&raw)?;
      let component = pointer.resolve(root)?;
      closure.record(ClosureEntry {
        pointer,
        component,
        depth,
      });
    }

    frontier = closure.entries[first_new..]
      .iter()
      .flat_map(|entry| distinct_pointers(entry.component))
      .filter(|pointer| !closure.contains(pointer))
      .collect();
    depth += 1;
  }

  Ok(closure)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::error::ComposeError;

  fn pet_store() -> Value {
    json!({
      "paths": {
        "/pets": {
          "get": {
            "responses": {
              "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } }
            }
          },
          "post": {
            "requestBody": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } }
          }
        }
      },
      "components": {
        "schemas": {
          "Pet": { "properties": { "category": { "$ref": "#/components/schemas/Category" } } },
          "Category": { "type": "object" },
          "Unused": { "type": "string" }
        }
      }
    })
  }

  #[test]
  fn test_closure_captures_transitive_references() {
    let doc = pet_store();
    let seed = json!({ "schema": { "$ref": "#/components/schemas/Pet" } });

    let closure = compute_closure(&doc, [&seed]).unwrap();

    assert_eq!(closure.len(), 2);
    assert_eq!(
      closure.pointers().collect::<Vec<_>>(),
      ["#/components/schemas/Pet", "#/components/schemas/Category"]
    );
    assert_eq!(closure.get("#/components/schemas/Category"), Some(&json!({ "type": "object" })));
    assert_eq!(closure.iter().map(|entry| entry.depth).collect::<Vec<_>>(), [0, 1]);
  }

  #[test]
  fn test_closure_terminates_on_cycles() {
    let doc = json!({
      "components": {
        "schemas": {
          "A": { "properties": { "b": { "$ref": "#/components/schemas/B" } } },
          "B": { "properties": { "a": { "$ref": "#/components/schemas/A" } } }
        }
      }
    });
    let seed = json!({ "$ref": "#/components/schemas/A" });

    let closure = compute_closure(&doc, [&seed]).unwrap();

    assert_eq!(closure.len(), 2);
    assert!(closure.contains("#/components/schemas/A"));
    assert!(closure.contains("#/components/schemas/B"));
  }

  #[test]
  fn test_closure_terminates_on_self_reference() {
    let doc = json!({
      "components": { "schemas": { "Node": { "properties": { "next": { "$ref": "#/components/schemas/Node" } } } } }
    });
    let seed = json!({ "$ref": "#/components/schemas/Node" });

    let closure = compute_closure(&doc, [&seed]).unwrap();
    assert_eq!(closure.len(), 1);
  }

  #[test]
  fn test_closure_deduplicates_shared_references() {
    let doc = pet_store();
    let path_item = &doc["paths"]["/pets"];

    let closure = compute_closure(&doc, [path_item]).unwrap();

    assert_eq!(closure.len(), 2, "Pet is referenced by get and post but captured once");
    assert!(!closure.contains("#/components/schemas/Unused"));
  }

  #[test]
  fn test_closure_fails_on_dangling_reference() {
    let doc = json!({ "components": { "schemas": {} } });
    let seed = json!({ "$ref": "#/components/schemas/Ghost" });

    let err = compute_closure(&doc, [&seed]).unwrap_err();
    assert_eq!(
      err,
      ComposeError::PointerNotFound {
        pointer: "#/components/schemas/Ghost".to_string()
      }
    );
  }

  #[test]
  fn test_closure_of_unreferencing_seeds_is_empty() {
    let doc = pet_store();
    let seed = json!({ "get": { "responses": { "204": { "description": "gone" } } } });

    let closure = compute_closure(&doc, [&seed]).unwrap();
    assert!(closure.is_empty());
  }
}
