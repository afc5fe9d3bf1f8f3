use indexmap::IndexSet;
use serde_json::{Map, Value};

pub const REF_KEY: &str = "$ref";

/// One step from a container to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
  Key(String),
  Index(usize),
}

/// A mapping that carries a `$ref` property, addressed by its location in the searched value.
///
/// The location is relative to the value handed to [`find_reference_nodes`] and lets callers reach
/// the node again mutably through [`ReferenceSite::node_mut`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
  pub location: Vec<Step>,
  pub pointer: String,
}

impl ReferenceSite {
  /// The node's location as an escaped JSON Pointer in fragment form, e.g. `#/paths/~1pets/get`.
  pub fn location_pointer(&self) -> String {
    self.location.iter().fold(String::from("#"), |mut pointer, step| {
      pointer.push('/');
      match step {
        Step::Key(key) => pointer.push_str(&key.replace('~', "~0").replace('/', "~1")),
        Step::Index(idx) => pointer.push_str(&idx.to_string()),
      }
      pointer
    })
  }

  pub fn node<'a>(&self, root: &'a Value) -> Option<&'a Map<String, Value>> {
    self
      .location
      .iter()
      .try_fold(root, |node, step| match (node, step) {
        (Value::Object(map), Step::Key(key)) => map.get(key),
        (Value::Array(items), Step::Index(idx)) => items.get(*idx),
        _ => None,
      })
      .and_then(Value::as_object)
  }

  pub fn node_mut<'a>(&self, root: &'a mut Value) -> Option<&'a mut Map<String, Value>> {
    self
      .location
      .iter()
      .try_fold(root, |node, step| match (node, step) {
        (Value::Object(map), Step::Key(key)) => map.get_mut(key),
        (Value::Array(items), Step::Index(idx)) => items.get_mut(*idx),
        _ => None,
      })
      .and_then(Value::as_object_mut)
  }
}

/// Finds every mapping inside `value` that holds a string `$ref` property.
///
/// Sites come back in depth-first traversal order. Traversal does not stop at a reference node:
/// sibling properties of `$ref` are searched too, and a `$ref` whose value is not a string is
/// treated as an ordinary property. Pointers are never followed, so cyclic references are harmless
/// here.
pub fn find_reference_nodes(value: &Value) -> Vec<ReferenceSite> {
  let mut sites = Vec::new();
  let mut location = Vec::new();
  collect(value, &mut location, &mut sites);
  sites
}

/// Distinct `$ref` pointers inside `value`, first occurrence wins.
pub fn distinct_pointers(value: &Value) -> Vec<String> {
  find_reference_nodes(value)
    .into_iter()
    .map(|site| site.pointer)
    .collect::<IndexSet<_>>()
    .into_iter()
    .collect()
}

fn collect(value: &Value, location: &mut Vec<Step>, sites: &mut Vec<ReferenceSite>) {
  match value {
    Value::Array(items) => {
      for (idx, item) in items.iter().enumerate() {
        if is_container(item) {
          location.push(Step::Index(idx));
          collect(item, location, sites);
          location.pop();
        }
      }
    }
    Value::Object(map) => {
      for (key, child) in map {
        if key == REF_KEY
          && let Value::String(pointer) = child
        {
          sites.push(ReferenceSite {
            location: location.clone(),
            pointer: pointer.clone(),
          });
        } else if is_container(child) {
          location.push(Step::Key(key.clone()));
          collect(child, location, sites);
          location.pop();
        }
      }
    }
    Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
  }
}

fn is_container(value: &Value) -> bool {
  matches!(value, Value::Array(_) | Value::Object(_))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_finds_nested_reference_nodes() {
    let doc = json!({
      "get": {
        "parameters": [{ "$ref": "#/components/parameters/limit" }],
        "responses": {
          "200": { "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } } }
        }
      }
    });

    let sites = find_reference_nodes(&doc);
    let pointers: Vec<&str> = sites.iter().map(|site| site.pointer.as_str()).collect();
    assert_eq!(pointers, ["#/components/parameters/limit", "#/components/schemas/Pet"]);
    assert_eq!(
      sites[0].location,
      vec![
        Step::Key("get".to_string()),
        Step::Key("parameters".to_string()),
        Step::Index(0)
      ]
    );
    assert_eq!(sites[0].location_pointer(), "#/get/parameters/0");
  }

  #[test]
  fn test_location_pointer_escapes_keys() {
    let doc = json!({ "paths": { "/pets": { "get": { "$ref": "#/x" } } } });
    let sites = find_reference_nodes(&doc);
    assert_eq!(sites[0].location_pointer(), "#/paths/~1pets/get");
  }

  #[test]
  fn test_collects_whole_node_and_searches_siblings() {
    let doc = json!({
      "$ref": "#/components/schemas/A",
      "description": "malformed sibling",
      "items": { "$ref": "#/components/schemas/B" }
    });

    let sites = find_reference_nodes(&doc);
    assert_eq!(sites.len(), 2);
    assert!(sites[0].location.is_empty());
    assert_eq!(
      sites[0].node(&doc).and_then(|node| node.get("description")),
      Some(&json!("malformed sibling"))
    );
  }

  #[test]
  fn test_non_string_ref_is_an_ordinary_property() {
    let doc = json!({
      "properties": {
        "$ref": { "type": "string" },
        "owner": { "$ref": "#/components/schemas/User" }
      }
    });

    let sites = find_reference_nodes(&doc);
    assert_eq!(sites.len(), 1);
    assert_eq!(sites[0].pointer, "#/components/schemas/User");
  }

  #[test]
  fn test_node_mut_reaches_the_site() {
    let mut doc = json!({ "items": [{}, { "$ref": "#/components/schemas/Pet" }] });
    let sites = find_reference_nodes(&doc);

    let node = sites[0].node_mut(&mut doc).unwrap();
    node.insert(REF_KEY.to_string(), json!("#/components/schemas/X_Pet"));

    assert_eq!(doc["items"][1]["$ref"], json!("#/components/schemas/X_Pet"));
  }

  #[test]
  fn test_distinct_pointers_keeps_first_occurrence_order() {
    let doc = json!([
      { "$ref": "#/b" },
      { "$ref": "#/a" },
      { "$ref": "#/b" }
    ]);
    assert_eq!(distinct_pointers(&doc), ["#/b", "#/a"]);
  }

  #[test]
  fn test_scalars_have_no_reference_nodes() {
    assert!(find_reference_nodes(&json!("#/components/schemas/Pet")).is_empty());
    assert!(find_reference_nodes(&json!(null)).is_empty());
  }
}
