use std::fmt;

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};

use crate::error::{ComposeError, Result};

/// A document-internal JSON Pointer in URI fragment form, e.g. `#/components/schemas/Pet`.
///
/// The raw string is kept verbatim because it is what `$ref` nodes carry and what the rewriter
/// prefixes. The decoded segments are what traversal uses: each segment is percent-decoded (URI
/// fragment form) and then `~1`/`~0` unescaped, so `#/paths/~1pets/get` addresses the `get`
/// operation of the `/pets` path item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JsonPointer {
  raw: String,
  segments: Vec<String>,
}

impl JsonPointer {
  /// Parses a `$ref` value. Anything not starting with `#` refers to another document and is rejected.
  pub fn parse(raw: &str) -> Result<Self> {
    let Some(path) = raw.strip_prefix('#') else {
      return Err(ComposeError::ExternalReference {
        pointer: raw.to_string(),
      });
    };

    let segments = if path.is_empty() {
      vec![]
    } else {
      path
        .strip_prefix('/')
        .unwrap_or(path)
        .split('/')
        .map(decode_segment)
        .collect()
    };

    Ok(Self {
      raw: raw.to_string(),
      segments,
    })
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }

  pub fn segments(&self) -> &[String] {
    &self.segments
  }

  /// Returns the pointer with `prefix` inserted immediately before its final `/`-delimited segment.
  ///
  /// `#/components/schemas/Pet` with prefix `Foo_` becomes `#/components/schemas/Foo_Pet`. The
  /// insertion works on the raw text so escaped segments keep their original spelling.
  pub fn with_prefixed_name(&self, prefix: &str) -> String {
    let split_at = self.raw.rfind('/').map_or(1, |idx| idx + 1);
    let (head, name) = self.raw.split_at(split_at);
    format!("{head}{prefix}{name}")
  }

  /// Looks the pointer up in `root`, returning `None` when any segment is absent.
  pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
    self.segments.iter().try_fold(root, |node, segment| child(node, segment))
  }

  /// Like [`JsonPointer::lookup`], but fails with [`ComposeError::PointerNotFound`].
  pub fn resolve<'a>(&self, root: &'a Value) -> Result<&'a Value> {
    self.lookup(root).ok_or_else(|| ComposeError::PointerNotFound {
      pointer: self.raw.clone(),
    })
  }

  /// Removes and returns the value at this pointer.
  ///
  /// Returns `Ok(None)` when nothing lives there. Only entries of a mapping can be removed; the root
  /// and sequence elements are reported as [`ComposeError::UnmovableReference`].
  pub fn take(&self, root: &mut Value) -> Result<Option<Value>> {
    let Some((name, parents)) = self.segments.split_last() else {
      return Err(self.unmovable());
    };

    let parent = parents.iter().try_fold(root, |node, segment| child_mut(node, segment));
    match parent {
      None => Ok(None),
      Some(Value::Object(map)) => Ok(map.shift_remove(name)),
      Some(other) => match child(other, name) {
        Some(_) => Err(self.unmovable()),
        None => Ok(None),
      },
    }
  }

  /// Stores `value` at this pointer, creating empty mappings for missing intermediate segments.
  ///
  /// An existing value at the final segment is replaced. Every level on the way must be a mapping.
  pub fn insert(&self, root: &mut Value, value: Value) -> Result<()> {
    let Some((name, parents)) = self.segments.split_last() else {
      return Err(self.unmovable());
    };

    let mut node = root;
    for segment in parents {
      let Value::Object(map) = node else {
        return Err(self.unmovable());
      };
      node = map
        .entry(segment.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    }

    let Value::Object(map) = node else {
      return Err(self.unmovable());
    };
    map.insert(name.clone(), value);
    Ok(())
  }

  fn unmovable(&self) -> ComposeError {
    ComposeError::UnmovableReference {
      pointer: self.raw.clone(),
    }
  }
}

impl fmt::Display for JsonPointer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.raw)
  }
}

/// Resolves `pointer` against `root`.
///
/// The leading `#` is stripped and the remainder split on `/`; a missing segment anywhere on the
/// way fails with [`ComposeError::PointerNotFound`].
pub fn resolve<'a>(root: &'a Value, pointer: &str) -> Result<&'a Value> {
  JsonPointer::parse(pointer)?.resolve(root)
}

fn decode_segment(segment: &str) -> String {
  percent_decode_str(segment)
    .decode_utf8_lossy()
    .replace("~1", "/")
    .replace("~0", "~")
}

fn child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
  match node {
    Value::Object(map) => map.get(segment),
    Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
    _ => None,
  }
}

fn child_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
  match node {
    Value::Object(map) => map.get_mut(segment),
    Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get_mut(idx)),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn test_parse_strips_hash_and_splits_segments() {
    let pointer = JsonPointer::parse("#/components/schemas/Pet").unwrap();
    assert_eq!(pointer.segments(), ["components", "schemas", "Pet"]);
    assert_eq!(pointer.as_str(), "#/components/schemas/Pet");
  }

  #[test]
  fn test_parse_unescapes_segments() {
    let pointer = JsonPointer::parse("#/paths/~1pets~1%7Bid%7D/get").unwrap();
    assert_eq!(pointer.segments(), ["paths", "/pets/{id}", "get"]);

    let tilde = JsonPointer::parse("#/a~0b").unwrap();
    assert_eq!(tilde.segments(), ["a~b"]);
  }

  #[test]
  fn test_parse_root_pointer_has_no_segments() {
    let pointer = JsonPointer::parse("#").unwrap();
    assert!(pointer.segments().is_empty());
  }

  #[test]
  fn test_parse_rejects_external_reference() {
    let err = JsonPointer::parse("other.json#/components/schemas/Pet").unwrap_err();
    assert!(matches!(err, ComposeError::ExternalReference { .. }));
  }

  #[test]
  fn test_resolve_walks_maps_and_arrays() {
    let doc = json!({
      "components": { "schemas": { "Pet": { "type": "object" } } },
      "servers": [{ "url": "a" }, { "url": "b" }]
    });

    assert_eq!(
      resolve(&doc, "#/components/schemas/Pet").unwrap(),
      &json!({ "type": "object" })
    );
    assert_eq!(resolve(&doc, "#/servers/1/url").unwrap(), &json!("b"));
  }

  #[test]
  fn test_resolve_missing_segment_fails() {
    let doc = json!({ "components": { "schemas": {} } });

    let err = resolve(&doc, "#/components/schemas/Missing").unwrap_err();
    assert_eq!(
      err,
      ComposeError::PointerNotFound {
        pointer: "#/components/schemas/Missing".to_string()
      }
    );
    assert!(resolve(&doc, "#/components/schemas/0/x").is_err());
  }

  #[test]
  fn test_with_prefixed_name_inserts_before_last_segment() {
    let pointer = JsonPointer::parse("#/components/schemas/Pet").unwrap();
    assert_eq!(pointer.with_prefixed_name("Foo_"), "#/components/schemas/Foo_Pet");

    let parameter = JsonPointer::parse("#/components/parameters/limit").unwrap();
    assert_eq!(parameter.with_prefixed_name("Store"), "#/components/parameters/Storelimit");
  }

  #[test]
  fn test_take_and_insert_move_a_mapping_entry() {
    let mut doc = json!({ "components": { "schemas": { "Pet": { "type": "object" }, "Tag": {} } } });
    let from = JsonPointer::parse("#/components/schemas/Pet").unwrap();
    let to = JsonPointer::parse("#/components/schemas/Foo_Pet").unwrap();

    let moved = from.take(&mut doc).unwrap().unwrap();
    to.insert(&mut doc, moved).unwrap();

    assert_eq!(
      doc,
      json!({ "components": { "schemas": { "Tag": {}, "Foo_Pet": { "type": "object" } } } })
    );
    assert_eq!(from.take(&mut doc).unwrap(), None);
  }

  #[test]
  fn test_insert_creates_intermediate_mappings() {
    let mut doc = json!({});
    let pointer = JsonPointer::parse("#/components/responses/NotFound").unwrap();
    pointer.insert(&mut doc, json!({ "description": "missing" })).unwrap();

    assert_eq!(
      doc,
      json!({ "components": { "responses": { "NotFound": { "description": "missing" } } } })
    );
  }

  #[test]
  fn test_take_from_sequence_is_unmovable() {
    let mut doc = json!({ "parameters": [{ "name": "id" }] });
    let pointer = JsonPointer::parse("#/parameters/0").unwrap();
    assert!(matches!(
      pointer.take(&mut doc),
      Err(ComposeError::UnmovableReference { .. })
    ));
  }
}
