use serde_json::{Map, Value};

use crate::{closure::ReferenceClosure, error::Result};

/// Builds a components tree from a reference closure.
///
/// Every captured component is cloned to the location its pointer names inside a fresh tree
/// (`#/components/schemas/Foo` becomes `{components: {schemas: {Foo: ...}}}`), and the
/// `components` subtree of that tree is returned. Captures outside `components` (references into
/// `paths`, for instance) do not survive repacking. An empty closure yields an empty mapping.
pub fn repack(closure: &ReferenceClosure<'_>) -> Result<Value> {
  let mut tree = Value::Object(Map::new());
  for entry in closure.iter() {
    entry.pointer.insert(&mut tree, entry.component.clone())?;
  }

  Ok(match tree {
    Value::Object(mut root) => root
      .shift_remove("components")
      .unwrap_or_else(|| Value::Object(Map::new())),
    _ => Value::Object(Map::new()),
  })
}
