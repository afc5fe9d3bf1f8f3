use serde_json::Value;

/// Recursively overlays `source` onto `target` and returns `target`.
///
/// Mappings merge key by key; any other value from `source` (sequences, scalars, `null`)
/// replaces what `target` holds. Keys new to `target` are appended in `source` order.
pub fn merge<'t>(target: &'t mut Value, source: &Value) -> &'t mut Value {
  match (&mut *target, source) {
    (Value::Object(target_map), Value::Object(source_map)) => {
      for (key, value) in source_map {
        match target_map.get_mut(key) {
          Some(existing) if existing.is_object() && value.is_object() => {
            merge(existing, value);
          }
          _ => {
            target_map.insert(key.clone(), value.clone());
          }
        }
      }
    }
    (target_slot, _) => *target_slot = source.clone(),
  }
  target
}
