use oas3_compose_core::HttpMethod;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::IntoStaticStr;

/// Named transformations run on the composed document, in configuration order, before it is
/// validated and written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "hook", rename_all = "camelCase", rename_all_fields = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum DocHook {
  /// Overwrites the given fields of `info`, creating it when absent.
  SetInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    description: Option<String>,
  },
  /// Replaces `servers` with one entry per URL.
  SetServers { urls: Vec<String> },
  /// Orders `paths` by key.
  SortPaths,
  /// Drops `x-` extensions from the root, `info`, every path item and every operation.
  RemoveExtensions,
}

impl DocHook {
  pub fn name(&self) -> &'static str {
    self.into()
  }

  pub fn apply(&self, doc: &mut Value) {
    let Value::Object(doc) = doc else {
      return;
    };

    match self {
      Self::SetInfo {
        title,
        version,
        description,
      } => {
        let info = doc
          .entry("info")
          .or_insert_with(|| Value::Object(Map::new()));
        if !info.is_object() {
          *info = Value::Object(Map::new());
        }
        if let Value::Object(info) = info {
          for (key, value) in [("title", title), ("version", version), ("description", description)] {
            if let Some(value) = value {
              info.insert(key.to_string(), Value::String(value.clone()));
            }
          }
        }
      }
      Self::SetServers { urls } => {
        let servers = urls
          .iter()
          .map(|url| {
            let mut server = Map::new();
            server.insert("url".to_string(), Value::String(url.clone()));
            Value::Object(server)
          })
          .collect();
        doc.insert("servers".to_string(), Value::Array(servers));
      }
      Self::SortPaths => {
        if let Some(Value::Object(paths)) = doc.get_mut("paths") {
          paths.sort_keys();
        }
      }
      Self::RemoveExtensions => {
        strip_extensions(doc);
        if let Some(Value::Object(info)) = doc.get_mut("info") {
          strip_extensions(info);
        }
        if let Some(Value::Object(paths)) = doc.get_mut("paths") {
          for item in paths.values_mut() {
            let Value::Object(item) = item else {
              continue;
            };
            strip_extensions(item);
            for (key, operation) in item.iter_mut() {
              if let Value::Object(operation) = operation
                && key.parse::<HttpMethod>().is_ok()
              {
                strip_extensions(operation);
              }
            }
          }
        }
      }
    }
  }
}

fn strip_extensions(map: &mut Map<String, Value>) {
  map.retain(|key, _| !key.starts_with("x-"));
}
