use std::path::{Path, PathBuf};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use indexmap::IndexMap;
use oas3_compose_core::DocConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::doc_hooks::DocHook;

const GEN_CONFIGS_KEY: &str = "genConfigs";

/// One composed output document and the sources it is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
  /// Sources keyed by URL or path, merged in declaration order.
  pub docs: IndexMap<String, DocConfig>,
  pub destination: PathBuf,
  /// Document the composed fragments are merged onto.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub template: Option<String>,
  #[serde(default)]
  pub throw_src_validation: bool,
  #[serde(default)]
  pub throw_dest_validation: bool,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub on_generated_doc: Vec<DocHook>,
}

impl GenerationConfig {
  /// Promotes source and destination validation errors to failures.
  #[must_use]
  pub fn strict(mut self) -> Self {
    self.throw_src_validation = true;
    self.throw_dest_validation = true;
    self
  }
}

/// Reads a configuration file holding either one generation config or `{ "genConfigs": [...] }`.
pub async fn load_configs(path: &Path) -> anyhow::Result<Vec<GenerationConfig>> {
  let file = AsyncMmapFile::open(path)
    .await
    .with_context(|| format!("failed to open config file '{}'", path.display()))?;
  let value: Value = serde_json::from_slice(file.as_slice())
    .with_context(|| format!("config file '{}' is not valid JSON", path.display()))?;

  parse_configs(value).with_context(|| format!("invalid config file '{}'", path.display()))
}

pub fn parse_configs(value: Value) -> anyhow::Result<Vec<GenerationConfig>> {
  if let Some(configs) = value.get(GEN_CONFIGS_KEY) {
    let configs: Vec<GenerationConfig> = serde_path_to_error::deserialize(configs)
      .map_err(|err| anyhow::anyhow!("{GEN_CONFIGS_KEY}{}: {}", path_suffix(err.path()), err.inner()))?;
    if configs.is_empty() {
      anyhow::bail!("'{GEN_CONFIGS_KEY}' must list at least one generation config");
    }
    return Ok(configs);
  }

  let config: GenerationConfig = serde_path_to_error::deserialize(&value)
    .map_err(|err| anyhow::anyhow!("{}: {}", err.path(), err.inner()))?;
  Ok(vec![config])
}

fn path_suffix(path: &serde_path_to_error::Path) -> String {
  let path = path.to_string();
  match path.as_str() {
    "." => String::new(),
    rest if rest.starts_with('[') => rest.to_string(),
    rest => format!(".{rest}"),
  }
}
