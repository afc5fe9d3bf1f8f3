use std::path::Path;

use serde_json::Value;

use crate::pipeline::errors::GenerationError;

/// Writes `doc` as pretty-printed JSON with a trailing newline, creating missing parent directories.
pub async fn write_document(destination: &Path, doc: &Value) -> Result<(), GenerationError> {
  let mut body = serde_json::to_vec_pretty(doc).map_err(|err| GenerationError::write(destination, err))?;
  body.push(b'\n');

  if let Some(parent) = destination.parent()
    && !parent.as_os_str().is_empty()
  {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|err| GenerationError::write(destination, err))?;
  }
  tokio::fs::write(destination, body)
    .await
    .map_err(|err| GenerationError::write(destination, err))
}
