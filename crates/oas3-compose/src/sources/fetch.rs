use std::path::{Path, PathBuf};

use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use reqwest::{StatusCode, Url};
use serde_json::Value;

use crate::pipeline::errors::GenerationError;

/// Where a source document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
  Remote(Url),
  Local(PathBuf),
}

impl SourceLocation {
  /// `http(s)://` inputs are remote, `file://` URLs and everything else are local paths.
  pub fn parse(input: &str) -> Self {
    match Url::parse(input) {
      Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Remote(url),
      Ok(url) if url.scheme() == "file" => url
        .to_file_path()
        .map_or_else(|()| Self::Local(PathBuf::from(input)), Self::Local),
      _ => Self::Local(PathBuf::from(input)),
    }
  }
}

/// Fetches and parses JSON source documents from the network or the local disk.
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
  client: reqwest::Client,
}

impl DocumentLoader {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn fetch(&self, input: &str) -> Result<Value, GenerationError> {
    match SourceLocation::parse(input) {
      SourceLocation::Remote(url) => self.fetch_remote(input, url).await,
      SourceLocation::Local(path) => fetch_local(input, &path).await,
    }
  }

  async fn fetch_remote(&self, input: &str, url: Url) -> Result<Value, GenerationError> {
    let response = self.client.get(url).send().await.map_err(|err| {
      if err.is_connect() {
        GenerationError::source_not_found(input)
      } else {
        GenerationError::fetch(input, err)
      }
    })?;

    if response.status() == StatusCode::NOT_FOUND {
      return Err(GenerationError::source_not_found(input));
    }

    let body = response
      .error_for_status()
      .map_err(|err| GenerationError::fetch(input, err))?
      .bytes()
      .await
      .map_err(|err| GenerationError::fetch(input, err))?;

    serde_json::from_slice(&body).map_err(|err| GenerationError::fetch(input, err))
  }
}

async fn fetch_local(input: &str, path: &Path) -> Result<Value, GenerationError> {
  if !tokio::fs::try_exists(path).await.unwrap_or(false) {
    return Err(GenerationError::source_not_found(input));
  }

  let file = AsyncMmapFile::open(path)
    .await
    .map_err(|err| GenerationError::fetch(input, err))?;
  serde_json::from_slice(file.as_slice()).map_err(|err| GenerationError::fetch(input, err))
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn test_parse_http_urls_as_remote() {
    assert!(matches!(
      SourceLocation::parse("https://petstore.swagger.io/v2/swagger.json"),
      SourceLocation::Remote(_)
    ));
  }

  #[test]
  fn test_parse_paths_as_local() {
    assert_eq!(
      SourceLocation::parse("./specs/petstore.json"),
      SourceLocation::Local(PathBuf::from("./specs/petstore.json"))
    );
    assert_eq!(
      SourceLocation::parse("file:///tmp/petstore.json"),
      SourceLocation::Local(PathBuf::from("/tmp/petstore.json"))
    );
  }

  #[tokio::test]
  async fn test_fetch_local_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"openapi": "3.0.0", "paths": {{}}}}"#).unwrap();

    let doc = DocumentLoader::new()
      .fetch(file.path().to_str().unwrap())
      .await
      .unwrap();

    assert_eq!(doc["openapi"], "3.0.0");
  }

  #[tokio::test]
  async fn test_fetch_missing_file_is_source_not_found() {
    let err = DocumentLoader::new()
      .fetch("/definitely/not/here/openapi.json")
      .await
      .unwrap_err();

    assert!(matches!(err, GenerationError::SourceNotFound { .. }));
  }

  #[tokio::test]
  async fn test_fetch_invalid_json_is_fetch_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "not json").unwrap();

    let err = DocumentLoader::new()
      .fetch(file.path().to_str().unwrap())
      .await
      .unwrap_err();

    assert!(matches!(err, GenerationError::Fetch { .. }));
  }
}
