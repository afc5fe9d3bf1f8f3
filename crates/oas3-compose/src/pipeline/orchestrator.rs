//! Composition of one output document from many sources.
//!
//! Every source is imported as its own future (fetch, normalize, validate, assemble) and the
//! futures are driven together. Fragments are merged in the order the sources are declared in
//! the configuration, whatever order they finish in. A failing source does not stop its
//! siblings: all errors are collected and the composition fails as a whole.

use futures::future::{join, join_all};
use oas3_compose_core::{AssemblyReport, DocConfig, ImportFragment, assemble_with_report, merge};
use serde_json::{Map, Value};

use crate::{
  config::GenerationConfig,
  pipeline::{
    errors::{ComposeFailure, GenerationError},
    metrics::{ComposeStats, ComposeWarning},
  },
  sources::{DocumentLoader, ValidationReport, to_v3, validate},
};

/// Top-level keys a source contributes through its import fragment rather than its header.
const FRAGMENT_KEYS: &[&str] = &["paths", "components"];

pub struct Orchestrator {
  config: GenerationConfig,
  loader: DocumentLoader,
}

/// A composed document ready to be written.
#[derive(Debug, Clone)]
pub struct ComposedOutput {
  pub document: Value,
  pub stats: ComposeStats,
  pub validation: ValidationReport,
}

/// One source after a successful import.
#[derive(Debug)]
struct ImportedSource {
  location: String,
  header: Map<String, Value>,
  fragment: ImportFragment,
  converted: bool,
  report: AssemblyReport,
  validation: ValidationReport,
  missing_paths: Vec<String>,
}

impl Orchestrator {
  pub fn new(config: GenerationConfig) -> Self {
    Self {
      config,
      loader: DocumentLoader::new(),
    }
  }

  pub fn config(&self) -> &GenerationConfig {
    &self.config
  }

  /// Builds the output document without writing it.
  pub async fn compose(&self) -> Result<ComposedOutput, ComposeFailure> {
    let imports = join_all(
      self
        .config
        .docs
        .iter()
        .map(|(location, doc_config)| self.import(location, doc_config)),
    );
    let (template, imports) = join(self.load_template(), imports).await;

    let mut stats = ComposeStats::default();
    let mut errors = Vec::new();
    let mut imported = Vec::new();

    let base = template.unwrap_or_else(|err| {
      errors.push(err);
      None
    });

    for result in imports {
      match result {
        Ok(source) => {
          stats.record_source(&source.location, source.converted, &source.report);
          if !source.validation.is_clean() {
            stats.record_validation(&source.location, &source.validation);
          }
          stats.record_warnings(source.missing_paths.iter().map(|path| ComposeWarning::MissingPath {
            location: source.location.clone(),
            path: path.clone(),
          }));
          imported.push(source);
        }
        Err(err) => errors.push(err),
      }
    }

    if !errors.is_empty() {
      return Err(ComposeFailure { errors, stats });
    }

    let has_template = base.is_some();
    let mut document = base.unwrap_or_else(|| Value::Object(Map::new()));
    for source in imported {
      if !has_template {
        merge(&mut document, &Value::Object(source.header));
      }
      merge(&mut document, source.fragment.as_value());
    }

    for hook in &self.config.on_generated_doc {
      hook.apply(&mut document);
      stats.record_doc_hook();
    }

    let validation = validate(&document);
    if !validation.is_valid() && self.config.throw_dest_validation {
      return Err(ComposeFailure {
        errors: vec![GenerationError::Validation {
          location: self.config.destination.display().to_string(),
          report: validation,
        }],
        stats,
      });
    }
    if !validation.is_clean() {
      stats.record_validation(&self.config.destination.display().to_string(), &validation);
    }

    Ok(ComposedOutput {
      document,
      stats,
      validation,
    })
  }

  async fn load_template(&self) -> Result<Option<Value>, GenerationError> {
    match &self.config.template {
      Some(template) => self.loader.fetch(template).await.map(Some),
      None => Ok(None),
    }
  }

  async fn import(&self, location: &str, doc_config: &DocConfig) -> Result<ImportedSource, GenerationError> {
    let raw = self.loader.fetch(location).await?;
    let normalized = to_v3(location, raw)?;

    let validation = validate(&normalized.document);
    if !validation.is_valid() && self.config.throw_src_validation {
      return Err(GenerationError::Validation {
        location: location.to_string(),
        report: validation,
      });
    }

    let (fragment, report) =
      assemble_with_report(&normalized.document, doc_config).map_err(|err| GenerationError::compose(location, err))?;

    let source_paths = normalized.document.get("paths").and_then(Value::as_object);
    let missing_paths = doc_config
      .paths
      .iter()
      .flat_map(|paths| paths.keys())
      .filter(|path| !source_paths.is_some_and(|source_paths| source_paths.contains_key(*path)))
      .cloned()
      .collect();

    let converted = normalized.was_converted();
    let header = match normalized.document {
      Value::Object(doc) => doc
        .into_iter()
        .filter(|(key, _)| !FRAGMENT_KEYS.contains(&key.as_str()))
        .collect(),
      _ => Map::new(),
    };

    Ok(ImportedSource {
      location: location.to_string(),
      header,
      fragment,
      converted,
      report,
      validation,
      missing_paths,
    })
  }
}
