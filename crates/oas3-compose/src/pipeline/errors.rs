use std::{fmt::Display, path::Path};

use oas3_compose_core::ComposeError;

use crate::{pipeline::metrics::ComposeStats, sources::validate::ValidationReport};

/// Why one source, or the destination, of a generation config failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
  #[error("source '{location}' could not be found")]
  SourceNotFound { location: String },
  #[error("failed to fetch '{location}': {message}")]
  Fetch { location: String, message: String },
  #[error("'{location}' is neither a Swagger 2.x nor an OpenAPI 3.x document")]
  UnrecognizedDocument { location: String },
  #[error("'{location}' failed validation with {count} error(s)", count = .report.errors.len())]
  Validation { location: String, report: ValidationReport },
  #[error("failed to compose '{location}': {error}")]
  Compose {
    location: String,
    #[source]
    error: ComposeError,
  },
  #[error("failed to write '{destination}': {message}")]
  Write { destination: String, message: String },
}

impl GenerationError {
  pub fn source_not_found(location: &str) -> Self {
    Self::SourceNotFound {
      location: location.to_string(),
    }
  }

  pub fn fetch(location: &str, err: impl Display) -> Self {
    Self::Fetch {
      location: location.to_string(),
      message: err.to_string(),
    }
  }

  pub fn unrecognized(location: &str) -> Self {
    Self::UnrecognizedDocument {
      location: location.to_string(),
    }
  }

  pub fn compose(location: &str, error: ComposeError) -> Self {
    Self::Compose {
      location: location.to_string(),
      error,
    }
  }

  pub fn write(destination: &Path, err: impl Display) -> Self {
    Self::Write {
      destination: destination.display().to_string(),
      message: err.to_string(),
    }
  }
}

/// Every error collected while running one generation config.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{} source(s) failed to compose", .errors.len())]
pub struct ComposeFailure {
  pub errors: Vec<GenerationError>,
  pub stats: ComposeStats,
}

impl ComposeFailure {
  /// The first collected error, which is the one re-raised to the caller.
  pub fn into_first(self) -> Option<GenerationError> {
    self.errors.into_iter().next()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_messages_name_the_location() {
    let err = GenerationError::compose(
      "https://petstore3.swagger.io/api/v3/openapi.json",
      ComposeError::PointerNotFound {
        pointer: "#/components/schemas/Missing".to_string(),
      },
    );

    assert_eq!(
      err.to_string(),
      "failed to compose 'https://petstore3.swagger.io/api/v3/openapi.json': reference \
       '#/components/schemas/Missing' does not resolve to a value in the document"
    );
  }

  #[test]
  fn test_validation_message_counts_errors() {
    let err = GenerationError::Validation {
      location: "out/api.json".to_string(),
      report: ValidationReport::default(),
    };
    assert_eq!(err.to_string(), "'out/api.json' failed validation with 0 error(s)");
  }

  #[test]
  fn test_into_first_keeps_collection_order() {
    let failure = ComposeFailure {
      errors: vec![
        GenerationError::source_not_found("a.json"),
        GenerationError::source_not_found("b.json"),
      ],
      stats: ComposeStats::default(),
    };

    assert_eq!(failure.to_string(), "2 source(s) failed to compose");
    assert_eq!(
      failure.into_first().map(|err| err.to_string()),
      Some("source 'a.json' could not be found".to_string())
    );
  }
}
