/// Failures raised by the reference closure and rewrite engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
  #[error("reference '{pointer}' does not resolve to a value in the document")]
  PointerNotFound { pointer: String },
  #[error("reference '{pointer}' points outside the document; only '#/...' pointers are supported")]
  ExternalReference { pointer: String },
  #[error("component at '{pointer}' cannot be relocated under a prefixed name")]
  UnmovableReference { pointer: String },
  #[error("onPathComplete hook failed for '{path}': {message}")]
  PathHookFailed { path: String, message: String },
}

pub type Result<T, E = ComposeError> = std::result::Result<T, E>;
