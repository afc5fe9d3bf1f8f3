pub mod doc_hooks;
pub mod errors;
pub mod metrics;
pub mod orchestrator;

pub use errors::{ComposeFailure, GenerationError};
pub use metrics::{ComposeStats, ComposeWarning};
pub use orchestrator::{ComposedOutput, Orchestrator};
