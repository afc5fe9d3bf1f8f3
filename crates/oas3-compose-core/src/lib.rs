//! Reference closure and re-pathing engine for composing OpenAPI 3 documents.
//!
//! Given a source document and a per-path import configuration, [`assemble`] selects path items,
//! captures every component they transitively reference, and namespaces the captured components
//! so fragments from many sources can be [`merge`]d into one document without name collisions.
#![allow(clippy::missing_errors_doc)]

pub mod assemble;
pub mod closure;
pub mod error;
pub mod index;
pub mod merge;
pub mod pointer;
pub mod repack;
pub mod rewrite;
pub mod selector;

pub use assemble::{AssemblyReport, CapturedComponent, DocConfig, ImportFragment, assemble, assemble_with_report};
pub use closure::{ClosureEntry, ReferenceClosure, compute_closure};
pub use error::{ComposeError, Result};
pub use index::{ReferenceSite, Step, find_reference_nodes};
pub use merge::merge;
pub use pointer::{JsonPointer, resolve};
pub use repack::repack;
pub use rewrite::{ReferenceRewrite, RewriteReport, rewrite};
pub use selector::{HttpMethod, PathConfig, PathHook, PathSelection, PathsConfig, select_paths};

#[cfg(test)]
mod tests;
