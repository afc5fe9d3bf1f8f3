pub mod fetch;
pub mod normalize;
pub mod validate;
pub mod write;

pub use fetch::DocumentLoader;
pub use normalize::to_v3;
pub use validate::{ValidationReport, validate};
pub use write::write_document;
