pub mod compose;
pub mod list;

pub use compose::{ComposeSettings, compose_documents};
pub use list::{list_paths, list_refs};
