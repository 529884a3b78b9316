//! Import pipeline - descriptor construction and the transactional insert loop

pub mod executor;
pub mod metadata;

pub use executor::{ImportOutcome, Importer};
pub use metadata::{FileMetadata, ImportOptions, build_metadata};
