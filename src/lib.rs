// Public API - the runner plus the pieces needed to drive imports directly
pub mod db;
pub mod error;
pub mod formats;
pub mod ident;
pub mod import;
pub mod runner;

// Internal modules
mod config;

pub use error::ImportError;
pub use ident::IdentRegistry;
pub use import::FileMetadata;
