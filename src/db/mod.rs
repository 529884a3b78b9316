//! Database layer - SQLite connection pooling and SQL generation

pub mod pool;
pub mod schema;

pub use pool::Pool;
pub use schema::SqlType;
