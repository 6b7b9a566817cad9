pub mod manager;
pub mod models;
pub mod query_builder;
pub mod repository;
pub mod source;

pub use manager::{with_deadline, DatabaseError, DatabaseManager};
pub use repository::Repository;
pub use source::RecordSource;
