pub mod error;
pub mod query;
pub mod redis;
pub mod store;
pub mod types;
pub mod validate;

pub use error::{StoreError, ValidationError};
pub use store::{MemoryStore, ProblemStore};
