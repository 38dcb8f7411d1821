// Repository module structure
pub mod errors;
mod in_memory;
mod records;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use in_memory::InMemoryStorage;
pub use records::{open_storage, ConfiguredStorage, RecordRepository, RecordStorage, RECORDS_KEY};
pub use storage::JsonFileStorage;
#[cfg(feature = "sqlite")]
pub use storage::SqliteStorage;

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub use records::tests;
