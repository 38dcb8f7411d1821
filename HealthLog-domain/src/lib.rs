// HealthLog Domain
// This crate contains the business logic for the HealthLog application

// Domain entities and value objects
pub mod entities;

// Services that implement business logic
pub mod services;

// Report rendering
pub mod export;

// Domain configuration
pub mod config;

// Re-export the storage modules from the data layer for convenience
pub use health_log_data::{database, repository};

// Testing utilities - only available in tests or with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
