// Storage configuration and SQLite connection management
pub mod connection;
pub mod migrations;

// Re-export connection types and functions
pub use connection::*;
