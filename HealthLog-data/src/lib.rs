// HealthLog Data
// This crate owns durable storage of health records

// Storage configuration, SQLite pools and migrations
pub mod database;

// Record store and its storage backends
pub mod repository;

// Data storage models
pub mod models;
