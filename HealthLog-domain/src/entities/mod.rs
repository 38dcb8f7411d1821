// Domain entities and value objects
pub mod conversions;
pub mod record;
pub mod vitals;

// Re-export common types for easier imports
pub use record::{HealthRecord, SubmitRecordRequest};
pub use vitals::{BloodPressureStage, FitnessVerdict, SeverityColor, VitalReading};
