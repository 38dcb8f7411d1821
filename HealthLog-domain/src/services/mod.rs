pub mod classifier;
pub mod legacy_import;
pub mod records;
pub mod report;

// Domain services
// This module contains business logic implementations.

// Re-export the service types and the classification entry points
pub use classifier::{classify_blood_pressure, FitnessAssessment, FitnessPolicy};
pub use legacy_import::{parse_legacy_blob, ImportError};
pub use records::{RecordPreview, RecordService, RecordServiceError};
pub use report::{week_of_year, ReportError, ReportScope, ReportStatistics, ReportWeek};
