use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::vitals::{BloodPressureStage, FitnessVerdict, VitalReading};

/// Domain model for a stored health record.
///
/// `bp_stage`, `color` and `fitness` were frozen when the record was
/// submitted and are not recomputed when the record is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    /// Unique identifier for the record
    pub id: Uuid,

    /// Employee name
    pub name: String,

    /// Employee badge number
    pub badge_number: String,

    /// Age in years
    pub age: u32,

    /// Job title
    pub job_title: String,

    /// Direct supervisor
    pub supervisor: String,

    /// Department
    pub department: String,

    /// The measured vitals
    pub reading: VitalReading,

    /// Assessment date
    pub date: NaiveDate,

    /// Local time of submission
    pub time: String,

    /// Blood pressure stage at submission
    pub bp_stage: BloodPressureStage,

    /// Display color token at submission
    pub color: String,

    /// Fitness verdict at submission
    pub fitness: FitnessVerdict,

    /// Note, empty unless the verdict required one
    pub note: String,
}

/// Request payload for submitting or editing a health record
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitRecordRequest {
    /// Employee name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Employee badge number
    #[validate(length(min = 1, message = "Badge number is required"))]
    pub badge_number: String,

    /// Age in years
    pub age: u32,

    /// Job title
    #[validate(length(min = 1, message = "Job title is required"))]
    pub job_title: String,

    /// Direct supervisor
    #[validate(length(min = 1, message = "Supervisor is required"))]
    pub supervisor: String,

    /// Department
    #[validate(length(min = 1, message = "Department is required"))]
    pub department: String,

    /// The measured vitals
    pub reading: VitalReading,

    /// Assessment date
    pub date: NaiveDate,

    /// Note; mandatory when the verdict is FIT WITH NOTE
    #[validate(length(max = 1000, message = "Note cannot exceed 1000 characters"))]
    pub note: Option<String>,
}

impl From<&HealthRecord> for SubmitRecordRequest {
    /// Prefill an edit with the stored values
    fn from(record: &HealthRecord) -> Self {
        Self {
            name: record.name.clone(),
            badge_number: record.badge_number.clone(),
            age: record.age,
            job_title: record.job_title.clone(),
            supervisor: record.supervisor.clone(),
            department: record.department.clone(),
            reading: record.reading,
            date: record.date,
            note: if record.note.is_empty() {
                None
            } else {
                Some(record.note.clone())
            },
        }
    }
}
