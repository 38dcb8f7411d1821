use serde::{Deserialize, Serialize};

/// Storage model for a health record.
///
/// Classification fields are stored as the labels produced at submission
/// time and are never recomputed by the storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Unique identifier assigned when the record was created
    pub id: String,

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

    /// Systolic blood pressure in mmHg
    pub systolic: i32,

    /// Diastolic blood pressure in mmHg
    pub diastolic: i32,

    /// Pulse rate in beats per minute
    pub pulse: i32,

    /// Blood-oxygen saturation in percent
    pub spo2: f64,

    /// Body temperature in degrees Celsius
    pub temperature: f64,

    /// Assessment date (YYYY-MM-DD)
    pub date: String,

    /// Local time of submission (HH:MM:SS)
    pub time: String,

    /// Blood pressure stage label
    pub bp_stage: String,

    /// Display color token for the blood pressure stage
    pub color: String,

    /// Fitness verdict label
    pub fitness: String,

    /// Free-text note, empty unless the verdict required one
    #[serde(default)]
    pub note: String,
}
