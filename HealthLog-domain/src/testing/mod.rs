// Testing utilities and fixtures for the domain layer
// This module is only available in tests or when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use health_log_data::repository::tests::{sample_record, MockRecordStorage};

use chrono::NaiveDate;
use health_log_data::repository::RecordRepository;
use uuid::Uuid;

use crate::entities::record::{HealthRecord, SubmitRecordRequest};
use crate::entities::vitals::{FitnessVerdict, VitalReading};
use crate::services::classifier::{classify_blood_pressure, FitnessPolicy};
use crate::services::records::RecordService;

/// A reading that is FIT under both policies
pub fn fit_reading() -> VitalReading {
    VitalReading {
        systolic: 118,
        diastolic: 76,
        pulse: 72,
        spo2: 98.0,
        temperature: 36.6,
    }
}

/// A complete submit request for `reading`, dated 2024-05-02, without a note
pub fn sample_request(reading: VitalReading) -> SubmitRecordRequest {
    SubmitRecordRequest {
        name: "Budi".to_string(),
        badge_number: "BN-001".to_string(),
        age: 34,
        job_title: "Operator".to_string(),
        supervisor: "Sari".to_string(),
        department: "Production".to_string(),
        reading,
        date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        note: None,
    }
}

/// A frozen record on `date` carrying `fitness`, whatever its vitals say
pub fn record_on(date: NaiveDate, fitness: FitnessVerdict) -> HealthRecord {
    let reading = fit_reading();
    let bp_stage = classify_blood_pressure(reading.systolic, reading.diastolic);

    HealthRecord {
        id: Uuid::new_v4(),
        name: "Budi".to_string(),
        badge_number: "BN-001".to_string(),
        age: 34,
        job_title: "Operator".to_string(),
        supervisor: "Sari".to_string(),
        department: "Production".to_string(),
        reading,
        date,
        time: "07:15:00".to_string(),
        bp_stage,
        color: bp_stage.color_token().to_string(),
        fitness,
        note: if fitness.requires_note() {
            "checked".to_string()
        } else {
            String::new()
        },
    }
}

/// A service over empty mock storage
pub fn mock_record_service(policy: FitnessPolicy) -> RecordService<MockRecordStorage> {
    RecordService::new(RecordRepository::new(MockRecordStorage::new()), policy)
}
