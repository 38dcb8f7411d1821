use chrono::NaiveDate;
use health_log_data::models::record::StoredRecord;
use uuid::Uuid;

use crate::entities::record::HealthRecord;
use crate::entities::vitals::VitalReading;

// Conversion functions between domain entities and storage models.
// Functions follow the pattern convert_to_[target_layer]_[model_name].

/// Date format used by stored records
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a string ID into a UUID
///
/// Centralizes UUID parsing so every layer reports malformed IDs the same way.
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id.trim()).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Convert from storage model to domain entity.
///
/// Stored labels are parsed, never recomputed.
pub fn convert_to_domain_record(stored: StoredRecord) -> Result<HealthRecord, String> {
    let id = parse_string_to_uuid(&stored.id)?;
    let date = NaiveDate::parse_from_str(&stored.date, DATE_FORMAT)
        .map_err(|e| format!("Invalid date '{}' in record {}: {}", stored.date, stored.id, e))?;
    let bp_stage = stored.bp_stage.parse()?;
    let fitness = stored.fitness.parse()?;

    Ok(HealthRecord {
        id,
        name: stored.name,
        badge_number: stored.badge_number,
        age: stored.age,
        job_title: stored.job_title,
        supervisor: stored.supervisor,
        department: stored.department,
        reading: VitalReading {
            systolic: stored.systolic,
            diastolic: stored.diastolic,
            pulse: stored.pulse,
            spo2: stored.spo2,
            temperature: stored.temperature,
        },
        date,
        time: stored.time,
        bp_stage,
        color: stored.color,
        fitness,
        note: stored.note,
    })
}

/// Convert from domain entity to storage model
pub fn convert_to_data_record(record: &HealthRecord) -> StoredRecord {
    StoredRecord {
        id: record.id.to_string(),
        name: record.name.clone(),
        badge_number: record.badge_number.clone(),
        age: record.age,
        job_title: record.job_title.clone(),
        supervisor: record.supervisor.clone(),
        department: record.department.clone(),
        systolic: record.reading.systolic,
        diastolic: record.reading.diastolic,
        pulse: record.reading.pulse,
        spo2: record.reading.spo2,
        temperature: record.reading.temperature,
        date: record.date.format(DATE_FORMAT).to_string(),
        time: record.time.clone(),
        bp_stage: record.bp_stage.label().to_string(),
        color: record.color.clone(),
        fitness: record.fitness.label().to_string(),
        note: record.note.clone(),
    }
}
