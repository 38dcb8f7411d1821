use chrono::Local;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use health_log_data::repository::{RecordRepository, RecordStorage, RepositoryError};

use crate::entities::conversions;
use crate::entities::record::{HealthRecord, SubmitRecordRequest};
use crate::entities::vitals::{BloodPressureStage, FitnessVerdict, VitalReading};
use crate::services::classifier::{classify_blood_pressure, FitnessAssessment, FitnessPolicy};
use crate::services::legacy_import::{parse_legacy_blob, ImportError};
use crate::services::report::{ReportScope, ReportStatistics};

/// Record service errors
#[derive(Debug, Error)]
pub enum RecordServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The verdict needs a note and none was given
    #[error("A note is required for a {0} verdict")]
    NoteRequired(FitnessVerdict),

    /// Not found error
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A stored record could not be read back
    #[error("Corrupt stored record: {0}")]
    CorruptRecord(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// Legacy import failed; nothing was stored
    #[error("Import error: {0}")]
    Import(#[from] ImportError),
}

/// Classification of a reading without storing anything
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordPreview {
    pub bp_stage: BloodPressureStage,
    pub assessment: FitnessAssessment,
}

/// Record service: the submission gate in front of the record store
pub struct RecordService<S: RecordStorage> {
    repository: RecordRepository<S>,
    policy: FitnessPolicy,
}

impl<S: RecordStorage> RecordService<S> {
    /// Create a service over a loaded repository
    pub fn new(repository: RecordRepository<S>, policy: FitnessPolicy) -> Self {
        Self { repository, policy }
    }

    /// Policy used for new submissions
    pub fn policy(&self) -> FitnessPolicy {
        self.policy
    }

    /// Underlying repository
    pub fn repository(&self) -> &RecordRepository<S> {
        &self.repository
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> RecordServiceError {
        match err {
            RepositoryError::NotFound(msg) => RecordServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => RecordServiceError::ValidationError(msg),
            _ => RecordServiceError::RepositoryError(err.to_string()),
        }
    }

    /// Classify a reading without touching storage
    pub fn preview(&self, reading: &VitalReading) -> Result<RecordPreview, RecordServiceError> {
        validate_decimal_vitals(reading)?;
        Ok(RecordPreview {
            bp_stage: classify_blood_pressure(reading.systolic, reading.diastolic),
            assessment: self.policy.assess(reading),
        })
    }

    /// Validate a submit request
    pub fn validate_submit_request(
        &self,
        request: &SubmitRecordRequest,
    ) -> Result<(), RecordServiceError> {
        // Use the validator crate's validation
        if let Err(validation_errors) = request.validate() {
            let mut fields: Vec<String> = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| {
                            if let Some(msg) = &err.message {
                                msg.to_string()
                            } else {
                                format!("Invalid {}", field)
                            }
                        })
                        .collect();
                    format!("{}: {}", field, error_msgs.join(", "))
                })
                .collect();
            fields.sort();

            return Err(RecordServiceError::ValidationError(fields.join("; ")));
        }

        validate_decimal_vitals(&request.reading)
    }

    /// Validate, classify and freeze a request into a record with `id`
    fn freeze(&self, id: Uuid, request: SubmitRecordRequest) -> Result<HealthRecord, RecordServiceError> {
        self.validate_submit_request(&request)?;

        let reading = request.reading;
        let fitness = self.policy.classify(&reading);
        let bp_stage = classify_blood_pressure(reading.systolic, reading.diastolic);

        let note = request.note.unwrap_or_default();
        if fitness.requires_note() && note.trim().is_empty() {
            warn!("Rejected {} submission without a note", fitness);
            return Err(RecordServiceError::NoteRequired(fitness));
        }

        Ok(HealthRecord {
            id,
            name: request.name,
            badge_number: request.badge_number,
            age: request.age,
            job_title: request.job_title,
            supervisor: request.supervisor,
            department: request.department,
            reading,
            date: request.date,
            time: Local::now().format("%H:%M:%S").to_string(),
            bp_stage,
            color: bp_stage.color_token().to_string(),
            fitness,
            note: if fitness.requires_note() { note } else { String::new() },
        })
    }

    /// Submit a new record.
    ///
    /// Nothing is stored when validation fails or a required note is missing.
    pub fn submit(&mut self, request: SubmitRecordRequest) -> Result<HealthRecord, RecordServiceError> {
        let record = self.freeze(Uuid::new_v4(), request)?;

        self.repository
            .insert(conversions::convert_to_data_record(&record))
            .map_err(|e| self.map_repo_error(e))?;

        info!("Submitted record {} ({}, {})", record.id, record.bp_stage, record.fitness);
        Ok(record)
    }

    /// Replace the record `id` with a re-classified version of `request`.
    ///
    /// The record keeps its id and position; other records are untouched.
    pub fn update(
        &mut self,
        id: &str,
        request: SubmitRecordRequest,
    ) -> Result<HealthRecord, RecordServiceError> {
        let id = conversions::parse_string_to_uuid(id).map_err(RecordServiceError::ValidationError)?;
        if self.repository.get(&id.to_string()).is_none() {
            return Err(RecordServiceError::NotFound(format!(
                "Health record with ID {} not found",
                id
            )));
        }

        let record = self.freeze(id, request)?;

        self.repository
            .replace(conversions::convert_to_data_record(&record))
            .map_err(|e| self.map_repo_error(e))?;

        info!("Updated record {} ({}, {})", record.id, record.bp_stage, record.fitness);
        Ok(record)
    }

    /// Delete one record by id
    pub fn delete(&mut self, id: &str) -> Result<HealthRecord, RecordServiceError> {
        let id = conversions::parse_string_to_uuid(id).map_err(RecordServiceError::ValidationError)?;

        let removed = self
            .repository
            .remove(&id.to_string())
            .map_err(|e| self.map_repo_error(e))?;

        conversions::convert_to_domain_record(removed).map_err(RecordServiceError::CorruptRecord)
    }

    /// Delete every record. Returns how many were removed.
    pub fn delete_all(&mut self) -> Result<usize, RecordServiceError> {
        self.repository.clear().map_err(|e| self.map_repo_error(e))
    }

    /// Get a record by id
    pub fn get(&self, id: &str) -> Result<HealthRecord, RecordServiceError> {
        let id = conversions::parse_string_to_uuid(id).map_err(RecordServiceError::ValidationError)?;

        let stored = self.repository.get(&id.to_string()).cloned().ok_or_else(|| {
            RecordServiceError::NotFound(format!("Health record with ID {} not found", id))
        })?;

        conversions::convert_to_domain_record(stored).map_err(RecordServiceError::CorruptRecord)
    }

    /// All records in store order
    pub fn list(&self) -> Result<Vec<HealthRecord>, RecordServiceError> {
        self.repository
            .all()
            .iter()
            .cloned()
            .map(conversions::convert_to_domain_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RecordServiceError::CorruptRecord)
    }

    /// Records selected by a report scope
    pub fn records_in(&self, scope: &ReportScope) -> Result<Vec<HealthRecord>, RecordServiceError> {
        let records = self.list()?;
        let selected = scope.filter(&records);

        debug!("{} of {} records in scope {:?}", selected.len(), records.len(), scope);
        Ok(selected)
    }

    /// Verdict statistics for a report scope
    pub fn statistics(&self, scope: &ReportScope) -> Result<ReportStatistics, RecordServiceError> {
        Ok(ReportStatistics::from_records(&self.records_in(scope)?))
    }

    /// Append already-frozen records (e.g. imported ones) in one write
    pub fn append_frozen(&mut self, records: Vec<HealthRecord>) -> Result<usize, RecordServiceError> {
        let stored = records.iter().map(conversions::convert_to_data_record).collect();

        let added = self
            .repository
            .extend(stored)
            .map_err(|e| self.map_repo_error(e))?;

        info!("Appended {} frozen records", added);
        Ok(added)
    }

    /// Import a legacy record blob. All entries are stored in one write or none are.
    pub fn import_legacy(&mut self, blob: &str) -> Result<usize, RecordServiceError> {
        let records = parse_legacy_blob(blob, self.policy)?;
        self.append_frozen(records)
    }
}

/// Decimal vitals must be actual numbers
fn validate_decimal_vitals(reading: &VitalReading) -> Result<(), RecordServiceError> {
    if !reading.spo2.is_finite() {
        return Err(RecordServiceError::ValidationError(
            "spo2: SpO2 must be a number".to_string(),
        ));
    }
    if !reading.temperature.is_finite() {
        return Err(RecordServiceError::ValidationError(
            "temperature: Temperature must be a number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fit_reading, mock_record_service as service, sample_request, MockRecordStorage};
    use chrono::NaiveDate;

    fn note_reading() -> VitalReading {
        VitalReading {
            systolic: 135,
            diastolic: 70,
            pulse: 80,
            spo2: 97.0,
            temperature: 36.8,
        }
    }

    #[test]
    fn test_submit_fit_record() {
        let mut service = service(FitnessPolicy::ThreeTier);
        let record = service.submit(sample_request(fit_reading())).unwrap();

        assert_eq!(record.fitness, FitnessVerdict::Fit);
        assert_eq!(record.bp_stage, BloodPressureStage::Normal);
        assert_eq!(record.color, "bg-green-200");
        assert_eq!(record.time.len(), 8);
        assert_eq!(service.list().unwrap(), vec![record]);
        assert_eq!(service.repository().storage().write_count(), 1);
    }

    #[test]
    fn test_note_required_rejects_without_storing() {
        let mut service = service(FitnessPolicy::ThreeTier);

        let mut request = sample_request(note_reading());
        request.note = None;
        let result = service.submit(request.clone());
        assert!(matches!(
            result,
            Err(RecordServiceError::NoteRequired(FitnessVerdict::FitWithNote))
        ));

        request.note = Some("   ".to_string());
        assert!(matches!(
            service.submit(request),
            Err(RecordServiceError::NoteRequired(_))
        ));

        assert!(service.list().unwrap().is_empty());
        assert_eq!(service.repository().storage().write_count(), 0);
        assert_eq!(service.repository().storage().blob(), None);
    }

    #[test]
    fn test_note_is_stored_when_given() {
        let mut service = service(FitnessPolicy::ThreeTier);

        let mut request = sample_request(note_reading());
        request.note = Some("ok".to_string());
        let record = service.submit(request).unwrap();

        assert_eq!(record.fitness, FitnessVerdict::FitWithNote);
        assert_eq!(service.get(&record.id.to_string()).unwrap().note, "ok");
    }

    #[test]
    fn test_unfit_needs_no_note_and_drops_one() {
        let mut service = service(FitnessPolicy::ThreeTier);
        let reading = VitalReading {
            temperature: 38.2,
            ..fit_reading()
        };

        let without_note = service.submit(sample_request(reading)).unwrap();
        assert_eq!(without_note.fitness, FitnessVerdict::Unfit);

        let mut request = sample_request(reading);
        request.note = Some("feverish".to_string());
        let with_note = service.submit(request).unwrap();
        assert_eq!(with_note.fitness, FitnessVerdict::Unfit);
        assert_eq!(with_note.note, "");
    }

    #[test]
    fn test_two_tier_policy_never_asks_for_note() {
        let mut service = service(FitnessPolicy::TwoTier);
        let record = service.submit(sample_request(note_reading())).unwrap();
        assert_eq!(record.fitness, FitnessVerdict::Fit);
    }

    #[test]
    fn test_validation_errors() {
        let mut service = service(FitnessPolicy::ThreeTier);

        let mut request = sample_request(fit_reading());
        request.name = String::new();
        request.department = String::new();
        let err = service.submit(request).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Name is required"), "{}", message);
        assert!(message.contains("Department is required"), "{}", message);

        let mut request = sample_request(fit_reading());
        request.reading.spo2 = f64::NAN;
        assert!(matches!(
            service.submit(request),
            Err(RecordServiceError::ValidationError(_))
        ));

        assert_eq!(service.repository().storage().write_count(), 0);
    }

    #[test]
    fn test_update_reclassifies_only_that_record() {
        let mut service = service(FitnessPolicy::ThreeTier);
        let first = service.submit(sample_request(fit_reading())).unwrap();
        let second = service.submit(sample_request(fit_reading())).unwrap();

        let mut request = SubmitRecordRequest::from(&first);
        request.reading.systolic = 155;
        let updated = service.update(&first.id.to_string(), request).unwrap();

        assert_eq!(updated.id, first.id);
        assert_eq!(updated.fitness, FitnessVerdict::Unfit);
        assert_eq!(updated.bp_stage, BloodPressureStage::Hypertension1);

        let records = service.list().unwrap();
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[1], second);
    }

    #[test]
    fn test_update_applies_note_gate() {
        let mut service = service(FitnessPolicy::ThreeTier);
        let record = service.submit(sample_request(fit_reading())).unwrap();

        let request = sample_request(note_reading());
        let result = service.update(&record.id.to_string(), request);
        assert!(matches!(result, Err(RecordServiceError::NoteRequired(_))));
        assert_eq!(service.get(&record.id.to_string()).unwrap(), record);
    }

    #[test]
    fn test_update_unknown_or_malformed_id() {
        let mut service = service(FitnessPolicy::ThreeTier);
        let request = sample_request(fit_reading());

        assert!(matches!(
            service.update(&Uuid::new_v4().to_string(), request.clone()),
            Err(RecordServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.update("7", request),
            Err(RecordServiceError::ValidationError(_))
        ));
    }

    #[test]
    fn test_delete_from_filtered_view_removes_matching_record() {
        let mut service = service(FitnessPolicy::ThreeTier);
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let other_day = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();

        let mut request = sample_request(fit_reading());
        request.date = other_day;
        let kept = service.submit(request.clone()).unwrap();
        request.date = day;
        let target = service.submit(request).unwrap();

        let view = service.records_in(&ReportScope::Daily(day)).unwrap();
        assert_eq!(view.len(), 1);

        let removed = service.delete(&view[0].id.to_string()).unwrap();
        assert_eq!(removed.id, target.id);
        assert_eq!(service.list().unwrap(), vec![kept]);
    }

    #[test]
    fn test_delete_all() {
        let mut service = service(FitnessPolicy::ThreeTier);
        service.submit(sample_request(fit_reading())).unwrap();
        service.submit(sample_request(fit_reading())).unwrap();

        assert_eq!(service.delete_all().unwrap(), 2);
        assert!(service.list().unwrap().is_empty());
        assert!(matches!(
            service.delete(&Uuid::new_v4().to_string()),
            Err(RecordServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_preview_does_not_store() {
        let service = service(FitnessPolicy::ThreeTier);
        let preview = service.preview(&note_reading()).unwrap();

        assert_eq!(preview.bp_stage, BloodPressureStage::Prehypertension);
        assert_eq!(preview.assessment.verdict, FitnessVerdict::FitWithNote);
        assert_eq!(service.repository().storage().write_count(), 0);
    }

    #[test]
    fn test_preview_rejects_non_finite_decimals() {
        let service = service(FitnessPolicy::ThreeTier);

        let mut reading = note_reading();
        reading.spo2 = f64::NAN;
        let err = service.preview(&reading).unwrap_err();
        assert!(matches!(err, RecordServiceError::ValidationError(ref msg) if msg.starts_with("spo2")));

        let mut reading = note_reading();
        reading.temperature = f64::INFINITY;
        let err = service.preview(&reading).unwrap_err();
        assert!(matches!(err, RecordServiceError::ValidationError(ref msg) if msg.starts_with("temperature")));
    }

    #[test]
    fn test_import_legacy_appends_in_one_write() {
        let mut service = service(FitnessPolicy::ThreeTier);
        service.submit(sample_request(fit_reading())).unwrap();

        let blob = r#"[
            {"nama":"Siti","systolic":118,"diastolic":76,"nadi":72,"spo2":98,"suhu":36.6,
             "tanggal":"2024-03-04","fitness":"FIT"},
            {"nama":"Joko","systolic":118,"diastolic":76,"nadi":72,"spo2":98,"suhu":38.4,
             "tanggal":"2024-03-04","fitness":"TIDAK FIT"}
        ]"#;
        assert_eq!(service.import_legacy(blob).unwrap(), 2);

        let records = service.list().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].fitness, FitnessVerdict::Unfit);
        assert_eq!(service.repository().storage().write_count(), 2);
    }

    #[test]
    fn test_import_legacy_rejects_bad_blob_without_writing() {
        let mut service = service(FitnessPolicy::ThreeTier);
        let result = service.import_legacy(r#"[{"nama":"A"}]"#);

        assert!(matches!(result, Err(RecordServiceError::Import(_))));
        assert_eq!(service.repository().storage().write_count(), 0);
    }

    #[test]
    fn test_storage_failure_is_reported() {
        let storage = MockRecordStorage::new().with_write_failure();
        let mut service = RecordService::new(RecordRepository::new(storage), FitnessPolicy::ThreeTier);

        let result = service.submit(sample_request(fit_reading()));
        assert!(matches!(result, Err(RecordServiceError::RepositoryError(_))));
        assert!(service.list().unwrap().is_empty());
    }
}
