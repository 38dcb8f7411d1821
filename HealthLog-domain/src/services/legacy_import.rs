//! Import of record lists written by the older browser-based form.
//!
//! The old form kept its records as one JSON array with Indonesian keys.
//! Imported records get fresh ids; their fitness labels stay frozen.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::conversions::DATE_FORMAT;
use crate::entities::record::HealthRecord;
use crate::entities::vitals::{FitnessVerdict, VitalReading};
use crate::services::classifier::{classify_blood_pressure, FitnessPolicy};

/// Legacy import errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// The blob is not a JSON array of legacy records
    #[error("Malformed legacy blob: {0}")]
    Malformed(#[from] serde_json::Error),

    /// One entry could not be converted
    #[error("Legacy record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// A number the old form may have saved either as a number or as text
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LegacyNumber {
    Number(f64),
    Text(String),
}

impl LegacyNumber {
    fn value(&self) -> Option<f64> {
        match self {
            LegacyNumber::Number(n) => Some(*n),
            LegacyNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One entry of the legacy array
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyRecord {
    #[serde(default)]
    nama: String,
    #[serde(default)]
    bn: String,
    umur: Option<LegacyNumber>,
    #[serde(default)]
    jabatan: String,
    #[serde(default)]
    supervisor: String,
    #[serde(default)]
    dept: String,
    systolic: LegacyNumber,
    diastolic: LegacyNumber,
    nadi: LegacyNumber,
    spo2: LegacyNumber,
    suhu: LegacyNumber,
    tanggal: String,
    #[serde(default)]
    time: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    fitness: Option<String>,
    #[serde(default)]
    catatan: Option<String>,
}

/// Parse a legacy verdict label. `TIDAK FIT` is the old spelling of UNFIT.
pub fn parse_legacy_verdict(label: &str) -> Option<FitnessVerdict> {
    match label.trim() {
        "TIDAK FIT" => Some(FitnessVerdict::Unfit),
        other => other.parse().ok(),
    }
}

fn whole(value: &LegacyNumber, field: &str) -> Result<i32, String> {
    let value = decimal(value, field)?;
    if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return Err(format!("{} {} is not a whole number", field, value));
    }
    Ok(value as i32)
}

fn decimal(value: &LegacyNumber, field: &str) -> Result<f64, String> {
    value
        .value()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("{} is not a number", field))
}

impl LegacyRecord {
    /// Convert into a record with a fresh id.
    ///
    /// A missing fitness label is computed with `policy` and a missing colour
    /// token comes from the stage. The stage is always derived from the
    /// vitals, so fractional pressures are rejected rather than rounded.
    pub fn into_record(self, policy: FitnessPolicy) -> Result<HealthRecord, String> {
        let reading = VitalReading {
            systolic: whole(&self.systolic, "systolic")?,
            diastolic: whole(&self.diastolic, "diastolic")?,
            pulse: whole(&self.nadi, "nadi")?,
            spo2: decimal(&self.spo2, "spo2")?,
            temperature: decimal(&self.suhu, "suhu")?,
        };

        let date = NaiveDate::parse_from_str(self.tanggal.trim(), DATE_FORMAT)
            .map_err(|e| format!("tanggal '{}': {}", self.tanggal, e))?;

        let age = match &self.umur {
            Some(umur) => {
                let age = whole(umur, "umur")?;
                u32::try_from(age).map_err(|_| format!("umur {} is negative", age))?
            }
            None => 0,
        };

        let fitness = match self.fitness.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(label) => parse_legacy_verdict(label)
                .ok_or_else(|| format!("unknown fitness label '{}'", label))?,
            None => policy.classify(&reading),
        };

        let bp_stage = classify_blood_pressure(reading.systolic, reading.diastolic);
        let color = match self.color.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => bp_stage.color_token().to_string(),
        };

        Ok(HealthRecord {
            id: Uuid::new_v4(),
            name: self.nama,
            badge_number: self.bn,
            age,
            job_title: self.jabatan,
            supervisor: self.supervisor,
            department: self.dept,
            reading,
            date,
            time: self.time,
            bp_stage,
            color,
            fitness,
            note: self.catatan.unwrap_or_default(),
        })
    }
}

/// Parse a whole legacy blob into records.
///
/// Fails on the first entry that cannot be converted; nothing is returned
/// partially.
pub fn parse_legacy_blob(blob: &str, policy: FitnessPolicy) -> Result<Vec<HealthRecord>, ImportError> {
    let entries: Vec<LegacyRecord> = serde_json::from_str(blob)?;
    debug!("Parsed {} legacy entries", entries.len());

    let records = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            entry
                .into_record(policy)
                .map_err(|reason| ImportError::InvalidRecord { index, reason })
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!("Converted {} legacy records", records.len());
    Ok(records)
}
