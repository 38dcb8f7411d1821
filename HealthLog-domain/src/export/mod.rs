//! Report export.
//!
//! A [`Report`] is the printable view of a filtered record set: one row of
//! display cells per record plus verdict statistics. [`pdf`] renders it.

pub mod pdf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::entities::conversions::DATE_FORMAT;
use crate::entities::record::HealthRecord;
use crate::entities::vitals::{BloodPressureStage, FitnessVerdict};
use crate::services::classifier::classify_blood_pressure;
use crate::services::report::{ReportScope, ReportStatistics};

pub use pdf::generate_report_pdf;

/// Column headings in print order
pub const COLUMNS: [&str; 15] = [
    "Name",
    "BN",
    "Age",
    "Title",
    "Supervisor",
    "Dept",
    "Systolic",
    "Diastolic",
    "Pulse",
    "SpO2",
    "Temp",
    "Date",
    "BP Status",
    "Fitness",
    "Note",
];

/// Index of the blood pressure status column
pub const BP_STATUS_COLUMN: usize = 12;

/// Index of the fitness column
pub const FITNESS_COLUMN: usize = 13;

/// One printed row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub cells: [String; 15],
    /// Stage derived from the vitals when the row was built
    pub bp_stage: BloodPressureStage,
    /// Verdict frozen into the record
    pub fitness: FitnessVerdict,
}

impl ReportRow {
    pub fn from_record(record: &HealthRecord) -> Self {
        let reading = &record.reading;
        let bp_stage = classify_blood_pressure(reading.systolic, reading.diastolic);

        let note = if record.note.trim().is_empty() {
            "-".to_string()
        } else {
            record.note.clone()
        };

        Self {
            cells: [
                record.name.clone(),
                record.badge_number.clone(),
                record.age.to_string(),
                record.job_title.clone(),
                record.supervisor.clone(),
                record.department.clone(),
                reading.systolic.to_string(),
                reading.diastolic.to_string(),
                reading.pulse.to_string(),
                format!("{}%", reading.spo2),
                format!("{}°C", reading.temperature),
                record.date.format(DATE_FORMAT).to_string(),
                bp_stage.label().to_string(),
                record.fitness.label().to_string(),
                note,
            ],
            bp_stage,
            fitness: record.fitness,
        }
    }
}

/// Everything needed to print one report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub title: String,
    pub printed_on: NaiveDate,
    pub rows: Vec<ReportRow>,
    pub statistics: ReportStatistics,
}

impl Report {
    /// Build the report for `scope` out of `records`, which may hold more
    /// than the scope selects.
    pub fn build(scope: &ReportScope, records: &[HealthRecord], printed_on: NaiveDate) -> Self {
        let selected = scope.filter(records);

        Self {
            title: scope.title(),
            printed_on,
            rows: selected.iter().map(ReportRow::from_record).collect(),
            statistics: ReportStatistics::from_records(&selected),
        }
    }

    /// The print-date line under the title
    pub fn printed_line(&self) -> String {
        format!("Printed: {}", self.printed_on.format("%d/%m/%Y"))
    }

    /// One-line verdict summary
    pub fn summary_line(&self) -> String {
        let stats = &self.statistics;
        let pct = |value: Option<f64>| value.map(|v| format!(" ({:.1}%)", v)).unwrap_or_default();

        format!(
            "Total: {} | FIT: {}{} | FIT WITH NOTE: {}{} | UNFIT: {}{}",
            stats.total,
            stats.fit,
            pct(stats.fit_percentage),
            stats.fit_with_note,
            pct(stats.fit_with_note_percentage),
            stats.unfit,
            pct(stats.unfit_percentage),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::report::ReportWeek;
    use crate::testing::record_on;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_row_cells() {
        let mut record = record_on(date(2024, 5, 2), FitnessVerdict::Fit);
        record.reading.spo2 = 98.0;
        record.reading.temperature = 36.6;

        let row = ReportRow::from_record(&record);
        assert_eq!(row.cells.len(), COLUMNS.len());
        assert_eq!(row.cells[0], "Budi");
        assert_eq!(row.cells[9], "98%");
        assert_eq!(row.cells[10], "36.6°C");
        assert_eq!(row.cells[11], "2024-05-02");
        assert_eq!(row.cells[BP_STATUS_COLUMN], "Normal");
        assert_eq!(row.cells[FITNESS_COLUMN], "FIT");
        assert_eq!(row.cells[14], "-");
    }

    #[test]
    fn test_row_derives_stage_but_keeps_frozen_verdict() {
        let mut record = record_on(date(2024, 5, 2), FitnessVerdict::Fit);
        record.reading.systolic = 165;
        record.reading.diastolic = 105;

        let row = ReportRow::from_record(&record);
        assert_eq!(row.bp_stage, BloodPressureStage::Hypertension2);
        assert_eq!(row.fitness, FitnessVerdict::Fit);
        assert_eq!(row.cells[FITNESS_COLUMN], "FIT");
    }

    #[test]
    fn test_row_keeps_note() {
        let record = record_on(date(2024, 5, 2), FitnessVerdict::FitWithNote);
        assert_eq!(ReportRow::from_record(&record).cells[14], "checked");
    }

    #[test]
    fn test_build_weekly_report() {
        let records = vec![
            record_on(date(2024, 1, 2), FitnessVerdict::Fit),
            record_on(date(2024, 1, 9), FitnessVerdict::Unfit),
            record_on(date(2024, 1, 5), FitnessVerdict::Unfit),
        ];
        let scope = ReportScope::Weekly(ReportWeek::new(2024, 1).unwrap());

        let report = Report::build(&scope, &records, date(2024, 1, 10));
        assert_eq!(report.title, "Weekly Health Report - 2024-W01");
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.statistics.unfit, 1);
        assert_eq!(report.printed_line(), "Printed: 10/01/2024");
        assert_eq!(
            report.summary_line(),
            "Total: 2 | FIT: 1 (50.0%) | FIT WITH NOTE: 0 (0.0%) | UNFIT: 1 (50.0%)"
        );
    }

    #[test]
    fn test_empty_report_summary() {
        let report = Report::build(&ReportScope::All, &[], date(2024, 1, 10));
        assert!(report.rows.is_empty());
        assert_eq!(
            report.summary_line(),
            "Total: 0 | FIT: 0 | FIT WITH NOTE: 0 | UNFIT: 0"
        );
    }
}
