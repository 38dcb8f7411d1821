use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::entities::record::HealthRecord;
use crate::entities::vitals::FitnessVerdict;

/// Report errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// Week string is not `YYYY-Www` or the week is out of range
    #[error("Invalid report week: {0}")]
    InvalidWeek(String),

    /// PDF rendering failed
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Week number of `date` within its own year.
///
/// Week = ceil(day_of_year / 7) with January 1st as day 1, so weeks always
/// start on January 1st whatever the weekday. This is not ISO-8601 and early
/// January never belongs to the previous year.
pub fn week_of_year(date: NaiveDate) -> u32 {
    (date.ordinal() + 6) / 7
}

/// A (year, week) pair selected for a weekly report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ReportWeek {
    pub year: i32,
    pub week: u32,
}

impl ReportWeek {
    /// Highest week number `week_of_year` can produce
    pub const MAX_WEEK: u32 = 53;

    /// Build a week, rejecting week numbers outside 1..=53
    pub fn new(year: i32, week: u32) -> Result<Self, ReportError> {
        if !(1..=Self::MAX_WEEK).contains(&week) {
            return Err(ReportError::InvalidWeek(format!(
                "week {} is outside 1..={}",
                week,
                Self::MAX_WEEK
            )));
        }
        Ok(Self { year, week })
    }

    /// The week `date` falls in
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            week: week_of_year(date),
        }
    }

    /// Whether `date` falls in this week
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::containing(date) == *self
    }
}

impl fmt::Display for ReportWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

impl FromStr for ReportWeek {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ReportError::InvalidWeek(format!("'{}', expected YYYY-Www", s));

        let (year, week) = s.trim().split_once("-W").ok_or_else(invalid)?;
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let week = week.parse::<u32>().map_err(|_| invalid())?;

        Self::new(year, week)
    }
}

/// Which records a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    /// Every stored record
    All,
    /// Records dated exactly on this day
    Daily(NaiveDate),
    /// Records whose date falls in this week
    Weekly(ReportWeek),
}

impl ReportScope {
    /// Whether a record belongs in this report
    pub fn matches(&self, record: &HealthRecord) -> bool {
        match self {
            ReportScope::All => true,
            ReportScope::Daily(date) => record.date == *date,
            ReportScope::Weekly(week) => week.contains(record.date),
        }
    }

    /// Records in scope, in store order
    pub fn filter(&self, records: &[HealthRecord]) -> Vec<HealthRecord> {
        records.iter().filter(|record| self.matches(record)).cloned().collect()
    }

    /// Report title
    pub fn title(&self) -> String {
        match self {
            ReportScope::All => "Employee Health Report - All Records".to_string(),
            ReportScope::Daily(date) => {
                format!("Daily Health Report - {}", date.format("%d/%m/%Y"))
            }
            ReportScope::Weekly(week) => format!("Weekly Health Report - {}", week),
        }
    }

    /// Suggested PDF file name; `printed_on` names the all-records export
    pub fn file_name(&self, printed_on: NaiveDate) -> String {
        match self {
            ReportScope::All => format!("report-all-{}.pdf", printed_on.format("%Y-%m-%d")),
            ReportScope::Daily(date) => format!("report-daily-{}.pdf", date.format("%Y-%m-%d")),
            ReportScope::Weekly(week) => format!("report-weekly-{}.pdf", week),
        }
    }
}

/// Verdict counts for a set of records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStatistics {
    pub total: usize,
    pub fit: usize,
    pub fit_with_note: usize,
    pub unfit: usize,
    /// Percentages rounded to one decimal; absent for an empty set
    pub fit_percentage: Option<f64>,
    pub fit_with_note_percentage: Option<f64>,
    pub unfit_percentage: Option<f64>,
}

impl ReportStatistics {
    /// Count the stored verdicts of `records`
    pub fn from_records(records: &[HealthRecord]) -> Self {
        let count = |verdict: FitnessVerdict| {
            records.iter().filter(|record| record.fitness == verdict).count()
        };

        let total = records.len();
        let fit = count(FitnessVerdict::Fit);
        let fit_with_note = count(FitnessVerdict::FitWithNote);
        let unfit = count(FitnessVerdict::Unfit);

        let percentage = |part: usize| {
            if total == 0 {
                None
            } else {
                Some((part as f64 * 1000.0 / total as f64).round() / 10.0)
            }
        };

        Self {
            total,
            fit,
            fit_with_note,
            unfit,
            fit_percentage: percentage(fit),
            fit_with_note_percentage: percentage(fit_with_note),
            unfit_percentage: percentage(unfit),
        }
    }
}
