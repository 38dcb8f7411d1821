//! Command-line argument parsing for healthlog
//!
//! Provides the clap-based CLI with subcommands and verbosity control.

use chrono::{Local, NaiveDate};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use health_log_domain::database::StorageType;
use health_log_domain::entities::{SubmitRecordRequest, VitalReading};
use health_log_domain::services::{FitnessPolicy, ReportScope, ReportWeek};

/// healthlog - record employee vitals and fitness-for-duty verdicts
#[derive(Parser, Debug)]
#[command(name = "healthlog")]
#[command(version)]
#[command(about = "Record employee vitals, classify fitness for duty and print reports", long_about = None)]
pub struct Args {
    /// Fitness policy for new submissions (three-tier or two-tier)
    #[arg(long, global = true)]
    pub policy: Option<FitnessPolicy>,

    /// Storage backend (sqlite, json or memory)
    #[arg(long, global = true)]
    pub storage: Option<StorageType>,

    /// Path of the SQLite database or JSON file
    #[arg(long, global = true, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// Verbosity level: default (info), -v (debug), -vv (trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

impl Args {
    /// Log filter used when `RUST_LOG` is not set
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a new record
    Add(RecordArgs),

    /// Re-submit an existing record with some fields changed
    Edit {
        /// Record id
        id: String,

        #[command(flatten)]
        changes: RecordChanges,
    },

    /// Delete one record
    Delete {
        /// Record id
        id: String,
    },

    /// Delete every record
    Clear {
        /// Confirm deleting everything
        #[arg(long)]
        yes: bool,
    },

    /// List records in a report scope
    List {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one record
    Show {
        /// Record id
        id: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Classify a reading without storing it
    Preview(VitalArgs),

    /// Verdict counts for a report scope
    Stats {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Write a PDF report for a scope
    Export {
        #[command(flatten)]
        scope: ScopeArgs,

        /// Output file; defaults to a name derived from the scope
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import records saved by the old browser form
    Import {
        /// JSON file holding the old record array
        file: PathBuf,
    },

    /// Display current configuration
    Config,
}

/// The five vitals
#[derive(ClapArgs, Debug, Clone)]
pub struct VitalArgs {
    /// Systolic pressure (mmHg)
    #[arg(long, allow_negative_numbers = true)]
    pub systolic: i32,

    /// Diastolic pressure (mmHg)
    #[arg(long, allow_negative_numbers = true)]
    pub diastolic: i32,

    /// Pulse (bpm)
    #[arg(long, allow_negative_numbers = true)]
    pub pulse: i32,

    /// Oxygen saturation (%)
    #[arg(long, allow_negative_numbers = true)]
    pub spo2: f64,

    /// Body temperature (°C)
    #[arg(long, allow_negative_numbers = true)]
    pub temp: f64,
}

impl VitalArgs {
    pub fn reading(&self) -> VitalReading {
        VitalReading {
            systolic: self.systolic,
            diastolic: self.diastolic,
            pulse: self.pulse,
            spo2: self.spo2,
            temperature: self.temp,
        }
    }
}

/// Everything a new record needs
#[derive(ClapArgs, Debug, Clone)]
pub struct RecordArgs {
    /// Employee name
    #[arg(long)]
    pub name: String,

    /// Badge number
    #[arg(long)]
    pub badge: String,

    /// Age in years
    #[arg(long)]
    pub age: u32,

    /// Job title
    #[arg(long)]
    pub title: String,

    /// Supervisor
    #[arg(long)]
    pub supervisor: String,

    /// Department
    #[arg(long)]
    pub dept: String,

    #[command(flatten)]
    pub vitals: VitalArgs,

    /// Assessment date (YYYY-MM-DD); today by default
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Note, required when the verdict is FIT WITH NOTE
    #[arg(long)]
    pub note: Option<String>,
}

impl RecordArgs {
    pub fn into_request(self, today: NaiveDate) -> SubmitRecordRequest {
        SubmitRecordRequest {
            name: self.name,
            badge_number: self.badge,
            age: self.age,
            job_title: self.title,
            supervisor: self.supervisor,
            department: self.dept,
            reading: self.vitals.reading(),
            date: self.date.unwrap_or(today),
            note: self.note,
        }
    }
}

/// Fields to change when editing; anything omitted keeps its stored value
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RecordChanges {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub badge: Option<String>,
    #[arg(long)]
    pub age: Option<u32>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub supervisor: Option<String>,
    #[arg(long)]
    pub dept: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    pub systolic: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    pub diastolic: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    pub pulse: Option<i32>,
    #[arg(long, allow_negative_numbers = true)]
    pub spo2: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub temp: Option<f64>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// New note; pass an empty string to drop the stored one
    #[arg(long)]
    pub note: Option<String>,
}

impl RecordChanges {
    /// Apply the changes on top of a prefilled request
    pub fn apply(self, mut request: SubmitRecordRequest) -> SubmitRecordRequest {
        if let Some(name) = self.name {
            request.name = name;
        }
        if let Some(badge) = self.badge {
            request.badge_number = badge;
        }
        if let Some(age) = self.age {
            request.age = age;
        }
        if let Some(title) = self.title {
            request.job_title = title;
        }
        if let Some(supervisor) = self.supervisor {
            request.supervisor = supervisor;
        }
        if let Some(dept) = self.dept {
            request.department = dept;
        }
        if let Some(systolic) = self.systolic {
            request.reading.systolic = systolic;
        }
        if let Some(diastolic) = self.diastolic {
            request.reading.diastolic = diastolic;
        }
        if let Some(pulse) = self.pulse {
            request.reading.pulse = pulse;
        }
        if let Some(spo2) = self.spo2 {
            request.reading.spo2 = spo2;
        }
        if let Some(temp) = self.temp {
            request.reading.temperature = temp;
        }
        if let Some(date) = self.date {
            request.date = date;
        }
        if let Some(note) = self.note {
            request.note = if note.is_empty() { None } else { Some(note) };
        }
        request
    }
}

/// Report scope selection; a daily report for today when nothing is given
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Daily report for this date (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["week", "all"])]
    pub date: Option<NaiveDate>,

    /// Weekly report for this week (YYYY-Www)
    #[arg(long, conflicts_with = "all")]
    pub week: Option<ReportWeek>,

    /// Every stored record
    #[arg(long)]
    pub all: bool,
}

impl ScopeArgs {
    pub fn scope(&self, today: NaiveDate) -> ReportScope {
        if self.all {
            ReportScope::All
        } else if let Some(week) = self.week {
            ReportScope::Weekly(week)
        } else {
            ReportScope::Daily(self.date.unwrap_or(today))
        }
    }
}

/// Local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_add() {
        let args = parse(&[
            "healthlog", "add", "--name", "Ayu", "--badge", "B-1", "--age", "30", "--title",
            "Welder", "--supervisor", "Rina", "--dept", "Fab", "--systolic", "135",
            "--diastolic", "70", "--pulse", "80", "--spo2", "97", "--temp", "36.8", "--date",
            "2024-05-02", "--note", "ok",
        ]);

        let Commands::Add(record) = args.command else {
            panic!("expected add");
        };
        let request = record.into_request(date(2024, 6, 1));
        assert_eq!(request.name, "Ayu");
        assert_eq!(request.reading.systolic, 135);
        assert_eq!(request.reading.temperature, 36.8);
        assert_eq!(request.date, date(2024, 5, 2));
        assert_eq!(request.note.as_deref(), Some("ok"));
    }

    #[test]
    fn test_add_requires_vitals() {
        let result = Args::try_parse_from([
            "healthlog", "add", "--name", "Ayu", "--badge", "B-1", "--age", "30", "--title",
            "Welder", "--supervisor", "Rina", "--dept", "Fab",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags() {
        let args = parse(&["healthlog", "list", "--policy", "two-tier", "--storage", "json", "-vv"]);
        assert_eq!(args.policy, Some(FitnessPolicy::TwoTier));
        assert_eq!(args.storage, Some(StorageType::JsonFile));
        assert_eq!(args.log_level(), "trace");

        assert!(Args::try_parse_from(["healthlog", "list", "--policy", "strict"]).is_err());
    }

    #[test]
    fn test_scope_selection() {
        let today = date(2024, 5, 9);

        let args = parse(&["healthlog", "stats"]);
        let Commands::Stats { scope, .. } = args.command else {
            panic!("expected stats");
        };
        assert_eq!(scope.scope(today), ReportScope::Daily(today));

        let args = parse(&["healthlog", "export", "--week", "2024-W19"]);
        let Commands::Export { scope, .. } = args.command else {
            panic!("expected export");
        };
        assert_eq!(
            scope.scope(today),
            ReportScope::Weekly(ReportWeek::new(2024, 19).unwrap())
        );

        let args = parse(&["healthlog", "list", "--all"]);
        let Commands::List { scope, .. } = args.command else {
            panic!("expected list");
        };
        assert_eq!(scope.scope(today), ReportScope::All);

        assert!(Args::try_parse_from(["healthlog", "list", "--all", "--date", "2024-05-02"]).is_err());
        assert!(Args::try_parse_from(["healthlog", "list", "--week", "2024-W60"]).is_err());
    }

    #[test]
    fn test_record_changes_apply() {
        let base = RecordArgs {
            name: "Ayu".to_string(),
            badge: "B-1".to_string(),
            age: 30,
            title: "Welder".to_string(),
            supervisor: "Rina".to_string(),
            dept: "Fab".to_string(),
            vitals: VitalArgs {
                systolic: 118,
                diastolic: 76,
                pulse: 72,
                spo2: 98.0,
                temp: 36.6,
            },
            date: Some(date(2024, 5, 2)),
            note: Some("old".to_string()),
        }
        .into_request(date(2024, 5, 2));

        let changes = RecordChanges {
            systolic: Some(150),
            note: Some(String::new()),
            ..RecordChanges::default()
        };
        let request = changes.apply(base);
        assert_eq!(request.reading.systolic, 150);
        assert_eq!(request.reading.diastolic, 76);
        assert_eq!(request.name, "Ayu");
        assert_eq!(request.note, None);
    }
}
