//! Subcommand handlers.
//!
//! Each handler writes its human-readable output to `out`; logging goes to
//! stderr through tracing.

use anyhow::{bail, Context as _, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::io::Write;
use tracing::info;

use health_log_domain::database::StorageConfig;
use health_log_domain::entities::{HealthRecord, SubmitRecordRequest};
use health_log_domain::export::{generate_report_pdf, Report};
use health_log_domain::repository::RecordStorage;
use health_log_domain::services::{FitnessPolicy, RecordService, ReportStatistics};

use crate::args::Commands;

/// What a handler needs besides the service
#[derive(Debug, Clone)]
pub struct Context {
    pub today: NaiveDate,
    pub storage: StorageConfig,
}

#[derive(Debug, Serialize)]
struct ConfigView {
    storage: String,
    location: String,
    pool_size: u32,
    timeout_seconds: u64,
    fitness_policy: FitnessPolicy,
}

/// Run one subcommand against `service`
pub fn run<S: RecordStorage, W: Write>(
    service: &mut RecordService<S>,
    command: Commands,
    context: &Context,
    out: &mut W,
) -> Result<()> {
    match command {
        Commands::Add(record) => {
            let record = service.submit(record.into_request(context.today))?;
            writeln!(out, "Saved {}", record.id)?;
            print_verdict(out, &record)?;
        }
        Commands::Edit { id, changes } => {
            let current = service.get(&id)?;
            let request = changes.apply(SubmitRecordRequest::from(&current));
            let record = service.update(&id, request)?;
            writeln!(out, "Updated {}", record.id)?;
            print_verdict(out, &record)?;
        }
        Commands::Delete { id } => {
            let record = service.delete(&id)?;
            writeln!(out, "Deleted {} ({}, {})", record.id, record.name, record.date)?;
        }
        Commands::Clear { yes } => {
            if !yes {
                bail!("Refusing to delete every record without --yes");
            }
            let removed = service.delete_all()?;
            writeln!(out, "Deleted {} records", removed)?;
        }
        Commands::List { scope, json } => {
            let records = service.records_in(&scope.scope(context.today))?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&records)?)?;
            } else {
                print_table(out, &records)?;
            }
        }
        Commands::Show { id, json } => {
            let record = service.get(&id)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
            } else {
                print_record(out, &record)?;
            }
        }
        Commands::Preview(vitals) => {
            let preview = service.preview(&vitals.reading())?;
            let assessment = &preview.assessment;
            writeln!(out, "Blood pressure: {}", preview.bp_stage)?;
            writeln!(out, "Policy:         {}", assessment.policy)?;
            writeln!(out, "  BP:           {}", assessment.blood_pressure)?;
            writeln!(out, "  Pulse:        {}", assessment.pulse)?;
            writeln!(out, "  SpO2:         {}", assessment.spo2)?;
            writeln!(out, "  Temperature:  {}", assessment.temperature)?;
            write!(out, "Verdict:        {}", assessment.verdict)?;
            if assessment.verdict.requires_note() {
                write!(out, " (a note is required to submit)")?;
            }
            writeln!(out)?;
        }
        Commands::Stats { scope, json } => {
            let scope = scope.scope(context.today);
            let stats = service.statistics(&scope)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else {
                writeln!(out, "{}", scope.title())?;
                print_statistics(out, &stats)?;
            }
        }
        Commands::Export { scope, output } => {
            let scope = scope.scope(context.today);
            let report = Report::build(&scope, &service.list()?, context.today);
            let bytes = generate_report_pdf(&report)?;

            let path = output.unwrap_or_else(|| scope.file_name(context.today).into());
            fs::write(&path, bytes)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;

            info!("Exported {} records to {}", report.rows.len(), path.display());
            writeln!(out, "Wrote {} records to {}", report.rows.len(), path.display())?;
        }
        Commands::Import { file } => {
            let blob = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let imported = service.import_legacy(&blob)?;
            writeln!(out, "Imported {} records from {}", imported, file.display())?;
        }
        Commands::Config => {
            let view = ConfigView {
                storage: context.storage.storage_type.to_string(),
                location: context.storage.location(),
                pool_size: context.storage.pool_size,
                timeout_seconds: context.storage.timeout_seconds,
                fitness_policy: service.policy(),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
        }
    }

    Ok(())
}

fn print_verdict<W: Write>(out: &mut W, record: &HealthRecord) -> Result<()> {
    writeln!(out, "Blood pressure: {}", record.bp_stage)?;
    writeln!(out, "Fitness:        {}", record.fitness)?;
    Ok(())
}

fn print_table<W: Write>(out: &mut W, records: &[HealthRecord]) -> Result<()> {
    if records.is_empty() {
        writeln!(out, "No records")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<36}  {:<10}  {:<8}  {:<20}  {:<20}  {:<13}  Note",
        "ID", "Date", "Time", "Name", "BP Status", "Fitness"
    )?;
    for record in records {
        let note = if record.note.is_empty() { "-" } else { record.note.as_str() };
        writeln!(
            out,
            "{:<36}  {:<10}  {:<8}  {:<20}  {:<20}  {:<13}  {}",
            record.id,
            record.date.to_string(),
            record.time,
            record.name,
            record.bp_stage.label(),
            record.fitness.label(),
            note
        )?;
    }
    writeln!(out, "{} records", records.len())?;
    Ok(())
}

fn print_record<W: Write>(out: &mut W, record: &HealthRecord) -> Result<()> {
    let reading = &record.reading;
    writeln!(out, "ID:          {}", record.id)?;
    writeln!(out, "Name:        {}", record.name)?;
    writeln!(out, "Badge:       {}", record.badge_number)?;
    writeln!(out, "Age:         {}", record.age)?;
    writeln!(out, "Title:       {}", record.job_title)?;
    writeln!(out, "Supervisor:  {}", record.supervisor)?;
    writeln!(out, "Department:  {}", record.department)?;
    writeln!(out, "Date:        {} {}", record.date, record.time)?;
    writeln!(out, "BP:          {}/{} mmHg", reading.systolic, reading.diastolic)?;
    writeln!(out, "Pulse:       {} bpm", reading.pulse)?;
    writeln!(out, "SpO2:        {}%", reading.spo2)?;
    writeln!(out, "Temperature: {}°C", reading.temperature)?;
    writeln!(out, "BP status:   {}", record.bp_stage)?;
    writeln!(out, "Fitness:     {}", record.fitness)?;
    if !record.note.is_empty() {
        writeln!(out, "Note:        {}", record.note)?;
    }
    Ok(())
}

fn print_statistics<W: Write>(out: &mut W, stats: &ReportStatistics) -> Result<()> {
    let pct = |value: Option<f64>| value.map(|v| format!(" ({:.1}%)", v)).unwrap_or_default();

    writeln!(out, "Total:         {}", stats.total)?;
    writeln!(out, "FIT:           {}{}", stats.fit, pct(stats.fit_percentage))?;
    writeln!(
        out,
        "FIT WITH NOTE: {}{}",
        stats.fit_with_note,
        pct(stats.fit_with_note_percentage)
    )?;
    writeln!(out, "UNFIT:         {}{}", stats.unfit, pct(stats.unfit_percentage))?;
    Ok(())
}
