//! myhealth CLI
//!
//! Record vital signs and report on a day or a month of them.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use myhealth::{
    config::Config,
    core::{
        latest, lookup, records_before_period, render_records, QueryOutcome, ReportBuilder,
        VitalsReport, WindowOutcome,
    },
    records::{FieldSelection, MatchKey, ReadingDraft, RecordTable},
    store::{RecordPatch, Session, VitalsStore},
    VERSION,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Parser)]
#[command(name = "myhealth")]
#[command(version = VERSION)]
#[command(about = "Personal blood pressure, pulse and glucose records", long_about = None)]
struct Cli {
    /// Use this configuration file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report every record in a day (YYYY-MM-DD) or month (YYYY-MM)
    Find {
        period: MatchKey,

        /// Fields to report: all, bp, or a comma-separated list
        #[arg(long, default_value = "all")]
        field: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report every record
    All {
        /// Fields to report: all, bp, or a comma-separated list
        #[arg(long, default_value = "all")]
        field: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the most recent record
    Latest,

    /// Show the records leading up to the end of a day
    Before {
        /// Day in YYYY-MM-DD form
        day: NaiveDate,

        /// Number of records to show
        #[arg(long, default_value = "5")]
        count: NonZeroUsize,
    },

    /// Add a record
    Add {
        /// Time of the readings ("YYYY-MM-DD HH:MM")
        #[arg(long, value_parser = parse_timestamp)]
        at: NaiveDateTime,

        #[command(flatten)]
        readings: ReadingArgs,
    },

    /// Change a record
    Edit {
        /// Time of the record to change ("YYYY-MM-DD HH:MM")
        #[arg(long, value_parser = parse_timestamp)]
        at: NaiveDateTime,

        /// Move the record to a new time
        #[arg(long, value_parser = parse_timestamp)]
        new_at: Option<NaiveDateTime>,

        /// Readings to drop: bp, or a comma-separated list of fields
        #[arg(long, value_parser = FieldSelection::from_csv)]
        clear: Option<FieldSelection>,

        #[command(flatten)]
        readings: ReadingArgs,
    },

    /// Delete a record
    Remove {
        /// Time of the record to delete ("YYYY-MM-DD HH:MM")
        #[arg(long, value_parser = parse_timestamp)]
        at: NaiveDateTime,
    },

    /// Show configuration
    Config,
}

#[derive(Args)]
struct ReadingArgs {
    /// Systolic blood pressure (mmHg)
    #[arg(long)]
    sys: Option<u32>,

    /// Diastolic blood pressure (mmHg)
    #[arg(long)]
    dia: Option<u32>,

    /// Pulse rate (bpm)
    #[arg(long)]
    pulse: Option<u32>,

    /// Blood glucose (mmol/L)
    #[arg(long)]
    glucose: Option<f64>,
}

impl ReadingArgs {
    fn draft(&self) -> ReadingDraft {
        ReadingDraft {
            systolic: self.sys,
            diastolic: self.dia,
            pulse: self.pulse,
            glucose: self.glucose,
        }
    }
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("myhealth=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(Config::config_path);
    let config = Config::load_from(&config_path)
        .with_context(|| format!("failed to load configuration from {config_path:?}"))?;

    match cli.command {
        Commands::Find {
            period,
            field,
            json,
        } => cmd_find(&config, period, &field, json),
        Commands::All { field, json } => cmd_all(&config, &field, json),
        Commands::Latest => cmd_latest(&config),
        Commands::Before { day, count } => cmd_before(&config, day, count.get()),
        Commands::Add { at, readings } => cmd_add(&config, at, readings.draft()),
        Commands::Edit {
            at,
            new_at,
            clear,
            readings,
        } => {
            let patch = RecordPatch {
                timestamp: new_at,
                systolic: readings.sys,
                diastolic: readings.dia,
                pulse: readings.pulse,
                glucose: readings.glucose,
                clear: clear.map(|c| c.fields().to_vec()).unwrap_or_default(),
            };
            cmd_edit(&config, at, patch)
        }
        Commands::Remove { at } => cmd_remove(&config, at),
        Commands::Config => {
            cmd_config(&config, &config_path);
            Ok(())
        }
    }
}

fn open_store(config: &Config) -> Result<(VitalsStore, RecordTable)> {
    config
        .ensure_directories()
        .context("failed to create data directory")?;
    let store = VitalsStore::new(config.vitals_path());
    let table = store.load().context("failed to load records")?;
    Ok((store, table))
}

fn cmd_find(config: &Config, period: MatchKey, field: &str, json: bool) -> Result<()> {
    let selection = FieldSelection::from_csv(field)?;
    anyhow::ensure!(selection.any_selected(), "no fields selected");
    let (_, table) = open_store(config)?;

    let set = match lookup(&table, period) {
        QueryOutcome::Found(set) => set,
        QueryOutcome::NoRecords { .. } => {
            println!("No records for this period");
            return Ok(());
        }
    };

    print_report(&ReportBuilder::from_config(config).build(&set, &selection), json)
}

fn cmd_all(config: &Config, field: &str, json: bool) -> Result<()> {
    let selection = FieldSelection::from_csv(field)?;
    anyhow::ensure!(selection.any_selected(), "no fields selected");
    let (_, table) = open_store(config)?;

    if table.is_empty() {
        println!("No records yet. Use 'myhealth add' to record one.");
        return Ok(());
    }

    print_report(&ReportBuilder::from_config(config).build_all(&table, &selection), json)
}

fn print_report(report: &VitalsReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn cmd_latest(config: &Config) -> Result<()> {
    let (_, table) = open_store(config)?;

    match latest(&table) {
        Some((_, record)) => print!("{}", render_records(std::slice::from_ref(record))),
        None => println!("No records yet. Use 'myhealth add' to record one."),
    }
    Ok(())
}

fn cmd_before(config: &Config, day: NaiveDate, count: usize) -> Result<()> {
    let (_, table) = open_store(config)?;

    match records_before_period(&table, MatchKey::day(day), count) {
        WindowOutcome::Found { records, capped } => {
            if capped {
                println!("Only {} record(s) exist up to {day}.", records.len());
            }
            print!("{}", render_records(records));
        }
        WindowOutcome::NoRecords { .. } => println!("No records for this period"),
    }
    Ok(())
}

fn cmd_add(config: &Config, at: NaiveDateTime, draft: ReadingDraft) -> Result<()> {
    let (store, table) = open_store(config)?;
    let mut session = Session::new(table);

    session
        .apply(|staged| staged.add(at, &draft))
        .context("record not added")?;
    store.save(session.table())?;

    println!("Record added at {}.", at.format(TIMESTAMP_FORMAT));
    Ok(())
}

fn cmd_edit(config: &Config, at: NaiveDateTime, patch: RecordPatch) -> Result<()> {
    let (store, table) = open_store(config)?;
    let mut session = Session::new(table);

    let index = session
        .apply(|staged| {
            let index = staged.index_of(at)?;
            staged.edit(index, &patch)
        })
        .context("record not changed")?;
    store.save(session.table())?;

    if let Some(record) = session.table().get(index) {
        print!("{}", render_records(std::slice::from_ref(record)));
    }
    Ok(())
}

fn cmd_remove(config: &Config, at: NaiveDateTime) -> Result<()> {
    let (store, table) = open_store(config)?;
    let mut session = Session::new(table);

    let removed = session
        .apply(|staged| {
            let index = staged.index_of(at)?;
            staged.remove(index)
        })
        .context("record not removed")?;
    store.save(session.table())?;

    println!(
        "Removed record at {}.",
        removed.timestamp.format(TIMESTAMP_FORMAT)
    );
    Ok(())
}

fn cmd_config(config: &Config, path: &std::path::Path) {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {path:?}");
    println!("Record file: {:?}", config.vitals_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(config).unwrap_or_else(|_| "Error".to_string())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use myhealth::VitalField;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("myhealth").chain(args.iter().copied()))
    }

    #[test]
    fn test_before_rejects_zero_count() {
        assert!(parse(&["before", "2024-01-05", "--count", "0"]).is_err());

        match parse(&["before", "2024-01-05", "--count", "3"]).unwrap().command {
            Commands::Before { count, .. } => assert_eq!(count.get(), 3),
            _ => panic!("expected before"),
        }
    }

    #[test]
    fn test_edit_clear_fields() {
        let args = ["edit", "--at", "2024-01-05 07:30", "--clear", "glucose,pulse"];
        match parse(&args).unwrap().command {
            Commands::Edit { clear, .. } => assert_eq!(
                clear.unwrap().fields(),
                &[VitalField::Pulse, VitalField::Glucose]
            ),
            _ => panic!("expected edit"),
        }

        assert!(parse(&["edit", "--at", "2024-01-05 07:30", "--clear", "weight"]).is_err());
    }

    #[test]
    fn test_all_command() {
        match parse(&["all", "--field", "bp", "--json"]).unwrap().command {
            Commands::All { field, json } => {
                assert_eq!(field, "bp");
                assert!(json);
            }
            _ => panic!("expected all"),
        }
    }
}
