//! Eventsink CLI - pipe NDJSON events into an in-memory sink.
//!
//! - `eventsink [FILE]`: read one JSON object per line from FILE (or stdin),
//!   project and write each, print the written rows and a summary
//! - `eventsink init`: write a default `eventsink.toml`
//!
//! Malformed lines and rejected records are reported on stderr and skipped.
//! The exit code is 1 if any record was not written.

mod commands;
mod format;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::info;
use tracing_subscriber::EnvFilter;

use eventsink_core::Record;
use eventsink_engine::{Sink, SinkConfig, CONFIG_FILE_NAME};
use eventsink_storage::MemoryStore;

use commands::build_cli;
use format::{format_error, format_row, format_summary, OutputMode};

fn main() {
    let matches = build_cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    let result = match matches.subcommand() {
        Some(("init", _)) => run_init(&matches).map(|()| 0),
        _ => run_pipe(&matches),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("(error) {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("eventsink={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn config_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn load_config(matches: &ArgMatches) -> Result<SinkConfig> {
    let explicit = matches.get_one::<String>("config").is_some();
    let path = config_path(matches);

    let mut config = if explicit || path.exists() {
        SinkConfig::from_file(&path)?
    } else {
        SinkConfig::default()
    };
    if let Some(keyspace) = matches.get_one::<String>("keyspace") {
        config.keyspace = keyspace.clone();
    }
    if let Some(table) = matches.get_one::<String>("table") {
        config.table = table.clone();
    }
    Ok(config)
}

fn run_init(matches: &ArgMatches) -> Result<()> {
    let path = config_path(matches);
    SinkConfig::write_default_if_missing(&path)?;
    println!("{}", path.display());
    Ok(())
}

fn run_pipe(matches: &ArgMatches) -> Result<i32> {
    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config = load_config(matches)?;
    let store = Arc::new(MemoryStore::with_options(config.options.clone()));
    let sink = Sink::register(store, &config).context("Failed to register sink")?;

    let reader: Box<dyn BufRead> = match matches.get_one::<String>("input") {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open '{}'", path))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut malformed = 0u64;
    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.with_context(|| format!("Failed to read line {}", line_no))?;
        if line.trim().is_empty() {
            continue;
        }

        // Lines that do not parse never reach the sink or its counters
        let outcome = match Record::from_json_str(&line) {
            Ok(record) => sink.receive(record),
            Err(e) => {
                malformed += 1;
                Err(e)
            }
        };
        match outcome {
            Ok(row) => println!("{}", format_row(&row, line_no, mode)),
            Err(e) => eprintln!("{}", format_error(&e, line_no, mode)),
        }
    }

    let stats = sink.stats();
    info!(
        target: "eventsink::sink",
        written = stats.written,
        rejected = stats.rejected,
        failed = stats.failed,
        malformed,
        "Input exhausted"
    );
    eprintln!("{}", format_summary(&stats, malformed, mode));

    let all_written = malformed == 0 && stats.rejected == 0 && stats.failed == 0;
    Ok(if all_written { 0 } else { 1 })
}
