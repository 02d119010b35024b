//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("eventsink")
        .about("Project newline-delimited JSON events onto a CQL table")
        .subcommand_required(false)
        .arg(
            Arg::new("input")
                .help("NDJSON file to read (default: stdin)")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Config file (default: ./eventsink.toml if present)")
                .value_name("PATH")
                .global(true),
        )
        .arg(
            Arg::new("keyspace")
                .long("keyspace")
                .help("Target keyspace, overrides the config file"),
        )
        .arg(
            Arg::new("table")
                .long("table")
                .help("Target table, overrides the config file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print each written row as one JSON line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Debug logging on stderr")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("init").about("Write a default eventsink.toml if none exists"),
        )
}
