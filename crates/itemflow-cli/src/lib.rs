//! itemflow command line host
//!
//! Plays the workflow host locally: reads a JSON array of items, runs the
//! mapper, and writes the resulting items.

#![allow(missing_docs)]

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use itemflow_core::{FixedClock, ItemMapper, ItemSequence, MapStrategy, MapperConfig};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

pub fn command() -> Command {
    Command::new("itemflow")
        .version(itemflow_core::VERSION)
        .about("Map workflow items to new items without mutating the input")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines on stderr"),
        )
        .subcommand(
            Command::new("map")
                .about("Transform a batch of items")
                .arg(input_arg())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write items here instead of stdout"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML mapper configuration"),
                )
                .arg(
                    Arg::new("strategy")
                        .long("strategy")
                        .value_parser(MapStrategy::from_str)
                        .help("standard, conditional or indexed (overrides config)"),
                )
                .arg(
                    Arg::new("parallel")
                        .long("parallel")
                        .action(ArgAction::SetTrue)
                        .help("Map items on all cores"),
                )
                .arg(
                    Arg::new("fixed-time")
                        .long("fixed-time")
                        .help("Pin derived timestamps to this RFC 3339 instant"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate an items payload and report its size")
                .arg(input_arg()),
        )
}

fn input_arg() -> Arg {
    Arg::new("input")
        .long("input")
        .short('i')
        .value_parser(value_parser!(PathBuf))
        .help("Read items from this file instead of stdin")
}

/// Install the stderr subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Run the selected subcommand
///
/// # Errors
/// Returns error on unreadable input, malformed payloads, or bad config
pub fn execute(matches: &ArgMatches, stdin: &mut dyn Read, stdout: &mut dyn Write) -> Result<()> {
    match matches.subcommand() {
        Some(("map", args)) => run_map(args, stdin, stdout),
        Some(("check", args)) => run_check(args, stdin, stdout),
        Some((other, _)) => anyhow::bail!("unknown subcommand `{other}`"),
        None => anyhow::bail!("no subcommand given"),
    }
}

fn run_map(args: &ArgMatches, stdin: &mut dyn Read, stdout: &mut dyn Write) -> Result<()> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => MapperConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MapperConfig::default(),
    };
    if let Some(strategy) = args.get_one::<MapStrategy>("strategy") {
        config.strategy = *strategy;
    }
    if args.get_flag("parallel") {
        config.parallel = true;
    }

    let items = read_items(args, stdin)?;
    tracing::debug!("Read {} items", items.len());

    let output = match args.get_one::<String>("fixed-time") {
        Some(text) => {
            let clock = FixedClock::parse(text)
                .with_context(|| format!("invalid --fixed-time `{text}`"))?;
            ItemMapper::try_with_clock(config, clock)?.transform(&items)
        }
        None => ItemMapper::try_new(config)?.transform(&items),
    };

    let text = output.to_json_string_pretty()?;
    match args.get_one::<PathBuf>("output") {
        Some(path) => std::fs::write(path, format!("{text}\n"))
            .with_context(|| format!("writing {}", path.display()))?,
        None => writeln!(stdout, "{text}").context("writing stdout")?,
    }
    tracing::info!("Mapped {} items", output.len());
    Ok(())
}

fn run_check(args: &ArgMatches, stdin: &mut dyn Read, stdout: &mut dyn Write) -> Result<()> {
    let items = read_items(args, stdin)?;
    writeln!(stdout, "{} items", items.len()).context("writing stdout")?;
    Ok(())
}

fn read_items(args: &ArgMatches, stdin: &mut dyn Read) -> Result<ItemSequence> {
    let payload = match args.get_one::<PathBuf>("input") {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            stdin.read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    ItemSequence::from_json_str(&payload).context("decoding items payload")
}
