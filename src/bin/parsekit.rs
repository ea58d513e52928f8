////////////////////////////////////////////////////////////////////////////////
// Parsekit
////////////////////////////////////////////////////////////////////////////////
// Copyright 2024 Parsekit Contributors
// This code is dual licenced using the MIT or Apache 2 license.
// See licence-mit.md and licence-apache.md for details.
////////////////////////////////////////////////////////////////////////////////
//! The `parsekit` command-line interface: a calculator REPL/one-shot
//! evaluator and a one-shot JSON parser.
////////////////////////////////////////////////////////////////////////////////

// External library imports.
use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use log::debug;
use log::trace;

// Standard library imports.
use std::io::BufRead;

////////////////////////////////////////////////////////////////////////////////
// ParsekitOptions
////////////////////////////////////////////////////////////////////////////////

/// Command line options for `parsekit`.
#[derive(Debug, Parser)]
#[command(name = "parsekit", about = "A parser combinator toolkit")]
struct ParsekitOptions {
    /// Increases the log verbosity; repeatable.
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    /// Suppresses all output below the error level.
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,

    /// Enables trace-level logging.
    #[arg(long = "trace", global = true)]
    trace: bool,

    /// The subcommand to run.
    #[command(subcommand)]
    command: Command,
}

impl ParsekitOptions {
    /// Resolves the effective `log` level from the verbosity flags,
    /// favoring `--trace` over `--verbose` over `--quiet`.
    fn log_level(&self) -> log::LevelFilter {
        if self.trace {
            log::LevelFilter::Trace
        } else if self.verbose {
            log::LevelFilter::Debug
        } else if self.quiet {
            log::LevelFilter::Error
        } else {
            log::LevelFilter::Info
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluates an arithmetic expression, or starts a REPL if none is
    /// given.
    Calc {
        /// The expression to evaluate. Omit to start an interactive REPL.
        expression: Option<String>,
    },
    /// Parses a JSON text and prints the resulting value tree.
    Json {
        /// The JSON text to parse.
        text: String,
    },
}

////////////////////////////////////////////////////////////////////////////////
// main
////////////////////////////////////////////////////////////////////////////////

/// The application entry point.
fn main() {
    let opts = ParsekitOptions::parse();

    env_logger::Builder::new()
        .filter_level(opts.log_level())
        .init();

    if let Err(err) = main_facade(opts) {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

fn main_facade(opts: ParsekitOptions) -> anyhow::Result<()> {
    debug!("parsekit version: {}", env!("CARGO_PKG_VERSION"));
    trace!("options: {:?}", opts);

    match opts.command {
        Command::Calc { expression: Some(expression) } => run_calc_one_shot(&expression),
        Command::Calc { expression: None } => run_calc_repl(),
        Command::Json { text } => run_json_one_shot(&text),
    }
}

////////////////////////////////////////////////////////////////////////////////
// Calculator subcommand.
////////////////////////////////////////////////////////////////////////////////

fn run_calc_one_shot(expression: &str) -> anyhow::Result<()> {
    let value = parsekit::parse_calculator(expression)
        .context("Command 'calc' failed")?;
    println!("{}", value);
    Ok(())
}

fn run_calc_repl() -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read a line from stdin")?;
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit")
            || trimmed.eq_ignore_ascii_case("quit")
            || trimmed.eq_ignore_ascii_case("q")
        {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }
        match parsekit::parse_calculator(trimmed) {
            Ok(value) => println!("{}", value),
            Err(e) => println!("{}", e),
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// JSON subcommand.
////////////////////////////////////////////////////////////////////////////////

fn run_json_one_shot(text: &str) -> anyhow::Result<()> {
    let value = parsekit::parse_json(text)
        .context("Command 'json' failed")?;
    println!("{}", value);
    Ok(())
}
