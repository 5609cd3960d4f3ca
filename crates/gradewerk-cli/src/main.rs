// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// gradewerk - read, grade and report paper answer sheets from the command
// line. Results go to stdout as JSON (or CSV for `export`); logs go to stderr.

use clap::Parser;
use gradewerk_core::GradewerkError;
use gradewerk_core::human_errors::humanize_error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;

use commands::{Cli, Commands, ExitCode};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let outcome = commands::load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Scan(args) => commands::scan::run(args, &config),
        Commands::Grade(args) => commands::grade::run(args, &config),
        Commands::Batch(args) => commands::batch::run(args, &config),
        Commands::Export(args) => commands::export::run(args, &config),
    });

    match outcome {
        Ok(code) => code.into(),
        Err(err) => {
            report_error(&err);
            ExitCode::Error.into()
        }
    }
}

fn report_error(err: &anyhow::Error) {
    eprintln!("error: {err:#}");
    if let Some(gradewerk_err) = err.downcast_ref::<GradewerkError>() {
        let human = humanize_error(gradewerk_err);
        eprintln!("  {}", human.message);
        eprintln!("  {}", human.suggestion);
    }
}
