// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

use std::process::ExitCode;

use anyhow::{Context, Result};
use castep_h5md::prelude::*;
use colored::Colorize;

mod cli;

fn run(cli: cli::Cli) -> Result<()> {
    let mut options = ConvertOptions::default()
        .with_units(cli.units.system())
        .with_author(&cli.author)
        .with_email(&cli.email);

    if !cli.quiet {
        options = options.with_progress(ProgressPrinter::new().with_print_freq(10));
    }

    convert_file(&cli.source, &cli.output, options).with_context(|| {
        format!(
            "Could not convert `{}` into `{}`",
            cli.source.display(),
            cli.output.display()
        )
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            for cause in e.chain().skip(1) {
                eprintln!("  {} {}", "caused by:".red(), cause);
            }
            ExitCode::FAILURE
        }
    }
}
