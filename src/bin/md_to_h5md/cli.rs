// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

use std::path::PathBuf;

use castep_h5md::units::UnitSystem;
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(
    name = "md_to_h5md",
    about = "Convert a CASTEP .md or .geom trajectory into the h5md format",
    version,
    author
)]
pub struct Cli {
    /// CASTEP .md or .geom file to convert
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Output h5md file (overwritten if it exists)
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Author name stored in the file metadata
    #[arg(short, long, value_name = "NAME", default_value = "Unknown")]
    pub author: String,

    /// Author email stored in the file metadata
    #[arg(short, long, value_name = "EMAIL", default_value = "Unknown")]
    pub email: String,

    /// Unit system of the output file
    #[arg(short, long, value_name = "SYSTEM", default_value = "mdanalysis")]
    pub units: UnitsArg,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UnitsArg {
    /// angstrom, ps, eV, K, N
    #[value(name = "mdanalysis")]
    MdAnalysis,
    /// CASTEP atomic units
    Castep,
    /// angstrom, ps, eV, K, eV/angstrom
    Electronic,
    /// Store values as read, without unit annotations
    None,
}

impl UnitsArg {
    pub fn system(self) -> Option<UnitSystem> {
        match self {
            UnitsArg::MdAnalysis => Some(UnitSystem::MdAnalysis),
            UnitsArg::Castep => Some(UnitSystem::Castep),
            UnitsArg::Electronic => Some(UnitSystem::Electronic),
            UnitsArg::None => None,
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
