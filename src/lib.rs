// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! # castep_h5md: Conversion of CASTEP trajectories into h5md
//!
//! Rust library for converting CASTEP molecular dynamics (`.md`) and geometry optimization (`.geom`)
//! trajectories into the [h5md](https://www.nongnu.org/h5md/) format.
//!
//! ## Usage
//!
//! Run
//!
//! ```bash
//! $ cargo add castep_h5md --features hdf5
//! ```
//!
//! Import the crate in your Rust code:
//! ```
//! use castep_h5md::prelude::*;
//! ```
//!
//! ## Examples
//!
//! #### Converting a file
//!
//! Convert a CASTEP md file into an h5md file using the default (MDANALYSIS) unit system.
//! Requires the `hdf5` feature.
//!
//! ```no_run
//! # #[cfg(feature = "hdf5")]
//! # {
//! use castep_h5md::prelude::*;
//!
//! let options = ConvertOptions::default()
//!     .with_author("Jane Doe")
//!     .with_email("jane@example.org")
//!     .with_progress(ProgressPrinter::new());
//!
//! convert_file("simulation.md", "simulation.h5md", options).unwrap();
//! # }
//! ```
//!
//! #### Converting into a custom store
//!
//! The conversion can write into anything implementing [`ArchiveStore`](io::store::ArchiveStore).
//! `MemoryStore` keeps the archive in memory which is useful for inspecting the output.
//!
//! ```no_run
//! use castep_h5md::prelude::*;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = BufReader::new(File::open("simulation.md").unwrap());
//! let options = ConvertOptions::default().with_units(Some(UnitSystem::Electronic));
//! let store = md_to_h5md(file, MemoryStore::new(), options).unwrap();
//!
//! let forces = store.dataset("particles/force/value").unwrap();
//! println!("Force acting on the first atom along x: {} eV/Å", forces[[0, 0, 0]]);
//! ```
//!
//! #### Writing frames one by one
//!
//! Datasets are allocated once for the whole trajectory and frames are then written into their slots.
//!
//! ```no_run
//! use castep_h5md::prelude::*;
//!
//! let frames = read_md_file("simulation.md").unwrap();
//! let metadata = TrajectoryMetadata::from_frames(&frames).unwrap();
//!
//! let mut store = MemoryStore::new();
//! write_header(&mut store, &Author::new(Some("Jane Doe"), None)).unwrap();
//!
//! let mut archive = SchemaBuilder::new(metadata)
//!     .with_units(Some(UnitSystem::MdAnalysis))
//!     .build(store)
//!     .unwrap();
//!
//! // frames can be written in any order
//! for (i, frame) in frames.iter().enumerate().rev() {
//!     archive.write_frame(frame, i).unwrap();
//! }
//!
//! let store = archive.finish().unwrap();
//! ```
//!
//! #### Converting values between unit systems
//!
//! ```
//! use castep_h5md::prelude::*;
//!
//! let converter = UnitConverter::new(UnitSystem::Castep, UnitSystem::Electronic).unwrap();
//! let pressure = converter.convert(1.0, Dimension::Pressure);
//! assert!((pressure - 183.6315).abs() < 1e-4);
//! ```
//!
//! ## Unit systems
//!
//! | dimension   | MDANALYSIS        | CASTEP                          | ELECTRONIC        |
//! |-------------|-------------------|---------------------------------|-------------------|
//! | length      | angstrom          | bohr                            | angstrom          |
//! | velocity    | angstrom / ps     | bohr / atomic_unit_of_time      | angstrom / ps     |
//! | force       | N                 | hartree / bohr                  | eV / angstrom     |
//! | energy      | eV                | hartree                         | eV                |
//! | pressure    | eV / angstrom^3   | hartree / bohr^3                | eV / angstrom^3   |
//! | temperature | K                 | atomic_unit_of_temperature      | K                 |
//! | time        | ps                | atomic_unit_of_time             | ps                |
//!
//! Input files are always read in CASTEP units.
//!
//! ## Features
//! - `hdf5`: writing HDF5 files (`H5Store`, `convert_file`). Requires the HDF5 library.
//! - `cli`: the `md_to_h5md` command line program.
//!
//! ## License
//! This library is released under the MIT License.

/// Version of the `castep_h5md` library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod errors;
pub mod files;
pub mod h5md;
pub mod io {
    pub mod md_io;
    pub mod store;
}
pub mod progress;
pub mod structures {
    pub mod frame;
    pub mod metadata;
}
mod test_utilities;
pub mod units;

/// Reexported basic `castep_h5md` structures and functions.
pub mod prelude {
    pub use crate::errors::{
        ConvertError, ParseMdError, RegistryError, StoreError, UnitError, WriteFrameError,
    };
    pub use crate::files::FileType;
    #[cfg(feature = "hdf5")]
    pub use crate::h5md::convert::convert_file;
    pub use crate::h5md::convert::{frames_to_h5md, md_to_h5md, ConvertOptions};
    pub use crate::h5md::header::{write_header, Author};
    pub use crate::h5md::schema::{H5mdArchive, SchemaBuilder};
    pub use crate::io::md_io::{read_md, read_md_file};
    #[cfg(feature = "hdf5")]
    pub use crate::io::store::h5::H5Store;
    pub use crate::io::store::memory::MemoryStore;
    pub use crate::io::store::{ArchiveStore, Attribute};
    pub use crate::progress::{ProgressPrinter, ProgressStatus};
    pub use crate::structures::frame::{AtomKey, AtomState, Energies, Frame};
    pub use crate::structures::metadata::TrajectoryMetadata;
    pub use crate::units::quantity::{Quantity, Unit};
    pub use crate::units::{Dimension, Scalable, UnitConverter, UnitSystem};
}
