// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of the conversion of CASTEP trajectories into h5md archives.

use std::io::BufRead;
#[cfg(feature = "hdf5")]
use std::path::Path;

use crate::errors::ConvertError;
use crate::io::md_io::read_md;
use crate::io::store::ArchiveStore;
use crate::progress::{ProgressPrinter, ProgressStatus};
use crate::structures::frame::Frame;
use crate::structures::metadata::TrajectoryMetadata;
use crate::units::{Dimension, UnitConverter, UnitSystem};

use super::header::{write_header, Author};
use super::schema::SchemaBuilder;

/// Options of the conversion.
///
/// ## Example
/// ```
/// use castep_h5md::prelude::*;
///
/// let options = ConvertOptions::default()
///     .with_units(Some(UnitSystem::Electronic))
///     .with_author("Jane Doe")
///     .with_email("jane@example.org");
///
/// assert_eq!(options.units(), Some(UnitSystem::Electronic));
/// assert_eq!(options.author().email(), "jane@example.org");
/// ```
pub struct ConvertOptions {
    units: Option<UnitSystem>,
    author: Option<String>,
    email: Option<String>,
    progress: Option<ProgressPrinter>,
}

impl Default for ConvertOptions {
    /// Values are converted into the MDANALYSIS unit system,
    /// author is unknown, and no progress is printed.
    fn default() -> Self {
        ConvertOptions {
            units: Some(UnitSystem::MdAnalysis),
            author: None,
            email: None,
            progress: None,
        }
    }
}

impl ConvertOptions {
    /// Set the unit system of the output archive. `None` disables the conversion.
    pub fn with_units(mut self, units: Option<UnitSystem>) -> Self {
        self.units = units;
        self
    }

    pub fn with_author(mut self, name: &str) -> Self {
        self.author = Some(name.to_owned());
        self
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_owned());
        self
    }

    /// Print the progress of frame writing using the provided printer.
    pub fn with_progress(mut self, printer: ProgressPrinter) -> Self {
        self.progress = Some(printer);
        self
    }

    /// Get the unit system of the output archive.
    pub fn units(&self) -> Option<UnitSystem> {
        self.units
    }

    /// Get the author recorded in the archive header.
    pub fn author(&self) -> Author {
        Author::new(self.author.as_deref(), self.email.as_deref())
    }
}

/// Read a CASTEP md or geom trajectory from `reader` and write it into `store` as an h5md archive.
///
/// ## Returns
/// The store with the complete archive or `ConvertError`.
///
/// ## Notes
/// - The entire trajectory is read before anything is written into the store.
/// - Input values are expected in CASTEP atomic units.
///
/// ## Example
/// ```
/// use castep_h5md::prelude::*;
///
/// let input = "\
///  0.0
///  -1.0 -1.1 0.1 <-- E
///  10.0 0.0 0.0 <-- h
///  0.0 10.0 0.0 <-- h
///  0.0 0.0 10.0 <-- h
///  Si 1 0.0 0.0 0.0 <-- R
///  Si 2 2.5 2.5 2.5 <-- R
/// ";
///
/// let store = md_to_h5md(input.as_bytes(), MemoryStore::new(), ConvertOptions::default()).unwrap();
/// assert_eq!(store.dataset("particles/position/value").unwrap().shape(), &[1, 2, 3]);
/// ```
pub fn md_to_h5md<S: ArchiveStore>(
    reader: impl BufRead,
    store: S,
    options: ConvertOptions,
) -> Result<S, ConvertError> {
    let frames = read_md(reader)?;
    frames_to_h5md(&frames, store, options)
}

/// Write already parsed frames into `store` as an h5md archive.
///
/// All frames must contain the same atoms in the same order.
pub fn frames_to_h5md<S: ArchiveStore>(
    frames: &[Frame],
    mut store: S,
    mut options: ConvertOptions,
) -> Result<S, ConvertError> {
    let metadata = TrajectoryMetadata::from_frames(frames)?;
    let n_steps = metadata.n_steps();

    log::info!(
        "Converting {} frame(s) with {} atom(s) into {} units.",
        n_steps,
        metadata.n_atoms(),
        options
            .units
            .map_or("original (CASTEP)", |system| system.name())
    );

    write_header(&mut store, &options.author())?;
    let mut archive = SchemaBuilder::new(metadata)
        .with_units(options.units)
        .build(store)?;

    // progress is always reported in picoseconds
    let to_ps = UnitConverter::new(UnitSystem::Castep, UnitSystem::MdAnalysis)?;

    for (index, frame) in frames.iter().enumerate() {
        if let Err(e) = archive.write_frame(frame, index) {
            if let Some(printer) = options.progress.as_mut() {
                printer.set_status(ProgressStatus::Failed);
                printer.print(index, n_steps, to_ps.convert(frame.time(), Dimension::Time));
            }
            return Err(e.into());
        }

        if let Some(printer) = options.progress.as_mut() {
            if index + 1 == n_steps {
                printer.set_status(ProgressStatus::Completed);
            }
            printer.print(index + 1, n_steps, to_ps.convert(frame.time(), Dimension::Time));
        }
    }

    log::info!("Written {} frame(s).", n_steps);
    Ok(archive.finish()?)
}

/// Convert a CASTEP md or geom file into an h5md file.
///
/// ## Returns
/// `Ok` if the conversion was successful or `ConvertError`.
///
/// ## Notes
/// - The input file is parsed completely before the output file is created.
///   A parsing error thus leaves no output file behind.
/// - Any existing output file is overwritten.
/// - If the conversion fails after the output file has been created, the partial file is kept.
///
/// ## Example
/// ```no_run
/// use castep_h5md::prelude::*;
///
/// let options = ConvertOptions::default().with_author("Jane Doe");
/// convert_file("simulation.md", "simulation.h5md", options).unwrap();
/// ```
#[cfg(feature = "hdf5")]
pub fn convert_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: ConvertOptions,
) -> Result<(), ConvertError> {
    use crate::files::FileType;
    use crate::io::md_io::read_md_file;
    use crate::io::store::h5::H5Store;

    if !FileType::from_name(&input).is_castep_trajectory() {
        log::warn!(
            "File `{}` does not have a `.md` or `.geom` extension. Reading it as a CASTEP trajectory anyway.",
            input.as_ref().display()
        );
    }

    if FileType::from_name(&output) != FileType::H5MD {
        log::warn!(
            "File `{}` does not have a `.h5md` or `.h5` extension. Writing it as an h5md file anyway.",
            output.as_ref().display()
        );
    }

    let frames = read_md_file(&input)?;
    log::debug!(
        "Read {} frame(s) from `{}`.",
        frames.len(),
        input.as_ref().display()
    );

    let store = H5Store::create(&output)?;
    frames_to_h5md(&frames, store, options)?;

    log::info!("Written h5md file `{}`.", output.as_ref().display());
    Ok(())
}

/******************************/
/*         UNIT TESTS         */
/******************************/
