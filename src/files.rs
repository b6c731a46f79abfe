// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Enum capturing file types supported by `castep_h5md`.

use std::path::Path;

/// Types of files supported by `castep_h5md`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FileType {
    Unknown,
    /// CASTEP molecular dynamics trajectory.
    MD,
    /// CASTEP geometry optimization trajectory.
    GEOM,
    H5MD,
}

impl FileType {
    /// Identify file type from the name of the file (based on file extension).
    pub fn from_name(filename: impl AsRef<Path>) -> FileType {
        let extension = match filename.as_ref().extension() {
            Some(x) => x,
            None => return FileType::Unknown,
        };

        match extension.to_str() {
            Some("md") => FileType::MD,
            Some("geom") => FileType::GEOM,
            Some("h5md") | Some("h5") => FileType::H5MD,
            Some(_) | None => FileType::Unknown,
        }
    }

    /// Check whether the file type can be read as a CASTEP trajectory.
    pub fn is_castep_trajectory(&self) -> bool {
        matches!(self, FileType::MD | FileType::GEOM)
    }
}
