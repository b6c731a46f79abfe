// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of errors that can be returned by the `castep_h5md` library.

use std::path::Path;
use thiserror::Error;

use crate::structures::frame::AtomKey;
use crate::units::{Dimension, UnitSystem};

/// Errors that can occur when looking up units in the unit-system registry.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unit system `{0}` is not known. Supported unit systems are MDANALYSIS, CASTEP, and ELECTRONIC.")]
    UnknownUnitSystem(String),
    #[error("Dimension `{0}` is not known.")]
    UnknownDimension(String),
    #[error("Unit system `{0}` does not define a unit for dimension `{1}`.")]
    MissingUnit(UnitSystem, Dimension),
}

/// Errors that can occur when parsing units or converting quantities between units.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UnitError {
    #[error("Unit `{0}` is not known.")]
    UnknownUnit(String),
    #[error("Could not parse unit expression `{0}`.")]
    InvalidExpression(String),
    #[error("Can not convert `{0}` to `{1}` as the units are not dimensionally compatible.")]
    Mismatch(String, String),
    #[error("{0}")]
    RegistryError(#[from] RegistryError),
}

/// Errors that can occur when reading and parsing a CASTEP md or geom file.
#[derive(Error, Debug)]
pub enum ParseMdError {
    #[error("File `{0}` was not found.")]
    FileNotFound(Box<Path>),
    #[error("Could not read line {0} of the input stream.")]
    LineNotFound(usize),
    #[error("Could not parse `{1}` on line {0} as a number.")]
    ParseNumberErr(usize, String),
    #[error("Line {0} contains {2} value(s) but {1} expected.")]
    ValueCountErr(usize, usize, usize),
    #[error("Line {0} contains an unknown tag `{1}`.")]
    UnknownTag(usize, String),
    #[error("Line {0} is not tagged and is not the first line of a frame.")]
    UnexpectedLine(usize),
    #[error("Could not parse line {0} as an atom line.")]
    ParseAtomLineErr(usize),
    #[error("Line {0} references atom `{1}` which has no position in the frame.")]
    UnknownAtom(usize, AtomKey),
    #[error("Line {0} repeats the `{2}` line of atom `{1}`.")]
    DuplicateAtom(usize, AtomKey, String),
    #[error("Matrix `{1}` in the frame ending on line {0} does not have exactly 3 rows.")]
    IncompleteMatrix(usize, String),
    #[error("Frame ending on line {0} does not contain `{1}`.")]
    MissingField(usize, String),
    #[error("Header of the input stream is not terminated.")]
    UnterminatedHeader,
}

/// Errors that can occur when working with a hierarchical archive store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Object `{0}` already exists in the archive.")]
    AlreadyExists(String),
    #[error("Parent group of `{0}` does not exist in the archive.")]
    ParentNotFound(String),
    #[error("Object `{0}` does not exist in the archive.")]
    NotFound(String),
    #[error("Object `{0}` is not a dataset.")]
    NotADataset(String),
    #[error("Dataset `{0}` does not hold floating-point values.")]
    NotAFloatDataset(String),
    #[error("Attribute `{1}` already exists on object `{0}`.")]
    AttributeExists(String, String),
    #[error("String `{0}` can not be stored as an attribute.")]
    InvalidString(String),
    #[error("Index `{1:?}` is out of range for dataset `{0}` of shape `{2:?}`.")]
    IndexOutOfRange(String, Vec<usize>, Vec<usize>),
    #[error("Block written into dataset `{0}` contains {2} values but {1} expected.")]
    BlockSizeMismatch(String, usize, usize),
    #[cfg(feature = "hdf5")]
    #[error("Could not create archive `{0}`.")]
    CouldNotCreate(Box<Path>, #[source] hdf5::Error),
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5Error(#[from] hdf5::Error),
}

/// Errors that can occur when writing a frame into an allocated h5md archive.
#[derive(Error, Debug)]
pub enum WriteFrameError {
    #[error("Frame index `{0}` is out of range for an archive allocated for {1} steps.")]
    IndexOutOfRange(usize, usize),
    #[error("Frame `{0}` contains {2} atoms but the archive was allocated for {1} atoms.")]
    AtomsNumberMismatch(usize, usize, usize),
    #[error("Atom #{1} of frame `{0}` is `{3}` but `{2}` was expected (atom order must match the first frame).")]
    AtomOrderMismatch(usize, usize, AtomKey, AtomKey),
    #[error("{0}")]
    UnitError(#[from] UnitError),
    #[error("{0}")]
    StoreError(#[from] StoreError),
}

/// Errors that can occur when converting a trajectory into the h5md format.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{0}")]
    ParseError(#[from] ParseMdError),
    #[error("Input trajectory contains no frames.")]
    EmptyTrajectory,
    #[error("{0}")]
    ShapeInvariantViolation(WriteFrameError),
    #[error("{0}")]
    UnitError(#[from] UnitError),
    #[error("{0}")]
    StoreError(#[from] StoreError),
    #[error("{0}")]
    WriteFrameError(WriteFrameError),
}

impl From<WriteFrameError> for ConvertError {
    fn from(e: WriteFrameError) -> Self {
        match e {
            WriteFrameError::AtomsNumberMismatch(..) | WriteFrameError::AtomOrderMismatch(..) => {
                ConvertError::ShapeInvariantViolation(e)
            }
            _ => ConvertError::WriteFrameError(e),
        }
    }
}
