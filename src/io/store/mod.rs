// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Hierarchical stores of groups, typed datasets, and attributes into which h5md archives are written.

#[cfg(feature = "hdf5")]
pub mod h5;
pub mod memory;

use crate::errors::StoreError;

/// Value of an attribute attached to a group or a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Str(String),
    StrArray(Vec<String>),
    Int(i64),
    IntArray(Vec<i64>),
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::Str(value.to_owned())
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::Int(value)
    }
}

/// Hierarchical store of groups and fixed-shape datasets.
///
/// Paths are `/`-separated and relative to the root of the store (`particles/box/edges`).
/// The parent group of every created object must already exist
/// and no object can be created twice.
pub trait ArchiveStore {
    /// Create an empty group.
    fn create_group(&mut self, path: &str) -> Result<(), StoreError>;

    /// Create a floating-point dataset of the given shape filled with zeros.
    fn create_dataset(&mut self, path: &str, shape: &[usize]) -> Result<(), StoreError>;

    /// Create a one-dimensional integer dataset holding `data`.
    fn create_int_dataset(&mut self, path: &str, data: &[i64]) -> Result<(), StoreError>;

    /// Create a hard link `path` pointing to the dataset at `target`.
    /// Both paths then refer to the same dataset; the data are not copied.
    fn link(&mut self, target: &str, path: &str) -> Result<(), StoreError>;

    /// Attach an attribute to a group or a dataset. Empty `path` refers to the root.
    fn set_attribute(&mut self, path: &str, name: &str, value: Attribute)
        -> Result<(), StoreError>;

    /// Write `data` into the contiguous block of a floating-point dataset
    /// addressed by the leading `index` (e.g. `[step]` addresses `dataset[step, .., ..]`).
    /// `data` must contain exactly as many values as the block, in row-major order.
    fn write_block(&mut self, path: &str, index: &[usize], data: &[f64])
        -> Result<(), StoreError>;

    /// Flush all written data to the underlying storage.
    fn flush(&mut self) -> Result<(), StoreError>;
}

/// Remove leading and trailing slashes from a path.
pub(crate) fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}

/// Get the path of the parent group. Objects in the root have an empty parent path.
pub(crate) fn parent(path: &str) -> &str {
    normalize(path).rsplit_once('/').map_or("", |(parent, _)| parent)
}

/// Check that `index` addresses a block of a dataset with `shape`
/// and return the number of values in that block.
pub(crate) fn block_size(
    path: &str,
    shape: &[usize],
    index: &[usize],
) -> Result<usize, StoreError> {
    if index.len() > shape.len() || index.iter().zip(shape).any(|(i, dim)| i >= dim) {
        return Err(StoreError::IndexOutOfRange(
            path.to_owned(),
            index.to_vec(),
            shape.to_vec(),
        ));
    }

    Ok(shape[index.len()..].iter().product())
}

/******************************/
/*         UNIT TESTS         */
/******************************/
