// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of an archive store backed by an HDF5 file.

use hdf5::types::VarLenUnicode;
use hdf5::{File, Location};
use ndarray::{ArrayView1, ArrayViewD, IxDyn, SliceInfo, SliceInfoElem};
use std::path::Path;

use super::{block_size, normalize, parent, ArchiveStore, Attribute};
use crate::errors::StoreError;

/// Archive store writing into an HDF5 file.
///
/// The file is created (truncating any existing file) when the store is constructed
/// and closed when the store is dropped.
#[derive(Debug)]
pub struct H5Store {
    file: File,
}

impl H5Store {
    /// Create a new HDF5 file at the given path.
    ///
    /// ## Returns
    /// `H5Store` if successful or `StoreError::CouldNotCreate` if the file could not be created.
    pub fn create(filename: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = File::create(filename.as_ref())
            .map_err(|e| StoreError::CouldNotCreate(Box::from(filename.as_ref()), e))?;

        Ok(H5Store { file })
    }

    /// Get the underlying HDF5 file.
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Check that `path` is free and its parent group exists.
    fn check_new_path<'a>(&self, path: &'a str) -> Result<&'a str, StoreError> {
        let path = normalize(path);

        if path.is_empty() || self.file.link_exists(path) {
            return Err(StoreError::AlreadyExists(path.to_owned()));
        }

        let parent = parent(path);
        if !parent.is_empty() && self.file.group(parent).is_err() {
            return Err(StoreError::ParentNotFound(path.to_owned()));
        }

        Ok(path)
    }
}

impl ArchiveStore for H5Store {
    fn create_group(&mut self, path: &str) -> Result<(), StoreError> {
        let path = self.check_new_path(path)?;
        self.file.create_group(path)?;
        Ok(())
    }

    fn create_dataset(&mut self, path: &str, shape: &[usize]) -> Result<(), StoreError> {
        let path = self.check_new_path(path)?;
        // unwritten elements of an HDF5 dataset read as zeros
        self.file
            .new_dataset::<f64>()
            .shape(shape.to_vec())
            .create(path)?;
        Ok(())
    }

    fn create_int_dataset(&mut self, path: &str, data: &[i64]) -> Result<(), StoreError> {
        let path = self.check_new_path(path)?;
        self.file
            .new_dataset_builder()
            .with_data(ArrayView1::from(data))
            .create(path)?;
        Ok(())
    }

    fn link(&mut self, target: &str, path: &str) -> Result<(), StoreError> {
        let target = normalize(target);
        if !self.file.link_exists(target) {
            return Err(StoreError::NotFound(target.to_owned()));
        }
        if self.file.dataset(target).is_err() {
            return Err(StoreError::NotADataset(target.to_owned()));
        }

        let path = self.check_new_path(path)?;
        self.file.link_hard(target, path)?;
        Ok(())
    }

    fn set_attribute(
        &mut self,
        path: &str,
        name: &str,
        value: Attribute,
    ) -> Result<(), StoreError> {
        let path = normalize(path);

        if path.is_empty() {
            return write_attribute(&self.file, path, name, &value);
        }

        if !self.file.link_exists(path) {
            return Err(StoreError::NotFound(path.to_owned()));
        }

        match self.file.group(path) {
            Ok(group) => write_attribute(&group, path, name, &value),
            Err(_) => write_attribute(&self.file.dataset(path)?, path, name, &value),
        }
    }

    fn write_block(&mut self, path: &str, index: &[usize], data: &[f64]) -> Result<(), StoreError> {
        let path = normalize(path);
        if !self.file.link_exists(path) {
            return Err(StoreError::NotFound(path.to_owned()));
        }

        let dataset = self
            .file
            .dataset(path)
            .map_err(|_| StoreError::NotADataset(path.to_owned()))?;

        if !dataset.dtype()?.is::<f64>() {
            return Err(StoreError::NotAFloatDataset(path.to_owned()));
        }

        let shape = dataset.shape();
        let expected = block_size(path, &shape, index)?;
        if expected != data.len() {
            return Err(StoreError::BlockSizeMismatch(
                path.to_owned(),
                expected,
                data.len(),
            ));
        }

        let block_shape = &shape[index.len()..];
        let block = ArrayViewD::from_shape(IxDyn(block_shape), data).map_err(|_| {
            StoreError::BlockSizeMismatch(path.to_owned(), expected, data.len())
        })?;

        let selection = index
            .iter()
            .map(|&i| SliceInfoElem::Index(i as isize))
            .chain(block_shape.iter().map(|_| SliceInfoElem::from(..)))
            .collect::<Vec<SliceInfoElem>>();
        let selection = SliceInfo::<_, IxDyn, IxDyn>::try_from(selection).map_err(|_| {
            StoreError::IndexOutOfRange(path.to_owned(), index.to_vec(), shape.clone())
        })?;

        dataset.write_slice(block, selection)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.file.flush()?;
        Ok(())
    }
}

fn to_var_len_unicode(string: &str) -> Result<VarLenUnicode, StoreError> {
    string
        .parse::<VarLenUnicode>()
        .map_err(|_| StoreError::InvalidString(string.to_owned()))
}

/// Create an attribute on a group, a dataset, or the file and write the value into it.
fn write_attribute(
    location: &Location,
    path: &str,
    name: &str,
    value: &Attribute,
) -> Result<(), StoreError> {
    if location.attr(name).is_ok() {
        return Err(StoreError::AttributeExists(
            path.to_owned(),
            name.to_owned(),
        ));
    }

    match value {
        Attribute::Str(string) => location
            .new_attr::<VarLenUnicode>()
            .create(name)?
            .write_scalar(&to_var_len_unicode(string)?)?,
        Attribute::StrArray(strings) => {
            let values = strings
                .iter()
                .map(|s| to_var_len_unicode(s))
                .collect::<Result<Vec<_>, _>>()?;
            location
                .new_attr::<VarLenUnicode>()
                .shape((values.len(),))
                .create(name)?
                .write(ArrayView1::from(values.as_slice()))?
        }
        Attribute::Int(number) => location.new_attr::<i64>().create(name)?.write_scalar(number)?,
        Attribute::IntArray(numbers) => location
            .new_attr::<i64>()
            .shape((numbers.len(),))
            .create(name)?
            .write(ArrayView1::from(numbers.as_slice()))?,
    }

    Ok(())
}

/******************************/
/*         UNIT TESTS         */
/******************************/
