// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of writing individual frames into an allocated h5md archive.

use crate::errors::WriteFrameError;
use crate::io::store::ArchiveStore;
use crate::structures::frame::Frame;
use crate::units::{Dimension, Scalable};

use super::schema::H5mdArchive;
use super::{Field, TIME};

impl<S: ArchiveStore> H5mdArchive<S> {
    /// Write a frame into the slot with index `frame_index` of every time-dependent dataset.
    ///
    /// ## Returns
    /// - `Ok` if the frame has been written.
    /// - `WriteFrameError::IndexOutOfRange` if `frame_index` is not lower than the number of allocated steps.
    /// - `WriteFrameError::AtomsNumberMismatch` or `WriteFrameError::AtomOrderMismatch`
    ///   if the atoms of the frame do not match the atoms the archive was allocated for.
    /// - `WriteFrameError::StoreError` if the store could not be written to.
    ///
    /// ## Notes
    /// - Values are converted from CASTEP atomic units into the unit system of the archive.
    /// - All values are extracted and converted before the store is touched,
    ///   so a rejected frame leaves its slot unchanged.
    /// - Frames can be written in any order. Writing into the same slot twice overwrites it.
    pub fn write_frame(&mut self, frame: &Frame, frame_index: usize) -> Result<(), WriteFrameError> {
        if frame_index >= self.n_steps() {
            return Err(WriteFrameError::IndexOutOfRange(
                frame_index,
                self.n_steps(),
            ));
        }

        self.metadata.check_frame(frame, frame_index)?;

        let time = self.convert(frame.time(), Dimension::Time);
        let blocks = Field::ALL
            .iter()
            .map(|&field| {
                (
                    field.value_path(),
                    self.convert(field.extract(frame), field.dimension()),
                )
            })
            .collect::<Vec<(String, Vec<f64>)>>();

        self.store.write_block(TIME, &[frame_index], &[time])?;
        for (path, values) in blocks {
            self.store.write_block(&path, &[frame_index], &values)?;
        }

        log::trace!("Written frame {} (time {}).", frame_index, frame.time());
        Ok(())
    }

    #[inline]
    fn convert<T: Scalable>(&self, value: T, dimension: Dimension) -> T {
        match &self.converter {
            Some(converter) => converter.convert(value, dimension),
            None => value,
        }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
