// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Small functions for testing purposes.

#[cfg(test)]
pub(crate) mod utilities {
    use crate::structures::frame::{AtomKey, AtomState, Energies, Frame};
    use nalgebra::{Matrix3, Vector3};

    /// Atoms of a small synthetic system (one water molecule and a sodium ion).
    pub(crate) const ATOMS: [(&str, usize); 4] = [("O", 1), ("H", 1), ("H", 2), ("Na", 1)];

    /// Construct a synthetic frame with values depending on the `step`.
    /// Every value of the frame is unique, so misplaced writes are detectable.
    pub(crate) fn synthetic_frame(step: usize) -> Frame {
        let s = step as f64;

        let frame = Frame::new(
            10.0 * s,
            Matrix3::from_diagonal_element(20.0 + s),
        )
        .with_energies(Energies::new(-100.0 - s, -101.0 - s, 1.0 + s))
        .with_temperature(1e-3 * (s + 1.0))
        .with_pressure(1e-5 * (s + 1.0))
        .with_stress(Matrix3::from_fn(|i, j| 1e-5 * (s + 1.0) * (i * 3 + j + 1) as f64))
        .with_cell_velocity(Matrix3::from_fn(|i, j| 1e-6 * (s + 1.0) * (i * 3 + j + 1) as f64));

        ATOMS
            .iter()
            .enumerate()
            .fold(frame, |frame, (a, (species, index))| {
                let base = 100.0 * s + 10.0 * a as f64;
                frame.with_atom(
                    AtomKey::new(species, *index),
                    AtomState::new(
                        Vector3::new(base + 1.0, base + 2.0, base + 3.0),
                        Vector3::new(-base - 1.0, -base - 2.0, -base - 3.0),
                        Vector3::new(1e-2 * base, 2e-2 * base, 3e-2 * base),
                    ),
                )
            })
    }

    /// Construct a synthetic trajectory with `n_steps` frames.
    pub(crate) fn synthetic_trajectory(n_steps: usize) -> Vec<Frame> {
        (0..n_steps).map(synthetic_frame).collect()
    }
}
