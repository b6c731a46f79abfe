// Released under MIT License.
// Copyright (c) 2025 Ladislav Bartos

//! Implementation of functions for reading CASTEP md and geom files.

use hashbrown::HashSet;
use indexmap::IndexMap;
use nalgebra::{Matrix3, RowVector3, Vector3};
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use crate::errors::ParseMdError;
use crate::structures::frame::{AtomKey, AtomState, Energies, Frame};

static TAGGED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)<--\s*(\S+)\s*$").expect(
        "FATAL CASTEP_H5MD ERROR | md_io::TAGGED_LINE | Could not construct regular expression.",
    )
});

static HEADER_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*BEGIN\s+header\s*$").expect(
        "FATAL CASTEP_H5MD ERROR | md_io::HEADER_START | Could not construct regular expression.",
    )
});

static HEADER_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*END\s+header\s*$").expect(
        "FATAL CASTEP_H5MD ERROR | md_io::HEADER_END | Could not construct regular expression.",
    )
});

/// Read a CASTEP md or geom file and return all of its frames.
///
/// ## Returns
/// Vector of frames in the order of the file or `ParseMdError` if the file could not be read.
///
/// ## Notes
/// - See [`read_md`] for the description of the supported format.
pub fn read_md_file(filename: impl AsRef<Path>) -> Result<Vec<Frame>, ParseMdError> {
    let file = File::open(filename.as_ref())
        .map_err(|_| ParseMdError::FileNotFound(Box::from(filename.as_ref())))?;

    read_md(BufReader::new(file))
}

/// Read frames from a stream in CASTEP md or geom format.
///
/// ## Supported format
/// - The stream may start with a header enclosed between `BEGIN header` and `END header` lines.
///   The content of the header is ignored.
/// - Frames are separated by empty lines.
/// - The first line of a frame contains only the simulation time.
///   In geom files, the time is replaced by a line tagged `c` containing the iteration number
///   and convergence flags. The iteration number is then stored as the time of the frame.
///   Geom files have no physical time, so this value is an iteration index and is only meaningful
///   when the trajectory is written without unit conversion (converting it treats it as a number
///   of atomic time units).
/// - All other lines of a frame end with a tag (`<-- TAG`) identifying the stored property:
///   - `E`: energies (Hamiltonian, potential, kinetic); missing trailing values are set to zero,
///   - `T`: temperature, `P`: pressure,
///   - `h`, `hv`, `S`: rows of the cell matrix, lattice velocity, and stress tensor,
///   - `R`, `V`, `F`: position, velocity, and force of an atom in the format `species index x y z`.
///
/// ## Notes
/// - Each frame must contain time, energies, all rows of the cell matrix, and at least one atom position.
///   Temperature, pressure, stress, lattice velocity, velocities, and forces are optional
///   (they are missing e.g. in geom files) and are set to zero if not present.
/// - Atoms of a frame are ordered as their positions appear in the stream.
/// - All values are expected to be in atomic units.
pub fn read_md(reader: impl BufRead) -> Result<Vec<Frame>, ParseMdError> {
    let mut frames = Vec::new();
    let mut builder = FrameBuilder::default();
    let mut in_header = false;
    let mut line_number = 0;

    for raw_line in reader.lines() {
        line_number += 1;
        let line = raw_line.map_err(|_| ParseMdError::LineNotFound(line_number))?;

        // the header can only appear before the first frame
        if frames.is_empty() && builder.is_empty() && !in_header && HEADER_START.is_match(&line) {
            in_header = true;
            continue;
        }

        if in_header {
            if HEADER_END.is_match(&line) {
                in_header = false;
            }
            continue;
        }

        if line.trim().is_empty() {
            if !builder.is_empty() {
                frames.push(std::mem::take(&mut builder).finish(line_number - 1)?);
            }
            continue;
        }

        builder.add_line(&line, line_number)?;
    }

    if in_header {
        return Err(ParseMdError::UnterminatedHeader);
    }

    if !builder.is_empty() {
        frames.push(builder.finish(line_number)?);
    }

    log::debug!("Read {} frame(s) from a CASTEP md/geom stream.", frames.len());
    Ok(frames)
}

/// Collects the lines of a single frame.
#[derive(Debug, Default)]
struct FrameBuilder {
    time: Option<f64>,
    energies: Option<Energies>,
    temperature: f64,
    pressure: f64,
    cell: Vec<RowVector3<f64>>,
    cell_velocity: Vec<RowVector3<f64>>,
    stress: Vec<RowVector3<f64>>,
    atoms: IndexMap<AtomKey, AtomState>,
    /// Atoms which already had their velocity (`V`) or force (`F`) set.
    velocities: HashSet<AtomKey>,
    forces: HashSet<AtomKey>,
}

impl FrameBuilder {
    fn is_empty(&self) -> bool {
        self.time.is_none()
            && self.energies.is_none()
            && self.cell.is_empty()
            && self.cell_velocity.is_empty()
            && self.stress.is_empty()
            && self.atoms.is_empty()
    }

    fn add_line(&mut self, line: &str, line_number: usize) -> Result<(), ParseMdError> {
        let Some(caps) = TAGGED_LINE.captures(line) else {
            // the only untagged line of a frame is the time
            if self.is_empty() {
                self.time = Some(parse_values::<1>(line, line_number)?[0]);
                return Ok(());
            }
            return Err(ParseMdError::UnexpectedLine(line_number));
        };

        let data = caps.get(1).map_or("", |m| m.as_str());
        let tag = caps.get(2).map_or("", |m| m.as_str());

        match tag {
            "E" => {
                let values = parse_floats(data, line_number)?;
                if values.is_empty() || values.len() > 3 {
                    return Err(ParseMdError::ValueCountErr(line_number, 3, values.len()));
                }
                let energy = |i: usize| values.get(i).copied().unwrap_or(0.0);
                self.energies = Some(Energies::new(energy(0), energy(1), energy(2)));
            }
            "c" => {
                let iteration = data
                    .split_whitespace()
                    .next()
                    .ok_or(ParseMdError::ValueCountErr(line_number, 1, 0))?;
                self.time = Some(parse_float(iteration, line_number)?);
            }
            "T" => self.temperature = parse_values::<1>(data, line_number)?[0],
            "P" => self.pressure = parse_values::<1>(data, line_number)?[0],
            "h" => self.cell.push(parse_row(data, line_number)?),
            "hv" => self.cell_velocity.push(parse_row(data, line_number)?),
            "S" => self.stress.push(parse_row(data, line_number)?),
            "R" => {
                let (key, position) = line_as_atom(data, line_number)?;
                if self.atoms.contains_key(&key) {
                    return Err(ParseMdError::DuplicateAtom(line_number, key, tag.to_owned()));
                }

                self.atoms.insert(key, AtomState::new(position, Vector3::zeros(), Vector3::zeros()));
            }
            "V" | "F" => {
                let (key, vector) = line_as_atom(data, line_number)?;
                let Some(state) = self.atoms.get_mut(&key) else {
                    return Err(ParseMdError::UnknownAtom(line_number, key));
                };

                let (seen, target) = if tag == "V" {
                    (&mut self.velocities, &mut state.velocity)
                } else {
                    (&mut self.forces, &mut state.force)
                };

                if !seen.insert(key.clone()) {
                    return Err(ParseMdError::DuplicateAtom(line_number, key, tag.to_owned()));
                }

                *target = vector;
            }
            _ => return Err(ParseMdError::UnknownTag(line_number, tag.to_owned())),
        }

        Ok(())
    }

    /// Construct the frame. `line_number` is the number of the last line of the frame.
    fn finish(self, line_number: usize) -> Result<Frame, ParseMdError> {
        let missing = |field: &str| ParseMdError::MissingField(line_number, field.to_owned());

        let time = self.time.ok_or_else(|| missing("time"))?;
        let energies = self.energies.ok_or_else(|| missing("E"))?;
        if self.cell.is_empty() {
            return Err(missing("h"));
        }
        if self.atoms.is_empty() {
            return Err(missing("R"));
        }

        let cell = rows_as_matrix(&self.cell, "h", line_number)?;
        let cell_velocity = rows_as_matrix(&self.cell_velocity, "hv", line_number)?;
        let stress = rows_as_matrix(&self.stress, "S", line_number)?;

        let frame = Frame::new(time, cell)
            .with_energies(energies)
            .with_temperature(self.temperature)
            .with_pressure(self.pressure)
            .with_cell_velocity(cell_velocity)
            .with_stress(stress);

        Ok(self
            .atoms
            .into_iter()
            .fold(frame, |frame, (key, state)| frame.with_atom(key, state)))
    }
}

/// Construct a matrix from its rows. No rows produce a zero matrix.
fn rows_as_matrix(
    rows: &[RowVector3<f64>],
    name: &str,
    line_number: usize,
) -> Result<Matrix3<f64>, ParseMdError> {
    match rows.len() {
        0 => Ok(Matrix3::zeros()),
        3 => Ok(Matrix3::from_rows(rows)),
        _ => Err(ParseMdError::IncompleteMatrix(line_number, name.to_owned())),
    }
}

/// Parse an atom line in the format `species index x y z`.
fn line_as_atom(data: &str, line_number: usize) -> Result<(AtomKey, Vector3<f64>), ParseMdError> {
    let split: Vec<&str> = data.split_whitespace().collect();
    if split.len() != 5 {
        return Err(ParseMdError::ParseAtomLineErr(line_number));
    }

    let index = split[1]
        .parse::<usize>()
        .map_err(|_| ParseMdError::ParseAtomLineErr(line_number))?;

    let mut vector = Vector3::zeros();
    for (item, string) in vector.iter_mut().zip(&split[2..]) {
        *item = parse_float(string, line_number)?;
    }

    Ok((AtomKey::new(split[0], index), vector))
}

/// Parse a row of a 3×3 matrix.
fn parse_row(data: &str, line_number: usize) -> Result<RowVector3<f64>, ParseMdError> {
    let [x, y, z] = parse_values::<3>(data, line_number)?;
    Ok(RowVector3::new(x, y, z))
}

/// Parse exactly `N` whitespace-separated numbers.
fn parse_values<const N: usize>(data: &str, line_number: usize) -> Result<[f64; N], ParseMdError> {
    let values = parse_floats(data, line_number)?;

    values
        .try_into()
        .map_err(|values: Vec<f64>| ParseMdError::ValueCountErr(line_number, N, values.len()))
}

fn parse_floats(data: &str, line_number: usize) -> Result<Vec<f64>, ParseMdError> {
    data.split_whitespace()
        .map(|string| parse_float(string, line_number))
        .collect()
}

/// Parse a number which may use the Fortran `D` exponent.
fn parse_float(string: &str, line_number: usize) -> Result<f64, ParseMdError> {
    string
        .parse::<f64>()
        .or_else(|_| string.replace(['D', 'd'], "E").parse::<f64>())
        .map_err(|_| ParseMdError::ParseNumberErr(line_number, string.to_owned()))
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    const SINGLE_FRAME: &str = "\
 BEGIN header

 END header

                      1.00000000E+000
                     -1.50000000E+001   -1.60000000E+001    1.00000000E+000  <-- E
                      2.00000000E-003                                         <-- T
                      3.00000000E-004                                         <-- P
                      1.00000000E+001    0.00000000E+000    0.00000000E+000  <-- h
                      0.00000000E+000    1.10000000E+001    0.00000000E+000  <-- h
                      0.00000000E+000    0.00000000E+000    1.20000000E+001  <-- h
                      1.00000000E-005    0.00000000E+000    0.00000000E+000  <-- hv
                      0.00000000E+000    2.00000000E-005    0.00000000E+000  <-- hv
                      0.00000000E+000    0.00000000E+000    3.00000000E-005  <-- hv
                      4.00000000E-004    1.00000000E-005    0.00000000E+000  <-- S
                      1.00000000E-005    5.00000000E-004    0.00000000E+000  <-- S
                      0.00000000E+000    0.00000000E+000    6.00000000E-004  <-- S
 O               1    1.00000000E+000    2.00000000E+000    3.00000000E+000  <-- R
 H               1    4.00000000E+000    5.00000000E+000    6.00000000E+000  <-- R
 O               1    1.00000000E-003    2.00000000E-003    3.00000000E-003  <-- V
 H               1   -4.00000000E-003   -5.00000000E-003   -6.00000000E-003  <-- V
 O               1    1.00000000E-002    0.00000000E+000    0.00000000E+000  <-- F
 H               1   -1.00000000E-002    0.00000000E+000    0.00000000E+000  <-- F
";

    #[test]
    fn read_single_frame() {
        let frames = read_md(SINGLE_FRAME.as_bytes()).unwrap();
        assert_eq!(frames.len(), 1);

        let frame = &frames[0];
        assert_approx_eq!(f64, frame.time(), 1.0);
        assert_approx_eq!(f64, frame.energies().hamiltonian(), -15.0);
        assert_approx_eq!(f64, frame.energies().potential(), -16.0);
        assert_approx_eq!(f64, frame.energies().kinetic(), 1.0);
        assert_approx_eq!(f64, frame.temperature(), 0.002);
        assert_approx_eq!(f64, frame.pressure(), 0.0003);

        assert_approx_eq!(f64, frame.cell()[(0, 0)], 10.0);
        assert_approx_eq!(f64, frame.cell()[(1, 1)], 11.0);
        assert_approx_eq!(f64, frame.cell()[(2, 2)], 12.0);
        assert_approx_eq!(f64, frame.cell()[(0, 1)], 0.0);
        assert_approx_eq!(f64, frame.cell_velocity()[(1, 1)], 2e-5);
        assert_approx_eq!(f64, frame.stress()[(0, 1)], 1e-5);
        assert_approx_eq!(f64, frame.stress()[(2, 2)], 6e-4);

        let keys: Vec<AtomKey> = frame.atom_keys().cloned().collect();
        assert_eq!(keys, vec![AtomKey::new("O", 1), AtomKey::new("H", 1)]);

        let hydrogen = &frame.atoms()[&AtomKey::new("H", 1)];
        assert_approx_eq!(f64, hydrogen.position().y, 5.0);
        assert_approx_eq!(f64, hydrogen.velocity().z, -6e-3);
        assert_approx_eq!(f64, hydrogen.force().x, -1e-2);
    }

    #[test]
    fn read_multiple_frames() {
        let second = SINGLE_FRAME
            .split("END header\n")
            .nth(1)
            .unwrap()
            .replace("1.00000000E+000\n", "2.00000000E+000\n");
        let input = format!("{}\n\n{}", SINGLE_FRAME, second);

        let frames = read_md(input.as_bytes()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_approx_eq!(f64, frames[0].time(), 1.0);
        assert_approx_eq!(f64, frames[1].time(), 2.0);
        assert_eq!(frames[1].n_atoms(), 2);
    }

    #[test]
    fn read_without_header() {
        let input = "\
 0.0
 -1.0 <-- E
 1.0 0.0 0.0 <-- h
 0.0 1.0 0.0 <-- h
 0.0 0.0 1.0 <-- h
 Si 1 0.1 0.2 0.3 <-- R
 Si 1 0.0 0.0 1.0D-002 <-- F";

        let frames = read_md(input.as_bytes()).unwrap();
        assert_eq!(frames.len(), 1);

        let frame = &frames[0];
        assert_approx_eq!(f64, frame.energies().hamiltonian(), -1.0);
        assert_approx_eq!(f64, frame.energies().kinetic(), 0.0);
        assert_approx_eq!(f64, frame.temperature(), 0.0);
        assert_eq!(frame.stress(), Matrix3::zeros());
        assert_eq!(frame.cell_velocity(), Matrix3::zeros());

        let atom = &frame.atoms()[&AtomKey::new("Si", 1)];
        assert_eq!(atom.velocity(), Vector3::zeros());
        assert_approx_eq!(f64, atom.force().z, 0.01);
    }

    #[test]
    fn read_geom() {
        let input = "\
 BEGIN header
 END header

                                      3                                     F   F   F   T   <-- c
                     -8.39102456E+000   -8.39102456E+000                             <-- E
                      5.10000000E+000    0.00000000E+000    0.00000000E+000          <-- h
                      0.00000000E+000    5.10000000E+000    0.00000000E+000          <-- h
                      0.00000000E+000    0.00000000E+000    5.10000000E+000          <-- h
                     -1.30000000E-003    0.00000000E+000    0.00000000E+000          <-- S
                      0.00000000E+000   -1.30000000E-003    0.00000000E+000          <-- S
                      0.00000000E+000    0.00000000E+000   -1.30000000E-003          <-- S
 Si              1    0.00000000E+000    0.00000000E+000    0.00000000E+000          <-- R
 Si              2    2.55000000E+000    2.55000000E+000    0.00000000E+000          <-- R
 Si              1    0.00000000E+000    0.00000000E+000    0.00000000E+000          <-- F
 Si              2    1.00000000E-004    0.00000000E+000    0.00000000E+000          <-- F
";

        let frames = read_md(input.as_bytes()).unwrap();
        assert_eq!(frames.len(), 1);

        let frame = &frames[0];
        assert_approx_eq!(f64, frame.time(), 3.0);
        assert_approx_eq!(f64, frame.energies().potential(), -8.39102456);
        assert_approx_eq!(f64, frame.energies().kinetic(), 0.0);
        assert_approx_eq!(f64, frame.stress()[(1, 1)], -1.3e-3);
        assert_eq!(frame.n_atoms(), 2);
        assert_approx_eq!(f64, frame.atoms()[&AtomKey::new("Si", 2)].force().x, 1e-4);
        assert_eq!(frame.atoms()[&AtomKey::new("Si", 2)].velocity(), Vector3::zeros());
    }

    #[test]
    fn read_empty() {
        assert!(read_md("".as_bytes()).unwrap().is_empty());
        assert!(read_md(" BEGIN header\n END header\n\n".as_bytes())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn read_file() {
        let frames = read_md_file("test_files/example.md").unwrap();
        assert_eq!(frames.len(), 3);

        for frame in frames.iter() {
            assert_eq!(frame.n_atoms(), 3);
        }

        assert_approx_eq!(f64, frames[2].time(), 8.26827247e1);
    }

    #[test]
    fn read_file_nonexistent() {
        match read_md_file("test_files/nonexistent.md") {
            Err(ParseMdError::FileNotFound(path)) => {
                assert_eq!(path.to_str().unwrap(), "test_files/nonexistent.md")
            }
            x => panic!("Unexpected result: {:?}", x),
        }
    }

    #[test]
    fn fail_unterminated_header() {
        assert!(matches!(
            read_md(" BEGIN header\n 1.0\n".as_bytes()),
            Err(ParseMdError::UnterminatedHeader)
        ));
    }

    #[test]
    fn fail_invalid_number() {
        let input = " 0.0\n -1.0 x.5 <-- E\n";
        match read_md(input.as_bytes()) {
            Err(ParseMdError::ParseNumberErr(line, string)) => {
                assert_eq!(line, 2);
                assert_eq!(string, "x.5");
            }
            x => panic!("Unexpected result: {:?}", x),
        }
    }

    #[test]
    fn fail_value_count() {
        let input = " 0.0\n -1.0 <-- E\n 1.0 0.0 <-- h\n";
        assert!(matches!(
            read_md(input.as_bytes()),
            Err(ParseMdError::ValueCountErr(3, 3, 2))
        ));

        let input = " 0.0\n -1.0 1.0 2.0 3.0 <-- E\n";
        assert!(matches!(
            read_md(input.as_bytes()),
            Err(ParseMdError::ValueCountErr(2, 3, 4))
        ));
    }

    #[test]
    fn fail_unknown_tag() {
        let input = " 0.0\n -1.0 <-- Q\n";
        match read_md(input.as_bytes()) {
            Err(ParseMdError::UnknownTag(line, tag)) => {
                assert_eq!(line, 2);
                assert_eq!(tag, "Q");
            }
            x => panic!("Unexpected result: {:?}", x),
        }
    }

    #[test]
    fn fail_unexpected_line() {
        let input = " 0.0\n 1.0\n";
        assert!(matches!(
            read_md(input.as_bytes()),
            Err(ParseMdError::UnexpectedLine(2))
        ));
    }

    #[test]
    fn fail_unknown_atom() {
        let input = " 0.0\n -1.0 <-- E\n Si 1 0.0 0.0 0.0 <-- R\n Si 2 0.0 0.0 0.0 <-- V\n";
        match read_md(input.as_bytes()) {
            Err(ParseMdError::UnknownAtom(line, key)) => {
                assert_eq!(line, 4);
                assert_eq!(key, AtomKey::new("Si", 2));
            }
            x => panic!("Unexpected result: {:?}", x),
        }
    }

    #[test]
    fn fail_duplicate_atom() {
        let input = " 0.0\n -1.0 <-- E\n Si 1 0.0 0.0 0.0 <-- R\n Si 1 5.0 5.0 5.0 <-- R\n";
        match read_md(input.as_bytes()) {
            Err(ParseMdError::DuplicateAtom(line, key, tag)) => {
                assert_eq!(line, 4);
                assert_eq!(key, AtomKey::new("Si", 1));
                assert_eq!(tag, "R");
            }
            x => panic!("Unexpected result: {:?}", x),
        }

        let input = "\
 0.0
 -1.0 <-- E
 Si 1 0.0 0.0 0.0 <-- R
 Si 2 1.0 1.0 1.0 <-- R
 Si 1 0.1 0.0 0.0 <-- V
 Si 2 0.1 0.0 0.0 <-- V
 Si 1 0.2 0.0 0.0 <-- V
";
        match read_md(input.as_bytes()) {
            Err(ParseMdError::DuplicateAtom(line, key, tag)) => {
                assert_eq!(line, 7);
                assert_eq!(key, AtomKey::new("Si", 1));
                assert_eq!(tag, "V");
            }
            x => panic!("Unexpected result: {:?}", x),
        }

        let input = " 0.0\n -1.0 <-- E\n Si 1 0.0 0.0 0.0 <-- R\n Si 1 1.0 0.0 0.0 <-- F\n Si 1 2.0 0.0 0.0 <-- F\n";
        assert!(matches!(
            read_md(input.as_bytes()),
            Err(ParseMdError::DuplicateAtom(5, _, _))
        ));
    }

    #[test]
    fn fail_atom_line() {
        let input = " 0.0\n Si 0.0 0.0 0.0 <-- R\n";
        assert!(matches!(
            read_md(input.as_bytes()),
            Err(ParseMdError::ParseAtomLineErr(2))
        ));

        let input = " 0.0\n Si one 0.0 0.0 0.0 <-- R\n";
        assert!(matches!(
            read_md(input.as_bytes()),
            Err(ParseMdError::ParseAtomLineErr(2))
        ));
    }

    #[test]
    fn fail_incomplete_matrix() {
        let input = "\
 0.0
 -1.0 <-- E
 1.0 0.0 0.0 <-- h
 0.0 1.0 0.0 <-- h
 Si 1 0.1 0.2 0.3 <-- R
";
        match read_md(input.as_bytes()) {
            Err(ParseMdError::IncompleteMatrix(line, name)) => {
                assert_eq!(line, 5);
                assert_eq!(name, "h");
            }
            x => panic!("Unexpected result: {:?}", x),
        }
    }

    #[test]
    fn fail_missing_fields() {
        let cases = [
            (" -1.0 <-- E\n 1.0 0.0 0.0 <-- h\n", "time"),
            (" 0.0\n 1.0 0.0 0.0 <-- h\n", "E"),
            (" 0.0\n -1.0 <-- E\n Si 1 0.0 0.0 0.0 <-- R\n", "h"),
            (" 0.0\n -1.0 <-- E\n 1 0 0 <-- h\n 0 1 0 <-- h\n 0 0 1 <-- h\n", "R"),
        ];

        for (input, field) in cases {
            match read_md(input.as_bytes()) {
                Err(ParseMdError::MissingField(_, missing)) => assert_eq!(missing, field),
                x => panic!("Unexpected result for missing `{}`: {:?}", field, x),
            }
        }
    }
}
