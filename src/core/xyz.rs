use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use nalgebra::Point3;

use crate::core::domain::Molecule;
use crate::engine::error::{OrcaError, Result};

/// Reads a standard XYZ file into a `Molecule` named `name`.
///
/// The first line must hold the atom count; the comment line is ignored.
pub fn read_molecule(path: &Path, name: &str) -> Result<Molecule> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines();

    let count: usize = lines
        .next()
        .and_then(|l| l.trim().parse().ok())
        .ok_or_else(|| OrcaError::parse(path, "first line must be the atom count"))?;
    lines.next(); // comment

    let mut symbols = Vec::with_capacity(count);
    let mut coords = Vec::with_capacity(count);

    for line in lines.filter(|l| !l.trim().is_empty()).take(count) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(OrcaError::parse(path, format!("malformed atom line '{}'", line.trim())));
        }
        symbols.push(parts[0].to_string());
        coords.push(parse_point(&parts[1..4], path)?);
    }

    if symbols.len() != count {
        return Err(OrcaError::parse(
            path,
            format!("header declares {} atoms, found {}", count, symbols.len()),
        ));
    }

    Molecule::new(name, symbols, coords)
}

/// Reads the coordinate block of an XYZ file written by ORCA.
///
/// Skips the two header lines and takes columns 1..=3 of every remaining
/// non-blank line. The row count must match `expected_atoms`.
pub fn read_coordinates(path: &Path, expected_atoms: usize) -> Result<Vec<Point3<f64>>> {
    let text = fs::read_to_string(path)?;
    let mut coords = Vec::with_capacity(expected_atoms);

    for line in text.lines().skip(2) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() < 4 {
            return Err(OrcaError::parse(path, format!("expected 4 columns in '{}'", line.trim())));
        }
        coords.push(parse_point(&parts[1..4], path)?);
    }

    if coords.len() != expected_atoms {
        return Err(OrcaError::parse(
            path,
            format!("atom count mismatch: expected {}, got {}", expected_atoms, coords.len()),
        ));
    }

    Ok(coords)
}

/// Writes a result geometry annotated with its energy (Hartree) on the comment line.
pub fn write_xyz(
    path: &Path,
    job_name: &str,
    atoms_list: &[String],
    coordinates: &[Point3<f64>],
    energy: f64,
) -> Result<()> {
    let mut s = String::with_capacity(64 * (atoms_list.len() + 2));

    let _ = writeln!(s, "{:3}", coordinates.len());
    let _ = writeln!(s, "{}:{}", job_name, energy);
    for (symbol, p) in atoms_list.iter().zip(coordinates) {
        let _ = writeln!(s, "{:<2}{:12.5}{:12.5}{:12.5}", symbol, p.x, p.y, p.z);
    }

    fs::write(path, s)?;
    Ok(())
}

fn parse_point(cols: &[&str], path: &Path) -> Result<Point3<f64>> {
    let mut xyz = [0.0; 3];
    for (slot, col) in xyz.iter_mut().zip(cols) {
        *slot = col
            .parse::<f64>()
            .map_err(|_| OrcaError::parse(path, format!("'{}' is not a number", col)))?;
    }
    Ok(Point3::new(xyz[0], xyz[1], xyz[2]))
}
