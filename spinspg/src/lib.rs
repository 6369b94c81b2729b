//! Spin space groups of magnetic crystals.
//!
//! `get_symmetry_with_cell` finds the space group of the crystal ignoring the
//! moments and re-expresses it in a primitive cell. `get_spin_space_group`
//! then pairs lattice operations with spin rotations compatible with the
//! moment configuration, and `get_spin_symmetry` lists every spin symmetry
//! operation in the input cell.

mod assembler;
mod nonmagnetic;
mod operation;

pub use assembler::*;
pub use nonmagnetic::*;
pub use operation::*;

use lattice::{Lattice, LatticeError};
use magmom::MagmomError;
use nalgebra::Vector3;
use pointgroup::PointGroupError;
use symops::{DetectOptions, DetectionError};
use tracing::info;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum SpinGroupError {
    #[error(
        "|det| of the cell transformation ({transformation}) differs from \
         |det| of the reduced cell ({reduced}) times {centerings} centerings"
    )]
    CenteringCountMismatch {
        transformation: i64,
        reduced: i64,
        centerings: usize,
    },
    #[error("{moments} magnetic moments given for {sites} sites")]
    MismatchedMoments { moments: usize, sites: usize },
    #[error("magnetic tolerance must be positive")]
    NonPositiveTolerance,
    #[error(transparent)]
    Detection(#[from] DetectionError),
    #[error(transparent)]
    Lattice(#[from] LatticeError),
    #[error(transparent)]
    Magmom(#[from] MagmomError),
    #[error(transparent)]
    PointGroup(#[from] PointGroupError),
}

#[derive(Debug, Clone, Copy)]
pub struct SpinSymmetryOptions {
    /// Tolerances of the nonmagnetic symmetry search.
    pub detect: DetectOptions,
    /// Largest accepted deviation of a transformed moment from its target.
    pub mag_symprec: f64,
}

impl Default for SpinSymmetryOptions {
    fn default() -> Self {
        Self {
            detect: DetectOptions::default(),
            mag_symprec: 1.0e-5,
        }
    }
}

/// Spin space group of a structure with its operations in the input cell.
#[derive(Debug, Clone)]
pub struct SpinSymmetry {
    pub spin_space_group: SpinSpaceGroup,
    pub operations: Vec<SpinSymmetryOperation>,
}

/// Spin symmetry operations of a magnetic structure.
///
/// `moments` are Cartesian, one per site. Rotations and translations of the
/// returned operations are in the fractional basis of `lattice`.
pub fn get_spin_symmetry(
    lattice: &Lattice,
    positions: &[Vector3<f64>],
    numbers: &[i32],
    moments: &[Vector3<f64>],
    options: SpinSymmetryOptions,
) -> Result<SpinSymmetry, SpinGroupError> {
    if moments.len() != positions.len() {
        return Err(SpinGroupError::MismatchedMoments {
            moments: moments.len(),
            sites: positions.len(),
        });
    }

    let ns = get_symmetry_with_cell(lattice, positions, numbers, options.detect)?;
    let ssg = get_spin_space_group(&ns, moments, options.mag_symprec)?;
    let operations = ssg.input_cell_operations()?;

    info!(
        n_operations = operations.len(),
        spin_only_group = %ssg.spin_only_group,
        "spin symmetry"
    );

    Ok(SpinSymmetry {
        spin_space_group: ssg,
        operations,
    })
}
