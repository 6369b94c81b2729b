//! Magnetic moment configurations in Cartesian coordinates.
//!
//! Moments are one 3-vector per site. Spin rotations act on them as real
//! orthogonal 3x3 matrices, independently of the lattice operation.

use nalgebra::{Matrix3, Vector3};
use permutation::Permutation;

mod procrustes;
mod spin_only;

pub use procrustes::*;
pub use spin_only::*;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum MagmomError {
    #[error("singular value decomposition did not converge")]
    SvdFailed,
}

/// Moments each site must carry after a lattice operation with permutation
/// `perm`: site `i` is sent onto site `perm(i)`.
pub fn permuted_moments(moments: &[Vector3<f64>], perm: &Permutation) -> Vec<Vector3<f64>> {
    perm.permute(moments)
}

/// `max_i |U m_i - m_perm(i)|`.
pub fn max_moment_deviation(
    moments: &[Vector3<f64>],
    spin_rotation: &Matrix3<f64>,
    perm: &Permutation,
) -> f64 {
    moments
        .iter()
        .enumerate()
        .map(|(i, m)| (spin_rotation * m - moments[perm.apply(i)]).norm())
        .fold(0.0, f64::max)
}

/// True when the site permutation alone leaves the configuration unchanged.
pub fn is_invariant_under(moments: &[Vector3<f64>], perm: &Permutation, mag_symprec: f64) -> bool {
    max_moment_deviation(moments, &Matrix3::identity(), perm) < mag_symprec
}

/// Largest moment length.
pub fn max_moment_norm(moments: &[Vector3<f64>]) -> f64 {
    moments.iter().map(|m| m.norm()).fold(0.0, f64::max)
}
