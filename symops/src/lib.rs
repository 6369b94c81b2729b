//! Space-group operation algebra in fractional coordinates.
//!
//! Operations act as `x' = R x + t` with an integer rotation `R` and a real
//! translation `t` kept in `[0, 1)`. Sibling modules detect the operations of
//! a structure (`detect`) and identify the crystallographic point group of a
//! rotation set (`classify`).

use std::fmt;
use std::ops::Mul;

use itertools::iproduct;
use lattice::{adjugate, determinant, to_float, IntMatrix3, Lattice};
use nalgebra::Vector3;

pub mod classify;
pub mod detect;

pub use classify::*;
pub use detect::*;

/// Integer 3x3 rotation matrix in fractional-coordinate basis.
pub type Rotation = IntMatrix3;

/// Fractional translation.
pub type Translation = Vector3<f64>;

const WRAP_EPS: f64 = 1.0e-12;

#[derive(Clone, Debug, PartialEq)]
pub struct SymOp {
    rotation: Rotation,
    translation: Translation,
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SymOpError {
    #[error("rotation determinant must be ±1, got {det}")]
    NonUnimodularRotation { det: i64 },
    #[error("symmetry group is empty")]
    EmptyGroup,
    #[error("symmetry group is missing identity")]
    MissingIdentity,
    #[error("symmetry op {index} has no inverse in group")]
    MissingInverse { index: usize },
    #[error("symmetry group is not closed: op {left} composed with op {right} is missing")]
    NotClosed { left: usize, right: usize },
    #[error("symmetry op {index} violates lattice consistency (max metric deviation = {deviation:.3e})")]
    LatticeInconsistent { index: usize, deviation: f64 },
}

impl SymOp {
    /// The translation is wrapped into `[0, 1)`.
    pub fn new(rotation: Rotation, translation: Translation) -> Result<Self, SymOpError> {
        unimodular_det(&rotation)?;

        Ok(Self {
            rotation,
            translation: normalize_fractional(&translation),
        })
    }

    pub fn identity() -> Self {
        Self {
            rotation: Rotation::identity(),
            translation: Translation::zeros(),
        }
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn translation(&self) -> &Translation {
        &self.translation
    }

    pub fn is_pure_translation(&self) -> bool {
        self.rotation == Rotation::identity()
    }

    pub fn apply_rotation(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        to_float(&self.rotation) * vector
    }

    /// `rhs` first, then `self`: `(R1, t1)(R2, t2) = (R1 R2, R1 t2 + t1)`.
    pub fn compose(&self, rhs: &SymOp) -> SymOp {
        SymOp {
            rotation: self.rotation * rhs.rotation,
            translation: normalize_fractional(
                &(self.apply_rotation(&rhs.translation) + self.translation),
            ),
        }
    }

    pub fn inverse(&self) -> Result<SymOp, SymOpError> {
        let det = unimodular_det(&self.rotation)?;
        let rotation = adjugate(&self.rotation).map(|x| (x / det) as i32);
        let translation = -(to_float(&rotation) * self.translation);

        Ok(SymOp {
            rotation,
            translation: normalize_fractional(&translation),
        })
    }
}

impl Mul<&SymOp> for &SymOp {
    type Output = SymOp;

    fn mul(self, rhs: &SymOp) -> SymOp {
        self.compose(rhs)
    }
}

fn unimodular_det(rotation: &Rotation) -> Result<i64, SymOpError> {
    match determinant(rotation) {
        det @ (1 | -1) => Ok(det),
        det => Err(SymOpError::NonUnimodularRotation { det }),
    }
}

impl fmt::Display for SymOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let r = &self.rotation;
        let t = &self.translation;

        for i in 0..3 {
            writeln!(
                f,
                "{:3} {:3} {:3}   {:12.8}",
                r[(i, 0)],
                r[(i, 1)],
                r[(i, 2)],
                t[i]
            )?;
        }

        Ok(())
    }
}

/// Checks that `ops` is a group, comparing translations modulo the lattice
/// with the Cartesian tolerance `symprec`.
pub fn validate_group(ops: &[SymOp], lattice: &Lattice, symprec: f64) -> Result<(), SymOpError> {
    let contains = |target: &SymOp| {
        ops.iter()
            .any(|op| sym_op_approx_eq(op, target, lattice, symprec))
    };
    let is_identity = |op: &SymOp| {
        op.is_pure_translation() && lattice.is_overlap(op.translation(), symprec)
    };

    if ops.is_empty() {
        return Err(SymOpError::EmptyGroup);
    }
    if !ops.iter().any(is_identity) {
        return Err(SymOpError::MissingIdentity);
    }

    if let Some(index) = ops.iter().position(|op| {
        !ops.iter()
            .any(|other| is_identity(&(op * other)) && is_identity(&(other * op)))
    }) {
        return Err(SymOpError::MissingInverse { index });
    }

    match iproduct!(0..ops.len(), 0..ops.len()).find(|&(i, j)| !contains(&(&ops[i] * &ops[j]))) {
        Some((left, right)) => Err(SymOpError::NotClosed { left, right }),
        None => Ok(()),
    }
}

/// Checks `R^T G R ≈ G` for every operation.
pub fn validate_lattice_consistency(
    ops: &[SymOp],
    lattice: &Lattice,
    tol: f64,
) -> Result<(), SymOpError> {
    ops.iter()
        .map(|op| rotation_metric_deviation(op.rotation(), lattice))
        .enumerate()
        .find(|&(_, deviation)| deviation > tol)
        .map_or(Ok(()), |(index, deviation)| {
            Err(SymOpError::LatticeInconsistent { index, deviation })
        })
}

/// Maximum entry of `|R^T G R - G|`.
pub fn rotation_metric_deviation(rotation: &Rotation, lattice: &Lattice) -> f64 {
    let metric = lattice.get_metric_tensor();
    let rot = to_float(rotation);

    (rot.transpose() * metric * rot - metric).amax()
}

/// Same rotation and translations equal modulo the lattice within the
/// Cartesian tolerance `symprec`.
pub fn sym_op_approx_eq(lhs: &SymOp, rhs: &SymOp, lattice: &Lattice, symprec: f64) -> bool {
    lhs.rotation == rhs.rotation && lattice.is_overlap(&(lhs.translation - rhs.translation), symprec)
}

pub fn normalize_fractional(vector: &Vector3<f64>) -> Vector3<f64> {
    vector.map(wrap_fractional)
}

/// `x` mod 1 in `[0, 1)`; values within `WRAP_EPS` of an integer map to 0.
pub fn wrap_fractional(x: f64) -> f64 {
    let wrapped = x.rem_euclid(1.0);
    if wrapped < WRAP_EPS || 1.0 - wrapped < WRAP_EPS {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cubic() -> Lattice {
        Lattice::new(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0])
    }

    fn c2z() -> SymOp {
        SymOp::new(
            Rotation::new(-1, 0, 0, 0, -1, 0, 0, 0, 1),
            Translation::zeros(),
        )
        .unwrap()
    }

    #[test]
    fn screw_times_inverse() {
        let screw = SymOp::new(
            Rotation::new(0, -1, 0, 1, -1, 0, 0, 0, 1),
            Translation::new(0.0, 0.0, 1.0 / 3.0),
        )
        .unwrap();
        let inv = screw.inverse().unwrap();

        assert_eq!(inv.rotation(), &Rotation::new(-1, 1, 0, -1, 0, 0, 0, 0, 1));
        assert!(sym_op_approx_eq(&(&screw * &inv), &SymOp::identity(), &cubic(), 1.0e-9));
        assert!(sym_op_approx_eq(&(&inv * &screw), &SymOp::identity(), &cubic(), 1.0e-9));
    }

    #[test]
    fn rejects_non_unimodular_rotation() {
        let err = SymOp::new(Rotation::new(2, 0, 0, 0, 1, 0, 0, 0, 1), Translation::zeros());
        assert_eq!(err, Err(SymOpError::NonUnimodularRotation { det: 2 }));
    }

    #[test]
    fn translations_wrap_into_unit_cell() {
        let op = SymOp::new(Rotation::identity(), Translation::new(-0.25, 1.5, 2.0)).unwrap();
        assert_eq!(*op.translation(), Translation::new(0.75, 0.5, 0.0));
        assert_eq!(wrap_fractional(-1.0e-14), 0.0);
    }

    #[test]
    fn group_checks() {
        let half = SymOp::new(Rotation::identity(), Translation::new(0.5, 0.5, 0.5)).unwrap();
        let quarter = SymOp::new(Rotation::identity(), Translation::new(0.25, 0.0, 0.0)).unwrap();

        assert_eq!(
            validate_group(&[SymOp::identity(), c2z(), half], &cubic(), 1.0e-9),
            Err(SymOpError::NotClosed { left: 1, right: 2 })
        );
        assert_eq!(
            validate_group(&[SymOp::identity(), quarter], &cubic(), 1.0e-9),
            Err(SymOpError::MissingInverse { index: 1 })
        );
        assert_eq!(
            validate_group(&[c2z()], &cubic(), 1.0e-9),
            Err(SymOpError::MissingIdentity)
        );
        assert_eq!(
            validate_group(&[], &cubic(), 1.0e-9),
            Err(SymOpError::EmptyGroup)
        );
    }

    #[test]
    fn lattice_validation_rejects_non_metric_rotation() {
        let shear = SymOp::new(
            Rotation::new(1, 1, 0, 0, 1, 0, 0, 0, 1),
            Translation::zeros(),
        )
        .unwrap();
        let err = validate_lattice_consistency(&[SymOp::identity(), shear], &cubic(), 1.0e-9)
            .unwrap_err();
        assert!(matches!(err, SymOpError::LatticeInconsistent { index: 1, .. }));
    }

    #[test]
    fn lattice_validation_accepts_metric_preserving_group() {
        let latt = Lattice::new(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 2.0]);
        assert_eq!(
            validate_lattice_consistency(&[SymOp::identity(), c2z()], &latt, 1.0e-9),
            Ok(())
        );
    }
}
