use std::fmt;

use nalgebra::{Matrix3, Vector3};
use symops::Rotation;

/// Lattice operation `(rotation, translation)` paired with a spin rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinSymmetryOperation {
    pub rotation: Rotation,
    pub translation: Vector3<f64>,
    /// Real orthogonal matrix acting on Cartesian moments.
    pub spin_rotation: Matrix3<f64>,
}

impl SpinSymmetryOperation {
    pub fn has_identity_spin(&self) -> bool {
        self.spin_rotation == Matrix3::identity()
    }
}

impl fmt::Display for SpinSymmetryOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let r = &self.rotation;
        let t = &self.translation;
        let s = &self.spin_rotation;

        for i in 0..3 {
            writeln!(
                f,
                "{:3} {:3} {:3}   {:12.8}   {:12.8} {:12.8} {:12.8}",
                r[(i, 0)],
                r[(i, 1)],
                r[(i, 2)],
                t[i],
                s[(i, 0)],
                s[(i, 1)],
                s[(i, 2)]
            )?;
        }

        Ok(())
    }
}
