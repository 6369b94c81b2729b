use std::fmt;

use nalgebra::{Matrix3, SymmetricEigen, Vector3};
use tracing::trace;

use crate::max_moment_norm;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinOnlyGroupType {
    /// O(3)
    Nonmagnetic,
    /// ∞m, rotations about and mirrors containing the moment axis
    Collinear,
    /// m, the mirror of the moment plane
    Coplanar,
    /// 1
    Noncoplanar,
}

/// Spin rotations that fix every moment of a configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinOnlyGroup {
    kind: SpinOnlyGroupType,
    /// Moment direction for collinear, plane normal for coplanar.
    axis: Option<Vector3<f64>>,
    tol: f64,
}

impl SpinOnlyGroup {
    pub fn nonmagnetic(tol: f64) -> SpinOnlyGroup {
        SpinOnlyGroup {
            kind: SpinOnlyGroupType::Nonmagnetic,
            axis: None,
            tol,
        }
    }

    pub fn collinear(axis: Vector3<f64>, tol: f64) -> SpinOnlyGroup {
        SpinOnlyGroup {
            kind: SpinOnlyGroupType::Collinear,
            axis: Some(axis.normalize()),
            tol,
        }
    }

    pub fn coplanar(normal: Vector3<f64>, tol: f64) -> SpinOnlyGroup {
        SpinOnlyGroup {
            kind: SpinOnlyGroupType::Coplanar,
            axis: Some(normal.normalize()),
            tol,
        }
    }

    pub fn noncoplanar(tol: f64) -> SpinOnlyGroup {
        SpinOnlyGroup {
            kind: SpinOnlyGroupType::Noncoplanar,
            axis: None,
            tol,
        }
    }

    pub fn kind(&self) -> SpinOnlyGroupType {
        self.kind
    }

    pub fn axis(&self) -> Option<&Vector3<f64>> {
        self.axis.as_ref()
    }

    /// Whether the orthogonal matrix `spin_rotation` fixes every moment.
    pub fn contains(&self, spin_rotation: &Matrix3<f64>) -> bool {
        match (self.kind, self.axis) {
            (SpinOnlyGroupType::Nonmagnetic, _) => true,
            (SpinOnlyGroupType::Collinear, Some(axis)) => {
                (spin_rotation * axis - axis).norm() < self.tol
            }
            (SpinOnlyGroupType::Coplanar, Some(normal)) => {
                let (u, v) = in_plane_basis(&normal);
                (spin_rotation * u - u).norm() < self.tol
                    && (spin_rotation * v - v).norm() < self.tol
            }
            _ => (spin_rotation - Matrix3::identity()).norm() < self.tol,
        }
    }

    /// An improper element of the group, if any.
    pub fn improper_element(&self) -> Option<Matrix3<f64>> {
        match (self.kind, self.axis) {
            (SpinOnlyGroupType::Nonmagnetic, _) => Some(-Matrix3::identity()),
            (SpinOnlyGroupType::Collinear, Some(axis)) => Some(mirror(&in_plane_basis(&axis).0)),
            (SpinOnlyGroupType::Coplanar, Some(normal)) => Some(mirror(&normal)),
            _ => None,
        }
    }

    /// Representative of the coset `spin_rotation * G_so`.
    ///
    /// Members map to the identity. An improper matrix is turned proper by an
    /// improper element of the group when one exists; this does not change
    /// its action on the moments.
    pub fn canonicalize(&self, spin_rotation: &Matrix3<f64>) -> Matrix3<f64> {
        if self.contains(spin_rotation) {
            return Matrix3::identity();
        }

        if spin_rotation.determinant() < 0.0 {
            if let Some(z) = self.improper_element() {
                return spin_rotation * z;
            }
        }

        *spin_rotation
    }
}

impl fmt::Display for SpinOnlyGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.kind, self.axis) {
            (SpinOnlyGroupType::Collinear, Some(a)) => {
                write!(f, "collinear, axis ({:.6}, {:.6}, {:.6})", a.x, a.y, a.z)
            }
            (SpinOnlyGroupType::Coplanar, Some(n)) => {
                write!(f, "coplanar, normal ({:.6}, {:.6}, {:.6})", n.x, n.y, n.z)
            }
            (kind, _) => write!(f, "{:?}", kind),
        }
    }
}

/// Determines the spin-only group of `moments` (Cartesian).
pub fn get_spin_only_group(moments: &[Vector3<f64>], mag_symprec: f64) -> SpinOnlyGroup {
    if max_moment_norm(moments) < mag_symprec {
        return SpinOnlyGroup::nonmagnetic(mag_symprec);
    }

    let second_moment = moments
        .iter()
        .fold(Matrix3::zeros(), |acc, m| acc + m * m.transpose());

    let eigen = SymmetricEigen::new(second_moment);

    let parallel: Vector3<f64> = eigen.eigenvectors.column(eigen.eigenvalues.imax()).normalize();
    let residual_collinear = moments
        .iter()
        .map(|m| 2.0 * (m - parallel * m.dot(&parallel)).norm())
        .fold(0.0, f64::max);
    trace!(residual_collinear, "collinearity check");

    if residual_collinear < mag_symprec {
        return SpinOnlyGroup::collinear(parallel, mag_symprec);
    }

    let normal: Vector3<f64> = eigen.eigenvectors.column(eigen.eigenvalues.imin()).normalize();
    let residual_coplanar = moments
        .iter()
        .map(|m| 2.0 * m.dot(&normal).abs())
        .fold(0.0, f64::max);
    trace!(residual_coplanar, "coplanarity check");

    if residual_coplanar < mag_symprec {
        return SpinOnlyGroup::coplanar(normal, mag_symprec);
    }

    SpinOnlyGroup::noncoplanar(mag_symprec)
}

/// Reflection through the plane with unit normal `n`.
fn mirror(n: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::identity() - 2.0 * n * n.transpose()
}

/// Orthonormal pair spanning the plane perpendicular to the unit vector `n`.
fn in_plane_basis(n: &Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let seed = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
        Vector3::x()
    } else if n.y.abs() <= n.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };

    let u = (seed - n * seed.dot(n)).normalize();
    let v = n.cross(&u);
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MAG_SYMPREC: f64 = 1.0e-5;

    #[test]
    fn test_spin_only_group_types() {
        let nonmagnetic = vec![Vector3::zeros(), Vector3::zeros()];
        assert_eq!(
            get_spin_only_group(&nonmagnetic, MAG_SYMPREC).kind(),
            SpinOnlyGroupType::Nonmagnetic
        );

        let collinear = vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, -2.0)];
        let so = get_spin_only_group(&collinear, MAG_SYMPREC);
        assert_eq!(so.kind(), SpinOnlyGroupType::Collinear);
        assert_relative_eq!(so.axis().unwrap().cross(&Vector3::z()).norm(), 0.0, epsilon = 1.0e-10);

        let coplanar = vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 1.0, 0.0)];
        let so = get_spin_only_group(&coplanar, MAG_SYMPREC);
        assert_eq!(so.kind(), SpinOnlyGroupType::Coplanar);
        assert_relative_eq!(so.axis().unwrap().cross(&Vector3::x()).norm(), 0.0, epsilon = 1.0e-10);

        let noncoplanar = vec![Vector3::x(), Vector3::y(), Vector3::z()];
        assert_eq!(
            get_spin_only_group(&noncoplanar, MAG_SYMPREC).kind(),
            SpinOnlyGroupType::Noncoplanar
        );
    }

    #[test]
    fn test_membership() {
        let c2z = Matrix3::new(-1.0, 0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0, 1.0);
        let mx = Matrix3::new(-1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0);

        let collinear = SpinOnlyGroup::collinear(Vector3::z(), MAG_SYMPREC);
        assert!(collinear.contains(&c2z));
        assert!(collinear.contains(&mx));
        assert!(!collinear.contains(&-Matrix3::identity()));

        let coplanar = SpinOnlyGroup::coplanar(Vector3::x(), MAG_SYMPREC);
        assert!(coplanar.contains(&mx));
        assert!(!coplanar.contains(&c2z));

        let noncoplanar = SpinOnlyGroup::noncoplanar(MAG_SYMPREC);
        assert!(noncoplanar.contains(&Matrix3::identity()));
        assert!(!noncoplanar.contains(&mx));

        assert!(SpinOnlyGroup::nonmagnetic(MAG_SYMPREC).contains(&c2z));
    }

    #[test]
    fn test_canonicalize() {
        let collinear = SpinOnlyGroup::collinear(Vector3::z(), MAG_SYMPREC);

        // members collapse onto the identity
        let c4z = Matrix3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(collinear.canonicalize(&c4z), Matrix3::identity());

        // inversion acts on the moment axis like a proper twofold rotation
        let canon = collinear.canonicalize(&-Matrix3::identity());
        assert_relative_eq!(canon.determinant(), 1.0, epsilon = 1.0e-10);
        assert_relative_eq!(canon * Vector3::z(), -Vector3::z(), epsilon = 1.0e-10);
        assert_relative_eq!(canon.trace(), -1.0, epsilon = 1.0e-10);

        // no improper element in the trivial spin-only group
        let noncoplanar = SpinOnlyGroup::noncoplanar(MAG_SYMPREC);
        let inversion = -Matrix3::identity();
        assert_eq!(noncoplanar.canonicalize(&inversion), inversion);

        assert_eq!(
            SpinOnlyGroup::nonmagnetic(MAG_SYMPREC).canonicalize(&inversion),
            Matrix3::identity()
        );
    }

    #[test]
    fn test_in_plane_basis_is_orthonormal() {
        for n in [
            Vector3::new(1.0, 2.0, 3.0).normalize(),
            Vector3::z(),
            Vector3::new(-1.0, 0.0, 1.0).normalize(),
        ] {
            let (u, v) = in_plane_basis(&n);
            assert_relative_eq!(u.dot(&n), 0.0, epsilon = 1.0e-12);
            assert_relative_eq!(v.dot(&n), 0.0, epsilon = 1.0e-12);
            assert_relative_eq!(u.dot(&v), 0.0, epsilon = 1.0e-12);
            assert_relative_eq!(v.norm(), 1.0, epsilon = 1.0e-12);
        }
    }
}
