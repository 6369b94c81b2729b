//! Direct lattice and exact integer lattice arithmetic.
//!
//! Basis vectors are stored as the columns of a 3x3 matrix `A`, so a
//! fractional coordinate `x` maps to the Cartesian point `A * x` and a change
//! of basis by an integer matrix `T` gives the new basis `A * T`.

use nalgebra::{Matrix3, Vector3};

use std::fmt;

mod hnf;
mod integer;

pub use hnf::*;
pub use integer::*;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LatticeError {
    #[error("integer matrix is singular")]
    Singular,
    #[error("exact division by {divisor} left a remainder")]
    NotIntegral { divisor: i64 },
    #[error("matrix with {rows} rows does not have full row rank")]
    RankDeficient { rows: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    data: Matrix3<f64>,
}

impl Lattice {
    pub fn new(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> Lattice {
        let data = Matrix3::from_columns(&[
            Vector3::from_column_slice(a),
            Vector3::from_column_slice(b),
            Vector3::from_column_slice(c),
        ]);

        Lattice { data }
    }

    pub fn from_matrix(data: Matrix3<f64>) -> Lattice {
        Lattice { data }
    }

    pub fn as_matrix(&self) -> &Matrix3<f64> {
        &self.data
    }

    // G = A^T * A
    pub fn get_metric_tensor(&self) -> Matrix3<f64> {
        self.data.transpose() * self.data
    }

    // ( a x b ) . c
    pub fn volume(&self) -> f64 {
        self.data.determinant()
    }

    pub fn get_vector_a(&self) -> Vector3<f64> {
        self.data.column(0).into_owned()
    }

    pub fn get_vector_b(&self) -> Vector3<f64> {
        self.data.column(1).into_owned()
    }

    pub fn get_vector_c(&self) -> Vector3<f64> {
        self.data.column(2).into_owned()
    }

    pub fn frac_to_cart(&self, pos_f: &Vector3<f64>) -> Vector3<f64> {
        self.data * pos_f
    }

    pub fn cart_to_frac(&self, pos_c: &Vector3<f64>) -> Option<Vector3<f64>> {
        self.data.try_inverse().map(|inv| inv * pos_c)
    }

    /// Lattice spanned by the columns of `A * tmat`.
    pub fn transformed(&self, tmat: &IntMatrix3) -> Lattice {
        Lattice {
            data: self.data * to_float(tmat),
        }
    }

    /// Cartesian length of the shortest periodic image of a fractional
    /// displacement.
    pub fn periodic_distance(&self, diff_f: &Vector3<f64>) -> f64 {
        let wrapped = diff_f.map(|x| x - x.round());
        (self.data * wrapped).norm()
    }

    pub fn is_overlap(&self, diff_f: &Vector3<f64>, symprec: f64) -> bool {
        self.periodic_distance(diff_f) < symprec
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let a = self.get_vector_a();
        let b = self.get_vector_b();
        let c = self.get_vector_c();

        write!(f,
               "{}\n{:25.16}\t{:25.16}\t{:25.16}\n{:25.16}\t{:25.16}\t{:25.16}\n{:25.16}\t{:25.16}\t{:25.16}", "Lattice",
               a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z)
    }
}

#[test]
fn test_lattice() {
    use approx::assert_relative_eq;

    let latt = Lattice::new(&[1.0, 0.1, 0.0], &[0.0, 1.0, 0.2], &[0.0, 0.3, 1.0]);

    println!("{}", latt);

    assert_relative_eq!(latt.get_vector_b(), Vector3::new(0.0, 1.0, 0.2));
    assert_relative_eq!(
        latt.volume(),
        latt.get_vector_a()
            .cross(&latt.get_vector_b())
            .dot(&latt.get_vector_c()),
        epsilon = 1.0e-12
    );

    let metric = latt.get_metric_tensor();
    assert_relative_eq!(metric[(0, 1)], latt.get_vector_a().dot(&latt.get_vector_b()));

    let pos_f = Vector3::new(0.2, 0.3, 0.4);
    let pos_c = latt.frac_to_cart(&pos_f);
    let pos_f_2 = latt.cart_to_frac(&pos_c).unwrap();

    assert_relative_eq!(pos_f, pos_f_2, epsilon = 1.0e-12);
}

#[test]
fn test_periodic_overlap() {
    let latt = Lattice::new(&[4.0, 0.0, 0.0], &[0.0, 4.0, 0.0], &[0.0, 0.0, 4.0]);

    assert!(latt.is_overlap(&Vector3::new(0.999999, 0.0, -1.0), 1.0e-4));
    assert!(!latt.is_overlap(&Vector3::new(0.5, 0.0, 0.0), 1.0e-4));
    assert!((latt.periodic_distance(&Vector3::new(0.75, 0.0, 0.0)) - 1.0).abs() < 1.0e-12);

    let doubled = latt.transformed(&IntMatrix3::new(2, 0, 0, 0, 1, 0, 0, 0, 1));
    assert!((doubled.volume() - 2.0 * latt.volume()).abs() < 1.0e-9);
}
