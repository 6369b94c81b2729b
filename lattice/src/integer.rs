//! Exact arithmetic on 3x3 integer matrices.
//!
//! Inverses of integer matrices are handled through the adjugate,
//! `T^-1 = adj(T) / det(T)`, so every change of basis is either exact or
//! reported as non-integral.

use nalgebra::{Matrix3, Vector3};

use crate::LatticeError;

pub type IntMatrix3 = Matrix3<i32>;
pub type IntVector3 = Vector3<i32>;

pub fn determinant(m: &IntMatrix3) -> i64 {
    let m = m.map(i64::from);

    m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
        - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
        + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
}

/// Transposed cofactor matrix, `m * adj(m) = det(m) * I`.
pub fn adjugate(m: &IntMatrix3) -> Matrix3<i64> {
    let m = m.map(i64::from);
    let mut adj = Matrix3::<i64>::zeros();

    for row in 0..3 {
        for col in 0..3 {
            adj[(col, row)] = cofactor(&m, row, col);
        }
    }

    adj
}

fn cofactor(m: &Matrix3<i64>, row: usize, col: usize) -> i64 {
    let minor = minor_det(m, row, col);
    if (row + col) % 2 == 0 {
        minor
    } else {
        -minor
    }
}

fn minor_det(m: &Matrix3<i64>, row: usize, col: usize) -> i64 {
    let mut vals = [0_i64; 4];
    let mut idx = 0;
    for i in 0..3 {
        if i == row {
            continue;
        }
        for j in 0..3 {
            if j == col {
                continue;
            }
            vals[idx] = m[(i, j)];
            idx += 1;
        }
    }
    vals[0] * vals[3] - vals[1] * vals[2]
}

pub fn to_float(m: &IntMatrix3) -> Matrix3<f64> {
    m.map(f64::from)
}

/// Divides every entry by `divisor`, failing if any entry leaves a remainder.
pub fn exact_div(m: &Matrix3<i64>, divisor: i64) -> Result<IntMatrix3, LatticeError> {
    if divisor == 0 {
        return Err(LatticeError::Singular);
    }
    if m.iter().any(|x| x % divisor != 0) {
        return Err(LatticeError::NotIntegral { divisor });
    }
    Ok(m.map(|x| (x / divisor) as i32))
}

/// `lhs^-1 * rhs`, required to be an integer matrix.
pub fn left_divide(lhs: &IntMatrix3, rhs: &IntMatrix3) -> Result<IntMatrix3, LatticeError> {
    let det = determinant(lhs);
    exact_div(&(adjugate(lhs) * rhs.map(i64::from)), det)
}

/// `lhs^-1 * v`, required to be an integer vector.
pub fn left_divide_vector(lhs: &IntMatrix3, v: &IntVector3) -> Result<IntVector3, LatticeError> {
    let det = determinant(lhs);
    if det == 0 {
        return Err(LatticeError::Singular);
    }

    let product = adjugate(lhs) * v.map(i64::from);
    if product.iter().any(|x| x % det != 0) {
        return Err(LatticeError::NotIntegral { divisor: det });
    }
    Ok(product.map(|x| (x / det) as i32))
}

/// `tmat^-1 * rotation * tmat`: a rotation re-expressed in the basis spanned
/// by the columns of `tmat`.
pub fn conjugate(rotation: &IntMatrix3, tmat: &IntMatrix3) -> Result<IntMatrix3, LatticeError> {
    let det = determinant(tmat);
    let product = adjugate(tmat) * rotation.map(i64::from) * tmat.map(i64::from);
    exact_div(&product, det)
}

/// `tmat * rotation * tmat^-1`, the inverse change of basis of [`conjugate`].
pub fn conjugate_inverse(
    rotation: &IntMatrix3,
    tmat: &IntMatrix3,
) -> Result<IntMatrix3, LatticeError> {
    let det = determinant(tmat);
    let product = tmat.map(i64::from) * rotation.map(i64::from) * adjugate(tmat);
    exact_div(&product, det)
}

/// `tmat^-1 * v` in floating point, built from the exact adjugate.
pub fn inverse_apply(tmat: &IntMatrix3, v: &Vector3<f64>) -> Result<Vector3<f64>, LatticeError> {
    let det = determinant(tmat);
    if det == 0 {
        return Err(LatticeError::Singular);
    }
    Ok(adjugate(tmat).map(|x| x as f64) * v / det as f64)
}

/// Reduces an integer vector into the fundamental domain of the lattice
/// spanned by the columns of `tmat`.
///
/// The result `r` satisfies `v - r = tmat * n` for an integer `n`, and
/// `tmat^-1 * r` has entries in `[0, 1)`, so vectors of one coset share the
/// same representative.
pub fn reduce_to_fundamental_domain(
    tmat: &IntMatrix3,
    v: &IntVector3,
) -> Result<IntVector3, LatticeError> {
    let mut det = determinant(tmat);
    if det == 0 {
        return Err(LatticeError::Singular);
    }

    let v = v.map(i64::from);
    let mut coords = adjugate(tmat) * v;
    if det < 0 {
        det = -det;
        coords = -coords;
    }

    // floor(tmat^-1 * v), exactly
    let shift = coords.map(|x| x.div_euclid(det));
    let reduced = v - tmat.map(i64::from) * shift;

    Ok(reduced.map(|x| x as i32))
}

pub fn is_identity(m: &IntMatrix3) -> bool {
    *m == IntMatrix3::identity()
}
