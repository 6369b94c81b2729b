//! Column-style Hermite Normal Form.
//!
//! For an integer matrix `A` with `r` rows and full row rank, finds a
//! unimodular `U` with `A * U = [H | 0]`, where `H` is `r x r` lower
//! triangular, `h_ii > 0`, and `0 <= h_ij < h_ii` for `j < i`. The columns of
//! `H` are a basis of the lattice generated by the columns of `A`.

use nalgebra::DMatrix;

use crate::{IntMatrix3, LatticeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HermiteNormalForm {
    /// `A * U`, with every column past the first `r` equal to zero.
    pub h: DMatrix<i64>,
    /// Unimodular column transform `U`.
    pub transform: DMatrix<i64>,
}

impl HermiteNormalForm {
    /// Leading 3x3 block of a three-row HNF.
    pub fn leading_basis(&self) -> IntMatrix3 {
        IntMatrix3::from_fn(|i, j| self.h[(i, j)] as i32)
    }
}

pub fn column_hnf(matrix: &DMatrix<i64>) -> Result<HermiteNormalForm, LatticeError> {
    let (nrows, ncols) = matrix.shape();
    if ncols < nrows {
        return Err(LatticeError::RankDeficient { rows: nrows });
    }

    let mut h = matrix.clone();
    let mut u = DMatrix::<i64>::identity(ncols, ncols);

    for i in 0..nrows {
        // Clear row i to the right of the diagonal.
        for j in (i + 1)..ncols {
            let b = h[(i, j)];
            if b == 0 {
                continue;
            }
            let a = h[(i, i)];
            let (g, x, y) = extended_gcd(a, b);
            let coeffs = [[x, -b / g], [y, a / g]];
            combine_columns(&mut h, i, j, coeffs);
            combine_columns(&mut u, i, j, coeffs);
        }

        if h[(i, i)] == 0 {
            return Err(LatticeError::RankDeficient { rows: nrows });
        }
        if h[(i, i)] < 0 {
            negate_column(&mut h, i);
            negate_column(&mut u, i);
        }

        let pivot = h[(i, i)];
        for j in 0..i {
            let q = h[(i, j)].div_euclid(pivot);
            if q != 0 {
                subtract_column(&mut h, j, i, q);
                subtract_column(&mut u, j, i, q);
            }
        }
    }

    Ok(HermiteNormalForm { h, transform: u })
}

/// Returns `(g, x, y)` with `a*x + b*y = g = gcd(a, b) >= 0`.
fn extended_gcd(a: i64, b: i64) -> (i64, i64, i64) {
    let (mut old_r, mut r) = (a, b);
    let (mut old_s, mut s) = (1, 0);
    let (mut old_t, mut t) = (0, 1);

    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
        (old_t, t) = (t, old_t - q * t);
    }

    if old_r < 0 {
        (-old_r, -old_s, -old_t)
    } else {
        (old_r, old_s, old_t)
    }
}

// col_i <- c00 * col_i + c10 * col_j
// col_j <- c01 * col_i + c11 * col_j
fn combine_columns(m: &mut DMatrix<i64>, i: usize, j: usize, coeffs: [[i64; 2]; 2]) {
    for row in 0..m.nrows() {
        let (ci, cj) = (m[(row, i)], m[(row, j)]);
        m[(row, i)] = coeffs[0][0] * ci + coeffs[1][0] * cj;
        m[(row, j)] = coeffs[0][1] * ci + coeffs[1][1] * cj;
    }
}

fn negate_column(m: &mut DMatrix<i64>, col: usize) {
    for row in 0..m.nrows() {
        m[(row, col)] = -m[(row, col)];
    }
}

// col_dst <- col_dst - q * col_src
fn subtract_column(m: &mut DMatrix<i64>, dst: usize, src: usize, q: i64) {
    for row in 0..m.nrows() {
        m[(row, dst)] -= q * m[(row, src)];
    }
}
