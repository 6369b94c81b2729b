use lattice::{
    adjugate, column_hnf, conjugate_inverse, determinant, exact_div, to_float, IntMatrix3,
    IntVector3, Lattice,
};
use nalgebra::{DMatrix, Vector3};
use permutation::Permutation;
use symops::{detect_symmetry, normalize_fractional, DetectOptions, Rotation, Structure};
use tracing::debug;

use crate::SpinGroupError;

/// Space group of the crystal without moments, in a primitive cell.
#[derive(Debug, Clone)]
pub struct NonmagneticSymmetry {
    pub prim_lattice: Lattice,
    /// One operation per distinct rotation, in discovery order.
    pub prim_rotations: Vec<Rotation>,
    pub prim_translations: Vec<Vector3<f64>>,
    /// Site permutation of each operation on the input sites.
    pub prim_permutations: Vec<Permutation>,
    /// Pure translations of the input cell as primitive lattice vectors,
    /// the zero vector first.
    pub prim_centerings: Vec<IntVector3>,
    pub prim_centering_permutations: Vec<Permutation>,
    /// Primitive to input cell, `A_in = A_prim * transformation`.
    pub transformation: IntMatrix3,
}

/// Detects the nonmagnetic space group of a structure and expresses it in a
/// primitive cell.
///
/// With `N` pure translations `t_j` in the input cell, the columns of
/// `[N*I | N*t_1 ... N*t_N]` span `N` times the primitive lattice; the
/// transformation to the input cell is the inverse of that basis divided by `N`.
pub fn get_symmetry_with_cell(
    lattice: &Lattice,
    positions: &[Vector3<f64>],
    numbers: &[i32],
    options: DetectOptions,
) -> Result<NonmagneticSymmetry, SpinGroupError> {
    let structure = Structure {
        lattice: *lattice,
        positions: positions.to_vec(),
        numbers: numbers.to_vec(),
    };
    let detected = detect_symmetry(&structure, options)?;

    let centering_indices = detected.centering_indices();
    let n = centering_indices.len() as i64;

    let mut generators = DMatrix::<i64>::zeros(3, 3 + centering_indices.len());
    for i in 0..3 {
        generators[(i, i)] = n;
    }
    for (j, &idx) in centering_indices.iter().enumerate() {
        let t = detected.operations[idx].translation();
        for i in 0..3 {
            generators[(i, 3 + j)] = (t[i] * n as f64).round() as i64;
        }
    }

    let scaled_basis = column_hnf(&generators)?.leading_basis();
    let transformation = exact_div(&adjugate(&scaled_basis), n)?;

    let det = determinant(&transformation).abs();
    if det != n {
        return Err(SpinGroupError::CenteringCountMismatch {
            transformation: det,
            reduced: 1,
            centerings: centering_indices.len(),
        });
    }

    let prim_lattice = Lattice::from_matrix(lattice.as_matrix() * to_float(&scaled_basis) / n as f64);
    let tmat = to_float(&transformation);

    let mut prim_rotations = Vec::new();
    let mut prim_translations = Vec::new();
    let mut prim_permutations = Vec::new();
    let mut prim_centerings = Vec::new();
    let mut prim_centering_permutations = Vec::new();

    for (op, perm) in detected.operations.iter().zip(detected.permutations.iter()) {
        let translation = tmat * op.translation();

        if op.is_pure_translation() {
            prim_centerings.push(translation.map(|x| x.round() as i32));
            prim_centering_permutations.push(perm.clone());
        }

        let rotation = conjugate_inverse(op.rotation(), &transformation)?;
        if prim_rotations.contains(&rotation) {
            continue;
        }

        prim_rotations.push(rotation);
        prim_translations.push(normalize_fractional(&translation));
        prim_permutations.push(perm.clone());
    }

    debug!(
        n_rotations = prim_rotations.len(),
        n_centerings = prim_centerings.len(),
        "nonmagnetic symmetry in primitive cell"
    );

    Ok(NonmagneticSymmetry {
        prim_lattice,
        prim_rotations,
        prim_translations,
        prim_permutations,
        prim_centerings,
        prim_centering_permutations,
        transformation,
    })
}
