use lattice::{to_float, IntMatrix3, Lattice};
use nalgebra::Vector3;
use tracing::debug;

use crate::Permutation;

/// A rigid operation together with the site permutation it induces.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedOperation {
    pub rotation: IntMatrix3,
    pub translation: Vector3<f64>,
    pub permutation: Permutation,
}

/// Finds the permutation induced by `(rotation, translation)` on the sites.
///
/// Sites are scanned in input order and each claims the first unclaimed site
/// of the same species whose periodic image lies strictly closer than
/// `symprec` (Cartesian). Returns `None` if some site has no partner.
pub fn match_sites(
    lattice: &Lattice,
    positions: &[Vector3<f64>],
    numbers: &[i32],
    rotation: &IntMatrix3,
    translation: &Vector3<f64>,
    symprec: f64,
) -> Option<Permutation> {
    let rot = to_float(rotation);
    let mut claimed = vec![false; positions.len()];
    let mut map = Vec::with_capacity(positions.len());

    for (i, pos) in positions.iter().enumerate() {
        let mapped = rot * pos + translation;

        let found = (0..positions.len()).find(|&j| {
            !claimed[j]
                && numbers[j] == numbers[i]
                && lattice.is_overlap(&(positions[j] - mapped), symprec)
        })?;

        claimed[found] = true;
        map.push(found);
    }

    // every site claimed exactly once
    Some(Permutation { map })
}

/// Site permutations of a list of operations.
///
/// Operations for which some site finds no partner are left out of the
/// result; input order is otherwise preserved.
pub fn get_symmetry_permutations(
    lattice: &Lattice,
    positions: &[Vector3<f64>],
    numbers: &[i32],
    rotations: &[IntMatrix3],
    translations: &[Vector3<f64>],
    symprec: f64,
) -> Vec<MatchedOperation> {
    assert_eq!(positions.len(), numbers.len());
    assert_eq!(rotations.len(), translations.len());

    let mut matched = Vec::with_capacity(rotations.len());

    for (rotation, translation) in rotations.iter().zip(translations.iter()) {
        match match_sites(lattice, positions, numbers, rotation, translation, symprec) {
            Some(permutation) => matched.push(MatchedOperation {
                rotation: *rotation,
                translation: *translation,
                permutation,
            }),
            None => debug!(
                ?rotation,
                ?translation,
                "operation has no site permutation, dropped"
            ),
        }
    }

    matched
}
