//! Symmetry-operation detection from a crystal structure.
//!
//! 1. Enumerate integer rotations with entries in `{-1, 0, 1}` and keep those
//!    that preserve the metric tensor within tolerance.
//! 2. For each rotation, seed candidate translations from one anchor site.
//! 3. Verify a species-preserving one-to-one site mapping for each `(R, t)`;
//!    the mapping is kept as the operation's site permutation.
//! 4. Deduplicate, sort deterministically and optionally validate the group.

use std::cmp::Ordering;

use itertools::Itertools;
use lattice::{determinant, to_float, Lattice};
use nalgebra::Vector3;
use permutation::{match_sites, Permutation};
use tracing::{debug, trace};

use crate::{
    normalize_fractional, sym_op_approx_eq, validate_group, validate_lattice_consistency,
    Rotation, SymOp, SymOpError,
};

#[derive(Clone, Debug)]
pub struct Structure {
    pub lattice: Lattice,
    /// Fractional coordinates; values outside `[0,1)` are allowed.
    pub positions: Vec<Vector3<f64>>,
    /// Species labels aligned with positions.
    pub numbers: Vec<i32>,
}

#[derive(Clone, Copy, Debug)]
pub struct DetectOptions {
    /// Cartesian distance below which two sites are considered the same.
    pub symprec: f64,
    /// Lattice-metric invariance tolerance for candidate rotations.
    ///
    /// Candidate `R` is accepted when `R^T G R ≈ G` under this tolerance.
    pub metric_tol: f64,
    /// Validate the resulting set as a closed group.
    pub validate_group: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            symprec: 1.0e-5,
            metric_tol: 1.0e-5,
            validate_group: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DetectedSymmetry {
    /// Identity rotation first, pure translations in ascending order.
    pub operations: Vec<SymOp>,
    /// Site permutation induced by each operation.
    pub permutations: Vec<Permutation>,
}

impl DetectedSymmetry {
    /// Indices of the pure translations, the zero translation first.
    pub fn centering_indices(&self) -> Vec<usize> {
        self.operations
            .iter()
            .positions(|op| op.is_pure_translation())
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DetectionError {
    #[error("structure has no atoms")]
    EmptyStructure,
    #[error("mismatched inputs: {positions} positions but {numbers} atom types")]
    MismatchedInputs { positions: usize, numbers: usize },
    #[error("tolerances must be positive")]
    NonPositiveTolerance,
    #[error("lattice is singular")]
    SingularLattice,
    #[error("failed to detect any symmetry operation with current candidate set")]
    NoOperationsDetected,
    #[error("invalid symmetry operation: {0}")]
    InvalidOperation(SymOpError),
    #[error("detected operations failed lattice validation: {0}")]
    LatticeValidationFailed(SymOpError),
    #[error("detected operations failed group validation: {0}")]
    GroupValidationFailed(SymOpError),
}

/// Detects the space-group operations of `structure` with their site
/// permutations.
pub fn detect_symmetry(
    structure: &Structure,
    options: DetectOptions,
) -> Result<DetectedSymmetry, DetectionError> {
    if structure.positions.is_empty() {
        return Err(DetectionError::EmptyStructure);
    }
    if structure.positions.len() != structure.numbers.len() {
        return Err(DetectionError::MismatchedInputs {
            positions: structure.positions.len(),
            numbers: structure.numbers.len(),
        });
    }
    if options.symprec <= 0.0 || options.metric_tol <= 0.0 {
        return Err(DetectionError::NonPositiveTolerance);
    }
    if structure.lattice.volume().abs() < f64::EPSILON {
        return Err(DetectionError::SingularLattice);
    }

    let lattice = &structure.lattice;
    let positions: Vec<Vector3<f64>> = structure.positions.iter().map(normalize_fractional).collect();
    let numbers = &structure.numbers;

    let rotations = generate_rotation_candidates(lattice, options.metric_tol);

    let anchor = anchor_site(numbers);

    let mut operations: Vec<SymOp> = Vec::new();
    let mut permutations = Vec::new();

    for rotation in rotations.iter() {
        let anchor_rot = to_float(rotation) * positions[anchor];

        for (j, target) in positions.iter().enumerate() {
            if numbers[j] != numbers[anchor] {
                continue;
            }

            let op = SymOp::new(*rotation, target - anchor_rot)
                .map_err(DetectionError::InvalidOperation)?;

            if operations
                .iter()
                .any(|existing| sym_op_approx_eq(existing, &op, lattice, options.symprec))
            {
                continue;
            }

            match match_sites(
                lattice,
                &positions,
                numbers,
                op.rotation(),
                op.translation(),
                options.symprec,
            ) {
                Some(perm) => {
                    operations.push(op);
                    permutations.push(perm);
                }
                None => trace!(?rotation, site = j, "translation candidate rejected"),
            }
        }
    }

    if operations.is_empty() {
        return Err(DetectionError::NoOperationsDetected);
    }

    let (operations, permutations) = canonical_sort_ops(operations, permutations);

    validate_lattice_consistency(&operations, lattice, options.metric_tol)
        .map_err(DetectionError::LatticeValidationFailed)?;

    if options.validate_group {
        validate_group(&operations, lattice, options.symprec)
            .map_err(DetectionError::GroupValidationFailed)?;
    }

    debug!(
        n_operations = operations.len(),
        candidate_rotations = rotations.len(),
        "detected space-group operations"
    );

    Ok(DetectedSymmetry {
        operations,
        permutations,
    })
}

/// First site of the least populated species.
fn anchor_site(numbers: &[i32]) -> usize {
    let counts = numbers.iter().counts();

    numbers
        .iter()
        .position_min_by_key(|n| counts[n])
        .unwrap_or(0)
}

/// Integer rotations with entries in `{-1, 0, 1}` that preserve the metric.
fn generate_rotation_candidates(lattice: &Lattice, tol: f64) -> Vec<Rotation> {
    let mut out = Vec::new();

    for code in 0..3_usize.pow(9) {
        let mut x = code;
        let mut vals = [0_i32; 9];
        for v in vals.iter_mut() {
            *v = (x % 3) as i32 - 1;
            x /= 3;
        }

        let rotation = Rotation::from_row_slice(&vals);
        let det = determinant(&rotation);
        if det != 1 && det != -1 {
            continue;
        }
        if crate::rotation_metric_deviation(&rotation, lattice) <= tol {
            out.push(rotation);
        }
    }

    out.sort_by(cmp_rotation);
    out
}

/// Identity rotation first, then rotations lexicographically, then
/// translations lexicographically.
fn canonical_sort_ops(
    operations: Vec<SymOp>,
    permutations: Vec<Permutation>,
) -> (Vec<SymOp>, Vec<Permutation>) {
    operations
        .into_iter()
        .zip(permutations)
        .sorted_by(|(lhs, _), (rhs, _)| {
            rhs.is_pure_translation()
                .cmp(&lhs.is_pure_translation())
                .then_with(|| cmp_rotation(lhs.rotation(), rhs.rotation()))
                .then_with(|| cmp_translation(lhs.translation(), rhs.translation()))
        })
        .unzip()
}

/// Lexicographic compare for integer rotation matrices in row-major order.
pub fn cmp_rotation(lhs: &Rotation, rhs: &Rotation) -> Ordering {
    lhs.transpose().as_slice().cmp(rhs.transpose().as_slice())
}

fn cmp_translation(lhs: &Vector3<f64>, rhs: &Vector3<f64>) -> Ordering {
    for i in 0..3 {
        match lhs[i].partial_cmp(&rhs[i]) {
            Some(Ordering::Equal) => continue,
            Some(ord) => return ord,
            None => return Ordering::Equal,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_cubic() -> Structure {
        Structure {
            lattice: Lattice::new(&[3.0, 0.0, 0.0], &[0.0, 3.0, 0.0], &[0.0, 0.0, 3.0]),
            positions: vec![Vector3::zeros()],
            numbers: vec![1],
        }
    }

    #[test]
    fn detects_full_cubic_group() {
        let sym = detect_symmetry(&simple_cubic(), DetectOptions::default()).unwrap();

        assert_eq!(sym.operations.len(), 48);
        assert_eq!(sym.permutations.len(), 48);
        assert_eq!(sym.operations[0], SymOp::identity());
        assert_eq!(sym.centering_indices(), vec![0]);
    }

    #[test]
    fn detects_body_centering() {
        let mut structure = simple_cubic();
        structure.positions.push(Vector3::new(0.5, 0.5, 0.5));
        structure.numbers.push(1);

        let sym = detect_symmetry(&structure, DetectOptions::default()).unwrap();

        assert_eq!(sym.operations.len(), 96);
        let centerings = sym.centering_indices();
        assert_eq!(centerings, vec![0, 1]);
        assert_eq!(
            *sym.operations[1].translation(),
            Vector3::new(0.5, 0.5, 0.5)
        );
        assert_eq!(sym.permutations[1].as_slice(), &[1, 0]);
    }

    #[test]
    fn distinct_species_break_centering() {
        let mut structure = simple_cubic();
        structure.positions.push(Vector3::new(0.5, 0.5, 0.5));
        structure.numbers.push(2);

        let sym = detect_symmetry(&structure, DetectOptions::default()).unwrap();
        assert_eq!(sym.operations.len(), 48);
        assert!(sym.permutations.iter().all(|p| p.is_identity()));
    }

    #[test]
    fn rejects_bad_input() {
        let mut structure = simple_cubic();
        structure.numbers.push(2);
        assert_eq!(
            detect_symmetry(&structure, DetectOptions::default()).unwrap_err(),
            DetectionError::MismatchedInputs {
                positions: 1,
                numbers: 2
            }
        );

        let options = DetectOptions {
            symprec: 0.0,
            ..DetectOptions::default()
        };
        assert_eq!(
            detect_symmetry(&simple_cubic(), options).unwrap_err(),
            DetectionError::NonPositiveTolerance
        );
    }

    #[test]
    fn rotation_order_is_lexicographic() {
        let a = Rotation::new(-1, 0, 0, 0, 1, 0, 0, 0, 1);
        let b = Rotation::new(0, 1, 0, 1, 0, 0, 0, 0, 1);
        assert_eq!(cmp_rotation(&a, &b), Ordering::Less);
        assert_eq!(cmp_rotation(&b, &b), Ordering::Equal);
    }
}
