//! Crystallographic point-group identification.
//!
//! A set of integer rotations is identified by how many elements it holds of
//! each rotation type. The ten counts determine the geometric crystal class
//! uniquely among the 32 crystallographic point groups.

use lattice::determinant;

use crate::Rotation;

/// Rotation type in Hermann–Mauguin notation; negative values are rotoinversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RotationType {
    RotoInversion6,
    RotoInversion4,
    RotoInversion3,
    Mirror,
    Inversion,
    Identity,
    Rotation2,
    Rotation3,
    Rotation4,
    Rotation6,
}

impl RotationType {
    pub const ALL: [RotationType; 10] = [
        RotationType::RotoInversion6,
        RotationType::RotoInversion4,
        RotationType::RotoInversion3,
        RotationType::Mirror,
        RotationType::Inversion,
        RotationType::Identity,
        RotationType::Rotation2,
        RotationType::Rotation3,
        RotationType::Rotation4,
        RotationType::Rotation6,
    ];

    /// Multiplicative order of an element of this type.
    pub fn order(self) -> u8 {
        match self {
            RotationType::Identity => 1,
            RotationType::Inversion | RotationType::Mirror | RotationType::Rotation2 => 2,
            RotationType::Rotation3 => 3,
            RotationType::RotoInversion4 | RotationType::Rotation4 => 4,
            RotationType::RotoInversion3 | RotationType::RotoInversion6 | RotationType::Rotation6 => 6,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("no symmetry operations provided")]
    EmptyOperations,
    #[error("matrix with determinant {det} and trace {trace} is not a crystallographic rotation")]
    NotCrystallographic { det: i64, trace: i32 },
    #[error("rotation-type counts {counts:?} match no crystallographic point group")]
    UnknownPointGroup { counts: [usize; 10] },
}

pub fn rotation_type(rotation: &Rotation) -> Result<RotationType, ClassificationError> {
    let det = determinant(rotation);
    let trace = rotation.trace();

    let rtype = match (det, trace) {
        (1, 3) => RotationType::Identity,
        (1, -1) => RotationType::Rotation2,
        (1, 0) => RotationType::Rotation3,
        (1, 1) => RotationType::Rotation4,
        (1, 2) => RotationType::Rotation6,
        (-1, -3) => RotationType::Inversion,
        (-1, 1) => RotationType::Mirror,
        (-1, 0) => RotationType::RotoInversion3,
        (-1, -1) => RotationType::RotoInversion4,
        (-1, -2) => RotationType::RotoInversion6,
        _ => return Err(ClassificationError::NotCrystallographic { det, trace }),
    };

    Ok(rtype)
}

/// Number of elements of each rotation type, in the order of [`RotationType::ALL`].
pub fn rotation_type_counts(rotations: &[Rotation]) -> Result<[usize; 10], ClassificationError> {
    let mut counts = [0; 10];
    for rotation in rotations.iter() {
        counts[rotation_type(rotation)?.index()] += 1;
    }
    Ok(counts)
}

// counts of (-6, -4, -3, -2, -1, 1, 2, 3, 4, 6)
const POINT_GROUP_COUNTS: [(&str, [usize; 10]); 32] = [
    ("1", [0, 0, 0, 0, 0, 1, 0, 0, 0, 0]),
    ("-1", [0, 0, 0, 0, 1, 1, 0, 0, 0, 0]),
    ("2", [0, 0, 0, 0, 0, 1, 1, 0, 0, 0]),
    ("m", [0, 0, 0, 1, 0, 1, 0, 0, 0, 0]),
    ("2/m", [0, 0, 0, 1, 1, 1, 1, 0, 0, 0]),
    ("222", [0, 0, 0, 0, 0, 1, 3, 0, 0, 0]),
    ("mm2", [0, 0, 0, 2, 0, 1, 1, 0, 0, 0]),
    ("mmm", [0, 0, 0, 3, 1, 1, 3, 0, 0, 0]),
    ("4", [0, 0, 0, 0, 0, 1, 1, 0, 2, 0]),
    ("-4", [0, 2, 0, 0, 0, 1, 1, 0, 0, 0]),
    ("4/m", [0, 2, 0, 1, 1, 1, 1, 0, 2, 0]),
    ("422", [0, 0, 0, 0, 0, 1, 5, 0, 2, 0]),
    ("4mm", [0, 0, 0, 4, 0, 1, 1, 0, 2, 0]),
    ("-42m", [0, 2, 0, 2, 0, 1, 3, 0, 0, 0]),
    ("4/mmm", [0, 2, 0, 5, 1, 1, 5, 0, 2, 0]),
    ("3", [0, 0, 0, 0, 0, 1, 0, 2, 0, 0]),
    ("-3", [0, 0, 2, 0, 1, 1, 0, 2, 0, 0]),
    ("32", [0, 0, 0, 0, 0, 1, 3, 2, 0, 0]),
    ("3m", [0, 0, 0, 3, 0, 1, 0, 2, 0, 0]),
    ("-3m", [0, 0, 2, 3, 1, 1, 3, 2, 0, 0]),
    ("6", [0, 0, 0, 0, 0, 1, 1, 2, 0, 2]),
    ("-6", [2, 0, 0, 1, 0, 1, 0, 2, 0, 0]),
    ("6/m", [2, 0, 2, 1, 1, 1, 1, 2, 0, 2]),
    ("622", [0, 0, 0, 0, 0, 1, 7, 2, 0, 2]),
    ("6mm", [0, 0, 0, 6, 0, 1, 1, 2, 0, 2]),
    ("-6m2", [2, 0, 0, 4, 0, 1, 3, 2, 0, 0]),
    ("6/mmm", [2, 0, 2, 7, 1, 1, 7, 2, 0, 2]),
    ("23", [0, 0, 0, 0, 0, 1, 3, 8, 0, 0]),
    ("m-3", [0, 0, 8, 3, 1, 1, 3, 8, 0, 0]),
    ("432", [0, 0, 0, 0, 0, 1, 9, 8, 6, 0]),
    ("-43m", [0, 6, 0, 6, 0, 1, 3, 8, 0, 0]),
    ("m-3m", [0, 6, 8, 9, 1, 1, 9, 8, 6, 0]),
];

/// All 32 point-group symbols in the order of International Tables.
pub fn point_group_symbols() -> impl Iterator<Item = &'static str> {
    POINT_GROUP_COUNTS.iter().map(|(symbol, _)| *symbol)
}

/// Hermann–Mauguin symbol of the point group formed by `rotations`.
pub fn point_group_symbol(rotations: &[Rotation]) -> Result<&'static str, ClassificationError> {
    if rotations.is_empty() {
        return Err(ClassificationError::EmptyOperations);
    }

    let counts = rotation_type_counts(rotations)?;

    POINT_GROUP_COUNTS
        .iter()
        .find(|(_, table)| *table == counts)
        .map(|(symbol, _)| *symbol)
        .ok_or(ClassificationError::UnknownPointGroup { counts })
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use crate::detect::{detect_symmetry, DetectOptions, Structure};
    use lattice::Lattice;

    use super::*;

    #[test]
    fn classify_trivial_groups() {
        let identity = Rotation::identity();
        assert_eq!(point_group_symbol(&[identity]), Ok("1"));
        assert_eq!(point_group_symbol(&[identity, -identity]), Ok("-1"));
        assert_eq!(
            point_group_symbol(&[]),
            Err(ClassificationError::EmptyOperations)
        );
    }

    #[test]
    fn rotation_types_from_trace() {
        let c4z = Rotation::new(0, -1, 0, 1, 0, 0, 0, 0, 1);
        let c3 = Rotation::new(0, 0, 1, 1, 0, 0, 0, 1, 0);
        let mz = Rotation::new(1, 0, 0, 0, 1, 0, 0, 0, -1);

        assert_eq!(rotation_type(&c4z), Ok(RotationType::Rotation4));
        assert_eq!(rotation_type(&(-c4z)), Ok(RotationType::RotoInversion4));
        assert_eq!(rotation_type(&c3), Ok(RotationType::Rotation3));
        assert_eq!(rotation_type(&(-c3)), Ok(RotationType::RotoInversion3));
        assert_eq!(rotation_type(&mz), Ok(RotationType::Mirror));
        assert_eq!(RotationType::RotoInversion3.order(), 6);

        let shear = Rotation::new(1, 1, 0, 0, 1, 0, 0, 0, 1);
        assert_eq!(
            rotation_type(&(shear * 2)),
            Err(ClassificationError::NotCrystallographic { det: 8, trace: 6 })
        );
    }

    #[test]
    fn counts_table_is_consistent() {
        // group orders of the 32 classes
        let orders = [
            1, 2, 2, 2, 4, 4, 4, 8, 4, 4, 8, 8, 8, 8, 16, 3, 6, 6, 6, 12, 6, 6, 12, 12, 12, 12,
            24, 12, 24, 24, 24, 48,
        ];
        for ((_, counts), order) in POINT_GROUP_COUNTS.iter().zip(orders.iter()) {
            assert_eq!(counts.iter().sum::<usize>(), *order);
        }
        assert_eq!(point_group_symbols().count(), 32);
    }

    #[test]
    fn unknown_combination_is_reported() {
        let c4z = Rotation::new(0, -1, 0, 1, 0, 0, 0, 0, 1);
        let err = point_group_symbol(&[Rotation::identity(), c4z]).unwrap_err();
        assert!(matches!(err, ClassificationError::UnknownPointGroup { .. }));
    }

    #[test]
    fn classify_cubic_detector_output() {
        let structure = Structure {
            lattice: Lattice::new(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.0]),
            positions: vec![Vector3::zeros()],
            numbers: vec![1],
        };
        let detected = detect_symmetry(&structure, DetectOptions::default()).unwrap();
        let rotations: Vec<Rotation> = detected.operations.iter().map(|op| *op.rotation()).collect();
        assert_eq!(point_group_symbol(&rotations), Ok("m-3m"));
    }

    #[test]
    fn classify_tetragonal_detector_output() {
        let structure = Structure {
            lattice: Lattice::new(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0], &[0.0, 0.0, 1.7]),
            positions: vec![Vector3::zeros()],
            numbers: vec![1],
        };
        let detected = detect_symmetry(&structure, DetectOptions::default()).unwrap();
        let rotations: Vec<Rotation> = detected.operations.iter().map(|op| *op.rotation()).collect();
        assert_eq!(point_group_symbol(&rotations), Ok("4/mmm"));
    }
}
