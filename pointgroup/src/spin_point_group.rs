use std::fmt;

use itertools::Itertools;
use symops::Rotation;

use crate::{
    generator_indices, traverse_spin_operations, PointGroupError, RepresentativeCatalogue,
    SpinPointGroupType,
};

/// Spin point group as `(spin rotation, rotation)` pairs, each part in the
/// representative setting of its point group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinPointGroup {
    pub number: u16,
    pub point_group: String,
    pub subgroup: String,
    pub spin_point_group: String,
    pub operations: Vec<(Rotation, Rotation)>,
}

impl SpinPointGroup {
    /// Builds the spin point group of a table entry: the i-th symmetry-direction
    /// generator of the rotation point group is paired with element
    /// `mapping[i]` of the spin-rotation point group, and the pairs are closed.
    pub fn from_type<C>(entry: &SpinPointGroupType, catalogue: &C) -> Result<SpinPointGroup, PointGroupError>
    where
        C: RepresentativeCatalogue + ?Sized,
    {
        let rotations = catalogue.representative(&entry.point_group)?;
        let spin_rotations = catalogue.representative(&entry.spin_point_group)?;
        let generators = generator_indices(&entry.point_group)?;

        let pairs = generators
            .iter()
            .zip(entry.mapping.iter())
            .map(|(&g, &idx)| {
                let rotation = rotations.get(g).ok_or_else(|| PointGroupError::IncompleteSetting {
                    symbol: entry.point_group.clone(),
                    index: g,
                })?;
                let spin_rotation =
                    spin_rotations
                        .get(idx)
                        .ok_or_else(|| PointGroupError::IncompleteSetting {
                            symbol: entry.spin_point_group.clone(),
                            index: idx,
                        })?;
                Ok((*spin_rotation, *rotation))
            })
            .collect::<Result<Vec<_>, PointGroupError>>()?;

        let operations = traverse_spin_operations(&pairs)?;

        if operations.len() != rotations.len() {
            return Err(PointGroupError::InconsistentTableEntry {
                number: entry.number,
                found: operations.len(),
                expected: rotations.len(),
            });
        }

        Ok(SpinPointGroup {
            number: entry.number,
            point_group: entry.point_group.clone(),
            subgroup: entry.subgroup.clone(),
            spin_point_group: entry.spin_point_group.clone(),
            operations,
        })
    }

    pub fn order(&self) -> usize {
        self.operations.len()
    }

    /// Distinct rotation parts, in generation order.
    pub fn rotations(&self) -> Vec<Rotation> {
        self.operations.iter().map(|(_, r)| *r).unique().collect()
    }

    /// Distinct spin-rotation parts, in generation order.
    pub fn spin_rotations(&self) -> Vec<Rotation> {
        self.operations.iter().map(|(s, _)| *s).unique().collect()
    }

    /// Rotations paired with the identity spin rotation.
    pub fn identity_subgroup(&self) -> Vec<Rotation> {
        self.operations
            .iter()
            .filter(|(s, _)| *s == Rotation::identity())
            .map(|(_, r)| *r)
            .collect()
    }
}

impl fmt::Display for SpinPointGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "#{} R={} r={} B={} order={}",
            self.number,
            self.point_group,
            self.subgroup,
            self.spin_point_group,
            self.order()
        )
    }
}
