use nalgebra::Matrix3;
use symops::{point_group_symbol, Rotation};
use tracing::debug;

use crate::{representative_index, PointGroupError, RepresentativeCatalogue};

/// Geometric crystal class of a rotation set together with the basis change
/// `P` into the setting of the catalogue: `P^-1 R P` is a catalogue rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedPointGroup {
    pub symbol: &'static str,
    pub basis_change: Matrix3<f64>,
}

pub trait PointGroupIdentifier {
    fn identify(&self, rotations: &[Rotation]) -> Result<IdentifiedPointGroup, PointGroupError>;
}

/// Identifies the crystal class from rotation-type counts and assumes the
/// rotations are already in the catalogue setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSettingIdentifier;

impl PointGroupIdentifier for StandardSettingIdentifier {
    fn identify(&self, rotations: &[Rotation]) -> Result<IdentifiedPointGroup, PointGroupError> {
        Ok(IdentifiedPointGroup {
            symbol: point_group_symbol(rotations)?,
            basis_change: Matrix3::identity(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalPointGroup {
    pub symbol: &'static str,
    /// Setting of `symbol` in the catalogue that was matched.
    pub index: usize,
    /// `P^-1 rotations[mapping[k]] P == setting[k]` for every `k`.
    pub mapping: Vec<usize>,
}

impl CanonicalPointGroup {
    /// Whether the matched setting is the chosen representative.
    pub fn is_representative(&self) -> bool {
        representative_index(self.symbol).map_or(false, |idx| idx == self.index)
    }
}

/// Matches `rotations` element by element against the catalogue settings of
/// their crystal class; the first setting that matches wins.
pub fn get_canonical_pointgroup<I, C>(
    rotations: &[Rotation],
    identifier: &I,
    catalogue: &C,
) -> Result<CanonicalPointGroup, PointGroupError>
where
    I: PointGroupIdentifier + ?Sized,
    C: RepresentativeCatalogue + ?Sized,
{
    let identified = identifier.identify(rotations)?;
    let p = identified.basis_change;
    let p_inv = p.try_inverse().ok_or(PointGroupError::SingularBasisChange)?;

    let conjugated: Vec<Rotation> = rotations
        .iter()
        .map(|r| (p_inv * lattice::to_float(r) * p).map(|x| x.round() as i32))
        .collect();

    for (index, setting) in catalogue.settings(identified.symbol).iter().enumerate() {
        if setting.len() != conjugated.len() {
            continue;
        }

        let mapping: Option<Vec<usize>> = setting
            .iter()
            .map(|std| conjugated.iter().position(|r| r == std))
            .collect();

        if let Some(mapping) = mapping {
            debug!(symbol = identified.symbol, index, "matched point-group setting");
            return Ok(CanonicalPointGroup {
                symbol: identified.symbol,
                index,
                mapping,
            });
        }
    }

    Err(PointGroupError::ClassificationMiss {
        symbol: identified.symbol.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuiltinCatalogue;

    fn c2(axis: usize) -> Rotation {
        let mut r = -Rotation::identity();
        r[(axis, axis)] = 1;
        r
    }

    #[test]
    fn test_trivial_group() {
        let canonical = get_canonical_pointgroup(
            &[Rotation::identity()],
            &StandardSettingIdentifier,
            &BuiltinCatalogue,
        )
        .unwrap();

        assert_eq!(canonical.symbol, "1");
        assert_eq!(canonical.index, 0);
        assert_eq!(canonical.mapping, vec![0]);
        assert!(canonical.is_representative());
    }

    #[test]
    fn test_mapping_follows_catalogue_order() {
        let identity = Rotation::identity();
        let canonical = get_canonical_pointgroup(
            &[-identity, identity],
            &StandardSettingIdentifier,
            &BuiltinCatalogue,
        )
        .unwrap();

        assert_eq!(canonical.symbol, "-1");
        assert_eq!(canonical.mapping, vec![1, 0]);
    }

    #[test]
    fn test_setting_is_selected() {
        let catalogue = BuiltinCatalogue;
        let canonical = get_canonical_pointgroup(
            &[c2(1), Rotation::identity()],
            &StandardSettingIdentifier,
            &catalogue,
        )
        .unwrap();

        assert_eq!(canonical.index, 1);
        assert_eq!(canonical.mapping, vec![1, 0]);
        assert!(canonical.is_representative());

        let canonical = get_canonical_pointgroup(
            &[Rotation::identity(), c2(2)],
            &StandardSettingIdentifier,
            &catalogue,
        )
        .unwrap();
        assert_eq!(canonical.index, 0);
        assert_eq!(canonical.mapping, vec![0, 1]);
        assert!(!canonical.is_representative());
    }

    #[test]
    fn test_holohedry_mapping() {
        let representative = BuiltinCatalogue.representative("4/mmm").unwrap();
        let reversed: Vec<Rotation> = representative.iter().rev().copied().collect();

        let canonical =
            get_canonical_pointgroup(&reversed, &StandardSettingIdentifier, &BuiltinCatalogue).unwrap();

        assert_eq!(canonical.symbol, "4/mmm");
        assert!(canonical.is_representative());
        assert_eq!(canonical.mapping, (0..16).rev().collect::<Vec<usize>>());
    }

    #[test]
    fn test_basis_change_is_applied() {
        struct Swapped;

        // the y and z axes are exchanged relative to the catalogue
        impl PointGroupIdentifier for Swapped {
            fn identify(&self, rotations: &[Rotation]) -> Result<IdentifiedPointGroup, PointGroupError> {
                Ok(IdentifiedPointGroup {
                    symbol: point_group_symbol(rotations)?,
                    basis_change: Matrix3::new(1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0),
                })
            }
        }

        let canonical = get_canonical_pointgroup(
            &[Rotation::identity(), c2(2)],
            &Swapped,
            &BuiltinCatalogue,
        )
        .unwrap();
        assert_eq!(canonical.index, 1);
        assert_eq!(canonical.mapping, vec![0, 1]);
    }

    #[test]
    fn test_classification_miss() {
        // twofold axis along [110]
        let c2_110 = Rotation::new(0, 1, 0, 1, 0, 0, 0, 0, -1);
        let err = get_canonical_pointgroup(
            &[Rotation::identity(), c2_110],
            &StandardSettingIdentifier,
            &BuiltinCatalogue,
        )
        .unwrap_err();

        assert_eq!(
            err,
            PointGroupError::ClassificationMiss {
                symbol: "2".to_string()
            }
        );
    }
}
