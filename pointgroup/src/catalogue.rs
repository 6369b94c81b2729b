//! Fixed classification tables.

use std::collections::HashMap;
use std::sync::OnceLock;

use symops::Rotation;

use crate::PointGroupError;

/// Chosen setting of each geometric crystal class among its descriptions.
///
/// Unique axis b for "2" and "m", unique axis c for "mm2"; the first
/// description elsewhere.
pub const POINT_GROUP_REPRESENTATIVES: [(&str, usize); 32] = [
    ("1", 0),
    ("-1", 0),
    ("2", 1),
    ("m", 1),
    ("2/m", 0),
    ("222", 0),
    ("mm2", 2),
    ("mmm", 0),
    ("4", 0),
    ("-4", 0),
    ("4/m", 0),
    ("422", 0),
    ("4mm", 0),
    ("-42m", 0),
    ("4/mmm", 0),
    ("3", 0),
    ("-3", 0),
    ("32", 0),
    ("3m", 0),
    ("-3m", 0),
    ("6", 0),
    ("-6", 0),
    ("6/m", 0),
    ("622", 0),
    ("6mm", 0),
    ("-6m2", 0),
    ("6/mmm", 0),
    ("23", 0),
    ("m-3", 0),
    ("432", 0),
    ("-43m", 0),
    ("m-3m", 0),
];

/// Indices, within the representative setting, of one generator per
/// symmetry direction (primary, secondary, tertiary).
pub const POINT_GROUP_GENERATORS: [(&str, &[usize]); 32] = [
    ("1", &[0]),
    ("-1", &[1]),
    // monoclinic, [010]
    ("2", &[1]),
    ("m", &[1]),
    ("2/m", &[1, 3]),
    // orthorhombic, [100] [010] [001]
    ("222", &[3, 2, 1]),
    ("mm2", &[3, 2, 1]),
    ("mmm", &[7, 6, 5]),
    // tetragonal, [001] [100] [1-10]
    ("4", &[2]),
    ("-4", &[2]),
    ("4/m", &[2, 5]),
    ("422", &[2, 5, 7]),
    ("4mm", &[2, 5, 7]),
    ("-42m", &[2, 5, 7]),
    ("4/mmm", &[2, 9, 13, 15]),
    // hexagonal, [001] [100] [1-10]
    ("3", &[1]),
    ("-3", &[4]),
    ("32", &[1, 3]),
    ("3m", &[1, 4]),
    ("-3m", &[7, 9]),
    ("6", &[5]),
    ("-6", &[5]),
    ("6/m", &[5, 9]),
    ("622", &[5, 7, 9]),
    ("6mm", &[5, 7, 9]),
    ("-6m2", &[5, 7, 9]),
    ("6/mmm", &[5, 15, 19, 21]),
    // cubic, [100] [111] [1-10]
    ("23", &[3, 4]),
    ("m-3", &[15, 16]),
    ("432", &[19, 4, 18]),
    ("-43m", &[17, 4, 16]),
    ("m-3m", &[27, 28, 42]),
];

pub fn representative_index(symbol: &str) -> Result<usize, PointGroupError> {
    POINT_GROUP_REPRESENTATIVES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, idx)| *idx)
        .ok_or_else(|| PointGroupError::UnknownSymbol {
            symbol: symbol.to_string(),
        })
}

pub fn generator_indices(symbol: &str) -> Result<&'static [usize], PointGroupError> {
    POINT_GROUP_GENERATORS
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, gens)| *gens)
        .ok_or_else(|| PointGroupError::UnknownSymbol {
            symbol: symbol.to_string(),
        })
}

/// All settings of each geometric crystal class as ordered rotation lists.
pub trait RepresentativeCatalogue {
    /// Settings of `symbol`; empty if the catalogue does not know it.
    fn settings(&self, symbol: &str) -> &[Vec<Rotation>];

    /// The chosen representative setting of `symbol`.
    fn representative(&self, symbol: &str) -> Result<&[Rotation], PointGroupError> {
        let idx = representative_index(symbol)?;

        self.settings(symbol)
            .get(idx)
            .map(|group| group.as_slice())
            .ok_or_else(|| PointGroupError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }
}

/// Catalogue held in memory, filled by the caller.
#[derive(Debug, Clone, Default)]
pub struct TableCatalogue {
    settings: HashMap<String, Vec<Vec<Rotation>>>,
}

impl TableCatalogue {
    pub fn new() -> TableCatalogue {
        TableCatalogue::default()
    }

    pub fn insert(&mut self, symbol: &str, settings: Vec<Vec<Rotation>>) {
        self.settings.insert(symbol.to_string(), settings);
    }
}

impl RepresentativeCatalogue for TableCatalogue {
    fn settings(&self, symbol: &str) -> &[Vec<Rotation>] {
        self.settings
            .get(symbol)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }
}

static POINT_GROUP_SETTINGS: OnceLock<HashMap<String, Vec<Vec<Rotation>>>> = OnceLock::new();

const POINT_GROUP_SETTINGS_DATA: &str = include_str!("../data/point_group_settings.dat");

/// Settings of the 32 geometric crystal classes shipped with the crate, in
/// the general-position order of International Tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalogue;

impl RepresentativeCatalogue for BuiltinCatalogue {
    fn settings(&self, symbol: &str) -> &[Vec<Rotation>] {
        POINT_GROUP_SETTINGS
            .get_or_init(|| parse_point_group_settings(POINT_GROUP_SETTINGS_DATA))
            .get(symbol)
            .map(|s| s.as_slice())
            .unwrap_or(&[])
    }
}

fn parse_point_group_settings(data: &str) -> HashMap<String, Vec<Vec<Rotation>>> {
    let mut settings: HashMap<String, Vec<Vec<Rotation>>> = HashMap::new();

    for line in data
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
    {
        let s: Vec<&str> = line.split_whitespace().collect();
        let index: usize = s[1].parse().expect("point-group setting index");
        let rotations = s[2..]
            .iter()
            .map(|t| parse_triplet(t).expect("point-group setting rotation"))
            .collect();

        let known = settings.entry(s[0].to_string()).or_default();
        assert_eq!(known.len(), index, "settings of {} out of order", s[0]);
        known.push(rotations);
    }

    settings
}

/// Rotation of a coordinate triplet such as `-y,x-y,z`.
pub fn parse_triplet(triplet: &str) -> Option<Rotation> {
    let rows: Vec<&str> = triplet.split(',').collect();
    if rows.len() != 3 {
        return None;
    }

    let mut rotation = Rotation::zeros();
    for (i, row) in rows.iter().enumerate() {
        let mut sign = 1;
        let mut terms = 0;

        for c in row.trim().chars() {
            match c {
                '+' => sign = 1,
                '-' => sign = -1,
                'x' | 'y' | 'z' => {
                    rotation[(i, (c as u8 - b'x') as usize)] += sign;
                    sign = 1;
                    terms += 1;
                }
                _ => return None,
            }
        }

        if terms == 0 {
            return None;
        }
    }

    Some(rotation)
}

/// One row of the spin point-group type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinPointGroupType {
    /// Point group of the rotation parts.
    pub point_group: String,
    /// Subgroup paired with the identity spin rotation.
    pub subgroup: String,
    /// Point group of the spin rotation parts.
    pub spin_point_group: String,
    /// Type number, 1 to 598.
    pub number: u16,
    /// For the i-th symmetry-direction generator of `point_group`, the index
    /// of its spin rotation within the representative of `spin_point_group`.
    pub mapping: Vec<usize>,
}

static SPIN_POINT_GROUP_TYPES: OnceLock<Vec<SpinPointGroupType>> = OnceLock::new();

const SPIN_POINT_GROUP_TYPES_DATA: &str = include_str!("../data/spin_point_group_types.dat");

fn parse_spin_point_group_types(data: &str) -> Vec<SpinPointGroupType> {
    data.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            let s: Vec<&str> = line.split_whitespace().collect();

            SpinPointGroupType {
                point_group: s[0].to_string(),
                subgroup: s[1].to_string(),
                spin_point_group: s[2].to_string(),
                number: s[3].parse().expect("spin point-group type number"),
                mapping: s[4..]
                    .iter()
                    .map(|x| x.parse().expect("spin point-group type mapping"))
                    .collect(),
            }
        })
        .collect()
}

/// Every spin point-group type, ordered by number.
pub fn all_spin_point_group_types() -> &'static [SpinPointGroupType] {
    SPIN_POINT_GROUP_TYPES.get_or_init(|| parse_spin_point_group_types(SPIN_POINT_GROUP_TYPES_DATA))
}

/// Spin point-group types with rotation point group `point_group`, identity
/// subgroup `subgroup` and spin-rotation point group `spin_point_group`.
pub fn spin_point_group_types(
    point_group: &str,
    subgroup: &str,
    spin_point_group: &str,
) -> Vec<&'static SpinPointGroupType> {
    all_spin_point_group_types()
        .iter()
        .filter(|t| {
            t.point_group == point_group
                && t.subgroup == subgroup
                && t.spin_point_group == spin_point_group
        })
        .collect()
}
