//! Crystallographic point groups and spin point groups.
//!
//! * `catalogue`: fixed tables of representative settings, symmetry-direction
//!   generators and the 598 spin point-group types.
//! * `canonical`: matching a rotation set against the representative setting
//!   of its geometric crystal class.
//! * `closure`: generating a finite group from its generators.
//! * `spin_point_group`: spin point groups built from table entries.

pub mod canonical;
pub mod catalogue;
pub mod closure;
pub mod spin_point_group;

pub use canonical::*;
pub use catalogue::*;
pub use closure::*;
pub use spin_point_group::*;

use symops::ClassificationError;

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PointGroupError {
    #[error("no representative of point group {symbol} matches the rotations")]
    ClassificationMiss { symbol: String },
    #[error("unknown point-group symbol {symbol}")]
    UnknownSymbol { symbol: String },
    #[error("generated group exceeds {max_order} elements")]
    ClosureOverflow { max_order: usize },
    #[error("setting of point group {symbol} has no element {index}")]
    IncompleteSetting { symbol: String, index: usize },
    #[error("basis change is singular")]
    SingularBasisChange,
    #[error("spin point-group type #{number} generates {found} operations, expected {expected}")]
    InconsistentTableEntry {
        number: u16,
        found: usize,
        expected: usize,
    },
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}
