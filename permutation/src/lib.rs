//! Permutations of crystal sites.
//!
//! A [`Permutation`] records where each site goes under a symmetry operation:
//! `p.apply(i)` is the image of site `i`. Composition follows function
//! composition, `(f * g).apply(i) == f.apply(g.apply(i))`, i.e. `g` acts first.

use std::fmt;
use std::ops::Mul;

mod matching;

pub use matching::*;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum PermutationError {
    #[error("image {image} of site {site} is out of range for {len} sites")]
    OutOfRange { site: usize, image: usize, len: usize },
    #[error("site {image} is the image of more than one site")]
    NotBijective { image: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Permutation {
    map: Vec<usize>,
}

impl Permutation {
    /// Builds a permutation from its image table, checking that it is a bijection.
    pub fn new(map: Vec<usize>) -> Result<Permutation, PermutationError> {
        let len = map.len();
        let mut seen = vec![false; len];

        for (site, &image) in map.iter().enumerate() {
            if image >= len {
                return Err(PermutationError::OutOfRange { site, image, len });
            }
            if seen[image] {
                return Err(PermutationError::NotBijective { image });
            }
            seen[image] = true;
        }

        Ok(Permutation { map })
    }

    pub fn identity(n: usize) -> Permutation {
        Permutation {
            map: (0..n).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn apply(&self, i: usize) -> usize {
        self.map[i]
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.map
    }

    pub fn is_identity(&self) -> bool {
        self.map.iter().enumerate().all(|(i, &j)| i == j)
    }

    pub fn inverse(&self) -> Permutation {
        let mut inv = vec![0; self.map.len()];
        for (i, &j) in self.map.iter().enumerate() {
            inv[j] = i;
        }
        Permutation { map: inv }
    }

    /// `self * rhs`: apply `rhs` first, then `self`.
    pub fn compose(&self, rhs: &Permutation) -> Permutation {
        assert_eq!(
            self.len(),
            rhs.len(),
            "cannot compose permutations of different lengths"
        );

        Permutation {
            map: rhs.map.iter().map(|&i| self.map[i]).collect(),
        }
    }

    /// Gathers `values` along the permutation: `out[i] = values[self(i)]`.
    ///
    /// For site vectors this is the configuration each site must be mapped
    /// onto by the accompanying operation.
    pub fn permute<T: Clone>(&self, values: &[T]) -> Vec<T> {
        self.map.iter().map(|&j| values[j].clone()).collect()
    }
}

impl Mul<&Permutation> for &Permutation {
    type Output = Permutation;

    fn mul(self, rhs: &Permutation) -> Permutation {
        self.compose(rhs)
    }
}

impl Mul for Permutation {
    type Output = Permutation;

    fn mul(self, rhs: Permutation) -> Permutation {
        self.compose(&rhs)
    }
}

impl fmt::Display for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, j) in self.map.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", j)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests;
