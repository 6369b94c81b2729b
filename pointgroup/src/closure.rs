use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use symops::Rotation;
use tracing::trace;

use crate::PointGroupError;

/// Order of the largest group the closure routines will build by default.
pub const DEFAULT_MAX_ORDER: usize = 1152;

/// Closes `generators` under `mul` by breadth-first search.
///
/// Elements come out in discovery order, generators first. Both `g*h` and
/// `h*g` are queued for every newly found `g` and every `h` found so far
/// (including `g` itself). Fails once more than `max_order` distinct
/// elements have been found.
pub fn traverse_operations<T, F>(
    generators: &[T],
    mul: F,
    max_order: usize,
) -> Result<Vec<T>, PointGroupError>
where
    T: Clone + Eq + Hash,
    F: Fn(&T, &T) -> T,
{
    let mut queue: VecDeque<T> = generators.iter().cloned().collect();
    let mut found: Vec<T> = Vec::new();
    let mut seen: HashSet<T> = HashSet::new();

    while let Some(g) = queue.pop_front() {
        if seen.contains(&g) {
            continue;
        }

        seen.insert(g.clone());
        found.push(g.clone());

        if found.len() > max_order {
            return Err(PointGroupError::ClosureOverflow { max_order });
        }

        for h in found.iter() {
            for product in [mul(&g, h), mul(h, &g)] {
                if !seen.contains(&product) {
                    queue.push_back(product);
                }
            }
        }
    }

    trace!(order = found.len(), "closure finished");

    Ok(found)
}

/// Point group generated by integer rotations.
pub fn traverse_rotations(generators: &[Rotation]) -> Result<Vec<Rotation>, PointGroupError> {
    traverse_operations(generators, |a, b| a * b, DEFAULT_MAX_ORDER)
}

/// Spin point group generated by `(spin rotation, rotation)` pairs, both parts
/// in their own integer bases.
pub fn traverse_spin_operations(
    generators: &[(Rotation, Rotation)],
) -> Result<Vec<(Rotation, Rotation)>, PointGroupError> {
    traverse_operations(
        generators,
        |(s1, r1), (s2, r2)| (s1 * s2, r1 * r2),
        DEFAULT_MAX_ORDER,
    )
}
