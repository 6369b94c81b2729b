use std::collections::HashSet;
use std::fmt;

use itertools::izip;
use lattice::{
    column_hnf, conjugate, determinant, inverse_apply, left_divide, left_divide_vector,
    reduce_to_fundamental_domain, IntMatrix3, IntVector3, Lattice, LatticeError,
};
use magmom::{
    get_spin_only_group, is_invariant_under, max_moment_deviation, permuted_moments,
    solve_procrustes, MagmomError, SpinOnlyGroup,
};
use nalgebra::{DMatrix, Matrix3, Vector3};
use permutation::Permutation;
use pointgroup::{
    get_canonical_pointgroup, CanonicalPointGroup, PointGroupIdentifier, RepresentativeCatalogue,
};
use symops::{normalize_fractional, point_group_symbol, Rotation};
use tracing::{debug, trace};

use crate::{NonmagneticSymmetry, SpinGroupError, SpinSymmetryOperation};

/// Spin space group in the primitive cell of its maximal space subgroup.
///
/// Every operation of the group is `s * c * g` with `s` from
/// `spin_translation_coset`, `c` a lattice translation of `prim_lattice` with
/// identity spin, and `g` from `nontrivial_coset`, up to the spin-only group.
#[derive(Debug, Clone)]
pub struct SpinSpaceGroup {
    pub prim_lattice: Lattice,
    pub spin_only_group: SpinOnlyGroup,
    /// Pure translations with their spin rotations, distinct modulo `prim_lattice`.
    pub spin_translation_coset: Vec<SpinSymmetryOperation>,
    /// Lattice vectors of `prim_lattice` that are pure translations of the
    /// input cell, the zero vector first.
    pub prim_centerings: Vec<IntVector3>,
    /// One operation per distinct rotation.
    pub nontrivial_coset: Vec<SpinSymmetryOperation>,
    /// New primitive cell to input cell, `A_in = A_prim * transformation`.
    pub transformation: IntMatrix3,
}

impl SpinSpaceGroup {
    /// Rotation parts of the nontrivial coset.
    pub fn point_group_rotations(&self) -> Vec<Rotation> {
        self.nontrivial_coset.iter().map(|op| op.rotation).collect()
    }

    /// `(spin rotation, rotation)` pairs of the nontrivial coset.
    pub fn spin_point_group_operations(&self) -> Vec<(Matrix3<f64>, Rotation)> {
        self.nontrivial_coset
            .iter()
            .map(|op| (op.spin_rotation, op.rotation))
            .collect()
    }

    /// Hermann–Mauguin symbol of the point group of the rotation parts.
    pub fn point_group_symbol(&self) -> Result<&'static str, SpinGroupError> {
        point_group_symbol(&self.point_group_rotations())
            .map_err(|e| SpinGroupError::PointGroup(e.into()))
    }

    /// Matches the rotation parts against a catalogue of point-group settings.
    pub fn canonical_point_group<I, C>(
        &self,
        identifier: &I,
        catalogue: &C,
    ) -> Result<CanonicalPointGroup, SpinGroupError>
    where
        I: PointGroupIdentifier + ?Sized,
        C: RepresentativeCatalogue + ?Sized,
    {
        Ok(get_canonical_pointgroup(
            &self.point_group_rotations(),
            identifier,
            catalogue,
        )?)
    }

    /// Every spin symmetry operation expressed in the input cell.
    pub fn input_cell_operations(&self) -> Result<Vec<SpinSymmetryOperation>, SpinGroupError> {
        let tmat = &self.transformation;
        let mut operations = Vec::new();

        for g in self.nontrivial_coset.iter() {
            let rotation = conjugate(&g.rotation, tmat)?;

            for s in self.spin_translation_coset.iter() {
                let spin_rotation = self
                    .spin_only_group
                    .canonicalize(&(s.spin_rotation * g.spin_rotation));

                for c in self.prim_centerings.iter() {
                    let t = g.translation + s.translation + c.map(f64::from);

                    operations.push(SpinSymmetryOperation {
                        rotation,
                        translation: normalize_fractional(&inverse_apply(tmat, &t)?),
                        spin_rotation,
                    });
                }
            }
        }

        Ok(operations)
    }
}

impl fmt::Display for SpinSpaceGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.prim_lattice)?;
        writeln!(f, "spin-only group: {}", self.spin_only_group)?;
        writeln!(f, "transformation: {:?}", self.transformation.as_slice())?;

        writeln!(f, "spin-translation coset ({})", self.spin_translation_coset.len())?;
        for op in self.spin_translation_coset.iter() {
            writeln!(f, "{}", op)?;
        }

        writeln!(f, "nontrivial coset ({})", self.nontrivial_coset.len())?;
        for op in self.nontrivial_coset.iter() {
            writeln!(f, "{}", op)?;
        }

        Ok(())
    }
}

/// Spin rotation carrying every moment onto the moment of its image site
/// under `perm`, reduced modulo the spin-only group, or `None` if the best
/// orthogonal fit misses some site by `mag_symprec` or more.
fn fit_spin_rotation(
    moments: &[Vector3<f64>],
    perm: &Permutation,
    spin_only_group: &SpinOnlyGroup,
    mag_symprec: f64,
) -> Result<Option<Matrix3<f64>>, MagmomError> {
    let target = permuted_moments(moments, perm);
    let fitted = solve_procrustes(moments, &target)?;
    let spin_rotation = spin_only_group.canonicalize(&fitted);

    if max_moment_deviation(moments, &spin_rotation, perm) < mag_symprec {
        Ok(Some(spin_rotation))
    } else {
        Ok(None)
    }
}

/// Assembles the spin space group of `moments` (Cartesian, one per site) from
/// the nonmagnetic symmetry of the same structure.
pub fn get_spin_space_group(
    ns: &NonmagneticSymmetry,
    moments: &[Vector3<f64>],
    mag_symprec: f64,
) -> Result<SpinSpaceGroup, SpinGroupError> {
    if mag_symprec <= 0.0 {
        return Err(SpinGroupError::NonPositiveTolerance);
    }
    if let Some(perm) = ns
        .prim_permutations
        .iter()
        .chain(ns.prim_centering_permutations.iter())
        .find(|perm| perm.len() != moments.len())
    {
        return Err(SpinGroupError::MismatchedMoments {
            moments: moments.len(),
            sites: perm.len(),
        });
    }

    // centerings that leave the moments unchanged without spin rotation
    let retained: Vec<usize> = ns
        .prim_centering_permutations
        .iter()
        .enumerate()
        .filter(|(_, perm)| is_invariant_under(moments, perm, mag_symprec))
        .map(|(i, _)| i)
        .collect();

    debug!(
        retained = retained.len(),
        total = ns.prim_centerings.len(),
        "centerings without spin rotation"
    );

    // primitive cell of the translations with identity spin
    let mut generators = DMatrix::<i64>::zeros(3, 3 + retained.len());
    for i in 0..3 {
        for j in 0..3 {
            generators[(i, j)] = i64::from(ns.transformation[(i, j)]);
        }
    }
    for (j, &idx) in retained.iter().enumerate() {
        for i in 0..3 {
            generators[(i, 3 + j)] = i64::from(ns.prim_centerings[idx][i]);
        }
    }

    let reduced = column_hnf(&generators)?.leading_basis();

    let det_transformation = determinant(&ns.transformation).abs();
    let det_reduced = determinant(&reduced).abs();
    if det_transformation != det_reduced * retained.len() as i64 {
        return Err(SpinGroupError::CenteringCountMismatch {
            transformation: det_transformation,
            reduced: det_reduced,
            centerings: retained.len(),
        });
    }

    let transformation = left_divide(&reduced, &ns.transformation)?;

    debug!(det_reduced, "reduced primitive cell");

    let spin_only_group = get_spin_only_group(moments, mag_symprec);

    debug!(spin_only_group = %spin_only_group, "spin-only group");

    // one centering per coset of the reduced lattice
    let mut seen = HashSet::new();
    let representatives: Vec<(IntVector3, &Permutation)> = ns
        .prim_centerings
        .iter()
        .zip(ns.prim_centering_permutations.iter())
        .filter_map(|(c, perm)| match reduce_to_fundamental_domain(&reduced, c) {
            Ok(key) if seen.insert(key) => Some(Ok((*c, perm))),
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
        .collect::<Result<_, _>>()?;

    let mut spin_translation_coset = Vec::new();
    for (c, perm) in representatives.iter() {
        match fit_spin_rotation(moments, perm, &spin_only_group, mag_symprec)? {
            Some(spin_rotation) => {
                let translation = inverse_apply(&reduced, &c.map(f64::from))?;
                spin_translation_coset.push(SpinSymmetryOperation {
                    rotation: Rotation::identity(),
                    translation: normalize_fractional(&translation),
                    spin_rotation,
                });
            }
            None => trace!(centering = ?c.as_slice(), "centering has no spin rotation"),
        }
    }

    debug!(
        n_representatives = representatives.len(),
        n_spin_translations = spin_translation_coset.len(),
        "spin-translation coset"
    );

    let mut nontrivial_coset = Vec::new();
    for (rotation, translation, perm) in izip!(
        ns.prim_rotations.iter(),
        ns.prim_translations.iter(),
        ns.prim_permutations.iter()
    ) {
        let new_rotation = match conjugate(rotation, &reduced) {
            Ok(r) => r,
            Err(LatticeError::NotIntegral { .. }) => {
                trace!(rotation = ?rotation.as_slice(), "rotation breaks the reduced lattice");
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        for (c, c_perm) in representatives.iter() {
            // the rotation acts first, then the centering
            let composed = *c_perm * perm;

            if let Some(spin_rotation) =
                fit_spin_rotation(moments, &composed, &spin_only_group, mag_symprec)?
            {
                let t = inverse_apply(&reduced, &(translation + c.map(f64::from)))?;
                nontrivial_coset.push(SpinSymmetryOperation {
                    rotation: new_rotation,
                    translation: normalize_fractional(&t),
                    spin_rotation,
                });
                break;
            }
        }
    }

    debug!(
        n_nontrivial = nontrivial_coset.len(),
        "nontrivial coset"
    );

    let prim_centerings = retained
        .iter()
        .map(|&idx| left_divide_vector(&reduced, &ns.prim_centerings[idx]))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SpinSpaceGroup {
        prim_lattice: ns.prim_lattice.transformed(&reduced),
        spin_only_group,
        spin_translation_coset,
        prim_centerings,
        nontrivial_coset,
        transformation,
    })
}
