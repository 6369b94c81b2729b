use super::*;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn random_permutation(rng: &mut StdRng, n: usize) -> Permutation {
    let mut map: Vec<usize> = (0..n).collect();
    map.shuffle(rng);
    Permutation::new(map).unwrap()
}

#[test]
fn test_apply_and_compose() {
    let f = Permutation::new(vec![1, 2, 0]).unwrap();
    let g = Permutation::new(vec![0, 2, 1]).unwrap();

    let fg = &f * &g;
    for i in 0..3 {
        assert_eq!(fg.apply(i), f.apply(g.apply(i)));
    }
    assert_eq!(fg.as_slice(), &[1, 0, 2]);
    assert_ne!(fg, &g * &f);
}

#[test]
fn test_identity_is_neutral() {
    let mut rng = StdRng::seed_from_u64(7);
    let e = Permutation::identity(6);
    assert!(e.is_identity());

    for _ in 0..20 {
        let p = random_permutation(&mut rng, 6);
        assert_eq!(&p * &e, p);
        assert_eq!(&e * &p, p);
        assert!((&p * &p.inverse()).is_identity());
    }
}

#[test]
fn test_composition_is_associative() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..50 {
        let f = random_permutation(&mut rng, 8);
        let g = random_permutation(&mut rng, 8);
        let h = random_permutation(&mut rng, 8);

        assert_eq!(&(&f * &g) * &h, &f * &(&g * &h));
        for i in 0..8 {
            assert_eq!((&f * &g).apply(i), f.apply(g.apply(i)));
        }
    }
}

#[test]
fn test_rejects_non_bijection() {
    assert_eq!(
        Permutation::new(vec![0, 0, 1]),
        Err(PermutationError::NotBijective { image: 0 })
    );
    assert_eq!(
        Permutation::new(vec![0, 3, 1]),
        Err(PermutationError::OutOfRange {
            site: 1,
            image: 3,
            len: 3
        })
    );
}

#[test]
fn test_permute_gathers_images() {
    let p = Permutation::new(vec![2, 0, 1]).unwrap();
    assert_eq!(p.permute(&['a', 'b', 'c']), vec!['c', 'a', 'b']);
    assert_eq!(format!("{}", p), "[2 0 1]");
}

#[test]
fn test_equal_permutations_hash_equal() {
    use std::collections::HashSet;

    let mut set = HashSet::new();
    set.insert(Permutation::new(vec![1, 0, 2]).unwrap());
    set.insert(Permutation::new(vec![1, 0, 2]).unwrap());
    set.insert(Permutation::identity(3));
    assert_eq!(set.len(), 2);
}
