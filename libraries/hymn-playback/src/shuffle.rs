//! Shuffle order generation
//!
//! The queue never reorders its entries when shuffled. It keeps a separate
//! permutation of entry indices, so turning shuffle off restores the exact
//! original order.

use rand::seq::SliceRandom;
use rand::Rng;

/// Random permutation of `0..len` (Fisher-Yates)
///
/// When `pinned` is a valid index it is placed first so the playing entry
/// keeps playing and everything after it is random.
pub fn shuffled_order<R: Rng + ?Sized>(len: usize, pinned: Option<usize>, rng: &mut R) -> Vec<usize> {
    let pinned = pinned.filter(|&index| index < len);

    let mut rest: Vec<usize> = (0..len).filter(|&index| Some(index) != pinned).collect();
    rest.shuffle(rng);

    match pinned {
        Some(index) => {
            let mut order = Vec::with_capacity(len);
            order.push(index);
            order.extend(rest);
            order
        }
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shuffle_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut order = shuffled_order(20, None, &mut rng);
        order.sort_unstable();
        assert_eq!(order, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn pinned_index_comes_first() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..10 {
            let order = shuffled_order(8, Some(5), &mut rng);
            assert_eq!(order[0], 5);
            assert_eq!(order.len(), 8);
        }
    }

    #[test]
    fn out_of_range_pin_ignored() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut order = shuffled_order(4, Some(9), &mut rng);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_and_single() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(shuffled_order(0, None, &mut rng).is_empty());
        assert_eq!(shuffled_order(1, Some(0), &mut rng), vec![0]);
    }
}
