use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Shuffle in place with a PRNG seeded from `seed`; the same seed always
/// produces the same order.
pub fn shuffle_pairs<T>(items: &mut [T], seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

/// Consecutive batches of exactly `batch_size` items. A final batch smaller
/// than `batch_size` is left out.
///
/// # Panics
///
/// Panics if `batch_size` is 0 (rejected earlier by config validation).
pub fn full_batches<T>(items: &[T], batch_size: usize) -> std::slice::ChunksExact<'_, T> {
    items.chunks_exact(batch_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle_is_reproducible() {
        let mut a: Vec<u32> = (0..100).collect();
        let mut b = a.clone();
        shuffle_pairs(&mut a, 42);
        shuffle_pairs(&mut b, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_depends_on_seed() {
        let mut a: Vec<u32> = (0..100).collect();
        let mut b = a.clone();
        shuffle_pairs(&mut a, 42);
        shuffle_pairs(&mut b, 43);
        assert_ne!(a, b);
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut a: Vec<u32> = (0..100).collect();
        shuffle_pairs(&mut a, 7);
        assert_ne!(a, (0..100).collect::<Vec<u32>>());
        a.sort();
        assert_eq!(a, (0..100).collect::<Vec<u32>>());
    }

    #[test]
    fn test_full_batches_drop_remainder() {
        let items: Vec<u32> = (0..10).collect();
        let batches: Vec<&[u32]> = full_batches(&items, 4).collect();
        assert_eq!(batches, vec![&[0, 1, 2, 3][..], &[4, 5, 6, 7][..]]);
    }

    #[test]
    fn test_full_batches_exact_multiple() {
        let items: Vec<u32> = (0..8).collect();
        assert_eq!(full_batches(&items, 4).count(), 2);
    }

    #[test]
    fn test_full_batches_too_few_items() {
        let items: Vec<u32> = (0..3).collect();
        assert_eq!(full_batches(&items, 4).count(), 0);
    }
}
