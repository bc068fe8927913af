//! Seeded train/test partitioning.

/// Default fraction of rows held out for evaluation.
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
/// Default shuffle seed.
pub const DEFAULT_SEED: u64 = 42;

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of held-out rows: `ceil(test_size * n)`, kept within `1..n` so
/// both partitions are non-empty whenever `n >= 2`.
pub fn test_count(n: usize, test_size: f64) -> usize {
    if n < 2 {
        return 0;
    }
    let raw = (test_size * n as f64).ceil();
    (raw.max(1.0) as usize).min(n - 1)
}

/// Shuffles `0..n` with a seeded Fisher-Yates pass and takes the first
/// [`test_count`] indices as the test partition.
///
/// The same `(n, test_size, seed)` always yields the same split.
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> Split {
    let mut rng = oorandom::Rand64::new(u128::from(seed));
    let mut order: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = rng.rand_range(0..(i as u64 + 1)) as usize;
        order.swap(i, j);
    }

    let train = order.split_off(test_count(n, test_size));
    Split { train, test: order }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_rounds_up() {
        assert_eq!(test_count(10, 0.2), 2);
        assert_eq!(test_count(11, 0.2), 3);
        assert_eq!(test_count(5, 0.2), 1);
        assert_eq!(test_count(3, 0.01), 1);
        assert_eq!(test_count(3, 0.99), 2);
        assert_eq!(test_count(1, 0.2), 0);
    }

    #[test]
    fn partitions_cover_all_rows_once() {
        let split = train_test_split(50, 0.2, DEFAULT_SEED);
        assert_eq!(split.test.len(), 10);
        assert_eq!(split.train.len(), 40);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn split_is_deterministic() {
        assert_eq!(train_test_split(30, 0.2, 7), train_test_split(30, 0.2, 7));
    }

    #[test]
    fn seed_changes_split() {
        let a = train_test_split(100, 0.2, 1);
        let b = train_test_split(100, 0.2, 2);
        assert_ne!(a.test, b.test);
    }
}
