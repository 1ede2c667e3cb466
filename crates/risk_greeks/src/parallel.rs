//! Rayon-based parallelisation helpers.

use rayon::prelude::*;

/// Minimum number of tasks before work is spread over the pool.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2;

/// Configuration for parallel execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Minimum items before using parallelism
    pub parallel_threshold: usize,
    /// Dedicated pool size; 0 runs on the global rayon pool
    pub num_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            num_threads: 0,
        }
    }
}

impl ParallelConfig {
    /// Creates a new parallel configuration.
    pub fn new(parallel_threshold: usize, num_threads: usize) -> Self {
        Self {
            parallel_threshold,
            num_threads,
        }
    }

    /// Returns whether to use parallel processing for the given item count.
    #[inline]
    pub fn should_parallelize(&self, n_items: usize) -> bool {
        n_items >= self.parallel_threshold.max(1) && n_items > 1
    }
}

/// Fallible map that runs in parallel above the configured threshold.
///
/// Results keep input order. The first error wins and no partial output is
/// returned.
pub fn try_map<T, R, E, F>(items: &[T], config: &ParallelConfig, mapper: F) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync + Send,
{
    if config.should_parallelize(items.len()) {
        items.par_iter().map(mapper).collect()
    } else {
        items.iter().map(mapper).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parallelize() {
        let config = ParallelConfig::new(4, 0);
        assert!(!config.should_parallelize(3));
        assert!(config.should_parallelize(4));
        assert!(!ParallelConfig::new(0, 0).should_parallelize(1));
    }

    #[test]
    fn test_try_map_preserves_order() {
        let items: Vec<i32> = (0..100).collect();
        let doubled: Result<Vec<i32>, String> =
            try_map(&items, &ParallelConfig::default(), |x| Ok(x * 2));
        let doubled = doubled.unwrap();
        assert_eq!(doubled.len(), 100);
        assert_eq!(doubled[50], 100);
    }

    #[test]
    fn test_try_map_propagates_error() {
        let items: Vec<i32> = (0..100).collect();
        let result: Result<Vec<i32>, String> = try_map(&items, &ParallelConfig::default(), |x| {
            if *x == 37 {
                Err(format!("bad {}", x))
            } else {
                Ok(*x)
            }
        });
        assert_eq!(result, Err("bad 37".to_string()));
    }
}
