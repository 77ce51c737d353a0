//! Cache counters

/// How a memoized computation has been served so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Calls answered from the cache
    pub hits: u64,
    /// Calls that ran the computation and stored its result
    pub misses: u64,
    /// Calls whose computation failed (cache left untouched)
    pub failures: u64,
}

impl MemoStats {
    /// Total number of calls
    pub fn calls(&self) -> u64 {
        self.hits + self.misses + self.failures
    }

    /// Fraction of calls answered from the cache, `0.0` before the first call
    pub fn hit_rate(&self) -> f64 {
        match self.calls() {
            0 => 0.0,
            calls => self.hits as f64 / calls as f64,
        }
    }
}
