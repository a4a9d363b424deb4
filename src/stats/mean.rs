//! Running Mean Summary
//!
//! Count-and-mean pair used by the change detector to slide a partition
//! across the window without touching the variance components.

use super::Variance;

/// Mean summary of a set of samples
///
/// The count is kept as a float because `remove` subtracts bucket counts
/// and cancellation can leave a tiny or non-positive remainder.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean {
    n: f64,
    mean: f64,
}

impl Mean {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Incorporate one sample
    pub fn fit(&mut self, x: f64) {
        self.n += 1.0;
        self.mean += (x - self.mean) / self.n;
    }

    /// Add a variance summary's contribution
    pub fn merge(&mut self, v: &Variance) {
        if v.is_empty() {
            return;
        }
        let n_b = v.nobs() as f64;
        let n = self.n + n_b;
        self.mean += (v.mean() - self.mean) * n_b / n;
        self.n = n;
    }

    /// Subtract a variance summary's contribution
    ///
    /// The mean is only renormalized while the remaining count stays above
    /// `1e-9`; past that the summary is exhausted and the caller must stop
    /// consuming it.
    pub fn remove(&mut self, v: &Variance) {
        let n_b = v.nobs() as f64;
        let n_out = self.n - n_b;
        if n_out > 1e-9 {
            self.mean = (self.mean * self.n - v.mean() * n_b) / n_out;
        }
        self.n = n_out;
    }

    /// Remaining sample count
    ///
    /// May be fractional or non-positive after removals.
    pub fn nobs(&self) -> f64 {
        self.n
    }

    /// Current mean
    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl From<&Variance> for Mean {
    fn from(v: &Variance) -> Self {
        Mean {
            n: v.nobs() as f64,
            mean: v.mean(),
        }
    }
}
