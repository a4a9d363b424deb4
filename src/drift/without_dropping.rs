//! Detector-Free Ingestion
//!
//! Feeds samples through the same bucket compression as the adaptive
//! estimator while leaving the change test out, so the caller can see what
//! the compressed window would report with pruning disabled.

use crate::error::{AdaptiveMeanError, Result};
use crate::stats::Variance;

use super::AdaptiveMean;

/// Ingestion handle that never prunes
///
/// Borrows the estimator for the duration of the comparison; all accessors
/// read through to the shared state.
#[derive(Debug)]
pub struct WithoutDropping<'a> {
    inner: &'a mut AdaptiveMean,
}

impl<'a> WithoutDropping<'a> {
    pub(crate) fn new(inner: &'a mut AdaptiveMean) -> Self {
        Self { inner }
    }

    /// Ingest one sample, compressing the window but never pruning it
    ///
    /// # Errors
    ///
    /// Rejects non-finite samples.
    pub fn fit(&mut self, x: f64) -> Result<&mut Self> {
        if !x.is_finite() {
            return Err(AdaptiveMeanError::NonFiniteSample(x));
        }
        self.inner.absorb(x);
        Ok(self)
    }

    /// Mean of the window
    pub fn mean(&self) -> f64 {
        self.inner.mean()
    }

    /// Alias of [`mean`](Self::mean)
    pub fn value(&self) -> f64 {
        self.inner.value()
    }

    /// Number of observations in the window
    pub fn nobs(&self) -> u64 {
        self.inner.nobs()
    }

    /// Variance summary of the window
    pub fn stats(&self) -> &Variance {
        self.inner.stats()
    }
}
