//! Adaptive Mean Estimator
//!
//! Tracks the mean of a real-valued stream whose distribution may shift
//! over time. The live window is kept in geometrically compressed buckets,
//! and every update re-checks all valid cut points of the window, pruning
//! everything older than the first cut at which the two halves disagree by
//! more than a Hoeffding-style bound with a variance term.
//!
//! Reference:
//! Bifet, A. and Gavalda, R., 2007. Learning from time-changing data with
//! adaptive windowing. In Proceedings of the 2007 SIAM international
//! conference on data mining (pp. 443-448).

use std::fmt;

use tracing::debug;

use crate::error::{AdaptiveMeanError, Result};
use crate::stats::{Mean, Variance};
use crate::window::Window;

use super::WithoutDropping;

/// Count below which a scan partition is considered exhausted
const MIN_PARTITION_NOBS: f64 = 1e-9;

/// Observer invoked after each detected shift, with the post-prune estimator
pub type ShiftHandler = Box<dyn FnMut(&AdaptiveMean)>;

/// Adaptive-window mean estimator
///
/// Maintains a variable-length window over the stream whose length is
/// chosen by the change test: as long as the window looks stationary it
/// grows, and when a statistically significant difference appears between
/// an older and a newer part, the older part is discarded so the reported
/// mean tracks only the current regime.
///
/// Single writer: `fit` must not be called concurrently with itself, with
/// accessors, or from inside the shift callback.
pub struct AdaptiveMean {
    /// Target false-positive rate of the change test
    delta: f64,
    /// Bucketed window of live observations
    window: Window,
    /// Variance summary of every live observation
    aggregate: Variance,
    /// Observer notified after each prune
    on_shift: Option<ShiftHandler>,
    /// Whether the most recent fit pruned the window
    shift_detected: bool,
    /// Number of shifts detected so far
    n_shifts: u64,
    /// Observations discarded across all prunes
    n_dropped: u64,
}

impl Default for AdaptiveMean {
    fn default() -> Self {
        Self::unchecked(0.001)
    }
}

impl AdaptiveMean {
    /// Create a new estimator
    ///
    /// # Arguments
    ///
    /// * `delta` - Target false-positive rate of the change test, strictly
    ///   between 0 and 1. Smaller values make pruning rarer.
    pub fn new(delta: f64) -> Result<Self> {
        if !(delta > 0.0 && delta < 1.0) {
            return Err(AdaptiveMeanError::InvalidDelta(delta));
        }
        Ok(Self::unchecked(delta))
    }

    fn unchecked(delta: f64) -> Self {
        Self {
            delta,
            window: Window::new(),
            aggregate: Variance::new(),
            on_shift: None,
            shift_detected: false,
            n_shifts: 0,
            n_dropped: 0,
        }
    }

    /// Set the shift observer (default: no-op)
    ///
    /// The handler runs synchronously inside the `fit` that detected the
    /// shift, after the prune, and sees the post-prune state. Re-entering
    /// `fit` from the handler is a contract violation.
    pub fn with_on_shift(mut self, handler: impl FnMut(&AdaptiveMean) + 'static) -> Self {
        self.on_shift = Some(Box::new(handler));
        self
    }

    /// Ingest one sample
    ///
    /// Returns whether a distribution shift was detected, and the window
    /// pruned, during this call.
    ///
    /// # Errors
    ///
    /// Rejects non-finite samples.
    pub fn fit(&mut self, x: f64) -> Result<bool> {
        if !x.is_finite() {
            return Err(AdaptiveMeanError::NonFiniteSample(x));
        }
        self.shift_detected = false;
        self.absorb(x);

        if self.detect_and_prune() {
            self.shift_detected = true;
            self.n_shifts += 1;
            if let Some(mut handler) = self.on_shift.take() {
                handler(self);
                self.on_shift = Some(handler);
            }
        }
        Ok(self.shift_detected)
    }

    /// Absorb a finite sample into the window and the aggregate without
    /// running the change test
    pub(crate) fn absorb(&mut self, x: f64) {
        self.window.fit(x);
        self.aggregate.fit(x);
    }

    /// Walk the cut points of the window, pruning at the first one whose
    /// halves differ by more than the cutoff
    fn detect_and_prune(&mut self) -> bool {
        let n_total = self.aggregate.nobs();
        if n_total <= 1 {
            return false;
        }

        let delta_prime = self.delta / (n_total as f64).ln();
        let ln_term = (2.0 / delta_prime).ln();
        // Snapshot once per fit and reused at every cut.
        let sigma_sq = self.aggregate.variance();

        let mut right = Mean::from(&self.aggregate);
        let mut left = Mean::new();

        // Slot 0 holds at most the freshest sample; cutting there would
        // leave a one-point partition, so the scan starts at slot 1.
        for cut in 1..self.window.slots().len() {
            let slot = self.window.slots()[cut];
            if slot.is_empty() {
                continue;
            }
            right.remove(&slot);
            left.merge(&slot);
            if right.nobs() < MIN_PARTITION_NOBS {
                break;
            }

            let h = 1.0 / right.nobs() + 1.0 / left.nobs();
            let cutoff = (2.0 * h * sigma_sq * ln_term).sqrt() + 2.0 / 3.0 * h * ln_term;
            if (right.mean() - left.mean()).abs() > cutoff {
                let dropped = self.window.drop_older_than(cut);
                self.n_dropped += dropped;
                self.aggregate = self.window.merge_through(cut);
                debug!(
                    "shift at cut {}: dropped {} observations, {} remain",
                    cut,
                    dropped,
                    self.aggregate.nobs()
                );
                return true;
            }
        }
        false
    }

    /// Mean of the live window
    pub fn mean(&self) -> f64 {
        self.aggregate.mean()
    }

    /// Alias of [`mean`](Self::mean)
    pub fn value(&self) -> f64 {
        self.mean()
    }

    /// Number of live observations
    pub fn nobs(&self) -> u64 {
        self.aggregate.nobs()
    }

    /// Variance summary of the live window
    pub fn stats(&self) -> &Variance {
        &self.aggregate
    }

    /// Variance of the live window
    pub fn variance(&self) -> f64 {
        self.aggregate.variance()
    }

    /// Configured false-positive rate of the change test
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Whether the most recent `fit` detected a shift
    pub fn shift_detected(&self) -> bool {
        self.shift_detected
    }

    /// Number of shifts detected so far
    pub fn shifts(&self) -> u64 {
        self.n_shifts
    }

    /// Observations discarded across all prunes
    pub fn dropped(&self) -> u64 {
        self.n_dropped
    }

    /// Total observations ingested, including discarded ones
    pub fn samples_seen(&self) -> u64 {
        self.nobs() + self.n_dropped
    }

    /// The bucketed window backing the estimator
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Ingestion handle over the same state that compresses the window but
    /// never runs the change test
    pub fn without_dropping(&mut self) -> WithoutDropping<'_> {
        WithoutDropping::new(self)
    }

    /// Return to the freshly constructed state, keeping `delta` and the
    /// shift observer
    pub fn reset(&mut self) {
        self.window.clear();
        self.aggregate = Variance::new();
        self.shift_detected = false;
        self.n_shifts = 0;
        self.n_dropped = 0;
    }
}

impl fmt::Debug for AdaptiveMean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveMean")
            .field("delta", &self.delta)
            .field("nobs", &self.nobs())
            .field("mean", &self.mean())
            .field("shifts", &self.n_shifts)
            .field("dropped", &self.n_dropped)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_rejects_delta_outside_unit_interval() {
        for delta in [0.0, 1.0, -0.5, 2.0, f64::NAN] {
            assert!(matches!(
                AdaptiveMean::new(delta),
                Err(AdaptiveMeanError::InvalidDelta(_))
            ));
        }
        assert!(AdaptiveMean::new(0.002).is_ok());
    }

    #[test]
    fn test_default_delta() {
        let estimator = AdaptiveMean::default();
        assert_eq!(estimator.delta(), 0.001);
    }

    #[test]
    fn test_rejects_non_finite_samples() {
        let mut estimator = AdaptiveMean::new(0.002).unwrap();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                estimator.fit(bad),
                Err(AdaptiveMeanError::NonFiniteSample(_))
            ));
        }
        assert_eq!(estimator.nobs(), 0);
    }

    #[test]
    fn test_first_sample() {
        let mut estimator = AdaptiveMean::new(0.002).unwrap();
        let shifted = estimator.fit(7.5).unwrap();

        assert!(!shifted);
        assert_eq!(estimator.nobs(), 1);
        assert_eq!(estimator.mean(), 7.5);
        assert_eq!(estimator.value(), 7.5);
    }

    #[test]
    fn test_constant_stream_never_shifts() {
        let mut estimator = AdaptiveMean::new(0.002).unwrap();
        for _ in 0..100 {
            assert!(!estimator.fit(1.0).unwrap());
        }

        assert_eq!(estimator.shifts(), 0);
        assert_eq!(estimator.nobs(), 100);
        assert!((estimator.mean() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_change_triggers_shift() {
        let mut estimator = AdaptiveMean::new(0.002).unwrap();
        for _ in 0..500 {
            estimator.fit(0.0).unwrap();
        }
        let mut shifted = false;
        for _ in 0..500 {
            shifted |= estimator.fit(10.0).unwrap();
        }

        assert!(shifted);
        assert!(estimator.nobs() < 1000);
        assert_eq!(estimator.samples_seen(), 1000);
    }

    #[test]
    fn test_aggregate_matches_window_contents() {
        let mut estimator = AdaptiveMean::new(0.002).unwrap();
        for i in 0..2000 {
            let x = if i < 1000 { 0.0 } else { 5.0 };
            estimator.fit(x).unwrap();
        }

        let rebuilt = estimator
            .window()
            .merge_through(estimator.window().slots().len() - 1);
        assert_eq!(rebuilt.nobs(), estimator.nobs());
        assert!((rebuilt.mean() - estimator.mean()).abs() < 1e-9);
    }

    #[test]
    fn test_callback_sees_post_prune_state() {
        let seen: Rc<RefCell<Vec<(u64, f64)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut estimator = AdaptiveMean::new(0.002)
            .unwrap()
            .with_on_shift(move |est| {
                assert!(est.shift_detected());
                sink.borrow_mut().push((est.nobs(), est.mean()));
            });

        for _ in 0..800 {
            estimator.fit(0.0).unwrap();
        }
        for _ in 0..800 {
            estimator.fit(3.0).unwrap();
        }

        let seen = seen.borrow();
        assert_eq!(seen.len() as u64, estimator.shifts());
        assert!(!seen.is_empty());
        // Every prune discarded something, so the callback never saw the
        // full ingested count.
        for &(nobs, _) in seen.iter() {
            assert!(nobs > 0);
            assert!(nobs < 1600);
        }
    }

    #[test]
    fn test_shift_detected_resets_between_fits() {
        let mut estimator = AdaptiveMean::new(0.002).unwrap();
        for _ in 0..600 {
            estimator.fit(0.0).unwrap();
        }
        for _ in 0..600 {
            estimator.fit(8.0).unwrap();
        }
        assert!(estimator.shifts() >= 1);
        assert!((estimator.mean() - 8.0).abs() < 0.5);

        // The window now holds only the new regime, so one more quiet fit
        // leaves the flag clear.
        let shifted = estimator.fit(8.0).unwrap();
        assert!(!shifted);
        assert!(!estimator.shift_detected());
    }

    #[test]
    fn test_sample_accounting() {
        let mut estimator = AdaptiveMean::new(0.002).unwrap();
        for i in 0..3000 {
            let x = if (i / 750) % 2 == 0 { 0.0 } else { 4.0 };
            estimator.fit(x).unwrap();
        }

        assert_eq!(estimator.samples_seen(), 3000);
        assert_eq!(estimator.nobs() + estimator.dropped(), 3000);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut estimator = AdaptiveMean::new(0.002).unwrap();
        for _ in 0..500 {
            estimator.fit(0.0).unwrap();
        }
        for _ in 0..500 {
            estimator.fit(6.0).unwrap();
        }
        estimator.reset();

        assert_eq!(estimator.nobs(), 0);
        assert_eq!(estimator.mean(), 0.0);
        assert_eq!(estimator.shifts(), 0);
        assert_eq!(estimator.dropped(), 0);
        assert_eq!(estimator.delta(), 0.002);

        estimator.fit(2.0).unwrap();
        assert_eq!(estimator.nobs(), 1);
        assert_eq!(estimator.mean(), 2.0);
    }
}
