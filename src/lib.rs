//! Adaptive Windowing Mean Estimator
//!
//! This library maintains an online estimate of the mean of a real-valued
//! data stream whose underlying distribution may shift over time, following
//! the ADWIN2 adaptive windowing scheme of Bifet and Gavaldà. When a
//! statistically significant shift is detected, observations predating the
//! shift are discarded so that the reported mean tracks only the current
//! regime.
//!
//! # Modules
//!
//! - `drift` - Adaptive mean estimator with shift detection and pruning
//! - `stats` - Mergeable streaming summaries (mean, variance)
//! - `window` - Geometrically bucketed window compression
//! - `error` - Error types
//!
//! # Example
//!
//! ```rust
//! use adaptive_mean::AdaptiveMean;
//!
//! let mut estimator = AdaptiveMean::new(0.002)
//!     .unwrap()
//!     .with_on_shift(|est| println!("shift detected, {} observations kept", est.nobs()));
//!
//! for _ in 0..500 {
//!     estimator.fit(1.0).unwrap();
//! }
//! for _ in 0..500 {
//!     estimator.fit(9.0).unwrap();
//! }
//!
//! // The old regime has been pruned away.
//! assert!(estimator.shifts() >= 1);
//! assert!((estimator.mean() - 9.0).abs() < 0.5);
//! ```

pub mod drift;
pub mod error;
pub mod stats;
pub mod window;

// Re-export commonly used types
pub use drift::{AdaptiveMean, ShiftHandler, WithoutDropping};
pub use error::{AdaptiveMeanError, Result};
pub use stats::{Mean, Variance};
pub use window::{Window, SLOTS_PER_ROW};
