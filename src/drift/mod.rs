//! Distribution Shift Detection Module
//!
//! This module provides the adaptive-window mean estimator together with a
//! detector-free ingestion handle for side-by-side comparisons.

mod adaptive;
mod without_dropping;

pub use adaptive::{AdaptiveMean, ShiftHandler};
pub use without_dropping::WithoutDropping;
