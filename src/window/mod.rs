//! Bucketed Window Compression
//!
//! Stores the live window as rows of fixed-capacity variance summaries so
//! that the whole history compresses into constant space per decade of age.
//! Row `r` holds summaries of up to `2^r` samples, [`SLOTS_PER_ROW`] slots
//! per row; rows are appended on demand and never removed.

use std::mem;

use tracing::trace;

use crate::stats::Variance;

/// Number of bucket slots in each row
pub const SLOTS_PER_ROW: usize = 5;

/// Geometrically bucketed sample window
///
/// Slots are flattened in row-major order: row `r` occupies indices
/// `r * SLOTS_PER_ROW .. (r + 1) * SLOTS_PER_ROW` and age increases with
/// the index. Slot 0 is the write slot and holds at most the freshest
/// sample. An empty slot is an ordinary gap, not a tombstone.
#[derive(Debug, Clone)]
pub struct Window {
    slots: Vec<Variance>,
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

impl Window {
    /// Create a window with a single row of empty summaries
    pub fn new() -> Self {
        Self {
            slots: vec![Variance::new(); SLOTS_PER_ROW],
        }
    }

    /// Ingest one sample
    ///
    /// Pending content is carried out of the write slot first, then the
    /// sample is fit into it, so the freshest observation is always alone
    /// in slot 0.
    pub fn fit(&mut self, x: f64) {
        self.compress(0);
        self.slots[0].fit(x);
    }

    /// Cascaded carry that frees the write slot of `row`
    ///
    /// Rotating the row one step right delivers its oldest slot to
    /// position 0 without any allocation. If that slot is empty the carry
    /// is absorbed. Otherwise the row overflowed: row 0 sheds its oldest
    /// single-sample bucket unchanged, deeper rows pair their two oldest
    /// buckets into one. Either way the promoted bucket lands as a fresh
    /// bucket in the freed write slot of the next row.
    fn compress(&mut self, row: usize) {
        let base = row * SLOTS_PER_ROW;
        if self.slots[base].is_empty() {
            return;
        }
        self.slots[base..base + SLOTS_PER_ROW].rotate_right(1);
        if self.slots[base].is_empty() {
            return;
        }
        let promoted = if row == 0 {
            mem::take(&mut self.slots[base])
        } else {
            let oldest = mem::take(&mut self.slots[base]);
            let mut pair = mem::take(&mut self.slots[base + SLOTS_PER_ROW - 1]);
            pair.merge(&oldest);
            pair
        };
        if (row + 1) * SLOTS_PER_ROW >= self.slots.len() {
            self.slots
                .resize(self.slots.len() + SLOTS_PER_ROW, Variance::new());
            trace!("window grew to {} rows", self.n_rows());
        }
        self.compress(row + 1);
        self.slots[(row + 1) * SLOTS_PER_ROW] = promoted;
    }

    /// All slots in row-major order, newest first
    pub fn slots(&self) -> &[Variance] {
        &self.slots
    }

    /// Number of allocated rows
    pub fn n_rows(&self) -> usize {
        self.slots.len() / SLOTS_PER_ROW
    }

    /// Clear every slot strictly older than `cut`
    ///
    /// Returns the number of observations discarded.
    pub fn drop_older_than(&mut self, cut: usize) -> u64 {
        let mut dropped = 0;
        for slot in &mut self.slots[cut + 1..] {
            dropped += slot.nobs();
            *slot = Variance::new();
        }
        dropped
    }

    /// Merge of slots `0..=cut`
    pub fn merge_through(&self, cut: usize) -> Variance {
        let mut agg = Variance::new();
        for slot in &self.slots[..=cut] {
            agg.merge(slot);
        }
        agg
    }

    /// Drop all content, keeping a single empty row
    pub fn clear(&mut self) {
        self.slots.clear();
        self.slots.resize(SLOTS_PER_ROW, Variance::new());
    }
}
