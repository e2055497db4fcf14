//! The edge-driven framing state machine.
//!
//! [`Sampler::on_edge`] is the body of the edge interrupt. It has no loops
//! and no error path so its running time is bounded: it computes the gap
//! since the previous edge, folds it into the [`PeriodTracker`], and then
//! walks one step of the transition table selected by the active
//! [`Strategy`].

use crate::bits::BitStore;
use crate::period::PeriodTracker;
use crate::strategy::{Framing, LongGap, SamplerState, Strategy};

/// What a single edge did to the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// Edge consumed; keep the callback bound.
    Continue,
    /// The block is complete and the sampler is now finished. The edge
    /// callback must be unbound.
    Complete,
    /// The sampler was already finished; only the misfire counter moved.
    Misfire,
}

/// Framing state, timing state, counters and bit storage for one capture.
#[derive(Clone, Debug)]
pub struct Sampler<const BYTES: usize> {
    store: BitStore<BYTES>,
    periods: PeriodTracker,
    strategy: Strategy,
    state: SamplerState,
    last_timestamp: u32,
    misfires: u32,
    restarts: u32,
}

impl<const BYTES: usize> Sampler<BYTES> {
    /// Create an idle sampler. It starts out finished so that edges
    /// arriving before the first [`reset`](Self::reset) are misfires.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            store: BitStore::new(),
            periods: PeriodTracker::new(),
            strategy: Strategy::PeriodStatistics,
            state: SamplerState::Finished,
            last_timestamp: 0,
            misfires: 0,
            restarts: 0,
        }
    }

    /// Prepare for a new capture with `strategy`, treating `now` as the
    /// previous edge.
    ///
    /// Rewinds the cursor, resets the period extrema and counters. Stored
    /// bits are left in place; use [`BitStore::clear`] through
    /// [`store_mut`](Self::store_mut) to zero them.
    pub fn reset(&mut self, strategy: Strategy, now: u32) {
        self.store.rewind();
        self.periods.reset();
        self.strategy = strategy;
        self.state = strategy.initial_state();
        self.last_timestamp = now;
        self.misfires = 0;
        self.restarts = 0;
    }

    /// Force the terminal state. Counters are untouched.
    #[inline]
    pub fn finish(&mut self) {
        self.state = SamplerState::Finished;
    }

    /// Count an edge that must not be acted upon.
    #[inline]
    pub fn misfire(&mut self) -> EdgeOutcome {
        self.misfires = self.misfires.wrapping_add(1);
        EdgeOutcome::Misfire
    }

    /// Process one edge sampled at `now` (microseconds) with input `level`.
    pub fn on_edge(&mut self, now: u32, level: bool) -> EdgeOutcome {
        if self.state == SamplerState::Finished {
            return self.misfire();
        }

        let period = now.wrapping_sub(self.last_timestamp);
        self.periods.record(period);

        let Some(framing) = self.strategy.framing() else {
            self.last_timestamp = now;
            return EdgeOutcome::Continue;
        };
        let long_gap = period > framing.end_of_block;

        let outcome = match (self.state, long_gap) {
            (SamplerState::SeekingFirstGap, false) => EdgeOutcome::Continue,
            (SamplerState::SeekingFirstGap, true) => {
                self.state = SamplerState::SeekingSecondGap;
                self.capture(&framing, level)
            }
            (SamplerState::SeekingSecondGap, false) => self.capture(&framing, level),
            (SamplerState::SeekingSecondGap, true) => match framing.long_gap {
                LongGap::Terminate => {
                    // The closing gap is not an edge of this block.
                    self.state = SamplerState::Finished;
                    return EdgeOutcome::Complete;
                }
                LongGap::Restart => {
                    self.store.rewind();
                    self.restarts = self.restarts.wrapping_add(1);
                    self.capture(&framing, level)
                }
            },
            (SamplerState::Finished, _) => EdgeOutcome::Misfire,
        };

        self.last_timestamp = now;
        outcome
    }

    fn capture(&mut self, framing: &Framing, level: bool) -> EdgeOutcome {
        self.store.push(level);
        match framing.target {
            Some(target) if self.store.len() >= usize::from(target) => {
                self.state = SamplerState::Finished;
                EdgeOutcome::Complete
            }
            _ => EdgeOutcome::Continue,
        }
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> SamplerState {
        self.state
    }

    #[inline]
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self.state, SamplerState::Finished)
    }

    #[inline]
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[inline]
    #[must_use]
    pub const fn store(&self) -> &BitStore<BYTES> {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut BitStore<BYTES> {
        &mut self.store
    }

    #[inline]
    #[must_use]
    pub const fn periods(&self) -> &PeriodTracker {
        &self.periods
    }

    #[inline]
    #[must_use]
    pub const fn last_timestamp(&self) -> u32 {
        self.last_timestamp
    }

    #[inline]
    #[must_use]
    pub const fn misfires(&self) -> u32 {
        self.misfires
    }

    #[inline]
    #[must_use]
    pub const fn restarts(&self) -> u32 {
        self.restarts
    }
}

impl<const BYTES: usize> Default for Sampler<BYTES> {
    fn default() -> Self {
        Self::new()
    }
}
