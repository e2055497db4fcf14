//! Running minimum/maximum of inter-edge periods.

/// Tracks the shortest and longest gap seen since the last reset.
///
/// Purely diagnostic; the framing strategies never read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodTracker {
    min: u32,
    max: u32,
}

impl PeriodTracker {
    /// Create a tracker with no observations.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: u32::MAX,
            max: 0,
        }
    }

    /// Fold one period into the running extrema.
    #[inline]
    pub fn record(&mut self, period: u32) {
        if period < self.min {
            self.min = period;
        }
        if period > self.max {
            self.max = period;
        }
    }

    /// Forget all observations.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Shortest period, or `u32::MAX` when nothing has been recorded.
    #[inline]
    #[must_use]
    pub const fn min(&self) -> u32 {
        self.min
    }

    /// Longest period, or 0 when nothing has been recorded.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// True until the first period is recorded.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

impl Default for PeriodTracker {
    fn default() -> Self {
        Self::new()
    }
}
