//! One-shot view of the sampler's counters after a capture.

use core::fmt;

use crate::strategy::{SamplerState, Strategy};

/// Everything worth knowing about the last (or current) capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureSummary {
    pub strategy: Strategy,
    pub state: SamplerState,
    /// Bits held since the last rewind, at most the store capacity.
    pub bits: usize,
    /// Shortest gap in microseconds, `None` if no edge was processed.
    pub min_period: Option<u32>,
    /// Longest gap in microseconds, `None` if no edge was processed.
    pub max_period: Option<u32>,
    pub misfires: u32,
    pub restarts: u32,
    /// More bits arrived than the store holds; early bits were overwritten.
    pub overrun: bool,
}

impl CaptureSummary {
    /// True when the capture finished without wrapping the store.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(self.state, SamplerState::Finished) && !self.overrun
    }
}

impl fmt::Display for CaptureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {} bits", self.strategy, self.state, self.bits)?;
        if let (Some(min), Some(max)) = (self.min_period, self.max_period) {
            write!(f, ", period {min}..={max}us")?;
        }
        write!(
            f,
            ", misfires={}, restarts={}",
            self.misfires, self.restarts
        )?;
        if self.overrun {
            f.write_str(", OVERRUN")?;
        }
        Ok(())
    }
}
