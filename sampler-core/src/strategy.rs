//! Framing strategies and the state they share.

use core::fmt;

/// Which signal transition triggers the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// Map an "on rising" flag to an edge polarity.
    #[inline]
    #[must_use]
    pub const fn from_rising(on_rising: bool) -> Self {
        if on_rising {
            Edge::Rising
        } else {
            Edge::Falling
        }
    }
}

/// Sampler state shared by every strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerState {
    /// Waiting for the idle gap that marks the start of a block.
    SeekingFirstGap,
    /// Capturing bits until the block ends.
    SeekingSecondGap,
    /// Terminal. Further edges count as misfires.
    Finished,
}

impl SamplerState {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SamplerState::SeekingFirstGap => "SEEKING_FIRST_GAP",
            SamplerState::SeekingSecondGap => "SEEKING_SECOND_GAP",
            SamplerState::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for SamplerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A framing strategy together with its parameters.
///
/// `end_of_block` is in microseconds; a gap strictly longer than it is a
/// block boundary. `bits` is the number of bits to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Strategy {
    /// Only track period statistics. Never stores bits, never finishes.
    PeriodStatistics,
    /// Capture everything between two long gaps.
    GapDelimited { end_of_block: u32 },
    /// Capture `bits` bits starting with the first edge. A long gap
    /// restarts the capture.
    FixedCount { end_of_block: u32, bits: u16 },
    /// Wait for a long gap, then capture `bits` bits. A long gap during
    /// capture restarts it.
    SyncedFixedCount { end_of_block: u32, bits: u16 },
}

/// What a long gap in the capture phase does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LongGap {
    Terminate,
    Restart,
}

/// The per-strategy knobs of the shared transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Framing {
    pub end_of_block: u32,
    pub initial: SamplerState,
    pub long_gap: LongGap,
    pub target: Option<u16>,
}

impl Strategy {
    /// The state a freshly started sampler enters.
    #[must_use]
    pub const fn initial_state(&self) -> SamplerState {
        match self.framing() {
            Some(framing) => framing.initial,
            None => SamplerState::SeekingFirstGap,
        }
    }

    /// Number of bits that ends the capture, if the strategy has one.
    #[must_use]
    pub const fn target_bits(&self) -> Option<u16> {
        match *self {
            Strategy::FixedCount { bits, .. } | Strategy::SyncedFixedCount { bits, .. } => {
                Some(bits)
            }
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Strategy::PeriodStatistics => "period-statistics",
            Strategy::GapDelimited { .. } => "gap-delimited",
            Strategy::FixedCount { .. } => "fixed-count",
            Strategy::SyncedFixedCount { .. } => "synced-fixed-count",
        }
    }

    pub(crate) const fn framing(&self) -> Option<Framing> {
        match *self {
            Strategy::PeriodStatistics => None,
            Strategy::GapDelimited { end_of_block } => Some(Framing {
                end_of_block,
                initial: SamplerState::SeekingFirstGap,
                long_gap: LongGap::Terminate,
                target: None,
            }),
            Strategy::FixedCount { end_of_block, bits } => Some(Framing {
                end_of_block,
                initial: SamplerState::SeekingSecondGap,
                long_gap: LongGap::Restart,
                target: Some(bits),
            }),
            Strategy::SyncedFixedCount { end_of_block, bits } => Some(Framing {
                end_of_block,
                initial: SamplerState::SeekingFirstGap,
                long_gap: LongGap::Restart,
                target: Some(bits),
            }),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Strategy::PeriodStatistics => f.write_str(self.name()),
            Strategy::GapDelimited { end_of_block } => {
                write!(f, "{} (end of block > {}us)", self.name(), end_of_block)
            }
            Strategy::FixedCount { end_of_block, bits }
            | Strategy::SyncedFixedCount { end_of_block, bits } => write!(
                f,
                "{} ({} bits, end of block > {}us)",
                self.name(),
                bits,
                end_of_block
            ),
        }
    }
}
