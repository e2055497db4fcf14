//! Capture planning: turning one capture's result into the next one's
//! configuration, and decoding named fields out of a finished block.

use core::fmt;

use sampler_core::{
    BitStore, CaptureSummary, ConfigError, ExtractError, SamplerState, Strategy,
};

/// Error type for a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum CaptureError {
    /// The capture did not finish in time and was stopped.
    Timeout,
    /// A gap-delimited measurement produced no bits.
    EmptyBlock,
    /// The measurement did not run to completion.
    Unfinished,
    /// The measured block does not fit a fixed-count capture.
    Config(ConfigError),
    /// A field could not be read from the block.
    Extract(ExtractError),
}

impl From<ConfigError> for CaptureError {
    fn from(err: ConfigError) -> Self {
        CaptureError::Config(err)
    }
}

impl From<ExtractError> for CaptureError {
    fn from(err: ExtractError) -> Self {
        CaptureError::Extract(err)
    }
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Timeout => f.write_str("capture timed out"),
            CaptureError::EmptyBlock => f.write_str("measured block is empty"),
            CaptureError::Unfinished => f.write_str("measurement did not finish"),
            CaptureError::Config(e) => write!(f, "invalid capture configuration: {e}"),
            CaptureError::Extract(e) => write!(f, "field extraction failed: {e}"),
        }
    }
}

/// Build the synced fixed-count capture for a block whose length was
/// measured with [`Strategy::GapDelimited`].
///
/// # Errors
///
/// - [`CaptureError::Unfinished`] if the measurement never saw its closing gap.
/// - [`CaptureError::EmptyBlock`] if no bits were captured.
/// - [`CaptureError::Config`] if the block overran the store or its bit
///   count does not fit in a `u16`.
pub fn synced_capture(
    measured: &CaptureSummary,
    end_of_block: u32,
) -> Result<Strategy, CaptureError> {
    if measured.state != SamplerState::Finished {
        return Err(CaptureError::Unfinished);
    }
    if measured.bits == 0 {
        return Err(CaptureError::EmptyBlock);
    }
    if measured.overrun {
        return Err(ConfigError::BitCountExceedsCapacity.into());
    }
    let bits =
        u16::try_from(measured.bits).map_err(|_| ConfigError::BitCountExceedsCapacity)?;
    Ok(Strategy::SyncedFixedCount { end_of_block, bits })
}

/// A named bit range inside a captured block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub from: usize,
    pub to: usize,
    pub signed: bool,
}

impl Field {
    #[must_use]
    pub const fn unsigned(name: &'static str, from: usize, to: usize) -> Self {
        Self {
            name,
            from,
            to,
            signed: false,
        }
    }

    #[must_use]
    pub const fn signed(name: &'static str, from: usize, to: usize) -> Self {
        Self {
            name,
            from,
            to,
            signed: true,
        }
    }

    /// Number of bits the field spans, 0 for a reversed range.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn width(&self) -> u32 {
        self.to.saturating_add(1).saturating_sub(self.from) as u32
    }

    /// Read the field, sign-extending signed fields to 32 bits.
    ///
    /// # Errors
    ///
    /// See [`BitStore::extract`].
    pub fn read<const BYTES: usize>(&self, store: &BitStore<BYTES>) -> Result<u32, ExtractError> {
        store.extract(self.from, self.to, self.signed)
    }

    /// The field as a signed integer. Only meaningful for signed fields.
    ///
    /// # Errors
    ///
    /// See [`BitStore::extract`].
    #[allow(clippy::cast_possible_wrap)]
    pub fn read_signed<const BYTES: usize>(
        &self,
        store: &BitStore<BYTES>,
    ) -> Result<i32, ExtractError> {
        self.read(store).map(|raw| raw as i32)
    }
}
