//! Compile-time configuration for the sampler firmware.

use crate::plan::Field;

/// Bytes of capture buffer (capacity is eight bits per byte).
#[cfg(feature = "buffer-8k")]
pub const BUFFER_BYTES: usize = 1024;
/// Bytes of capture buffer (capacity is eight bits per byte).
#[cfg(not(feature = "buffer-8k"))]
pub const BUFFER_BYTES: usize = 512;

/// Sample on rising edges unless `sample-on-falling` is enabled.
pub const ON_RISING: bool = !cfg!(feature = "sample-on-falling");

/// Gaps longer than this (microseconds) separate blocks.
pub const END_OF_BLOCK_US: u32 = 4_000;

/// How long to collect period statistics before framing anything.
pub const CHARACTERIZE_MS: u64 = 2_000;

/// Give up on a capture that has not finished within this time.
pub const CAPTURE_TIMEOUT_MS: u64 = 5_000;

/// How often ordinary context polls for a finished capture.
pub const POLL_INTERVAL_MS: u64 = 10;

/// Pause between capture sessions.
pub const SESSION_PAUSE_MS: u64 = 1_000;

/// Fields decoded from every captured block.
///
/// The layout matches a common 433 MHz weather sensor frame; adjust it for
/// the transmitter being decoded.
pub const FIELDS: &[Field] = &[
    Field::unsigned("id", 0, 7),
    Field::unsigned("channel", 8, 11),
    Field::signed("temperature", 12, 23),
    Field::unsigned("humidity", 24, 31),
];
