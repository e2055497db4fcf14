//! Platform-agnostic gap-timed edge sampler.
//!
//! This crate decodes a bitstream from a single digital input where the
//! duration of the gap between consecutive edges carries the framing: a gap
//! longer than the configured *end of block* period marks a block boundary,
//! and every other edge contributes one bit, the pin level sampled at that
//! edge. It can be used both in embedded `no_std` environments and on host
//! for testing.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`bits`]: Circular bit storage and range extraction ([`BitStore`])
//! - [`period`]: Running min/max of edge gaps ([`PeriodTracker`])
//! - [`strategy`]: Framing strategies and shared state ([`Strategy`], [`SamplerState`])
//! - [`sampler`]: The per-edge state machine ([`Sampler`])
//! - [`hal`]: Clock and interrupt binding traits ([`MicrosClock`], [`EdgeInterrupt`])
//! - [`controller`]: Start/stop lifecycle and the edge handler body ([`Controller`])
//! - [`summary`]: Post-capture report ([`CaptureSummary`])
//! - [`diag`]: Text renderings of bits ([`BitDump`], [`Binary`])
//!
//! # Strategies
//!
//! | Strategy | Sync on long gap first | Long gap while capturing | Ends when |
//! |---|---|---|---|
//! | [`Strategy::PeriodStatistics`] | - | - | stopped |
//! | [`Strategy::GapDelimited`] | yes | ends the block | second long gap |
//! | [`Strategy::FixedCount`] | no | restarts capture | bit count reached |
//! | [`Strategy::SyncedFixedCount`] | yes | restarts capture | bit count reached |
//!
//! A gap equal to the end of block period is still inside the block.
//!
//! # Interrupt Context
//!
//! [`Controller::on_edge`] is meant to run as the edge interrupt handler.
//! It never loops or allocates. Misfires (edges after the capture finished
//! or from a stale [`Session`]) and restarts are counted, never reported as
//! errors. Only ordinary-context operations such as [`Controller::extract`]
//! and [`Controller::start`] return `Result`.
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations,
//! making it suitable for embedded systems with limited resources.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod bits;
pub mod controller;
pub mod diag;
pub mod hal;
pub mod period;
pub mod sampler;
pub mod strategy;
pub mod summary;

// Re-export main types at crate root
pub use bits::{BitStore, BitStore4k, BitStore8k, ExtractError, MAX_EXTRACT_WIDTH};
pub use controller::{ConfigError, Controller};
pub use diag::{Binary, BitDump};
pub use hal::{EdgeInterrupt, MicrosClock, Session};
pub use period::PeriodTracker;
pub use sampler::{EdgeOutcome, Sampler};
pub use strategy::{Edge, SamplerState, Strategy};
pub use summary::CaptureSummary;
