//! Gap-timed edge sampler firmware for RP2040.
//!
//! This crate provides the embedded implementation of an edge sampler that
//! decodes pulse-timing bitstreams (simple RF remotes, 433 MHz sensors) from
//! a receiver wired to a GPIO input.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Measures the min/max gap between edges on the input line
//! 2. Measures the block length between two end-of-block gaps
//! 3. Captures a block of exactly that length and decodes its fields
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | DATA IN  | 3    | Receiver data output |
//! | LED      | 25   | On-board LED (toggles per session) |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with two executors:
//!
//! - **Edge Task** (interrupt executor, high priority): waits for the bound
//!   edge and runs the sampler's edge handler inside a critical section
//! - **Session Task** (thread executor): starts and stops captures, polls
//!   for completion and logs the results over defmt/RTT
//!
//! The two communicate through the shared [`edge::CONTROLLER`] and the
//! [`edge::EDGE_COMMAND`] signal. See [`edge`] for the details.
//!
//! # Modules
//!
//! - [`config`]: Compile-time settings (thresholds, timeouts, field layout)
//! - [`plan`]: Pure capture planning and field decoding (host-testable)
//! - [`edge`]: Edge delivery, shared controller, clock and interrupt binding
//! - [`session`]: The characterize / measure / capture workflow
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`buffer-8k`**: 8192-bit capture buffer instead of 4096
//! - **`sample-on-falling`**: Trigger on falling edges instead of rising
//!
//! # Re-exports
//!
//! This crate re-exports the public items of [`sampler_core`] for
//! convenience, so consumers only need to depend on this crate.

#![cfg_attr(target_os = "none", no_std)]

// Ensure mutually exclusive panic handler features
#[cfg(all(feature = "dev-panic", feature = "prod-panic"))]
compile_error!("Cannot enable both `dev-panic` and `prod-panic` features - they define conflicting panic handlers");

// Re-export core types for convenience
pub use sampler_core::{
    Binary, BitDump, BitStore, CaptureSummary, ConfigError, Controller, Edge, EdgeInterrupt,
    EdgeOutcome, ExtractError, MicrosClock, PeriodTracker, SamplerState, Session, Strategy,
};

pub mod config;
pub mod plan;

#[cfg(target_os = "none")]
pub mod edge;
#[cfg(target_os = "none")]
pub mod session;

pub use plan::{CaptureError, Field};
