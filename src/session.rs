//! Ordinary-context capture workflow: characterize, measure, capture.

use defmt::{info, warn, Display2Format};
use embassy_time::{with_timeout, Duration, Timer};
use sampler_core::{BitDump, Binary, CaptureSummary, Edge, Strategy};

use crate::config::{
    CAPTURE_TIMEOUT_MS, CHARACTERIZE_MS, END_OF_BLOCK_US, FIELDS, ON_RISING, POLL_INTERVAL_MS,
};
use crate::edge::{is_finished, with_controller};
use crate::plan::{synced_capture, CaptureError};

/// Collect period statistics for the characterization window.
pub async fn characterize() -> CaptureSummary {
    with_controller(|c| c.start_period_statistics(ON_RISING));
    Timer::after(Duration::from_millis(CHARACTERIZE_MS)).await;

    let summary = with_controller(|c| {
        c.stop();
        c.summary()
    });
    info!("signal timing: {}", summary);
    summary
}

/// Run `strategy` until it finishes or the capture timeout expires.
///
/// # Errors
///
/// [`CaptureError::Config`] for an invalid strategy, [`CaptureError::Timeout`]
/// if the capture had to be stopped.
pub async fn capture(strategy: Strategy) -> Result<CaptureSummary, CaptureError> {
    with_controller(|c| c.start(strategy, Edge::from_rising(ON_RISING)))?;

    let finished = with_timeout(Duration::from_millis(CAPTURE_TIMEOUT_MS), async {
        while !is_finished() {
            Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
        }
    })
    .await;

    let summary = with_controller(|c| {
        if finished.is_err() {
            c.stop();
        }
        c.summary()
    });

    if finished.is_err() {
        warn!("capture timed out: {}", summary);
        return Err(CaptureError::Timeout);
    }
    if summary.restarts > 0 {
        warn!("capture resynchronised {} times", summary.restarts);
    }
    if summary.overrun {
        warn!("capture overran the bit store");
    }
    Ok(summary)
}

/// One full session: characterize the line, measure the block length with
/// a gap-delimited capture, then capture a block of exactly that length and
/// decode the configured fields.
///
/// # Errors
///
/// Any [`CaptureError`] from the individual steps.
#[allow(clippy::cast_possible_wrap)]
pub async fn run_session() -> Result<(), CaptureError> {
    characterize().await;

    let measured = capture(Strategy::GapDelimited {
        end_of_block: END_OF_BLOCK_US,
    })
    .await?;
    info!("measured block: {}", measured);

    let strategy = synced_capture(&measured, END_OF_BLOCK_US)?;
    let block = capture(strategy).await?;
    info!("captured block: {}", block);

    // The capture is finished and unbound; copy the block out so logging
    // does not run with interrupts masked.
    let store = with_controller(|c| c.store().clone());
    info!("bits: {}", Display2Format(&BitDump::written(&store)));
    for field in FIELDS {
        let width = field.width();
        match field.read(&store) {
            Ok(value) if field.signed => info!(
                "{} = {} ({})",
                field.name,
                value as i32,
                Display2Format(&Binary::new(value, width))
            ),
            Ok(value) => info!(
                "{} = {} ({})",
                field.name,
                value,
                Display2Format(&Binary::new(value, width))
            ),
            Err(e) => warn!("{}: {}", field.name, e),
        }
    }

    Ok(())
}
