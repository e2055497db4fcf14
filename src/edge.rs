//! GPIO edge delivery for the sampler.
//!
//! The edge "interrupt handler" is an Embassy task running on a high
//! priority [`InterruptExecutor`](embassy_executor::InterruptExecutor). It
//! waits for the bound edge on the input pin and runs
//! [`Controller::on_edge`] inside a critical section, so ordinary-context
//! code holding the same lock can never observe a half-applied edge.
//!
//! Binding and unbinding travel over [`EDGE_COMMAND`] with "latest value
//! wins" semantics. A [`BOUND`] flag mirrors the binding so
//! [`is_finished`] can be polled without taking the lock.

use core::cell::RefCell;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::Instant;
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use portable_atomic::{AtomicBool, Ordering};
use sampler_core::{Controller, Edge, EdgeInterrupt, EdgeOutcome, MicrosClock, Session};

use crate::config::BUFFER_BYTES;

/// Controller type used by the firmware.
pub type SamplerController = Controller<SignalIrq, EmbassyClock, BUFFER_BYTES>;

/// The controller shared between the edge task and ordinary tasks.
pub type SharedController = Mutex<CriticalSectionRawMutex, RefCell<SamplerController>>;

/// Binding requests for the edge task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum EdgeCommand {
    Bind(Edge, Session),
    Unbind,
}

/// Signal carrying the latest binding request to the edge task.
pub static EDGE_COMMAND: Signal<CriticalSectionRawMutex, EdgeCommand> = Signal::new();

/// True while an edge handler is bound.
pub static BOUND: AtomicBool = AtomicBool::new(false);

/// The firmware's single sampler instance.
pub static CONTROLLER: SharedController =
    Mutex::new(RefCell::new(Controller::new(SignalIrq, EmbassyClock)));

/// Lock-free view of the capture state for polling loops.
#[inline]
#[must_use]
pub fn is_finished() -> bool {
    !BOUND.load(Ordering::Acquire)
}

/// Run `f` with exclusive access to the controller.
///
/// Interrupts are masked for the duration, so keep `f` short.
pub fn with_controller<R>(f: impl FnOnce(&mut SamplerController) -> R) -> R {
    CONTROLLER.lock(|cell| f(&mut cell.borrow_mut()))
}

/// [`EdgeInterrupt`] that forwards requests to the edge task.
pub struct SignalIrq;

impl EdgeInterrupt for SignalIrq {
    fn bind(&mut self, edge: Edge, session: Session) {
        BOUND.store(true, Ordering::Release);
        EDGE_COMMAND.signal(EdgeCommand::Bind(edge, session));
    }

    fn unbind(&mut self) {
        BOUND.store(false, Ordering::Release);
        EDGE_COMMAND.signal(EdgeCommand::Unbind);
    }
}

/// Microsecond clock backed by the Embassy time driver.
pub struct EmbassyClock;

impl MicrosClock for EmbassyClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_micros(&self) -> u32 {
        // Truncation gives the wrapping u32 counter the sampler expects.
        Instant::now().as_micros() as u32
    }
}

/// Deliver edges from `pin` to `controller` forever.
///
/// Waits for a bind request, then for the bound edge. A new request
/// replaces the current binding immediately. An edge that races an unbind
/// still reaches the controller, which counts it as a misfire.
pub async fn watch_edges<P>(pin: &mut P, controller: &'static SharedController) -> !
where
    P: InputPin + Wait,
{
    let mut binding: Option<(Edge, Session)> = None;

    loop {
        let Some((edge, session)) = binding else {
            binding = into_binding(EDGE_COMMAND.wait().await);
            continue;
        };

        let next_edge = async {
            match edge {
                Edge::Rising => pin.wait_for_rising_edge().await,
                Edge::Falling => pin.wait_for_falling_edge().await,
            }
        };

        match select(next_edge, EDGE_COMMAND.wait()).await {
            Either::First(Ok(())) => {
                let outcome =
                    controller.lock(|cell| cell.borrow_mut().on_edge(session, &mut *pin));
                if outcome == EdgeOutcome::Complete {
                    binding = None;
                }
            }
            // Pin wait errors leave the binding in place and retry.
            Either::First(Err(_)) => {}
            Either::Second(command) => binding = into_binding(command),
        }
    }
}

fn into_binding(command: EdgeCommand) -> Option<(Edge, Session)> {
    match command {
        EdgeCommand::Bind(edge, session) => Some((edge, session)),
        EdgeCommand::Unbind => None,
    }
}
