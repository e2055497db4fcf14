//! Controller: owns the sampler and its interrupt binding lifecycle.

use embedded_hal::digital::InputPin;

use crate::bits::{BitStore, ExtractError};
use crate::hal::{EdgeInterrupt, MicrosClock, Session};
use crate::sampler::{EdgeOutcome, Sampler};
use crate::strategy::{Edge, SamplerState, Strategy};
use crate::summary::CaptureSummary;

/// Error type for starting a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A fixed-count strategy was asked for zero bits.
    ZeroBitCount,
    /// The bit count does not fit in the bit store.
    BitCountExceedsCapacity,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ZeroBitCount => f.write_str("bit count must be at least 1"),
            ConfigError::BitCountExceedsCapacity => {
                f.write_str("bit count exceeds bit store capacity")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// Binds a [`Sampler`] to an edge interrupt and a clock.
///
/// All methods take `&mut self`: whoever shares the controller between the
/// edge handler and ordinary code must provide the exclusion (on a
/// microcontroller, a critical section). Readers such as
/// [`extract`](Self::extract) should only be used once
/// [`is_finished`](Self::is_finished) is true.
///
/// # Example
///
/// ```
/// use core::convert::Infallible;
/// use core::cell::Cell;
/// use embedded_hal::digital::{ErrorType, InputPin};
/// use sampler_core::{Controller, Edge, EdgeInterrupt, MicrosClock, Session};
///
/// struct Clock<'a>(&'a Cell<u32>);
/// impl MicrosClock for Clock<'_> {
///     fn now_micros(&self) -> u32 { self.0.get() }
/// }
///
/// struct Irq;
/// impl EdgeInterrupt for Irq {
///     fn bind(&mut self, _edge: Edge, _session: Session) {}
///     fn unbind(&mut self) {}
/// }
///
/// struct Pin(bool);
/// impl ErrorType for Pin { type Error = Infallible; }
/// impl InputPin for Pin {
///     fn is_high(&mut self) -> Result<bool, Infallible> { Ok(self.0) }
///     fn is_low(&mut self) -> Result<bool, Infallible> { Ok(!self.0) }
/// }
///
/// let time = Cell::new(0);
/// let mut controller = Controller::<_, _, 512>::new(Irq, Clock(&time));
/// let session = controller.start_gap_delimited(1000, true);
///
/// for (t, level) in [(1500, true), (1600, false), (1700, true), (3000, false)] {
///     time.set(t);
///     controller.on_edge(session, &mut Pin(level));
/// }
///
/// assert!(controller.is_finished());
/// assert_eq!(controller.extract(0, 2, false), Ok(0b101));
/// ```
pub struct Controller<I, C, const BYTES: usize> {
    sampler: Sampler<BYTES>,
    irq: I,
    clock: C,
    session: Session,
}

impl<I: EdgeInterrupt, C: MicrosClock, const BYTES: usize> Controller<I, C, BYTES> {
    /// Create an idle controller. Nothing is bound until a start call.
    #[must_use]
    pub const fn new(irq: I, clock: C) -> Self {
        Self {
            sampler: Sampler::new(),
            irq,
            clock,
            session: Session(0),
        }
    }

    /// Reset all capture state and bind the edge handler for `strategy`.
    ///
    /// Any capture in progress is abandoned. Returns the session tag the
    /// edge handler must pass to [`on_edge`](Self::on_edge).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a fixed-count strategy asks for zero bits
    /// or for more bits than the store holds. Nothing is reset or bound in
    /// that case.
    pub fn start(&mut self, strategy: Strategy, edge: Edge) -> Result<Session, ConfigError> {
        if let Some(bits) = strategy.target_bits() {
            if bits == 0 {
                return Err(ConfigError::ZeroBitCount);
            }
            if usize::from(bits) > BitStore::<BYTES>::CAPACITY {
                return Err(ConfigError::BitCountExceedsCapacity);
            }
        }

        Ok(self.arm(strategy, edge))
    }

    /// Strategy A: collect period statistics only.
    pub fn start_period_statistics(&mut self, on_rising: bool) -> Session {
        self.arm(Strategy::PeriodStatistics, Edge::from_rising(on_rising))
    }

    /// Strategy B: capture every bit between two gaps longer than
    /// `end_of_block` microseconds.
    pub fn start_gap_delimited(&mut self, end_of_block: u32, on_rising: bool) -> Session {
        self.arm(
            Strategy::GapDelimited { end_of_block },
            Edge::from_rising(on_rising),
        )
    }

    /// Strategy C: capture `bits` bits immediately, restarting on a long gap.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub fn start_fixed_count(
        &mut self,
        end_of_block: u32,
        bits: u16,
        on_rising: bool,
    ) -> Result<Session, ConfigError> {
        self.start(
            Strategy::FixedCount { end_of_block, bits },
            Edge::from_rising(on_rising),
        )
    }

    /// Strategy D: wait for a long gap, then capture `bits` bits,
    /// restarting on a long gap.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub fn start_synced_fixed_count(
        &mut self,
        end_of_block: u32,
        bits: u16,
        on_rising: bool,
    ) -> Result<Session, ConfigError> {
        self.start(
            Strategy::SyncedFixedCount { end_of_block, bits },
            Edge::from_rising(on_rising),
        )
    }

    fn arm(&mut self, strategy: Strategy, edge: Edge) -> Session {
        self.irq.unbind();
        self.session = self.session.next();
        self.sampler.reset(strategy, self.clock.now_micros());
        self.irq.bind(edge, self.session);
        self.session
    }

    /// Unbind the edge handler and force the finished state. Idempotent.
    pub fn stop(&mut self) {
        self.irq.unbind();
        self.sampler.finish();
    }

    /// Edge handler body: sample the pin and clock, then advance the
    /// state machine. Unbinds itself when the capture completes.
    ///
    /// Edges tagged with a session other than the current one are counted
    /// as misfires. A pin read error is taken as a low level.
    pub fn on_edge<P: InputPin>(&mut self, session: Session, pin: &mut P) -> EdgeOutcome {
        let level = pin.is_high().unwrap_or(false);
        let now = self.clock.now_micros();

        if session != self.session {
            return self.sampler.misfire();
        }

        let outcome = self.sampler.on_edge(now, level);
        if outcome == EdgeOutcome::Complete {
            self.irq.unbind();
        }
        outcome
    }

    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.sampler.is_finished()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SamplerState {
        self.sampler.state()
    }

    /// Tag of the most recent start.
    #[inline]
    #[must_use]
    pub fn session(&self) -> Session {
        self.session
    }

    /// Assemble bits `[from, to]` of the captured block.
    ///
    /// # Errors
    ///
    /// See [`BitStore::extract`].
    pub fn extract(&self, from: usize, to: usize, sign_extend: bool) -> Result<u32, ExtractError> {
        self.sampler.store().extract(from, to, sign_extend)
    }

    /// Zero the bit store. Diagnostic use only; do not call mid-capture.
    pub fn clear(&mut self) {
        self.sampler.store_mut().clear();
    }

    #[must_use]
    pub fn summary(&self) -> CaptureSummary {
        let periods = self.sampler.periods();
        let (min_period, max_period) = if periods.is_empty() {
            (None, None)
        } else {
            (Some(periods.min()), Some(periods.max()))
        };

        CaptureSummary {
            strategy: self.sampler.strategy(),
            state: self.sampler.state(),
            bits: self.sampler.store().len(),
            min_period,
            max_period,
            misfires: self.sampler.misfires(),
            restarts: self.sampler.restarts(),
            overrun: self.sampler.store().overrun(),
        }
    }

    #[inline]
    #[must_use]
    pub fn sampler(&self) -> &Sampler<BYTES> {
        &self.sampler
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &BitStore<BYTES> {
        self.sampler.store()
    }

    #[inline]
    pub fn irq_mut(&mut self) -> &mut I {
        &mut self.irq
    }

    #[inline]
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum IrqCall {
        Bind(Edge, Session),
        Unbind,
    }

    #[derive(Default)]
    struct MockIrq {
        calls: Vec<IrqCall>,
    }

    impl EdgeInterrupt for MockIrq {
        fn bind(&mut self, edge: Edge, session: Session) {
            self.calls.push(IrqCall::Bind(edge, session));
        }

        fn unbind(&mut self) {
            self.calls.push(IrqCall::Unbind);
        }
    }

    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<u32>>);

    impl MicrosClock for ManualClock {
        fn now_micros(&self) -> u32 {
            self.0.get()
        }
    }

    struct MockPin(bool);

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }

    type TestController = Controller<MockIrq, ManualClock, 16>;

    fn controller() -> (TestController, ManualClock) {
        let clock = ManualClock::default();
        (Controller::new(MockIrq::default(), clock.clone()), clock)
    }

    #[test]
    fn test_start_binds_with_new_session() {
        let (mut controller, clock) = controller();
        clock.0.set(5000);

        let first = controller.start_period_statistics(true);
        let second = controller.start_gap_delimited(100, false);
        assert_ne!(first, second);
        assert_eq!(
            controller.irq_mut().calls,
            [
                IrqCall::Unbind,
                IrqCall::Bind(Edge::Rising, first),
                IrqCall::Unbind,
                IrqCall::Bind(Edge::Falling, second),
            ]
        );
        assert_eq!(controller.sampler().last_timestamp(), 5000);
        assert_eq!(controller.state(), SamplerState::SeekingFirstGap);
    }

    #[test]
    fn test_start_rejects_bad_bit_counts() {
        let (mut controller, _) = controller();
        assert_eq!(
            controller.start_fixed_count(100, 0, true),
            Err(ConfigError::ZeroBitCount)
        );
        assert_eq!(
            controller.start_synced_fixed_count(100, 129, true),
            Err(ConfigError::BitCountExceedsCapacity)
        );
        assert!(controller.start_synced_fixed_count(100, 128, true).is_ok());
        // Only the successful start touched the interrupt.
        assert_eq!(controller.irq_mut().calls.len(), 2);
    }

    #[test]
    fn test_full_capacity_count_completes() {
        let (mut controller, clock) = controller();
        let capacity = BitStore::<16>::CAPACITY;
        let session = controller
            .start_fixed_count(500, 128, true)
            .expect("capacity fits");

        let mut outcomes = Vec::new();
        for i in 0..capacity {
            clock.0.set(100 * (i as u32 + 1));
            outcomes.push(controller.on_edge(session, &mut MockPin(i % 3 == 0)));
        }

        assert_eq!(outcomes.last(), Some(&EdgeOutcome::Complete));
        assert!(outcomes[..capacity - 1]
            .iter()
            .all(|&o| o == EdgeOutcome::Continue));
        assert!(controller.is_finished());
        assert_eq!(controller.irq_mut().calls.last(), Some(&IrqCall::Unbind));

        let summary = controller.summary();
        assert_eq!(summary.bits, capacity);
        assert!(!summary.overrun);
        // bits 120..=127: indices divisible by 3 are 120 and 123 and 126
        assert_eq!(controller.extract(120, 127, false), Ok(0b0100_1001));
    }

    #[test]
    fn test_complete_unbinds() {
        let (mut controller, clock) = controller();
        let session = controller
            .start_fixed_count(500, 2, true)
            .expect("valid config");
        controller.irq_mut().calls.clear();

        clock.0.set(100);
        assert_eq!(
            controller.on_edge(session, &mut MockPin(true)),
            EdgeOutcome::Continue
        );
        clock.0.set(200);
        assert_eq!(
            controller.on_edge(session, &mut MockPin(false)),
            EdgeOutcome::Complete
        );
        assert_eq!(controller.irq_mut().calls, [IrqCall::Unbind]);
        assert!(controller.is_finished());
        assert_eq!(controller.extract(0, 1, false), Ok(0b01));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut controller, _) = controller();
        controller.start_period_statistics(true);

        controller.stop();
        let after_first = controller.summary();
        controller.stop();
        let after_second = controller.summary();

        assert!(controller.is_finished());
        assert_eq!(after_first, after_second);
        assert_eq!(after_second.misfires, 0);
        assert_eq!(after_second.restarts, 0);
    }

    #[test]
    fn test_edge_after_stop_is_misfire() {
        let (mut controller, clock) = controller();
        let session = controller.start_gap_delimited(1000, true);
        controller.stop();

        clock.0.set(5000);
        assert_eq!(
            controller.on_edge(session, &mut MockPin(true)),
            EdgeOutcome::Misfire
        );
        assert_eq!(controller.summary().misfires, 1);
    }

    #[test]
    fn test_stale_session_is_misfire() {
        let (mut controller, clock) = controller();
        let stale = controller.start_gap_delimited(1000, true);
        let current = controller.start_gap_delimited(1000, true);

        clock.0.set(2000);
        assert_eq!(
            controller.on_edge(stale, &mut MockPin(true)),
            EdgeOutcome::Misfire
        );
        assert_eq!(controller.store().cursor(), 0);
        assert!(controller.summary().min_period.is_none());

        assert_eq!(
            controller.on_edge(current, &mut MockPin(true)),
            EdgeOutcome::Continue
        );
        assert_eq!(controller.store().cursor(), 1);
        assert_eq!(controller.summary().misfires, 1);
    }

    #[test]
    fn test_summary_reports_periods() {
        let (mut controller, clock) = controller();
        let session = controller.start_period_statistics(false);
        assert_eq!(controller.summary().min_period, None);

        for t in [250, 400, 1400] {
            clock.0.set(t);
            controller.on_edge(session, &mut MockPin(false));
        }
        let summary = controller.summary();
        assert_eq!(summary.min_period, Some(150));
        assert_eq!(summary.max_period, Some(1000));
        assert_eq!(summary.state, SamplerState::SeekingFirstGap);
        assert_eq!(summary.bits, 0);
    }
}
