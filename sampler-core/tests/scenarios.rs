//! End-to-end capture scenarios driven through the public controller API.

use core::cell::Cell;
use core::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin};
use sampler_core::{
    Controller, Edge, EdgeInterrupt, EdgeOutcome, ExtractError, MicrosClock, SamplerState,
    Session,
};

#[derive(Default)]
struct RecordingIrq {
    bound: Option<(Edge, Session)>,
    unbinds: usize,
}

impl EdgeInterrupt for RecordingIrq {
    fn bind(&mut self, edge: Edge, session: Session) {
        self.bound = Some((edge, session));
    }

    fn unbind(&mut self) {
        self.bound = None;
        self.unbinds += 1;
    }
}

#[derive(Clone, Default)]
struct TestClock(Rc<Cell<u32>>);

impl MicrosClock for TestClock {
    fn now_micros(&self) -> u32 {
        self.0.get()
    }
}

struct Level(bool);

impl ErrorType for Level {
    type Error = Infallible;
}

impl InputPin for Level {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0)
    }
}

type Rig = Controller<RecordingIrq, TestClock, 512>;

struct Bench {
    controller: Rig,
    clock: TestClock,
}

impl Bench {
    fn new() -> Self {
        let clock = TestClock::default();
        Self {
            controller: Controller::new(RecordingIrq::default(), clock.clone()),
            clock,
        }
    }

    /// Deliver edges at absolute times, stopping early if the handler was
    /// unbound (as real hardware would).
    fn replay(&mut self, session: Session, edges: &[(u32, bool)]) -> Vec<EdgeOutcome> {
        let mut outcomes = Vec::new();
        for &(at, level) in edges {
            if self.controller.irq_mut().bound.is_none() {
                break;
            }
            self.clock.0.set(at);
            outcomes.push(self.controller.on_edge(session, &mut Level(level)));
        }
        outcomes
    }

    fn bits(&self) -> Vec<bool> {
        let store = self.controller.store();
        (0..store.cursor()).map(|i| store.bit(i)).collect()
    }
}

/// Small deterministic generator so the property loops are reproducible.
struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.0 >> 8
    }

    fn below(&mut self, bound: u32) -> u32 {
        self.next() % bound
    }
}

#[test]
fn gap_delimited_scenario() {
    let mut bench = Bench::new();
    let session = bench.controller.start_gap_delimited(1000, true);

    bench.replay(
        session,
        &[(0, false), (1500, true), (1600, false), (1700, true), (3000, false)],
    );

    assert_eq!(bench.bits(), [true, false, true]);
    assert_eq!(bench.controller.store().cursor(), 3);
    assert_eq!(bench.controller.state(), SamplerState::Finished);
    assert!(bench.controller.irq_mut().bound.is_none());
}

#[test]
fn fixed_count_scenario() {
    let mut bench = Bench::new();
    let session = bench
        .controller
        .start_fixed_count(500, 4, true)
        .expect("valid config");

    let mut at = 0;
    let mut edges = Vec::new();
    for (i, gap) in [100, 100, 600, 100, 100, 100].into_iter().enumerate() {
        at += gap;
        edges.push((at, i % 2 == 0));
    }

    bench.replay(session, &edges[..3]);
    assert_eq!(bench.controller.store().cursor(), 1);
    assert_eq!(bench.controller.summary().restarts, 1);
    assert!(bench.controller.store().bit(0));

    let outcomes = bench.replay(session, &edges[3..]);
    assert_eq!(outcomes.last(), Some(&EdgeOutcome::Complete));
    assert_eq!(bench.bits(), [true, false, true, false]);
    assert!(bench.controller.is_finished());
}

#[test]
fn synced_fixed_count_recovers_from_missed_edge() {
    let mut bench = Bench::new();
    let session = bench
        .controller
        .start_synced_fixed_count(2000, 8, false)
        .expect("valid config");
    assert_eq!(
        bench.controller.irq_mut().bound,
        Some((Edge::Falling, session))
    );

    // Noise, sync gap, three bits, a dropout, sync again, eight bits.
    let mut edges = vec![(300, true), (700, false), (5000, true)];
    let mut at = 5000;
    for level in [false, true, true] {
        at += 400;
        edges.push((at, level));
    }
    at += 4000;
    edges.push((at, true));
    for level in [false, false, true, false, true, true, false] {
        at += 400;
        edges.push((at, level));
    }
    // Trailing edge after completion is never delivered.
    edges.push((at + 400, true));

    let outcomes = bench.replay(session, &edges);
    assert_eq!(outcomes.last(), Some(&EdgeOutcome::Complete));
    let summary = bench.controller.summary();
    assert_eq!(summary.restarts, 1);
    assert_eq!(summary.bits, 8);
    assert_eq!(summary.misfires, 0);
    assert_eq!(
        bench.controller.extract(0, 7, false),
        Ok(0b0110_1001)
    );
}

#[test]
fn gap_delimited_bit_count_matches_edges_between_gaps() {
    let mut rng = Lcg(0x5eed);
    for _ in 0..200 {
        let threshold = 500 + rng.below(2000);
        let mut bench = Bench::new();
        let session = bench.controller.start_gap_delimited(threshold, true);

        let mut at = 0u32;
        let mut edges = Vec::new();
        // Pre-sync chatter, all within the block threshold.
        for _ in 0..rng.below(5) {
            at += 1 + rng.below(threshold);
            edges.push((at, rng.below(2) == 1));
        }
        // Opening gap.
        at += threshold + 1 + rng.below(1000);
        edges.push((at, true));
        let inner = rng.below(40) as usize;
        for _ in 0..inner {
            at += 1 + rng.below(threshold);
            edges.push((at, rng.below(2) == 1));
        }
        // Closing gap.
        at += threshold + 1;
        edges.push((at, false));

        let outcomes = bench.replay(session, &edges);
        assert_eq!(outcomes.len(), edges.len());
        assert_eq!(outcomes.last(), Some(&EdgeOutcome::Complete));
        // The opening edge plus every edge strictly between the two gaps.
        assert_eq!(bench.controller.store().cursor(), inner + 1);
    }
}

#[test]
fn extract_matches_reference_scan() {
    let mut rng = Lcg(42);
    let mut bench = Bench::new();
    let session = bench.controller.start_gap_delimited(10_000, true);

    let mut at = 20_000;
    let mut expected = Vec::new();
    for _ in 0..300 {
        let level = rng.below(2) == 1;
        expected.push(level);
        bench.replay(session, &[(at, level)]);
        at += 50;
    }
    bench.controller.stop();
    assert_eq!(bench.bits(), expected);

    for _ in 0..500 {
        let from = rng.below(290) as usize;
        let to = from + rng.below(32) as usize;
        let to = to.min(expected.len() - 1);

        let reference = (from..=to)
            .rev()
            .fold(0u32, |acc, i| (acc << 1) | u32::from(expected[i]));
        assert_eq!(bench.controller.extract(from, to, false), Ok(reference));

        let width = to - from + 1;
        let signed = bench.controller.extract(from, to, true).expect("valid range");
        let high_mask = if width == 32 { 0 } else { u32::MAX << width };
        if expected[to] {
            assert_eq!(signed & high_mask, high_mask);
        } else {
            assert_eq!(signed & high_mask, 0);
        }
        assert_eq!(signed & !high_mask, reference);
    }
}

#[test]
fn extract_rejects_reversed_range() {
    let mut bench = Bench::new();
    let session = bench.controller.start_gap_delimited(100, true);
    let edges: Vec<(u32, bool)> = (1..=8).map(|i| (i * 50 + 200, true)).collect();
    bench.replay(session, &edges);
    bench.controller.stop();

    assert_eq!(
        bench.controller.extract(5, 3, false),
        Err(ExtractError::InvalidRange)
    );
    assert_eq!(bench.controller.extract(5, 3, false).unwrap_or(0), 0);
}

#[test]
fn stop_twice_keeps_counters() {
    let mut bench = Bench::new();
    bench.controller.start_period_statistics(true);

    bench.controller.stop();
    assert_eq!(bench.controller.state(), SamplerState::Finished);
    bench.controller.stop();
    assert_eq!(bench.controller.state(), SamplerState::Finished);

    let summary = bench.controller.summary();
    assert_eq!(summary.misfires, 0);
    assert_eq!(summary.restarts, 0);
}

#[test]
fn in_flight_edge_after_stop_counts_as_misfire() {
    let mut bench = Bench::new();
    let session = bench.controller.start_gap_delimited(1000, true);
    bench.replay(session, &[(1500, true), (1600, false)]);

    bench.controller.stop();
    let bits_before = bench.controller.store().cursor();

    // The handler was already running when stop() landed.
    bench.clock.0.set(1700);
    assert_eq!(
        bench.controller.on_edge(session, &mut Level(true)),
        EdgeOutcome::Misfire
    );
    assert_eq!(bench.controller.store().cursor(), bits_before);
    assert_eq!(bench.controller.summary().misfires, 1);
}

type ByteRig = Controller<RecordingIrq, TestClock, 1>;

/// Gap-delimited capture of `edges` short-gap edges into an 8-bit store,
/// closed by a long gap.
fn byte_block(edges: u32) -> ByteRig {
    let clock = TestClock::default();
    let mut controller: ByteRig = Controller::new(RecordingIrq::default(), clock.clone());
    let session = controller.start_gap_delimited(1000, true);

    clock.0.set(5000);
    controller.on_edge(session, &mut Level(true));
    for i in 1..edges {
        clock.0.set(5000 + i * 10);
        controller.on_edge(session, &mut Level(i % 2 == 1));
    }
    clock.0.set(20_000);
    controller.on_edge(session, &mut Level(false));
    controller
}

#[test]
fn exactly_full_block_is_intact() {
    let controller = byte_block(8);

    let summary = controller.summary();
    assert_eq!(summary.state, SamplerState::Finished);
    assert_eq!(summary.bits, 8);
    assert!(!summary.overrun);
    assert!(summary.is_clean());
    assert_eq!(controller.extract(0, 7, false), Ok(0b1010_1011));
}

#[test]
fn overrun_is_flagged() {
    let controller = byte_block(9);

    let summary = controller.summary();
    assert!(summary.overrun);
    assert_eq!(summary.bits, 8);
    assert!(!summary.is_clean());
    // The ninth bit (a 0) landed on the first bit (a 1).
    assert!(!controller.store().bit(0));
    assert_eq!(controller.store().cursor(), 1);
}

#[test]
fn fixed_count_of_full_capacity_completes() {
    let clock = TestClock::default();
    let mut controller: ByteRig = Controller::new(RecordingIrq::default(), clock.clone());
    let session = controller
        .start_fixed_count(500, 8, true)
        .expect("fits the store");

    let mut complete = 0;
    for i in 1..=20 {
        if controller.irq_mut().bound.is_none() {
            break;
        }
        clock.0.set(i * 10);
        if controller.on_edge(session, &mut Level(true)) == EdgeOutcome::Complete {
            complete += 1;
        }
    }

    assert_eq!(complete, 1);
    assert!(controller.is_finished());
    assert_eq!(controller.summary().bits, 8);
    assert!(!controller.summary().overrun);
    assert_eq!(controller.extract(0, 7, false), Ok(0xFF));
}
