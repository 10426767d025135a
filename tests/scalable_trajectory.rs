//! Window trajectories of the Scalable controller driven through its public API.
mod common;

use common::{SimTransport, init_tracing};
use rand::{Rng, SeedableRng, rngs::StdRng};
use scalable_tcp::{
    config::CongestionControlConfig,
    congestion::{
        CongestionControl, CongestionMode, HandlerContext, ScalableController, TracingObserver,
        TrajectoryRecorder,
    },
    sequence::SequenceNumber,
    transport::TransportAdapter,
};

fn config(initial_cwnd: u32, initial_ssthresh: u32) -> CongestionControlConfig {
    CongestionControlConfig {
        initial_cwnd,
        initial_ssthresh,
        ..CongestionControlConfig::with_segment_size(1000)
    }
}

#[test]
fn scenario_slow_start_growth() {
    init_tracing();
    let mut controller = ScalableController::new(config(1000, 4000));
    let mut transport = SimTransport::new(0, 10_000);
    let mut recorder = TrajectoryRecorder::new();

    let mut modes = Vec::new();
    for ack in [1000, 2000, 3000] {
        let mut cx = HandlerContext::new(&mut transport, &mut recorder);
        controller.on_ack_advance(SequenceNumber::new(ack), &mut cx);
        modes.push(controller.mode());
    }

    assert_eq!(recorder.windows(), vec![2000, 3000, 4000]);
    assert_eq!(modes[1], CongestionMode::SlowStart);
    assert_eq!(modes[2], CongestionMode::CongestionAvoidance);
}

#[test]
fn scenario_congestion_avoidance_increment() {
    init_tracing();
    let mut controller = ScalableController::new(config(5000, 4000));
    let mut transport = SimTransport::new(0, 10_000);
    let mut observer = TracingObserver::new(1);
    let mut cx = HandlerContext::new(&mut transport, &mut observer);

    let decision = controller.on_ack_advance(SequenceNumber::new(1000), &mut cx);
    assert_eq!(decision.new_congestion_window, 5100);
}

#[test]
fn scenario_fast_retransmit() {
    init_tracing();
    let mut controller = ScalableController::new(config(6000, 4000));
    let mut transport = SimTransport::new(20_000, 6000);
    let mut observer = TracingObserver::new(2);
    {
        let mut cx = HandlerContext::new(&mut transport, &mut observer);
        for count in 1..=3 {
            controller.on_duplicate_ack(count, &mut cx);
        }
    }

    assert_eq!(controller.slow_start_threshold(), 5250);
    assert_eq!(controller.congestion_window(), 1000);
    assert_eq!(transport.retransmits, vec![SequenceNumber::new(20_000)]);
    assert_eq!(transport.next_tx, SequenceNumber::new(20_000));
}

#[test]
fn scenario_timeout() {
    init_tracing();
    let mut controller = ScalableController::new(config(12_000, 4000));
    let mut transport = SimTransport::new(0, 8000);
    let mut observer = TracingObserver::new(3);
    let mut cx = HandlerContext::new(&mut transport, &mut observer);

    let decision = controller.on_retransmission_timeout(&mut cx);
    assert_eq!(decision.new_slow_start_threshold, 4000);
    assert_eq!(decision.new_congestion_window, 1000);
    assert_eq!(decision.new_mode, CongestionMode::SlowStart);
}

/// Number of ACKs needed to double the window in congestion avoidance.
fn acks_to_double(start: u32) -> u32 {
    let mut controller = ScalableController::new(config(start, 2000));
    let mut transport = SimTransport::new(0, u32::MAX / 2);
    let mut recorder = TrajectoryRecorder::new();
    let mut cx = HandlerContext::new(&mut transport, &mut recorder);

    let mut acks = 0;
    let mut sequence = SequenceNumber::new(0);
    while controller.congestion_window() < start * 2 {
        sequence = sequence + 1;
        controller.on_ack_advance(sequence, &mut cx);
        acks += 1;
    }
    acks
}

#[test]
fn doubling_time_does_not_depend_on_window_size() {
    let small = acks_to_double(50_000);
    let large = acks_to_double(5_000_000);
    assert!(small.abs_diff(large) <= 1, "small={small}, large={large}");
}

#[test]
fn random_event_sequences_preserve_invariants() {
    init_tracing();
    for seed in 0..16u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut controller = ScalableController::new(config(1000, 4000));
        let mut transport = SimTransport::new(rng.random(), 0);
        let mut recorder = TrajectoryRecorder::new();
        let mut dup_count = 0u32;
        let mut fired_in_episode = false;

        for _ in 0..2000 {
            let cwnd = controller.congestion_window();
            let ssthresh = controller.slow_start_threshold();
            let mode = controller.mode();

            match rng.random_range(0..4) {
                0 => transport.send(rng.random_range(1..=4000)),
                1 if transport.has_outstanding_data() => {
                    let acked = rng.random_range(1..=transport.bytes_in_flight());
                    let sequence = transport.head_sequence() + acked;
                    let mut cx = HandlerContext::new(&mut transport, &mut recorder);
                    let decision = controller.on_ack_advance(sequence, &mut cx);
                    if mode == CongestionMode::CongestionAvoidance {
                        let expected = cwnd.saturating_add((cwnd / 50).max(1));
                        assert_eq!(decision.new_congestion_window, expected);
                    }
                    assert_eq!(controller.dup_ack_count(), 0);
                    dup_count = 0;
                    fired_in_episode = false;
                }
                2 if transport.has_outstanding_data() => {
                    dup_count += 1;
                    let mut cx = HandlerContext::new(&mut transport, &mut recorder);
                    let decision = controller.on_duplicate_ack(dup_count, &mut cx);
                    if fired_in_episode {
                        assert_eq!(decision.new_congestion_window, cwnd);
                        assert_eq!(decision.new_slow_start_threshold, ssthresh);
                        assert!(decision.retransmit.is_none());
                    }
                    if decision.retransmit.is_some() {
                        fired_in_episode = true;
                    }
                }
                3 => {
                    let mut cx = HandlerContext::new(&mut transport, &mut recorder);
                    controller.on_retransmission_timeout(&mut cx);
                }
                _ => {}
            }

            assert!(controller.congestion_window() >= 1000, "seed {seed}");
            assert!(controller.slow_start_threshold() >= 2000, "seed {seed}");
            let expected_mode =
                if controller.congestion_window() < controller.slow_start_threshold() {
                    CongestionMode::SlowStart
                } else {
                    CongestionMode::CongestionAvoidance
                };
            assert_eq!(controller.mode(), expected_mode);
        }
    }
}
