//! End-to-end runs of the ELD broadcast-and-respond scenario.
mod helpers;

use std::time::{Duration, Instant};

use cansim::infra::codec::{decode_signal, SignalKind};
use cansim::protocol::messages::{request_frame, DEFAULT_VIN, PGN_ENGINE_HOURS, PGN_VIN};
use cansim::scenario::eld::EldStage;
use cansim::sim::CanSimulator;

use helpers::MockBus;

fn stage(description: &str, speed: f64, duration: Duration) -> EldStage {
    EldStage {
        description: description.to_string(),
        vehicle_speed: speed,
        vehicle_distance: 120_000.0,
        engine_speed: 1400.0,
        engine_hours: 200.5,
        vin: None,
        duration,
    }
}

#[test]
/// Stages run in order and the total wall-clock time stays within the
/// polling granularity of the configured 5 seconds.
fn two_stage_scenario_timing() {
    let stages = [
        stage("city", 45.0, Duration::from_secs(2)),
        stage("highway", 90.0, Duration::from_secs(3)),
    ];

    let mut sim = CanSimulator::new(MockBus::new());
    let start = Instant::now();
    sim.run_eld(&stages).unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_secs(5), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(5500), "elapsed {elapsed:?}");

    // Broadcast speeds switch from stage one to stage two exactly once.
    let speeds: Vec<f64> = sim
        .into_bus()
        .sent
        .iter()
        .filter(|frame| frame.id.pgn() == 0xFEF1)
        .map(|frame| decode_signal(SignalKind::VehicleSpeed, frame.payload()).unwrap())
        .collect();
    assert!(!speeds.is_empty());
    let first_highway = speeds
        .iter()
        .position(|&speed| speed == 90.0)
        .expect("second stage must broadcast");
    assert!(speeds[..first_highway].iter().all(|&speed| speed == 45.0));
    assert!(speeds[first_highway..].iter().all(|&speed| speed == 90.0));
}

#[test]
/// A VIN request is answered in-line with the 4-frame transfer, without
/// stopping the telemetry cadence.
fn vin_request_answered_inline() {
    let mut bus = MockBus::new();
    bus.enqueue_after(Duration::from_millis(300), request_frame(PGN_VIN, 0x21));

    let mut sim = CanSimulator::new(bus);
    sim.run_eld(&[stage("cruise", 60.0, Duration::from_millis(1500))])
        .unwrap();
    let sent = sim.into_bus().sent;

    // The reply is the announcement plus three sequenced data frames.
    let control = sent
        .iter()
        .position(|frame| frame.id.group() == 0xEC)
        .expect("VIN transfer announcement expected");
    let sequences: Vec<u8> = sent
        .iter()
        .filter(|frame| frame.id.group() == 0xEB)
        .map(|frame| frame.data[0])
        .collect();
    assert_eq!(sequences, [0x01, 0x02, 0x03]);

    // Reassembling the data frames yields the advertised VIN.
    let mut transported = Vec::new();
    for frame in sent.iter().filter(|frame| frame.id.group() == 0xEB) {
        transported.extend_from_slice(&frame.data[1..8]);
    }
    assert_eq!(&transported[..DEFAULT_VIN.len()], DEFAULT_VIN.as_bytes());

    // Telemetry runs before and after the reply.
    assert!(control >= 3, "a telemetry burst precedes the reply");
    let last_data = sent
        .iter()
        .rposition(|frame| frame.id.group() == 0xEB)
        .expect("data frames expected");
    assert!(
        sent[last_data..].iter().any(|frame| frame.id.pgn() == 0xFEF1),
        "broadcast cadence resumes after the reply"
    );
}

#[test]
/// An engine-hours request is answered from the running stage's values.
fn engine_hours_request_answered() {
    let mut bus = MockBus::new();
    bus.enqueue_after(
        Duration::from_millis(200),
        request_frame(PGN_ENGINE_HOURS, 0x21),
    );

    let mut sim = CanSimulator::new(bus);
    sim.run_eld(&[stage("cruise", 60.0, Duration::from_millis(1000))])
        .unwrap();
    let sent = sim.into_bus().sent;

    let reply = sent
        .iter()
        .find(|frame| frame.id.pgn() == PGN_ENGINE_HOURS)
        .expect("engine hours reply expected");
    let hours = decode_signal(SignalKind::EngineHours, reply.payload()).unwrap();
    assert!((hours - 200.5).abs() <= SignalKind::EngineHours.scale());
    assert_eq!(&reply.data[4..], &[0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
/// Unrelated bus traffic never provokes a reply.
fn other_traffic_ignored() {
    let mut bus = MockBus::new();
    bus.enqueue_after(Duration::from_millis(100), request_frame(0xFEE9, 0x21));

    let mut sim = CanSimulator::new(bus);
    sim.run_eld(&[stage("cruise", 60.0, Duration::from_millis(600))])
        .unwrap();
    let sent = sim.into_bus().sent;

    assert!(sent.iter().all(|frame| {
        matches!(frame.id.pgn(), 0xFEF1 | 0xF004 | 0xFEC1)
    }));
}
