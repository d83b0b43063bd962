//! Arbitration scenarios against a scripted peer ECU.
mod helpers;

use std::time::{Duration, Instant};

use cansim::infra::poller::Deadline;
use cansim::protocol::address_claim::{initiate_new_device, simulate_collisions, wait_for_claim};
use cansim::protocol::messages::{address_claim_frame, ARBITER_CLAIM_NAME, NEW_DEVICE_ADDRESS};
use cansim::protocol::transport::can_frame::CanFrame;
use cansim::protocol::transport::can_id::CanId;

use helpers::MockBus;

/// NAME a fielded peer device would carry.
const PEER_NAME: [u8; 8] = [0x52, 0x00, 0x45, 0x11, 0x00, 0x82, 0x00, 0xA0];

fn peer_claim(source: u8) -> CanFrame {
    address_claim_frame(PEER_NAME, source)
}

#[test]
/// A peer that re-claims within 100 ms loses exactly `max_collisions` times.
fn collisions_against_responsive_peer() {
    let mut bus = MockBus::new();
    bus.enqueue(peer_claim(0x80));
    // Every counter-claim provokes the peer's next claim attempt.
    let mut address = 0x80u8;
    bus.respond_with(move |frame| {
        if frame.id.group() == 0xEE {
            address += 1;
            Some((Duration::from_millis(100), peer_claim(address)))
        } else {
            None
        }
    });

    let collisions = simulate_collisions(&mut bus, Duration::from_millis(500), 3).unwrap();
    assert_eq!(collisions, 3);
    assert_eq!(bus.sent.len(), 3);
}

#[test]
/// A peer that goes silent after its first claim yields a single collision.
fn collisions_against_one_shot_peer() {
    let mut bus = MockBus::new();
    bus.enqueue(peer_claim(0x80));

    let collisions = simulate_collisions(&mut bus, Duration::from_millis(500), 3).unwrap();
    assert_eq!(collisions, 1);
    assert_eq!(bus.sent.len(), 1);
}

#[test]
/// The counter-claim reuses the peer's identifier at a higher priority and
/// always carries the fixed winning NAME.
fn counter_claim_always_wins() {
    let mut bus = MockBus::new();
    bus.enqueue(peer_claim(0x80));

    simulate_collisions(&mut bus, Duration::from_millis(200), 1).unwrap();

    let counter = &bus.sent[0];
    assert_eq!(counter.id.group(), 0xEE);
    assert_eq!(counter.id.source_address(), 0x80);
    assert_eq!(counter.id.priority(), 5);
    assert_eq!(counter.data, ARBITER_CLAIM_NAME);
    assert!(u64::from_le_bytes(counter.data) < u64::from_le_bytes(PEER_NAME));
}

#[test]
/// `wait_for_claim` discards unrelated traffic without losing its budget.
fn wait_for_claim_skips_other_traffic() {
    let mut bus = MockBus::new();
    bus.enqueue(CanFrame::extended(CanId(0x18FE_F101), &[0u8; 8]));
    bus.enqueue_after(Duration::from_millis(80), peer_claim(0x42));

    let observed = wait_for_claim(&mut bus, Deadline::starting_now(Duration::from_millis(500)))
        .unwrap()
        .expect("claim expected before the deadline");
    assert_eq!(observed.id.source_address(), 0x42);
}

#[test]
/// `wait_for_claim` returns `None` once the deadline expires.
fn wait_for_claim_times_out() {
    let mut bus = MockBus::new();
    let budget = Duration::from_millis(150);
    let start = Instant::now();
    let observed = wait_for_claim(&mut bus, Deadline::starting_now(budget)).unwrap();
    assert!(observed.is_none());
    assert!(start.elapsed() >= budget);
}

#[test]
/// New-device entry: the initiating claim is sent first and counted, and
/// each defense of the default address is met with a collision.
fn new_device_collides_with_defender() {
    let mut bus = MockBus::new();
    let mut defenses = 0u32;
    bus.respond_with(move |frame| {
        // The defender answers any claim for its address, twice.
        if frame.id.group() == 0xEE && defenses < 2 {
            defenses += 1;
            Some((Duration::from_millis(50), peer_claim(NEW_DEVICE_ADDRESS)))
        } else {
            None
        }
    });

    let claims = initiate_new_device(&mut bus, Duration::from_millis(500), 5).unwrap();
    assert_eq!(claims, 3); // initial claim + 2 collisions

    assert_eq!(bus.sent.len(), 3);
    assert_eq!(bus.sent[0].id.source_address(), NEW_DEVICE_ADDRESS);
    assert!(bus.sent[1..].iter().all(|f| f.data == ARBITER_CLAIM_NAME));
}
