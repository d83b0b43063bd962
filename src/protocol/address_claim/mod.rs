//! Adversarial side of the SAE J1939 address-claim procedure: watch for a
//! peer's claim (PGN 0xEE00) and answer with a counter-claim that always
//! wins arbitration, forcing the peer through its collision handling. The
//! device under test perceives a bus neighbour that refuses to yield the
//! address.
use std::time::Duration;

use log::info;

use crate::error::SimError;
use crate::infra::bus::CanBus;
use crate::infra::poller::Deadline;
use crate::protocol::messages::{
    address_claim_frame, ARBITER_CLAIM_NAME, NEW_DEVICE_ADDRESS, NEW_DEVICE_NAME,
};
use crate::protocol::request::{classify, RequestKind};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::CLAIM_REWAIT_MS;

//==================================================================================WAIT_FOR_CLAIM
/// Poll the bus until one Address Claim frame arrives or the deadline
/// expires. Unrelated traffic is discarded without consuming the budget.
pub fn wait_for_claim<B: CanBus>(
    bus: &mut B,
    deadline: Deadline,
) -> Result<Option<CanFrame>, SimError<B::Error>> {
    let outcome = deadline.poll(|window| -> Result<Option<CanFrame>, SimError<B::Error>> {
        Ok(bus
            .recv_timeout(window)
            .map_err(SimError::Receive)?
            .filter(|frame| classify(frame) == RequestKind::AddressClaim))
    })?;
    Ok(outcome.complete())
}

//==================================================================================COLLISIONS
/// Counter-claim for a peer's claim: same identifier at one priority level
/// higher, carrying the fixed arbiter NAME. Lowest NAME wins arbitration,
/// so the peer always loses.
pub fn counter_claim(peer_claim: &CanFrame) -> CanFrame {
    let priority = peer_claim.id.priority().saturating_sub(1);
    CanFrame::extended(peer_claim.id.with_priority(priority), &ARBITER_CLAIM_NAME)
}

/// Force up to `max_collisions` address collisions: wait for a claim,
/// counter it, then give the peer [`CLAIM_REWAIT_MS`] to attempt its next
/// address. Stops early once the peer goes silent.
pub fn simulate_collisions<B: CanBus>(
    bus: &mut B,
    max_duration: Duration,
    max_collisions: u32,
) -> Result<u32, SimError<B::Error>> {
    let mut collisions = 0;
    let mut deadline = Deadline::starting_now(max_duration);

    while collisions < max_collisions {
        let Some(peer_claim) = wait_for_claim(bus, deadline)? else {
            break;
        };
        bus.send(&counter_claim(&peer_claim))
            .map_err(SimError::Send)?;
        collisions += 1;
        info!(
            "forced address collision {collisions} against source 0x{:02X}",
            peer_claim.id.source_address()
        );
        deadline = Deadline::starting_now(Duration::from_millis(CLAIM_REWAIT_MS));
    }

    Ok(collisions)
}

/// Play a new device entering the bus: claim the well-known default address,
/// then force collisions on whoever defends it. The returned count includes
/// the initiating claim.
pub fn initiate_new_device<B: CanBus>(
    bus: &mut B,
    max_duration: Duration,
    max_collisions: u32,
) -> Result<u32, SimError<B::Error>> {
    bus.send(&address_claim_frame(NEW_DEVICE_NAME, NEW_DEVICE_ADDRESS))
        .map_err(SimError::Send)?;
    info!("initiated address claim from default address 0x{NEW_DEVICE_ADDRESS:02X}");
    let collisions = simulate_collisions(bus, max_duration, max_collisions)?;
    Ok(collisions + 1)
}
