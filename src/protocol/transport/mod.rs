//! J1939 transport layer: CAN frame representation, 29-bit identifier
//! management, and the fixed multi-frame VIN transfer.
//!
//! ## Timing constants
//!
//! These constants define the delays and windows the simulator must honor
//! for protocol-correct exchanges on the bus.

pub mod can_frame;
pub mod can_id;
pub mod multi_frame;

/// Mandatory delay between consecutive frames of the multi-frame VIN
/// transfer (ms). The receiving ECU paces its transport-protocol reassembly
/// on this spacing; sending faster or slower than 50 ms breaks conformance,
/// it is not a tuning knob.
pub const TP_INTER_FRAME_DELAY_MS: u64 = 50;

/// Receive window used when watching for a parameter request between
/// telemetry bursts (ms). Short enough that the broadcast cadence is never
/// starved by a pending request check.
pub const REQUEST_WINDOW_MS: u64 = 100;

/// Re-listen window after forcing an address collision (ms): the peer is
/// given this long to attempt its next claim before the arbiter gives up.
pub const CLAIM_REWAIT_MS: u64 = 500;
