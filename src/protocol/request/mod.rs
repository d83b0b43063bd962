//! Classification of inbound frames: decide whether a frame is an Address
//! Claim, a parameter request the simulator serves (VIN, Engine Hours), or
//! unrelated traffic.
use crate::protocol::messages::{
    ADDRESS_CLAIM_GROUP, PGN_ENGINE_HOURS, PGN_VIN, REQUEST_GROUP,
};
use crate::protocol::transport::can_frame::CanFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What an inbound frame asks of the simulator.
pub enum RequestKind {
    /// Request for the vehicle identification number (PGN 0xFEEC).
    VinRequest,
    /// Request for total engine hours (PGN 0xFEE5).
    EngineHoursRequest,
    /// An Address Claim, regardless of payload.
    AddressClaim,
    /// Anything else, malformed requests included.
    Other,
}

/// Classify a frame by its identifier PDU-format byte and, for request
/// frames, the embedded target PGN. Classification failure is `Other`.
pub fn classify(frame: &CanFrame) -> RequestKind {
    if !frame.extended {
        return RequestKind::Other;
    }
    match frame.id.group() {
        ADDRESS_CLAIM_GROUP => RequestKind::AddressClaim,
        REQUEST_GROUP => match requested_pgn(frame) {
            Some(PGN_VIN) => RequestKind::VinRequest,
            Some(PGN_ENGINE_HOURS) => RequestKind::EngineHoursRequest,
            _ => RequestKind::Other,
        },
        _ => RequestKind::Other,
    }
}

/// Extract the requested PGN from payload bytes 0-2, little-endian.
/// Frames shorter than three payload bytes carry no request.
pub fn requested_pgn(frame: &CanFrame) -> Option<u32> {
    let payload = frame.payload();
    if payload.len() < 3 {
        return None;
    }
    Some(u32::from_le_bytes([payload[0], payload[1], payload[2], 0]))
}
