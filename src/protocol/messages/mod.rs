//! ELD message definitions: the parameter groups, well-known addresses, and
//! fixed payloads the simulator speaks, plus builders for each frame kind.
use crate::error::CodecError;
use crate::infra::codec::{self, SignalKind};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;

//==================================================================================PARAMETER_GROUPS
/// Cruise Control/Vehicle Speed, carries wheel-based vehicle speed.
pub const PGN_CCVS: u32 = 0xFEF1;
/// Electronic Engine Controller 1, carries engine speed.
pub const PGN_EEC1: u32 = 0xF004;
/// High-Resolution Vehicle Distance.
pub const PGN_VHDR: u32 = 0xFEC1;
/// Engine Hours, served on request.
pub const PGN_ENGINE_HOURS: u32 = 0xFEE5;
/// Vehicle Identification, served on request (single or multi-frame).
pub const PGN_VIN: u32 = 0xFEEC;
/// Address Claimed.
pub const PGN_ADDRESS_CLAIM: u32 = 0xEE00;
/// Parameter request.
pub const PGN_REQUEST: u32 = 0xEA00;
/// Transport-protocol connection management (multi-frame announcement).
pub const PGN_TP_CONTROL: u32 = 0xEC00;
/// Transport-protocol data transfer (multi-frame payload).
pub const PGN_TP_DATA: u32 = 0xEB00;

/// Identifier PDU-format byte of Address Claim frames.
pub const ADDRESS_CLAIM_GROUP: u8 = (PGN_ADDRESS_CLAIM >> 8) as u8;
/// Identifier PDU-format byte of parameter request frames.
pub const REQUEST_GROUP: u8 = (PGN_REQUEST >> 8) as u8;

//==================================================================================ADDRESSES
/// Global destination address (all nodes).
pub const GLOBAL_ADDRESS: u8 = 0xFF;
/// Source address the simulated engine ECU transmits from.
pub const SIMULATOR_SOURCE_ADDRESS: u8 = 0x00;
/// Well-known default address a freshly powered device claims first.
pub const NEW_DEVICE_ADDRESS: u8 = 0xFB;

//==================================================================================FIXED_PAYLOADS
/// NAME transmitted with the arbiter's counter-claims, little-endian. The
/// value 1 is numerically smaller than any fielded device NAME, so the peer
/// always loses arbitration. Deliberately a fixed payload, never computed
/// from the peer's claim.
pub const ARBITER_CLAIM_NAME: [u8; 8] = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

/// NAME used when the simulator plays a new device entering the bus.
pub const NEW_DEVICE_NAME: [u8; 8] = [0x52, 0x1F, 0x4A, 0x22, 0x00, 0x82, 0x32, 0x20];

/// VIN served when the active scenario stage does not provide one.
pub const DEFAULT_VIN: &str = "1FUJGHDV0CLBP8834";

//==================================================================================TELEMETRY_FRAMES
/// CCVS frame for a wheel-based speed in km/h.
pub fn vehicle_speed_frame(speed_kmh: f64, source: u8) -> Result<CanFrame, CodecError> {
    let payload = codec::encode_signal(SignalKind::VehicleSpeed, speed_kmh)?;
    let id = CanId::builder(PGN_CCVS, source)
        .build()
        .expect("PGN 0xFEF1 is PDU2 and always produces a valid CanId");
    Ok(CanFrame::extended(id, &payload))
}

/// EEC1 frame for an engine speed in rpm. Transmitted at priority 3, like
/// the engine controller it impersonates.
pub fn engine_speed_frame(rpm: f64, source: u8) -> Result<CanFrame, CodecError> {
    let payload = codec::encode_signal(SignalKind::EngineSpeed, rpm)?;
    let id = CanId::builder(PGN_EEC1, source)
        .priority(3)
        .build()
        .expect("PGN 0xF004 is PDU2 and always produces a valid CanId");
    Ok(CanFrame::extended(id, &payload))
}

/// VHDR frame for a total vehicle distance in meters.
pub fn vehicle_distance_frame(distance_m: f64, source: u8) -> Result<CanFrame, CodecError> {
    let payload = codec::encode_signal(SignalKind::VehicleDistance, distance_m)?;
    let id = CanId::builder(PGN_VHDR, source)
        .build()
        .expect("PGN 0xFEC1 is PDU2 and always produces a valid CanId");
    Ok(CanFrame::extended(id, &payload))
}

//==================================================================================RESPONSE_FRAMES
/// HOURS response frame for a total engine-hours value. Bytes 4-7 carry a
/// parameter the simulator does not model and are sent as "not available".
pub fn engine_hours_frame(hours: f64, source: u8) -> Result<CanFrame, CodecError> {
    let mut payload = [0xFF; 8];
    codec::encode_signal_into(SignalKind::EngineHours, hours, &mut payload)?;
    let id = CanId::builder(PGN_ENGINE_HOURS, source)
        .build()
        .expect("PGN 0xFEE5 is PDU2 and always produces a valid CanId");
    Ok(CanFrame::extended(id, &payload))
}

//==================================================================================NETWORK_FRAMES
/// Address Claim frame carrying the given NAME, addressed to all nodes.
pub fn address_claim_frame(name: [u8; 8], source: u8) -> CanFrame {
    let id = CanId::builder(PGN_ADDRESS_CLAIM, source)
        .destination(GLOBAL_ADDRESS)
        .build()
        .expect("PGN 0xEE00 with destination 255 must always produce a valid CanId");
    CanFrame::extended(id, &name)
}

/// Parameter request for `pgn`, addressed to all nodes. The requested PGN
/// occupies payload bytes 0-2, little-endian; the DLC is 3.
pub fn request_frame(pgn: u32, source: u8) -> CanFrame {
    let id = CanId::builder(PGN_REQUEST, source)
        .destination(GLOBAL_ADDRESS)
        .build()
        .expect("PGN 0xEA00 with destination 255 must always produce a valid CanId");
    CanFrame::extended(id, &pgn.to_le_bytes()[..3])
}

//==================================================================================DEFAULT_MESSAGES
/// The two built-in frames of the `send_default_messages` action: a CCVS
/// speed sample from source 0x01 and an EEC1 engine-speed sample from
/// source 0x02.
pub fn default_frames() -> [CanFrame; 2] {
    [
        CanFrame::extended(
            CanId(0x18FE_F101),
            &[0x00, 0x00, 0x32, 0x00, 0x00, 0x00, 0x00, 0x00],
        ),
        CanFrame::extended(
            CanId(0x0CF0_0402),
            &[0x00, 0x00, 0xAA, 0x00, 0xAA, 0x00, 0x00, 0x00],
        ),
    ]
}
