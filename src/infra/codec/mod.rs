//! Fixed-point codec for the J1939 vehicle signals carried by the ELD
//! broadcast messages. Each signal owns a scale factor, a byte width, and a
//! fixed offset inside its 8-byte payload; values are stored little-endian.
use crate::error::CodecError;

//==================================================================================SIGNAL_KIND
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Physical quantities understood by the codec.
pub enum SignalKind {
    /// Wheel-based vehicle speed (CCVS). 1/256 km/h per bit, 2 bytes.
    VehicleSpeed,
    /// Engine speed (EEC1). 0.125 rpm per bit, 2 bytes.
    EngineSpeed,
    /// High-resolution total vehicle distance (VHDR). 5 m per bit, 4 bytes.
    VehicleDistance,
    /// Total engine hours (HOURS). 0.05 h per bit, 4 bytes.
    EngineHours,
}

impl SignalKind {
    /// Physical units represented by one raw bit.
    pub const fn scale(self) -> f64 {
        match self {
            SignalKind::VehicleSpeed => 1.0 / 256.0,
            SignalKind::EngineSpeed => 0.125,
            SignalKind::VehicleDistance => 5.0,
            SignalKind::EngineHours => 0.05,
        }
    }

    /// Width of the raw value in bytes.
    pub const fn width(self) -> usize {
        match self {
            SignalKind::VehicleSpeed | SignalKind::EngineSpeed => 2,
            SignalKind::VehicleDistance | SignalKind::EngineHours => 4,
        }
    }

    /// Byte offset of the raw value inside its 8-byte payload.
    pub const fn offset(self) -> usize {
        match self {
            SignalKind::VehicleSpeed => 1,
            SignalKind::EngineSpeed => 3,
            SignalKind::VehicleDistance | SignalKind::EngineHours => 0,
        }
    }

    /// Largest raw value the signal's byte width can carry.
    const fn max_raw(self) -> u64 {
        match self.width() {
            2 => u16::MAX as u64,
            _ => u32::MAX as u64,
        }
    }
}

//==================================================================================ENCODE
/// Convert a physical value to its raw fixed-point form.
///
/// Rounds to the nearest raw unit before truncation. Non-finite input and
/// values outside the signal's raw range are rejected; the caller must not
/// send a frame for the offending signal.
pub fn to_raw(kind: SignalKind, value: f64) -> Result<u64, CodecError> {
    if !value.is_finite() {
        return Err(CodecError::InvalidSignalValue { kind, value });
    }
    let raw = (value / kind.scale()).round();
    if raw < 0.0 || raw > kind.max_raw() as f64 {
        return Err(CodecError::InvalidSignalValue { kind, value });
    }
    Ok(raw as u64)
}

/// Write a physical value into `payload` at the signal's fixed byte range,
/// little-endian. Bytes outside the range are left untouched.
pub fn encode_signal_into(
    kind: SignalKind,
    value: f64,
    payload: &mut [u8; 8],
) -> Result<(), CodecError> {
    let raw = to_raw(kind, value)?;
    let bytes = raw.to_le_bytes();
    let offset = kind.offset();
    payload[offset..offset + kind.width()].copy_from_slice(&bytes[..kind.width()]);
    Ok(())
}

/// Encode a physical value into a fresh zero-filled 8-byte payload.
pub fn encode_signal(kind: SignalKind, value: f64) -> Result<[u8; 8], CodecError> {
    let mut payload = [0u8; 8];
    encode_signal_into(kind, value, &mut payload)?;
    Ok(payload)
}

//==================================================================================DECODE
/// Read a physical value back out of a payload at the signal's byte range.
pub fn decode_signal(kind: SignalKind, payload: &[u8]) -> Result<f64, CodecError> {
    let offset = kind.offset();
    if payload.len() < offset + kind.width() {
        return Err(CodecError::PayloadTooShort {
            kind,
            len: payload.len(),
        });
    }
    let mut bytes = [0u8; 8];
    bytes[..kind.width()].copy_from_slice(&payload[offset..offset + kind.width()]);
    Ok(u64::from_le_bytes(bytes) as f64 * kind.scale())
}

//==================================================================================TESTS
#[cfg(test)]
#[path = "tests.rs"]
mod tests;
