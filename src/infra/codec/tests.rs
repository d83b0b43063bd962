//! Tests for the fixed-point signal codec.
use super::*;

const KINDS: [SignalKind; 4] = [
    SignalKind::VehicleSpeed,
    SignalKind::EngineSpeed,
    SignalKind::VehicleDistance,
    SignalKind::EngineHours,
];

#[test]
/// Round-trip law: decode(encode(v)) stays within one raw unit of v.
fn test_round_trip_within_one_lsb() {
    let samples = [
        (SignalKind::VehicleSpeed, 88.5),
        (SignalKind::EngineSpeed, 1612.75),
        (SignalKind::VehicleDistance, 123_456_785.0),
        (SignalKind::EngineHours, 2231.4),
    ];
    for (kind, value) in samples {
        let payload = encode_signal(kind, value).unwrap();
        let decoded = decode_signal(kind, &payload).unwrap();
        assert!(
            (decoded - value).abs() <= kind.scale(),
            "{kind:?}: {value} -> {decoded}"
        );
    }
}

#[test]
/// Encoded bytes land little-endian at each signal's documented offset.
fn test_payload_layout() {
    // 100 km/h -> raw 25600 = 0x6400 at bytes 1-2 of CCVS.
    let payload = encode_signal(SignalKind::VehicleSpeed, 100.0).unwrap();
    assert_eq!(payload, [0x00, 0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x00]);

    // 2000 rpm -> raw 16000 = 0x3E80 at bytes 3-4 of EEC1.
    let payload = encode_signal(SignalKind::EngineSpeed, 2000.0).unwrap();
    assert_eq!(payload, [0x00, 0x00, 0x00, 0x80, 0x3E, 0x00, 0x00, 0x00]);

    // 1000 m -> raw 200 at bytes 0-3 of VHDR.
    let payload = encode_signal(SignalKind::VehicleDistance, 1000.0).unwrap();
    assert_eq!(payload, [0xC8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    // 1.0 h -> raw 20 at bytes 0-3 of HOURS.
    let payload = encode_signal(SignalKind::EngineHours, 1.0).unwrap();
    assert_eq!(payload, [0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
}

#[test]
/// Raw values round to the nearest unit, not toward zero.
fn test_rounding_to_nearest() {
    // 0.09 h / 0.05 = 1.8 -> raw 2, not 1.
    let payload = encode_signal(SignalKind::EngineHours, 0.09).unwrap();
    assert_eq!(payload[0], 2);
}

#[test]
/// Non-finite values are encode failures, never panics.
fn test_non_finite_rejected() {
    for kind in KINDS {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                encode_signal(kind, value),
                Err(CodecError::InvalidSignalValue { .. })
            ));
        }
    }
}

#[test]
/// Values outside the raw range of the signal's byte width are rejected.
fn test_out_of_range_rejected() {
    // Max raw for a 2-byte signal is 0xFFFF -> 255.996 km/h.
    assert!(encode_signal(SignalKind::VehicleSpeed, 256.0).is_err());
    assert!(encode_signal(SignalKind::VehicleSpeed, -1.0).is_err());
    assert!(encode_signal(SignalKind::EngineSpeed, 8192.0).is_err());
    // 4-byte signals top out at u32::MAX raw units.
    assert!(encode_signal(SignalKind::EngineHours, 0.05 * 4.3e9 + 1.0).is_err());
}

#[test]
/// Boundary values at the top of the raw range still encode.
fn test_range_boundaries() {
    let payload = encode_signal(SignalKind::VehicleSpeed, 65535.0 / 256.0).unwrap();
    assert_eq!(&payload[1..3], &[0xFF, 0xFF]);
    assert!(encode_signal(SignalKind::EngineSpeed, 0.0).is_ok());
}

#[test]
/// Decoding a payload shorter than the signal's byte range fails cleanly.
fn test_decode_short_payload() {
    assert!(matches!(
        decode_signal(SignalKind::EngineSpeed, &[0x00, 0x01]),
        Err(CodecError::PayloadTooShort { .. })
    ));
}
