//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (CAN ID construction,
//! signal encoding, bus I/O, scenario file parsing, etc.).
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::infra::codec::SignalKind;

#[derive(Error, Debug)]
/// Errors that can occur while building a 29-bit CAN identifier.
pub enum CanIdBuildError {
    /// Attempt to build a broadcast message (PDU2) with PF < 240.
    #[error("invalid for broadcast message: PF is too low")]
    InvalidForBroadcast,
    /// Attempt to build an addressed message (PDU1) with PF >= 240.
    #[error("invalid for addressed message: PF is too high: {pf}")]
    InvalidForAddressed { pf: u8 },
    /// In PDU1 the lower 8 bits of the PGN must remain zero.
    #[error("PDU1 PGNs require PS = 0")]
    PsAddressedMustBeNull,
}

#[derive(Error, Debug, Clone, PartialEq)]
/// Failures while converting physical signal values to/from payload bytes.
pub enum CodecError {
    /// The physical value is non-finite or outside the signal's raw range.
    #[error("value {value} is not encodable as {kind:?}")]
    InvalidSignalValue { kind: SignalKind, value: f64 },
    /// Payload does not cover the signal's byte range.
    #[error("payload too short for {kind:?}: {len} bytes")]
    PayloadTooShort { kind: SignalKind, len: usize },
}

#[derive(Error, Debug)]
/// I/O failures on the SocketCAN adapter.
pub enum BusError {
    /// The interface could not be opened; fatal to the invoked action.
    #[error("cannot open CAN interface {interface}: {source}")]
    Open {
        interface: String,
        #[source]
        source: io::Error,
    },
    /// A frame could not be written to the bus.
    #[error("CAN send failed: {0}")]
    Send(#[source] io::Error),
    /// A hard receive failure, distinct from "no frame within the window".
    #[error("CAN receive failed: {0}")]
    Receive(#[source] io::Error),
}

#[derive(Error, Debug)]
/// Failures while reading scenario or message batch files.
pub enum FileFormatError {
    /// The file could not be opened or read at all.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Nothing usable survived parsing; the action must not run.
    #[error("no complete record found in {}", path.display())]
    Empty { path: PathBuf },
}

#[derive(Error, Debug)]
/// Errors surfaced by a simulator action. Generic over the bus error so the
/// simulator can run against any [`CanBus`](crate::infra::bus::CanBus)
/// implementation.
pub enum SimError<E: core::fmt::Debug> {
    /// CAN bus rejected the frame during transmission.
    #[error("CAN bus send error: {0:?}")]
    Send(E),

    /// Unable to receive frames from the bus.
    #[error("CAN bus receive error: {0:?}")]
    Receive(E),

    /// Scenario or batch file was unusable.
    #[error(transparent)]
    File(#[from] FileFormatError),
}
