//! Creation and extraction of the 29-bit CAN identifiers defined by the
//! SAE J1939 specification.
use crate::error::CanIdBuildError;

// Define, build, and decompose a J1939 CAN identifier.

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Encapsulates an extended CAN identifier (29 bits) and exposes accessors
/// for priority, PDU-format byte, PGN, and source address.
pub struct CanId(pub u32);

impl CanId {
    // Builder entry point
    /// Creates a pre-configured `CanIdBuilder` for a PGN and source address.
    pub fn builder(pgn: u32, source_address: u8) -> CanIdBuilder {
        CanIdBuilder::new(pgn, source_address)
    }

    // Getters used to deconstruct the identifier
    /// Returns the priority (3 bits, value 0-7) encoded in the CAN ID.
    pub fn priority(&self) -> u8 {
        ((self.0 >> 26) & 0x07) as u8
    }

    /// PDU-format byte (identifier bits 16-23). Message-class matching masks
    /// only this byte: 0xEE for Address Claim, 0xEA for parameter requests.
    pub fn group(&self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    /// Extracts the 18-bit PGN, handling the PDU1/PDU2 distinction.
    pub fn pgn(&self) -> u32 {
        let ps = (self.0 >> 8) & 0xFF;
        let pf = (self.0 >> 16) & 0xFF;
        let dp = (self.0 >> 24) & 0x01;
        let r = (self.0 >> 25) & 0x01;

        if pf < 240 {
            // PDU1: PS stores the explicit destination, not part of the PGN.
            (r << 17) | (dp << 16) | (pf << 8)
        } else {
            // PDU2: implicit destination, PS becomes part of the PGN.
            (r << 17) | (dp << 16) | (pf << 8) | ps
        }
    }

    /// Returns the destination address (PDU1) when the PGN carries one.
    pub fn destination(&self) -> Option<u8> {
        if self.group() < 240 {
            Some(((self.0 >> 8) & 0xFF) as u8)
        } else {
            None
        }
    }

    /// Eight-bit source address (logical node identifier on the bus).
    pub fn source_address(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Same identifier with the priority bits replaced.
    pub fn with_priority(self, priority: u8) -> CanId {
        CanId((self.0 & !(0x07 << 26)) | (((priority & 0x07) as u32) << 26))
    }
}

//==================================================================================CAN_ID_BUILDER
#[derive(Debug)]
/// Fluent builder that enforces the PDU1/PDU2 rules.
pub struct CanIdBuilder {
    priority: u8,
    pgn: u32,
    source_address: u8,
    destination: Option<u8>,
}

impl CanIdBuilder {
    /// Initializes the builder for a given PGN and source address.
    pub fn new(pgn: u32, source_address: u8) -> Self {
        Self {
            priority: 6, // Default priority
            pgn,
            source_address,
            destination: None,
        }
    }

    /// Sets the priority (3 bits) to use during construction.
    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = priority & 0x07;
        self
    }

    /// Assigns a destination address (PDU1). Implies a directed message.
    pub fn destination(mut self, destination_address: u8) -> Self {
        self.destination = Some(destination_address);
        self
    }

    /// Builds the CAN identifier while applying the J1939 rules:
    /// - PF < 240 -> addressed message (PDU1): `destination` mandatory and
    ///   the PGN's PS byte must be zero
    /// - PF >= 240 -> broadcast (PDU2): `destination` must not be provided
    /// - R/DP/PF/PS bits are copied from the provided PGN
    pub fn build(self) -> Result<CanId, CanIdBuildError> {
        let upper_from_pgn = (self.pgn >> 16) & 0x03;
        let pf_from_pgn = ((self.pgn >> 8) & 0xFF) as u8;
        let ps_from_pgn = (self.pgn & 0xFF) as u8;

        let ps = match self.destination {
            None => {
                if pf_from_pgn < 240 {
                    return Err(CanIdBuildError::InvalidForBroadcast);
                }
                ps_from_pgn
            }
            Some(da) => {
                if pf_from_pgn >= 240 {
                    return Err(CanIdBuildError::InvalidForAddressed { pf: pf_from_pgn });
                }
                if ps_from_pgn != 0 {
                    return Err(CanIdBuildError::PsAddressedMustBeNull);
                }
                da
            }
        };

        let id = ((self.priority as u32) << 26)
            | (upper_from_pgn << 24)
            | ((pf_from_pgn as u32) << 16)
            | ((ps as u32) << 8)
            | (self.source_address as u32);
        Ok(CanId(id))
    }
}
