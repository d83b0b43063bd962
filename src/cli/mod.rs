//! Command-line surface of the `cansim` binary: one subcommand per
//! simulator action, with the hex-value parsers the actions share. A
//! malformed invocation is rejected here, before any bus I/O happens.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;

//==================================================================================CLI
#[derive(Debug, Parser)]
#[command(
    name = "cansim",
    about = "Command-line tool to simulate J1939 can-bus processes",
    version
)]
pub struct Cli {
    /// CAN interface to bind, e.g. can0 or vcan0.
    #[arg(short, long, default_value = "can0")]
    pub interface: String,

    #[command(subcommand)]
    pub action: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// Send one specific CAN message with 8 bytes of data.
    #[command(visible_alias = "s")]
    SendOneMessage {
        /// Message identifier, hex, with or without a 0x prefix.
        #[arg(value_parser = parse_hex_id)]
        id: u32,
        /// The 8 payload bytes, hex.
        #[arg(value_parser = parse_hex_byte, num_args = 8)]
        data: Vec<u8>,
    },

    /// Send the same CAN message multiple times with a fixed delay.
    #[command(visible_alias = "S")]
    SendMessageMulti {
        /// How many copies to send.
        count: u32,
        /// Delay between copies, milliseconds.
        delay_ms: u64,
        /// Message identifier, hex.
        #[arg(value_parser = parse_hex_id)]
        id: u32,
        /// The 8 payload bytes, hex.
        #[arg(value_parser = parse_hex_byte, num_args = 8)]
        data: Vec<u8>,
    },

    /// Send the messages defined in a batch text file.
    #[command(visible_alias = "f")]
    SendFileMessages {
        /// Batch file: `<hex id> <hex byte>x8` lines grouped by `delay <ms>`.
        file: PathBuf,
    },

    /// Send the built-in default messages.
    #[command(visible_alias = "d")]
    SendDefaultMessages,

    /// Wait for one message for the given number of milliseconds.
    #[command(visible_alias = "r")]
    ReceiveOneMessage { timeout_ms: u64 },

    /// Collect all messages observed within the given window.
    #[command(visible_alias = "R")]
    ReceiveMessages { timeout_ms: u64 },

    /// Wait for an Address Claim and send no response (address can be used).
    #[command(visible_alias = "an")]
    AddrClaimNoResponse { timeout_ms: u64 },

    /// Wait for an Address Claim and respond once (address can NOT be used).
    #[command(visible_alias = "au")]
    AddrClaimAddrUsed { timeout_ms: u64 },

    /// Wait for Address Claims and force up to the given number of
    /// collisions.
    #[command(visible_alias = "aU")]
    AddrClaimAddrUsedMulti {
        timeout_ms: u64,
        max_responses: u32,
    },

    /// Initiate a new Address Claim from the default address and force
    /// collisions on whoever defends it.
    #[command(visible_alias = "nU")]
    NewDeviceAddrUsedMulti {
        timeout_ms: u64,
        max_responses: u32,
    },

    /// Wait for a VIN code request and reply with a single frame.
    #[command(visible_alias = "v")]
    VinCodeResponse { timeout_ms: u64 },

    /// Wait for a VIN code request and reply with a multi-frame message.
    #[command(visible_alias = "V")]
    VinCodeResponseMulti { timeout_ms: u64 },

    /// Run the continuous ELD broadcast simulation.
    #[command(visible_alias = "e")]
    EldSimulation {
        /// Scenario stage file; the built-in stage when omitted.
        file: Option<PathBuf>,
        /// Overall run time for the built-in stage, milliseconds.
        #[arg(short, long, default_value_t = 60_000)]
        timeout_ms: u64,
    },
}

//==================================================================================PARSERS
/// Build the extended frame described by a `SendOneMessage`-style argument
/// pair.
pub fn frame_from_parts(id: u32, data: &[u8]) -> CanFrame {
    CanFrame::extended(CanId(id), data)
}

/// Parse a CAN identifier given in hex, with or without a `0x` prefix.
pub fn parse_hex_id(text: &str) -> Result<u32, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let id = u32::from_str_radix(digits, 16)
        .map_err(|_| format!("'{text}' is not a hex message identifier"))?;
    if id > 0x1FFF_FFFF {
        return Err(format!("'{text}' does not fit a 29-bit identifier"));
    }
    Ok(id)
}

/// Parse one payload byte given in hex.
pub fn parse_hex_byte(text: &str) -> Result<u8, String> {
    u8::from_str_radix(text, 16).map_err(|_| format!("'{text}' is not a hex byte"))
}
