//! `cansim` library: primitives and protocols required to simulate J1939
//! ECU behavior on a SocketCAN bus. The crate exposes the infrastructure
//! modules (bus adapter, deadline poller, signal codec), protocol logic
//! (identifiers, multi-frame transport, address claiming, request
//! classification, ELD message definitions), scenario sources, and the
//! top-level simulator actions driven by the `cansim` binary.
//==================================================================================
/// Command-line surface: one subcommand per simulator action.
pub mod cli;
/// Domain and low-level errors (CAN identifier construction, signal
/// encoding, bus I/O, file parsing, and related issues).
pub mod error;
/// Infrastructure modules: bus adapter, bounded-wait poller, signal codec.
pub mod infra;
/// J1939 protocol implementation: transport, address claiming, request
/// matching, and the ELD message definitions.
pub mod protocol;
/// Scenario sources: ELD stage files and raw message batch files.
pub mod scenario;
/// Top-level simulator: owns the bus and runs one action per invocation.
pub mod sim;
//==================================================================================
