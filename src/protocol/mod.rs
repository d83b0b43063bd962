//! J1939 protocol implementation: CAN transport, address-claim arbitration,
//! request classification, and the ELD message definitions.
pub mod address_claim;
pub mod messages;
pub mod request;
pub mod transport;
