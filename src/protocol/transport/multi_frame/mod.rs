//! CAN frame generator for the multi-frame VIN transfer: the fixed 4-frame
//! sequence (one announcement plus three sequence-numbered data frames) an
//! ECU emits when the VIN does not fit a single frame, and the single-frame
//! variant for short replies.
use std::thread;
use std::time::Duration;

use crate::infra::bus::CanBus;
use crate::protocol::messages::{GLOBAL_ADDRESS, PGN_TP_CONTROL, PGN_TP_DATA, PGN_VIN};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;
use crate::protocol::transport::TP_INTER_FRAME_DELAY_MS;

/// Bytes carried by the 4-frame transfer: three data frames of seven
/// payload bytes each. The VIN and its `*` terminator occupy a prefix; the
/// rest is 0xFF padding.
pub const VIN_TRANSFER_BYTES: usize = 21;
/// Data frames following the announcement frame.
pub const VIN_DATA_FRAMES: usize = 3;
/// ASCII `*`, marking the end of the VIN characters.
pub const VIN_TERMINATOR: u8 = 0x2A;

//==================================================================================VIN_FRAME_BUILDER
#[derive(Debug)]
/// Shared parameters for all frames composing the VIN transfer.
pub struct VinFrameBuilder<'a> {
    vin: &'a str,
    source_address: u8,
}

impl<'a> VinFrameBuilder<'a> {
    /// Prepare a builder for the given VIN, transmitted from `source_address`.
    pub fn new(vin: &'a str, source_address: u8) -> Self {
        Self {
            vin,
            source_address,
        }
    }

    /// The 21-byte transfer payload: VIN characters, `*`, then 0xFF padding.
    /// VINs longer than 20 characters are truncated to leave room for the
    /// terminator.
    fn transfer_payload(&self) -> [u8; VIN_TRANSFER_BYTES] {
        let mut payload = [0xFF; VIN_TRANSFER_BYTES];
        let vin = self.vin.as_bytes();
        let chars = vin.len().min(VIN_TRANSFER_BYTES - 1);
        payload[..chars].copy_from_slice(&vin[..chars]);
        payload[chars] = VIN_TERMINATOR;
        payload
    }

    /// Build the full 4-frame sequence: announcement first, then the three
    /// data frames with sequence bytes 0x01, 0x02, 0x03.
    pub fn frames(&self) -> [CanFrame; 4] {
        let control_id = CanId::builder(PGN_TP_CONTROL, self.source_address)
            .destination(GLOBAL_ADDRESS)
            .priority(7)
            .build()
            .expect("PGN 0xEC00 with destination 255 must always produce a valid CanId");
        let data_id = CanId::builder(PGN_TP_DATA, self.source_address)
            .destination(GLOBAL_ADDRESS)
            .priority(7)
            .build()
            .expect("PGN 0xEB00 with destination 255 must always produce a valid CanId");

        // Announcement: broadcast control byte, total size (little-endian),
        // packet count, then the PGN being transferred.
        let pgn = PGN_VIN.to_le_bytes();
        let control = CanFrame::extended(
            control_id,
            &[
                0x20,
                VIN_TRANSFER_BYTES as u8,
                0x00,
                VIN_DATA_FRAMES as u8,
                0xFF,
                pgn[0],
                pgn[1],
                pgn[2],
            ],
        );

        let payload = self.transfer_payload();
        let mut chunks = payload.chunks_exact(7);
        let mut data_frame = |sequence: u8| {
            let mut data = [0xFF; 8];
            data[0] = sequence;
            data[1..8].copy_from_slice(chunks.next().expect("21 bytes split into 3 chunks"));
            CanFrame::extended(data_id, &data)
        };

        [control, data_frame(0x01), data_frame(0x02), data_frame(0x03)]
    }
}

//==================================================================================ENTRY_POINTS
/// Build the fixed 4-frame VIN transfer.
pub fn build_vin_frames(vin: &str, source_address: u8) -> [CanFrame; 4] {
    VinFrameBuilder::new(vin, source_address).frames()
}

/// Build the single-frame VIN reply: up to seven characters, the `*`
/// terminator, then 0xFF padding.
pub fn build_vin_single_frame(vin: &str, source_address: u8) -> CanFrame {
    let id = CanId::builder(PGN_VIN, source_address)
        .build()
        .expect("PGN 0xFEEC is PDU2 and always produces a valid CanId");
    let mut data = [0xFF; 8];
    let vin = vin.as_bytes();
    let chars = vin.len().min(7);
    data[..chars].copy_from_slice(&vin[..chars]);
    data[chars] = VIN_TERMINATOR;
    CanFrame::extended(id, &data)
}

/// Send the 4-frame sequence with the mandatory 50 ms spacing between
/// consecutive frames.
pub fn send_vin_frames<B: CanBus>(bus: &mut B, vin: &str, source_address: u8) -> Result<(), B::Error> {
    let mut is_first = true;
    for frame in &build_vin_frames(vin, source_address) {
        if !is_first {
            thread::sleep(Duration::from_millis(TP_INTER_FRAME_DELAY_MS));
        }
        bus.send(frame)?;
        is_first = false;
    }
    Ok(())
}
