//! Raw message batches: text files listing frames to replay on the bus,
//! grouped by delay lines.
//!
//! File format:
//!
//! ```text
//! 18fef100 21 21 21 21 21 21 21 21
//! cf00400 22 22 22 22 22 22 22 22
//! delay 700
//! 18fef100 31 31 31 31 31 31 31 31
//! delay 800
//! ```
//!
//! A `delay <ms>` line closes the current group; the delay applies after
//! the group's frames are sent.
use std::fs;
use std::mem;
use std::path::Path;
use std::time::Duration;

use log::warn;

use crate::error::FileFormatError;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;

//==================================================================================MESSAGE_BATCH
#[derive(Debug, Clone, Default, PartialEq)]
/// One group of frames and the delay that follows them.
pub struct MessageBatch {
    pub frames: Vec<CanFrame>,
    pub delay: Duration,
}

//==================================================================================PARSING
/// Read and parse a batch file. Fatal when the file cannot be read or
/// yields no complete group.
pub fn read_message_groups(path: &Path) -> Result<Vec<MessageBatch>, FileFormatError> {
    let text = fs::read_to_string(path).map_err(|source| FileFormatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let groups = parse_groups(&text);
    if groups.is_empty() {
        return Err(FileFormatError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(groups)
}

/// Parse batch groups from file text, skipping malformed lines.
pub fn parse_groups(text: &str) -> Vec<MessageBatch> {
    let mut groups = Vec::new();
    let mut batch = MessageBatch::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(delay) = line.strip_prefix("delay") {
            match delay.trim().parse::<u64>() {
                Ok(millis) => batch.delay = Duration::from_millis(millis),
                Err(_) => {
                    warn!("line {}: cannot parse delay value: {line}", index + 1);
                    batch.delay = Duration::ZERO;
                }
            }
            groups.push(mem::take(&mut batch));
        } else {
            match parse_message_line(line) {
                Some(frame) => batch.frames.push(frame),
                None => warn!("line {}: cannot parse message: {line}", index + 1),
            }
        }
    }

    if !batch.frames.is_empty() {
        warn!("trailing messages without a closing delay line were dropped");
    }
    groups
}

/// Parse one `<hex id> <hex byte>...` message line into an extended frame.
pub fn parse_message_line(line: &str) -> Option<CanFrame> {
    let mut items = line.split_whitespace();
    let id = u32::from_str_radix(items.next()?, 16).ok()?;
    if id > 0x1FFF_FFFF {
        return None;
    }

    let mut data = [0u8; 8];
    let mut len = 0;
    for item in items {
        if len == 8 {
            return None;
        }
        data[len] = u8::from_str_radix(item, 16).ok()?;
        len += 1;
    }
    Some(CanFrame::extended(CanId(id), &data[..len]))
}
