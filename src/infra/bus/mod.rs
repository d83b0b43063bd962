//! Blocking seam between the protocol logic and the CAN transport. The
//! simulator only ever needs two operations: send one frame, and receive one
//! frame within a bounded window. Keeping the seam minimal lets the
//! integration tests plug in an in-memory bus.
use std::io;
use std::time::Duration;

use embedded_can::{ExtendedId, Frame as EmbeddedFrame, Id, StandardId};
use log::{debug, trace};
use socketcan::{CanSocket, Frame, Socket};

use crate::error::BusError;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::can_id::CanId;

//==================================================================================CAN_BUS
/// Contract to send and receive CAN frames with bounded blocking.
pub trait CanBus {
    type Error: core::fmt::Debug;

    /// Emit a frame on the bus.
    fn send(&mut self, frame: &CanFrame) -> Result<(), Self::Error>;

    /// Wait at most `timeout` for the next frame. `Ok(None)` means nothing
    /// arrived within the window, which is distinct from a hard I/O error.
    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<CanFrame>, Self::Error>;
}

//==================================================================================SOCKETCAN
/// SocketCAN adapter. The socket is the one long-lived shared resource of a
/// simulator run; it is opened once by the top-level driver and released on
/// drop on every exit path, early-return timeouts included.
pub struct SocketCanBus {
    interface: String,
    socket: CanSocket,
}

impl SocketCanBus {
    /// Open the named CAN interface (e.g. `can0`, `vcan0`).
    pub fn open(interface: &str) -> Result<Self, BusError> {
        let socket = CanSocket::open(interface).map_err(|source| BusError::Open {
            interface: interface.to_string(),
            source,
        })?;
        debug!("opened CAN interface {interface}");
        Ok(Self {
            interface: interface.to_string(),
            socket,
        })
    }

    /// Name of the interface this bus is bound to.
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl CanBus for SocketCanBus {
    type Error = BusError;

    fn send(&mut self, frame: &CanFrame) -> Result<(), BusError> {
        let wire = to_wire(frame).ok_or_else(|| {
            BusError::Send(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("identifier {:08X} does not fit its bit-width", frame.id.0),
            ))
        })?;
        self.socket.write_frame(&wire).map_err(BusError::Send)?;
        debug!("TX {frame}");
        Ok(())
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<CanFrame>, BusError> {
        match self.socket.read_frame_timeout(timeout) {
            Ok(wire) => {
                let frame = from_wire(&wire);
                match &frame {
                    Some(frame) => debug!("RX {frame}"),
                    None => trace!("ignoring non-data frame"),
                }
                Ok(frame)
            }
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                Ok(None)
            }
            Err(e) => Err(BusError::Receive(e)),
        }
    }
}

//==================================================================================CONVERSION
fn to_wire(frame: &CanFrame) -> Option<socketcan::CanFrame> {
    let id: Id = if frame.extended {
        ExtendedId::new(frame.id.0)?.into()
    } else {
        StandardId::new(frame.id.0 as u16)?.into()
    };
    socketcan::CanFrame::new(id, frame.payload())
}

fn from_wire(wire: &socketcan::CanFrame) -> Option<CanFrame> {
    match wire {
        socketcan::CanFrame::Data(data) => {
            let frame = if data.is_extended() {
                CanFrame::extended(CanId(data.raw_id()), data.data())
            } else {
                CanFrame::standard(data.raw_id(), data.data())
            };
            Some(frame)
        }
        // Remote and error frames carry nothing the simulator classifies.
        _ => None,
    }
}
