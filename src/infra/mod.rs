//! Infrastructure shared by the protocol layers: the SocketCAN bus adapter,
//! the bounded-wait deadline poller, and the fixed-point signal codec.
pub mod bus;
pub mod codec;
pub mod poller;
