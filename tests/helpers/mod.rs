//! Test doubles to simulate the CAN bus during integration tests.
use std::collections::VecDeque;
use std::convert::Infallible;
use std::thread;
use std::time::{Duration, Instant};

use cansim::infra::bus::CanBus;
use cansim::protocol::transport::can_frame::CanFrame;

/// Scripted reaction of the simulated peer: a reply frame and how long the
/// peer takes to put it on the bus.
type Responder = Box<dyn FnMut(&CanFrame) -> Option<(Duration, CanFrame)> + Send>;

#[allow(dead_code)]
/// In-memory CAN bus reproducing the `CanBus` trait behavior: records every
/// sent frame, serves inbound frames at scripted instants, and lets a
/// responder closure play the peer ECU.
pub struct MockBus {
    /// Every frame the code under test transmitted, in order.
    pub sent: Vec<CanFrame>,
    inbox: VecDeque<(Instant, CanFrame)>,
    responder: Option<Responder>,
}

#[allow(dead_code)]
impl MockBus {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            inbox: VecDeque::new(),
            responder: None,
        }
    }

    /// Make a frame available to the receiver immediately.
    pub fn enqueue(&mut self, frame: CanFrame) {
        self.enqueue_after(Duration::ZERO, frame);
    }

    /// Make a frame available to the receiver once `delay` has passed.
    pub fn enqueue_after(&mut self, delay: Duration, frame: CanFrame) {
        self.inbox.push_back((Instant::now() + delay, frame));
    }

    /// Script the peer: called for every sent frame; a returned reply is
    /// enqueued with the given delay.
    pub fn respond_with(
        &mut self,
        responder: impl FnMut(&CanFrame) -> Option<(Duration, CanFrame)> + Send + 'static,
    ) {
        self.responder = Some(Box::new(responder));
    }
}

impl CanBus for MockBus {
    type Error = Infallible;

    fn send(&mut self, frame: &CanFrame) -> Result<(), Infallible> {
        self.sent.push(frame.clone());
        if let Some(responder) = self.responder.as_mut() {
            if let Some((delay, reply)) = responder(frame) {
                self.inbox.push_back((Instant::now() + delay, reply));
            }
        }
        Ok(())
    }

    fn recv_timeout(&mut self, timeout: Duration) -> Result<Option<CanFrame>, Infallible> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.inbox.front() {
                Some((ready_at, _)) => {
                    let now = Instant::now();
                    if *ready_at <= now {
                        let (_, frame) = self.inbox.pop_front().expect("front checked above");
                        return Ok(Some(frame));
                    }
                    if *ready_at >= deadline {
                        if deadline > now {
                            thread::sleep(deadline - now);
                        }
                        return Ok(None);
                    }
                    thread::sleep(*ready_at - now);
                }
                None => {
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                    }
                    return Ok(None);
                }
            }
        }
    }
}
