//! Top-level simulator: owns the bus handle for the whole run and executes
//! one action per invocation (raw sends, bounded receives, the
//! address-claim collision family, VIN replies, and the continuous ELD
//! broadcast-and-respond scenario).
use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::error::SimError;
use crate::infra::bus::CanBus;
use crate::infra::poller::{Deadline, POLL_QUANTUM};
use crate::protocol::address_claim;
use crate::protocol::messages::{self, DEFAULT_VIN, SIMULATOR_SOURCE_ADDRESS};
use crate::protocol::request::{classify, RequestKind};
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::multi_frame;
use crate::protocol::transport::REQUEST_WINDOW_MS;
use crate::scenario::batch;
use crate::scenario::eld::{self, EldStage};

/// Gap between the two built-in default messages.
const DEFAULT_MESSAGE_GAP: Duration = Duration::from_millis(10);

//==================================================================================CAN_SIMULATOR
/// Simulator for J1939 ECU behavior. Holds the only long-lived bus handle;
/// each public method is one complete action of the command-line tool.
pub struct CanSimulator<B: CanBus> {
    bus: B,
}

impl<B: CanBus> CanSimulator<B> {
    /// Wrap an already-opened bus.
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Release the bus handle.
    pub fn into_bus(self) -> B {
        self.bus
    }

    //==============================================================================SEND_ACTIONS
    /// Send one frame.
    pub fn send_one_message(&mut self, frame: &CanFrame) -> Result<(), SimError<B::Error>> {
        self.bus.send(frame).map_err(SimError::Send)
    }

    /// Send the same frame `count` times with a fixed delay in between.
    pub fn send_message_multi(
        &mut self,
        count: u32,
        delay: Duration,
        frame: &CanFrame,
    ) -> Result<(), SimError<B::Error>> {
        info!("sending {count} messages with {delay:?} spacing");
        for sent in 0..count {
            self.bus.send(frame).map_err(SimError::Send)?;
            if sent + 1 < count {
                thread::sleep(delay);
            }
        }
        Ok(())
    }

    /// Replay the frame groups of a batch file, honoring each group's delay.
    pub fn send_file_messages(&mut self, path: &Path) -> Result<(), SimError<B::Error>> {
        let groups = batch::read_message_groups(path)?;
        for group in &groups {
            for frame in &group.frames {
                self.bus.send(frame).map_err(SimError::Send)?;
            }
            thread::sleep(group.delay);
        }
        Ok(())
    }

    /// Send the two built-in default messages.
    pub fn send_default_messages(&mut self) -> Result<(), SimError<B::Error>> {
        for frame in &messages::default_frames() {
            self.bus.send(frame).map_err(SimError::Send)?;
            thread::sleep(DEFAULT_MESSAGE_GAP);
        }
        Ok(())
    }

    //==============================================================================RECEIVE_ACTIONS
    /// Wait up to `max_duration` for any frame.
    pub fn receive_one_message(
        &mut self,
        max_duration: Duration,
    ) -> Result<Option<CanFrame>, SimError<B::Error>> {
        let outcome = Deadline::starting_now(max_duration)
            .poll(|window| self.bus.recv_timeout(window).map_err(SimError::Receive))?;
        Ok(outcome.complete())
    }

    /// Collect every frame observed within the window.
    pub fn receive_messages(
        &mut self,
        max_duration: Duration,
    ) -> Result<Vec<CanFrame>, SimError<B::Error>> {
        let mut frames = Vec::new();
        let deadline = Deadline::starting_now(max_duration);
        while !deadline.expired() {
            let window = deadline.remaining().min(POLL_QUANTUM);
            if let Some(frame) = self.bus.recv_timeout(window).map_err(SimError::Receive)? {
                frames.push(frame);
            }
        }
        Ok(frames)
    }

    //==============================================================================CLAIM_ACTIONS
    /// Observe one Address Claim without answering: the peer keeps its
    /// address.
    pub fn addr_claim_no_response(
        &mut self,
        max_duration: Duration,
    ) -> Result<Option<CanFrame>, SimError<B::Error>> {
        address_claim::wait_for_claim(&mut self.bus, Deadline::starting_now(max_duration))
    }

    /// Answer one Address Claim with a winning counter-claim.
    pub fn addr_claim_addr_used(
        &mut self,
        max_duration: Duration,
    ) -> Result<u32, SimError<B::Error>> {
        address_claim::simulate_collisions(&mut self.bus, max_duration, 1)
    }

    /// Force up to `max_collisions` collisions on the claiming peer.
    pub fn addr_claim_addr_used_multi(
        &mut self,
        max_duration: Duration,
        max_collisions: u32,
    ) -> Result<u32, SimError<B::Error>> {
        address_claim::simulate_collisions(&mut self.bus, max_duration, max_collisions)
    }

    /// Enter the bus as a new device and collide with whoever defends the
    /// default address.
    pub fn new_device_addr_used_multi(
        &mut self,
        max_duration: Duration,
        max_collisions: u32,
    ) -> Result<u32, SimError<B::Error>> {
        address_claim::initiate_new_device(&mut self.bus, max_duration, max_collisions)
    }

    //==============================================================================VIN_ACTIONS
    /// Wait for a VIN request and answer with the single-frame reply.
    /// Returns whether a reply was sent.
    pub fn vin_code_response(
        &mut self,
        max_duration: Duration,
    ) -> Result<bool, SimError<B::Error>> {
        if self.wait_for_vin_request(max_duration)?.is_none() {
            info!("no VIN request observed");
            return Ok(false);
        }
        self.bus
            .send(&multi_frame::build_vin_single_frame(
                DEFAULT_VIN,
                SIMULATOR_SOURCE_ADDRESS,
            ))
            .map_err(SimError::Send)?;
        Ok(true)
    }

    /// Wait for a VIN request and answer with the 4-frame transfer.
    /// Returns whether a reply was sent.
    pub fn vin_code_response_multi(
        &mut self,
        max_duration: Duration,
    ) -> Result<bool, SimError<B::Error>> {
        if self.wait_for_vin_request(max_duration)?.is_none() {
            info!("no VIN request observed");
            return Ok(false);
        }
        multi_frame::send_vin_frames(&mut self.bus, DEFAULT_VIN, SIMULATOR_SOURCE_ADDRESS)
            .map_err(SimError::Send)?;
        Ok(true)
    }

    fn wait_for_vin_request(
        &mut self,
        max_duration: Duration,
    ) -> Result<Option<CanFrame>, SimError<B::Error>> {
        let outcome = Deadline::starting_now(max_duration).poll(|window| -> Result<Option<CanFrame>, SimError<B::Error>> {
            Ok(self
                .bus
                .recv_timeout(window)
                .map_err(SimError::Receive)?
                .filter(|frame| classify(frame) == RequestKind::VinRequest))
        })?;
        Ok(outcome.complete())
    }

    //==============================================================================ELD_SCENARIO
    /// Run the ELD scenario: stages from `source` when given, otherwise the
    /// built-in default stage for the overall deadline.
    pub fn eld_simulation(
        &mut self,
        source: Option<&Path>,
        overall: Duration,
    ) -> Result<(), SimError<B::Error>> {
        match source {
            Some(path) => {
                let stages = eld::read_stages(path)?;
                self.run_eld(&stages)
            }
            None => self.run_eld(&[eld::default_stage(overall)]),
        }
    }

    /// Run the stages of the broadcast scenario in order.
    pub fn run_eld(&mut self, stages: &[EldStage]) -> Result<(), SimError<B::Error>> {
        for stage in stages {
            info!(
                "simulation step: {} ({} s)",
                stage.description,
                stage.duration.as_secs_f64()
            );
            self.run_stage(stage)?;
        }
        Ok(())
    }

    /// One stage of the broadcast loop. Every iteration sends the full
    /// telemetry burst before checking for a pending request, and the
    /// request wait is short and bounded, so neither side starves the other.
    fn run_stage(&mut self, stage: &EldStage) -> Result<(), SimError<B::Error>> {
        let deadline = Deadline::starting_now(stage.duration);
        let vin = stage.vin.as_deref().unwrap_or(DEFAULT_VIN);

        while !deadline.expired() {
            self.broadcast_telemetry(stage);

            // The request wait never outlives the stage budget.
            let request_budget = deadline
                .remaining()
                .min(Duration::from_millis(REQUEST_WINDOW_MS));
            let window = Deadline::new(request_budget, POLL_QUANTUM);
            let outcome = window.poll(|w| -> Result<Option<RequestKind>, SimError<B::Error>> {
                Ok(self
                    .bus
                    .recv_timeout(w)
                    .map_err(SimError::Receive)?
                    .map(|frame| classify(&frame))
                    .filter(|kind| {
                        matches!(
                            kind,
                            RequestKind::VinRequest | RequestKind::EngineHoursRequest
                        )
                    }))
            })?;

            match outcome.complete() {
                Some(RequestKind::VinRequest) => {
                    info!("VIN request received, sending multi-frame reply");
                    if let Err(e) =
                        multi_frame::send_vin_frames(&mut self.bus, vin, SIMULATOR_SOURCE_ADDRESS)
                    {
                        warn!("VIN reply failed: {e:?}");
                    }
                }
                Some(RequestKind::EngineHoursRequest) => {
                    info!("engine hours request received");
                    match messages::engine_hours_frame(stage.engine_hours, SIMULATOR_SOURCE_ADDRESS)
                    {
                        Ok(frame) => {
                            if let Err(e) = self.bus.send(&frame) {
                                warn!("engine hours reply failed: {e:?}");
                            }
                        }
                        Err(e) => warn!("engine hours value not encodable: {e}"),
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Send the periodic telemetry frames for the stage. A signal that does
    /// not encode is skipped for this iteration, and a failed send never
    /// aborts the stage.
    fn broadcast_telemetry(&mut self, stage: &EldStage) {
        let frames = [
            messages::vehicle_speed_frame(stage.vehicle_speed, SIMULATOR_SOURCE_ADDRESS),
            messages::engine_speed_frame(stage.engine_speed, SIMULATOR_SOURCE_ADDRESS),
            messages::vehicle_distance_frame(stage.vehicle_distance, SIMULATOR_SOURCE_ADDRESS),
        ];
        for built in frames {
            match built {
                Ok(frame) => {
                    if let Err(e) = self.bus.send(&frame) {
                        warn!("telemetry send failed: {e:?}");
                    }
                }
                Err(e) => warn!("telemetry signal skipped: {e}"),
            }
        }
    }
}
