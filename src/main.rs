//! `cansim` binary: parse the command line, open the CAN interface, and run
//! the selected simulator action.
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use cansim::cli::{frame_from_parts, Action, Cli};
use cansim::infra::bus::SocketCanBus;
use cansim::sim::CanSimulator;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let bus = SocketCanBus::open(&cli.interface)?;
    let mut simulator = CanSimulator::new(bus);

    match cli.action {
        Action::SendOneMessage { id, data } => {
            println!("- Sending one message -");
            let frame = frame_from_parts(id, &data);
            simulator.send_one_message(&frame)?;
            println!("{frame}");
        }
        Action::SendMessageMulti {
            count,
            delay_ms,
            id,
            data,
        } => {
            println!("- Sending one message multiple times -");
            let frame = frame_from_parts(id, &data);
            simulator.send_message_multi(count, Duration::from_millis(delay_ms), &frame)?;
        }
        Action::SendFileMessages { file } => {
            println!("- Sending messages from file -");
            simulator.send_file_messages(&file)?;
        }
        Action::SendDefaultMessages => {
            println!("- Sending default messages -");
            simulator.send_default_messages()?;
        }
        Action::ReceiveOneMessage { timeout_ms } => {
            match simulator.receive_one_message(Duration::from_millis(timeout_ms))? {
                Some(frame) => println!("{frame}"),
                None => println!("No message received within {timeout_ms} ms"),
            }
        }
        Action::ReceiveMessages { timeout_ms } => {
            let frames = simulator.receive_messages(Duration::from_millis(timeout_ms))?;
            for frame in &frames {
                println!("{frame}");
            }
            println!("{} message(s) received", frames.len());
        }
        Action::AddrClaimNoResponse { timeout_ms } => {
            match simulator.addr_claim_no_response(Duration::from_millis(timeout_ms))? {
                Some(frame) => println!("Address claim observed, not answered: {frame}"),
                None => println!("No address claim within {timeout_ms} ms"),
            }
        }
        Action::AddrClaimAddrUsed { timeout_ms } => {
            let collisions = simulator.addr_claim_addr_used(Duration::from_millis(timeout_ms))?;
            println!("Address collisions forced: {collisions}");
        }
        Action::AddrClaimAddrUsedMulti {
            timeout_ms,
            max_responses,
        } => {
            let collisions = simulator
                .addr_claim_addr_used_multi(Duration::from_millis(timeout_ms), max_responses)?;
            println!("Address collisions forced: {collisions}");
        }
        Action::NewDeviceAddrUsedMulti {
            timeout_ms,
            max_responses,
        } => {
            let claims = simulator
                .new_device_addr_used_multi(Duration::from_millis(timeout_ms), max_responses)?;
            println!("Address claims sent (initial claim included): {claims}");
        }
        Action::VinCodeResponse { timeout_ms } => {
            if simulator.vin_code_response(Duration::from_millis(timeout_ms))? {
                println!("VIN code sent as single frame");
            } else {
                println!("No VIN request within {timeout_ms} ms");
            }
        }
        Action::VinCodeResponseMulti { timeout_ms } => {
            if simulator.vin_code_response_multi(Duration::from_millis(timeout_ms))? {
                println!("VIN code sent as multi-frame message");
            } else {
                println!("No VIN request within {timeout_ms} ms");
            }
        }
        Action::EldSimulation { file, timeout_ms } => {
            println!("- Running ELD simulation -");
            simulator.eld_simulation(file.as_deref(), Duration::from_millis(timeout_ms))?;
        }
    }

    println!("- Done -");
    Ok(())
}
