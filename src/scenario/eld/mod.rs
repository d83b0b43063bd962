//! ELD simulation stages: the signal values and duration of each step of
//! the broadcast scenario, read from a line-oriented text file.
//!
//! File format, one stage per record:
//!
//! ```text
//! #City driving
//! speed=45;distance=120000;engine_rpm=1400;engine_hours=200.5
//! duration=20
//! ```
//!
//! A stage is complete once its `duration` line is seen. Unknown lines are
//! reported and skipped.
use std::fs;
use std::mem;
use std::path::Path;
use std::time::Duration;

use log::warn;

use crate::error::FileFormatError;

//==================================================================================ELD_STAGE
#[derive(Debug, Clone, Default, PartialEq)]
/// Signal values broadcast during one stage of the ELD scenario, immutable
/// while the stage runs.
pub struct EldStage {
    /// Free-text description of the simulation step.
    pub description: String,
    /// Wheel-based vehicle speed, km/h.
    pub vehicle_speed: f64,
    /// Total vehicle distance, meters.
    pub vehicle_distance: f64,
    /// Engine speed, rpm.
    pub engine_speed: f64,
    /// Total engine hours.
    pub engine_hours: f64,
    /// VIN served during this stage; the default VIN when absent.
    pub vin: Option<String>,
    /// How long the stage broadcasts before the runner advances.
    pub duration: Duration,
}

/// Built-in stage used when no scenario file is given: a truck cruising at
/// highway speed. Runs for the caller's overall deadline.
pub fn default_stage(duration: Duration) -> EldStage {
    EldStage {
        description: "default cruise".to_string(),
        vehicle_speed: 75.0,
        vehicle_distance: 150_000.0,
        engine_speed: 1500.0,
        engine_hours: 200.5,
        vin: None,
        duration,
    }
}

//==================================================================================PARSING
/// Read and parse a scenario file. Fatal when the file cannot be read or
/// yields no complete stage.
pub fn read_stages(path: &Path) -> Result<Vec<EldStage>, FileFormatError> {
    let text = fs::read_to_string(path).map_err(|source| FileFormatError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let stages = parse_stages(&text);
    if stages.is_empty() {
        return Err(FileFormatError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(stages)
}

/// Parse stage records from scenario text, skipping malformed lines.
pub fn parse_stages(text: &str) -> Vec<EldStage> {
    let mut stages = Vec::new();
    let mut stage = EldStage::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(description) = line.strip_prefix('#') {
            stage.description = description.trim().to_string();
        } else if line.starts_with("speed") {
            match parse_signal_line(line) {
                Some((speed, distance, rpm, hours)) => {
                    stage.vehicle_speed = speed;
                    stage.vehicle_distance = distance;
                    stage.engine_speed = rpm;
                    stage.engine_hours = hours;
                }
                None => warn!("line {}: cannot parse signal values: {line}", index + 1),
            }
        } else if line.starts_with("duration") {
            match field_value(line, "duration").and_then(|text| text.parse::<u64>().ok()) {
                Some(seconds) => {
                    stage.duration = Duration::from_secs(seconds);
                    stages.push(mem::take(&mut stage));
                }
                None => warn!("line {}: cannot parse duration: {line}", index + 1),
            }
        } else {
            warn!("line {}: unknown simulation line format: {line}", index + 1);
        }
    }

    if stage != EldStage::default() {
        warn!("trailing stage without a duration line was dropped");
    }
    stages
}

fn parse_signal_line(line: &str) -> Option<(f64, f64, f64, f64)> {
    let speed = field_value(line, "speed")?.parse::<i64>().ok()?;
    let distance = field_value(line, "distance")?.parse::<i64>().ok()?;
    let rpm = field_value(line, "engine_rpm")?.parse::<i64>().ok()?;
    let hours = field_value(line, "engine_hours")?.parse::<f64>().ok()?;
    Some((speed as f64, distance as f64, rpm as f64, hours))
}

/// Value following `key`, with an optional `=` and a `;` terminator.
fn field_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let after = line.split(key).nth(1)?;
    let after = after.strip_prefix('=').unwrap_or(after);
    Some(after.split(';').next().unwrap_or(after).trim())
}
