use std::env;
use std::fs;
use std::io::{self, BufRead, Write};

use brain::{Actuator, ActuatorError, CalibrationCurve, Gameplay, RecognitionSnapshot, RobotConfig};
use env_logger::Env;
use log::{debug, info, warn};

/// Frames between periodic status reports on the log.
const STATUS_EVERY: u64 = 50;

/// Queues setpoints and emits one JSON command frame per `apply`.
#[derive(Default)]
struct StdoutActuator {
    xyw: Option<(f32, f32, f32)>,
    thrower: Option<u32>,
}

impl Actuator for StdoutActuator {
    fn start(&mut self) -> Result<(), ActuatorError> {
        Ok(())
    }

    fn set_xyw(&mut self, x: f32, y: f32, w: f32) -> Result<(), ActuatorError> {
        self.xyw = Some((x, y, w));
        Ok(())
    }

    fn set_thrower(&mut self, rpm: u32) -> Result<(), ActuatorError> {
        self.thrower = Some(rpm);
        Ok(())
    }

    fn apply(&mut self) -> Result<(), ActuatorError> {
        let frame = serde_json::json!({
            "xyw": self.xyw.map(|(x, y, w)| vec![x, y, w]),
            "thrower": self.thrower,
        });
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{frame}")
            .map_err(|err| ActuatorError::Transport(err.to_string()))?;
        self.xyw = None;
        self.thrower = None;
        Ok(())
    }
}

/// Stand-in for the platform's fitted thrower curve (distance in cm).
fn dist_to_rpm(distance_cm: f32) -> f32 {
    3_500.0 + distance_cm * 18.0
}

fn load_config(path: &str) -> color_eyre::Result<RobotConfig> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(_) => {
            info!("no config at {path}, using defaults");
            Ok(RobotConfig::default())
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config_path = env::var("CONFIG").unwrap_or_else(|_| String::from("config.json"));
    let config = load_config(&config_path)?;
    info!(
        "field {} robot {} enabled {}",
        config.global.field_id,
        config.global.robot_id,
        config.is_enabled()
    );

    let curve: CalibrationCurve = Box::new(dist_to_rpm);
    let mut gameplay = Gameplay::new(config, StdoutActuator::default(), curve);
    gameplay.start()?;

    let mut frames: u64 = 0;
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<RecognitionSnapshot>(&line) {
            Ok(snapshot) => gameplay.step(Some(snapshot))?,
            Err(err) => {
                warn!("unreadable snapshot: {err}");
                continue;
            }
        }

        frames += 1;
        if frames % STATUS_EVERY == 0 {
            match serde_json::to_string(&gameplay.status()) {
                Ok(status) => debug!("status {status}"),
                Err(err) => warn!("status serialization failed: {err}"),
            }
        }
    }

    info!("recognition stream closed after {frames} frames");
    Ok(())
}
