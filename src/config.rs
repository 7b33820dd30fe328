// Tick timing, pin assignments, servo pulse and camera configuration
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::messages::{Joint, Motion};

// Delay between two drive ticks
pub const TICK_DELAY: Duration = Duration::from_millis(100);

// Ticks used by the demonstration sequence and by `drive` when no count is given
pub const DEFAULT_TICKS: u32 = 10;

// Pause after each arm command in the demonstration sequence
pub const ARM_SETTLE: Duration = Duration::from_millis(500);

// Motor layout (seen from above):
//
//   forward
//   1 ----- 2
//   |       |
//   3 ----- 4
//   backward
pub const MOTOR_PINS: [MotorPins; 4] = [
    MotorPins::new(17, 18),
    MotorPins::new(22, 23),
    MotorPins::new(24, 25),
    MotorPins::new(27, 28),
];

// Servo control pins, ordered base, shoulder, elbow, gripper
pub const SERVO_PINS: [u8; 4] = [12, 13, 19, 26];

// Hobby servo pulse train: 20ms period, 1ms..2ms pulse for -1..1
pub const SERVO_PERIOD_US: u64 = 20_000;
pub const SERVO_MIN_PULSE_US: u64 = 1_000;
pub const SERVO_MAX_PULSE_US: u64 = 2_000;

// Capture device (index 0)
pub const CAMERA_DEVICE: &str = "/dev/video0";
pub const CAMERA_RESOLUTION: (u32, u32) = (640, 480);

// Enable GPIO output (set to false to log commands instead of driving pins)
pub const HARDWARE_ENABLED: bool = true;

// Movement order of the demonstration sequence, each for `demo_ticks` ticks
pub const DEMO_MOTIONS: [Motion; 4] = [
    Motion::Forward,
    Motion::Backward,
    Motion::Left,
    Motion::Right,
];

// Angle commands issued by the demonstration sequence after the arm is initialized
pub const DEMO_ARM_SEQUENCE: [(Joint, i32); 6] = [
    (Joint::Base, 45),
    (Joint::Shoulder, 30),
    (Joint::Elbow, 60),
    (Joint::Gripper, 90),
    (Joint::Gripper, 0),
    (Joint::Base, 0),
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("GPIO pin {0} is assigned more than once")]
    DuplicatePin(u8),

    #[error("Tick delay must be greater than zero")]
    ZeroTickDelay,

    #[error("Servo pulse range {min_us}..{max_us}us does not fit in a {period_us}us period")]
    ServoPulse {
        min_us: u64,
        max_us: u64,
        period_us: u64,
    },
}

/// Forward/backward pin pair of one H-bridge channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPins {
    pub forward: u8,
    pub backward: u8,
}

impl MotorPins {
    pub const fn new(forward: u8, backward: u8) -> Self {
        Self { forward, backward }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoPulse {
    pub period_us: u64,
    pub min_pulse_us: u64,
    pub max_pulse_us: u64,
}

impl Default for ServoPulse {
    fn default() -> Self {
        Self {
            period_us: SERVO_PERIOD_US,
            min_pulse_us: SERVO_MIN_PULSE_US,
            max_pulse_us: SERVO_MAX_PULSE_US,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub device: String,
    pub resolution: (u32, u32),
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: CAMERA_DEVICE.to_string(),
            resolution: CAMERA_RESOLUTION,
        }
    }
}

/// Everything the runtime needs to build its hardware context.
///
/// Every field has a default, so a config file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub hardware_enabled: bool,
    pub motors: [MotorPins; 4],
    pub servos: [u8; 4],
    pub servo_pulse: ServoPulse,
    pub camera: CameraConfig,
    pub tick_delay_ms: u64,
    pub demo_ticks: u32,
    pub arm_settle_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            hardware_enabled: HARDWARE_ENABLED,
            motors: MOTOR_PINS,
            servos: SERVO_PINS,
            servo_pulse: ServoPulse::default(),
            camera: CameraConfig::default(),
            tick_delay_ms: TICK_DELAY.as_millis() as u64,
            demo_ticks: DEFAULT_TICKS,
            arm_settle_ms: ARM_SETTLE.as_millis() as u64,
        }
    }
}

impl RuntimeConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_delay_ms == 0 {
            return Err(ConfigError::ZeroTickDelay);
        }

        let pulse = &self.servo_pulse;
        if pulse.min_pulse_us >= pulse.max_pulse_us || pulse.max_pulse_us > pulse.period_us {
            return Err(ConfigError::ServoPulse {
                min_us: pulse.min_pulse_us,
                max_us: pulse.max_pulse_us,
                period_us: pulse.period_us,
            });
        }

        let mut seen = HashSet::new();
        let motor_pins = self.motors.iter().flat_map(|m| [m.forward, m.backward]);
        for pin in motor_pins.chain(self.servos.iter().copied()) {
            if !seen.insert(pin) {
                return Err(ConfigError::DuplicatePin(pin));
            }
        }
        Ok(())
    }

    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }

    pub fn arm_settle(&self) -> Duration {
        Duration::from_millis(self.arm_settle_ms)
    }
}
