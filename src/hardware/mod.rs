// Hardware boundary for the robot
//
// Provides:
// - Capability traits for wheel motors and servos
// - GPIO backed implementations (rppal)
// - Logging implementations for running without hardware
// - HardwareContext, built once from config and handed to the controllers

pub mod gpio;
pub mod sim;

use tracing::info;

use crate::camera::{CameraDevice, V4lCamera};
use crate::config::{ConfigError, RuntimeConfig};

/// Error types for the GPIO boundary
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("Servo value {value} outside [-1, 1]")]
    ServoValue { value: f64 },

    #[error("Invalid hardware configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A wheel motor driven through an H-bridge.
///
/// Commands are fire-and-forget: the hardware gives no feedback and the
/// commanded direction is not tracked.
pub trait MotorOutput {
    fn forward(&mut self);
    fn backward(&mut self);
    fn stop(&mut self);
}

/// A positional servo taking a normalized value in [-1, 1]
pub trait ServoOutput {
    fn set_value(&mut self, value: f64) -> Result<(), HardwareError>;

    /// Stop sending pulses so the servo goes limp
    fn detach(&mut self) -> Result<(), HardwareError>;
}

impl<T: MotorOutput + ?Sized> MotorOutput for Box<T> {
    fn forward(&mut self) {
        (**self).forward()
    }

    fn backward(&mut self) {
        (**self).backward()
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

impl<T: ServoOutput + ?Sized> ServoOutput for Box<T> {
    fn set_value(&mut self, value: f64) -> Result<(), HardwareError> {
        (**self).set_value(value)
    }

    fn detach(&mut self) -> Result<(), HardwareError> {
        (**self).detach()
    }
}

pub type BoxedMotor = Box<dyn MotorOutput + Send>;
pub type BoxedServo = Box<dyn ServoOutput + Send>;
pub type BoxedCamera = Box<dyn CameraDevice>;

/// All hardware handles used by one run of the process
pub struct HardwareContext {
    pub motors: [BoxedMotor; 4],
    pub servos: [BoxedServo; 4],
    pub camera: BoxedCamera,
}

impl HardwareContext {
    /// Open GPIO and the camera, or build logging stand-ins when hardware is disabled
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, HardwareError> {
        config.validate()?;

        if !config.hardware_enabled {
            info!("Hardware disabled, commands will only be logged");
            return Ok(sim::context(config));
        }

        let gpio = rppal::gpio::Gpio::new()?;
        let [m1, m2, m3, m4] = config.motors;
        let motors: [BoxedMotor; 4] = [
            Box::new(gpio::GpioMotor::new(&gpio, m1)?),
            Box::new(gpio::GpioMotor::new(&gpio, m2)?),
            Box::new(gpio::GpioMotor::new(&gpio, m3)?),
            Box::new(gpio::GpioMotor::new(&gpio, m4)?),
        ];

        let [s1, s2, s3, s4] = config.servos;
        let pulse = config.servo_pulse;
        let servos: [BoxedServo; 4] = [
            Box::new(gpio::GpioServo::new(&gpio, s1, pulse)?),
            Box::new(gpio::GpioServo::new(&gpio, s2, pulse)?),
            Box::new(gpio::GpioServo::new(&gpio, s3, pulse)?),
            Box::new(gpio::GpioServo::new(&gpio, s4, pulse)?),
        ];

        info!(
            "GPIO ready: motors {:?}, servos {:?}",
            config.motors, config.servos
        );

        Ok(Self {
            motors,
            servos,
            camera: Box::new(V4lCamera::new(&config.camera)),
        })
    }
}
