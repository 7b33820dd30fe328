// Logging stand-ins used when hardware is disabled (config or --simulate)

use image::DynamicImage;
use tracing::info;

use super::{HardwareContext, HardwareError, MotorOutput, ServoOutput};
use crate::camera::{CameraDevice, CameraError};
use crate::config::{MotorPins, RuntimeConfig};

pub struct SimMotor {
    id: usize,
    pins: MotorPins,
}

impl SimMotor {
    pub fn new(id: usize, pins: MotorPins) -> Self {
        Self { id, pins }
    }
}

impl MotorOutput for SimMotor {
    fn forward(&mut self) {
        info!(
            "[sim] motor {} ({}/{}) forward",
            self.id, self.pins.forward, self.pins.backward
        );
    }

    fn backward(&mut self) {
        info!(
            "[sim] motor {} ({}/{}) backward",
            self.id, self.pins.forward, self.pins.backward
        );
    }

    fn stop(&mut self) {
        info!(
            "[sim] motor {} ({}/{}) stop",
            self.id, self.pins.forward, self.pins.backward
        );
    }
}

pub struct SimServo {
    pin: u8,
}

impl SimServo {
    pub fn new(pin: u8) -> Self {
        Self { pin }
    }
}

impl ServoOutput for SimServo {
    fn set_value(&mut self, value: f64) -> Result<(), HardwareError> {
        if !(-1.0..=1.0).contains(&value) {
            return Err(HardwareError::ServoValue { value });
        }
        info!("[sim] servo pin {} value {:.3}", self.pin, value);
        Ok(())
    }

    fn detach(&mut self) -> Result<(), HardwareError> {
        info!("[sim] servo pin {} detached", self.pin);
        Ok(())
    }
}

/// Camera that never opens
pub struct SimCamera {
    device: String,
}

impl CameraDevice for SimCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        Err(CameraError::Unavailable(self.device.clone()))
    }

    fn read_frame(&mut self) -> Result<DynamicImage, CameraError> {
        Err(CameraError::NotOpen)
    }

    fn release(&mut self) {}
}

pub fn context(config: &RuntimeConfig) -> HardwareContext {
    let [m1, m2, m3, m4] = config.motors;
    let [s1, s2, s3, s4] = config.servos;
    HardwareContext {
        motors: [
            Box::new(SimMotor::new(1, m1)),
            Box::new(SimMotor::new(2, m2)),
            Box::new(SimMotor::new(3, m3)),
            Box::new(SimMotor::new(4, m4)),
        ],
        servos: [
            Box::new(SimServo::new(s1)),
            Box::new(SimServo::new(s2)),
            Box::new(SimServo::new(s3)),
            Box::new(SimServo::new(s4)),
        ],
        camera: Box::new(SimCamera {
            device: format!("{} (simulated)", config.camera.device),
        }),
    }
}
