// rppal backed motor and servo outputs
//
// Motors: two digital outputs per H-bridge channel, at most one high at a time.
// Servos: software PWM on a single pin, pulse width interpolated over the configured range.

use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};
use tracing::{debug, warn};

use super::{HardwareError, MotorOutput, ServoOutput};
use crate::config::{ConfigError, MotorPins, ServoPulse};

pub struct GpioMotor {
    forward_pin: OutputPin,
    backward_pin: OutputPin,
}

impl GpioMotor {
    pub fn new(gpio: &Gpio, pins: MotorPins) -> Result<Self, HardwareError> {
        let forward_pin = gpio.get(pins.forward)?.into_output_low();
        let backward_pin = gpio.get(pins.backward)?.into_output_low();
        debug!(
            "Motor on pins {}/{} configured",
            pins.forward, pins.backward
        );
        Ok(Self {
            forward_pin,
            backward_pin,
        })
    }
}

impl MotorOutput for GpioMotor {
    fn forward(&mut self) {
        // Release the opposite side first so both are never high together
        self.backward_pin.set_low();
        self.forward_pin.set_high();
    }

    fn backward(&mut self) {
        self.forward_pin.set_low();
        self.backward_pin.set_high();
    }

    fn stop(&mut self) {
        self.forward_pin.set_low();
        self.backward_pin.set_low();
    }
}

impl Drop for GpioMotor {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct GpioServo {
    pin_number: u8,
    pin: OutputPin,
    pulse: ServoPulse,
}

impl GpioServo {
    pub fn new(gpio: &Gpio, pin_number: u8, pulse: ServoPulse) -> Result<Self, HardwareError> {
        let pin = gpio.get(pin_number)?.into_output_low();
        debug!("Servo on pin {} configured", pin_number);
        Ok(Self {
            pin_number,
            pin,
            pulse,
        })
    }
}

impl ServoOutput for GpioServo {
    fn set_value(&mut self, value: f64) -> Result<(), HardwareError> {
        let width = pulse_width(value, &self.pulse)?;
        debug!(
            "Servo pin {}: value={:.3}, pulse={}us",
            self.pin_number,
            value,
            width.as_micros()
        );
        self.pin
            .set_pwm(Duration::from_micros(self.pulse.period_us), width)?;
        Ok(())
    }

    fn detach(&mut self) -> Result<(), HardwareError> {
        self.pin.clear_pwm()?;
        self.pin.set_low();
        Ok(())
    }
}

impl Drop for GpioServo {
    fn drop(&mut self) {
        if let Err(e) = self.detach() {
            warn!("Failed to detach servo on pin {}: {}", self.pin_number, e);
        }
    }
}

/// Map a normalized value in [-1, 1] to a pulse width between the configured bounds
pub fn pulse_width(value: f64, pulse: &ServoPulse) -> Result<Duration, HardwareError> {
    if !(-1.0..=1.0).contains(&value) {
        return Err(HardwareError::ServoValue { value });
    }
    let span = pulse
        .max_pulse_us
        .checked_sub(pulse.min_pulse_us)
        .ok_or(ConfigError::ServoPulse {
            min_us: pulse.min_pulse_us,
            max_us: pulse.max_pulse_us,
            period_us: pulse.period_us,
        })? as f64;
    let micros = pulse.min_pulse_us as f64 + (value + 1.0) / 2.0 * span;
    Ok(Duration::from_micros(micros.round() as u64))
}
