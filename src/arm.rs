// Four-joint arm, one servo command at a time
//
// Angle to servo value uses value = angle / 90 - 1. That puts 0 deg at -1 and 90 deg at 0,
// so only 0..=90 deg lands inside the servo's [-1, 1] range. Nothing is clamped: angles
// outside [-90, 90] and values outside [-1, 1] are rejected before the servo is touched.

use tracing::{info, warn};

use crate::hardware::{BoxedServo, HardwareError, ServoOutput};
use crate::messages::Joint;

/// Degrees that map to one unit of servo value
pub const SERVO_ANGLE_SCALE_DEG: f64 = 90.0;

/// Added to angle / SERVO_ANGLE_SCALE_DEG
pub const SERVO_VALUE_OFFSET: f64 = -1.0;

pub const MIN_ANGLE_DEG: i32 = -90;
pub const MAX_ANGLE_DEG: i32 = 90;

pub const MIN_SERVO_VALUE: f64 = -1.0;
pub const MAX_SERVO_VALUE: f64 = 1.0;

/// Angle every joint is set to by `initialize`
pub const HOME_ANGLE_DEG: i32 = 0;

#[derive(Debug, thiserror::Error)]
pub enum ArmError {
    #[error("Angle {angle} deg for {joint} outside [-90, 90]")]
    AngleOutOfRange { joint: Joint, angle: i32 },

    #[error("Angle {angle} deg for {joint} maps to servo value {value}, outside [-1, 1]")]
    ValueOutOfRange { joint: Joint, angle: i32, value: f64 },

    #[error("Servo for {joint} failed: {source}")]
    Hardware {
        joint: Joint,
        source: HardwareError,
    },
}

/// Convert a joint angle in degrees to a normalized servo value
pub fn angle_to_value(angle_deg: i32) -> f64 {
    angle_deg as f64 / SERVO_ANGLE_SCALE_DEG + SERVO_VALUE_OFFSET
}

/// Arm controller owning one servo per joint (base, shoulder, elbow, gripper)
pub struct ArmController<S = BoxedServo> {
    servos: [S; 4],
}

impl<S: ServoOutput> ArmController<S> {
    pub fn new(servos: [S; 4]) -> Self {
        Self { servos }
    }

    pub fn servos(&self) -> &[S; 4] {
        &self.servos
    }

    /// Move one joint. Returns the servo value that was sent.
    pub fn set_servo_angle(&mut self, joint: Joint, angle_deg: i32) -> Result<f64, ArmError> {
        if !(MIN_ANGLE_DEG..=MAX_ANGLE_DEG).contains(&angle_deg) {
            return Err(ArmError::AngleOutOfRange {
                joint,
                angle: angle_deg,
            });
        }

        let value = angle_to_value(angle_deg);
        if !(MIN_SERVO_VALUE..=MAX_SERVO_VALUE).contains(&value) {
            return Err(ArmError::ValueOutOfRange {
                joint,
                angle: angle_deg,
                value,
            });
        }

        info!("Setting {} to {} deg (value {:.3})", joint, angle_deg, value);
        self.servos[joint.index()]
            .set_value(value)
            .map_err(|source| ArmError::Hardware { joint, source })?;
        Ok(value)
    }

    /// Put every joint at the home angle.
    ///
    /// Every joint is attempted even if an earlier one fails; the first error is returned.
    pub fn initialize(&mut self) -> Result<(), ArmError> {
        info!("Initializing arm to {} deg", HOME_ANGLE_DEG);
        let mut first_error = None;
        for joint in Joint::ALL {
            if let Err(e) = self.set_servo_angle(joint, HOME_ANGLE_DEG) {
                warn!("{}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stop driving every servo
    pub fn detach(&mut self) -> Result<(), ArmError> {
        info!("Detaching arm servos");
        for joint in Joint::ALL {
            self.servos[joint.index()]
                .detach()
                .map_err(|source| ArmError::Hardware { joint, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingServo {
        values: Vec<f64>,
        detached: bool,
        fail: bool,
    }

    impl ServoOutput for RecordingServo {
        fn set_value(&mut self, value: f64) -> Result<(), HardwareError> {
            if self.fail {
                return Err(HardwareError::ServoValue { value });
            }
            self.values.push(value);
            Ok(())
        }

        fn detach(&mut self) -> Result<(), HardwareError> {
            self.detached = true;
            Ok(())
        }
    }

    fn arm() -> ArmController<RecordingServo> {
        ArmController::new(Default::default())
    }

    #[test]
    fn test_angle_to_value_literal_formula() {
        assert_eq!(angle_to_value(0), -1.0);
        assert_eq!(angle_to_value(90), 0.0);
        assert_eq!(angle_to_value(-90), -2.0);
        assert_eq!(angle_to_value(45), -0.5);
    }

    #[test]
    fn test_set_single_joint() {
        let mut arm = arm();

        let value = arm.set_servo_angle(Joint::Elbow, 45).unwrap();

        assert_eq!(value, -0.5);
        assert_eq!(arm.servos()[Joint::Elbow.index()].values, [-0.5]);
        for joint in [Joint::Base, Joint::Shoulder, Joint::Gripper] {
            assert!(arm.servos()[joint.index()].values.is_empty());
        }
    }

    #[test]
    fn test_initialize_sets_every_joint_home() {
        let mut arm = arm();

        arm.initialize().unwrap();

        for servo in arm.servos() {
            assert_eq!(servo.values, [-1.0]);
        }
    }

    #[test]
    fn test_angle_outside_range_rejected() {
        let mut arm = arm();

        let result = arm.set_servo_angle(Joint::Base, 91);

        assert!(matches!(
            result,
            Err(ArmError::AngleOutOfRange {
                joint: Joint::Base,
                angle: 91
            })
        ));
        assert!(arm.servos()[0].values.is_empty());
    }

    #[test]
    fn test_negative_angle_maps_outside_servo_range() {
        let mut arm = arm();

        let result = arm.set_servo_angle(Joint::Shoulder, -90);

        match result {
            Err(ArmError::ValueOutOfRange { value, .. }) => assert_eq!(value, -2.0),
            other => panic!("expected ValueOutOfRange, got {:?}", other),
        }
        assert!(arm.servos()[Joint::Shoulder.index()].values.is_empty());
    }

    #[test]
    fn test_hardware_failure_reported_per_joint() {
        let mut arm = arm();
        arm.servos[Joint::Elbow.index()].fail = true;

        let result = arm.initialize();

        assert!(matches!(
            result,
            Err(ArmError::Hardware {
                joint: Joint::Elbow,
                ..
            })
        ));
        // The other joints were still commanded
        assert_eq!(arm.servos()[Joint::Gripper.index()].values, [-1.0]);
    }

    #[test]
    fn test_detach_all() {
        let mut arm = arm();
        arm.detach().unwrap();
        assert!(arm.servos().iter().all(|s| s.detached));
    }
}
