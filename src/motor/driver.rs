// Tick-based drive controller for the four-wheel base
//
// schedule() computes what happens on every tick; DriveController applies it to the
// motors and sleeps between ticks. Timing lives only in the async loop.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use super::kinematics::{direction_vector, motion_of};
use crate::config::TICK_DELAY;
use crate::hardware::{BoxedMotor, MotorOutput};
use crate::messages::{Direction, DirectionVector, InvalidDirection, Motion, ScheduledTick};

/// Lay out `ticks` rounds of `vector`, each followed by `delay`.
///
/// Ticks are produced lazily, so a long drive never holds its whole plan in memory.
pub fn schedule(
    vector: DirectionVector,
    ticks: u32,
    delay: Duration,
) -> impl Iterator<Item = ScheduledTick> {
    (0..ticks).map(move |index| ScheduledTick {
        index,
        directions: vector,
        start: delay * index,
        delay,
    })
}

/// Drive controller owning the four wheel motors
/// (front-left, front-right, rear-left, rear-right)
pub struct DriveController<M = BoxedMotor> {
    motors: [M; 4],
    tick_delay: Duration,
}

impl<M: MotorOutput> DriveController<M> {
    pub fn new(motors: [M; 4]) -> Self {
        Self::with_tick_delay(motors, TICK_DELAY)
    }

    pub fn with_tick_delay(motors: [M; 4], tick_delay: Duration) -> Self {
        Self { motors, tick_delay }
    }

    /// Issue one direction to each motor, in motor order
    pub fn apply(&mut self, vector: &DirectionVector) {
        for (motor, direction) in self.motors.iter_mut().zip(vector.iter()) {
            match direction {
                Direction::Forward => motor.forward(),
                Direction::Stop => motor.stop(),
                Direction::Backward => motor.backward(),
            }
        }
    }

    /// Run `vector` for `ticks` rounds with the configured delay after each round
    pub async fn execute(&mut self, vector: DirectionVector, ticks: u32) {
        match motion_of(&vector) {
            Some(motion) => info!("Driving {:?} for {} ticks", motion, ticks),
            None => info!("Driving {:?} for {} ticks", vector.as_raw(), ticks),
        }

        for tick in schedule(vector, ticks, self.tick_delay) {
            debug!("Tick {}: {:?}", tick.index, tick.directions.as_raw());
            self.apply(&tick.directions);
            sleep(tick.delay).await;
        }
    }

    /// Same as `execute`, for raw `1 / 0 / -1` symbols. Nothing moves if any symbol is invalid.
    pub async fn execute_raw(&mut self, raw: [i64; 4], ticks: u32) -> Result<(), InvalidDirection> {
        let vector = DirectionVector::from_raw(raw)?;
        self.execute(vector, ticks).await;
        Ok(())
    }

    pub async fn drive(&mut self, motion: Motion, ticks: u32) {
        self.execute(direction_vector(motion), ticks).await
    }

    pub async fn move_forward(&mut self, ticks: u32) {
        self.drive(Motion::Forward, ticks).await
    }

    pub async fn move_backward(&mut self, ticks: u32) {
        self.drive(Motion::Backward, ticks).await
    }

    pub async fn move_left(&mut self, ticks: u32) {
        self.drive(Motion::Left, ticks).await
    }

    pub async fn move_right(&mut self, ticks: u32) {
        self.drive(Motion::Right, ticks).await
    }

    /// Stop all motors once, whatever they were doing
    pub fn stop(&mut self) {
        info!("Stopping all motors");
        for motor in &mut self.motors {
            motor.stop();
        }
    }
}
