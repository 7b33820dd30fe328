// Motion table for the four-wheel base
// Maps each canonical movement to one direction per motor.
//
// Motor order is front-left, front-right, rear-left, rear-right. Left and right are
// differential turns (each side pair spins against the other), not strafing.

use crate::messages::{DirectionVector, Motion};

/// Per-motor directions for a canonical movement
pub fn direction_vector(motion: Motion) -> DirectionVector {
    match motion {
        Motion::Forward => DirectionVector::FORWARD,
        Motion::Backward => DirectionVector::BACKWARD,
        Motion::Left => DirectionVector::LEFT,
        Motion::Right => DirectionVector::RIGHT,
    }
}

/// Reverse lookup: which canonical movement, if any, a vector describes
pub fn motion_of(vector: &DirectionVector) -> Option<Motion> {
    [Motion::Forward, Motion::Backward, Motion::Left, Motion::Right]
        .into_iter()
        .find(|&motion| direction_vector(motion) == *vector)
}
