// Command types shared by the drive and arm controllers

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Raw direction symbol that is not one of 1, 0, -1
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid direction {0:?}, expected 1, 0 or -1")]
pub struct InvalidDirection(pub String);

/// Command for a single wheel motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Stop,
    Backward,
}

impl Direction {
    pub fn inverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Stop => Direction::Stop,
            Direction::Backward => Direction::Forward,
        }
    }

    pub fn as_raw(self) -> i8 {
        match self {
            Direction::Forward => 1,
            Direction::Stop => 0,
            Direction::Backward => -1,
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = InvalidDirection;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Direction::Forward),
            0 => Ok(Direction::Stop),
            -1 => Ok(Direction::Backward),
            other => Err(InvalidDirection(other.to_string())),
        }
    }
}

/// One direction per motor, in motor order (front-left, front-right, rear-left, rear-right)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionVector(pub [Direction; 4]);

impl DirectionVector {
    pub const FORWARD: Self = Self([Direction::Forward; 4]);
    pub const BACKWARD: Self = Self([Direction::Backward; 4]);
    pub const LEFT: Self = Self([
        Direction::Backward,
        Direction::Forward,
        Direction::Backward,
        Direction::Forward,
    ]);
    pub const RIGHT: Self = Self([
        Direction::Forward,
        Direction::Backward,
        Direction::Forward,
        Direction::Backward,
    ]);
    pub const STOP: Self = Self([Direction::Stop; 4]);

    /// Parse a vector of raw symbols, rejecting anything outside 1, 0, -1
    pub fn from_raw(raw: [i64; 4]) -> Result<Self, InvalidDirection> {
        let [a, b, c, d] = raw;
        Ok(Self([
            Direction::try_from(a)?,
            Direction::try_from(b)?,
            Direction::try_from(c)?,
            Direction::try_from(d)?,
        ]))
    }

    pub fn as_raw(&self) -> [i8; 4] {
        self.0.map(Direction::as_raw)
    }

    pub fn inverse(&self) -> Self {
        Self(self.0.map(Direction::inverse))
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.0.iter().copied()
    }
}

/// Canonical movements of the base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Forward,
    Backward,
    Left,
    Right,
}

/// Arm joints, in servo order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Base,
    Shoulder,
    Elbow,
    Gripper,
}

impl Joint {
    pub const ALL: [Joint; 4] = [Joint::Base, Joint::Shoulder, Joint::Elbow, Joint::Gripper];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Joint::Base => "base",
            Joint::Shoulder => "shoulder",
            Joint::Elbow => "elbow",
            Joint::Gripper => "gripper",
        };
        f.write_str(name)
    }
}

/// One round of the drive loop: apply `directions` at `start`, then wait `delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduledTick {
    pub index: u32,
    pub directions: DirectionVector,
    pub start: Duration,
    pub delay: Duration,
}
