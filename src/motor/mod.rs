// Wheel motor control for the four-wheel base
//
// Provides:
// - Motion table (canonical movement -> per-motor directions)
// - Tick scheduling (pure) and the async drive loop that applies it

mod driver;
pub mod kinematics;

pub use driver::{schedule, DriveController};
pub use kinematics::{direction_vector, motion_of};
