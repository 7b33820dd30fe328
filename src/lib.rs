// Four-wheel drive and four-joint arm runtime for a GPIO driven robot

pub mod arm;
pub mod camera;
pub mod cli;
pub mod config;
pub mod hardware;
pub mod messages;
pub mod motor;
pub mod runtime;
