// Demonstration sequence and single-operation dispatch
//
// Nothing in here aborts on a bad angle or a missing camera: those are logged and the
// sequence carries on. Only startup problems (config, GPIO) end the process.

use std::path::Path;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::arm::{ArmController, ArmError};
use crate::camera::{capture_image, CaptureOutcome};
use crate::cli::{Cli, Command};
use crate::config::{ConfigError, RuntimeConfig, DEMO_ARM_SEQUENCE, DEMO_MOTIONS};
use crate::hardware::{BoxedCamera, HardwareContext};
use crate::messages::{Joint, Motion};
use crate::motor::{direction_vector, schedule, DriveController};

pub struct Runtime {
    drive: DriveController,
    arm: ArmController,
    camera: BoxedCamera,
    demo_ticks: u32,
    arm_settle: Duration,
}

impl Runtime {
    pub fn new(hardware: HardwareContext, config: &RuntimeConfig) -> Self {
        let HardwareContext {
            motors,
            servos,
            camera,
        } = hardware;
        Self {
            drive: DriveController::with_tick_delay(motors, config.tick_delay()),
            arm: ArmController::new(servos),
            camera,
            demo_ticks: config.demo_ticks,
            arm_settle: config.arm_settle(),
        }
    }

    pub fn drive(&mut self) -> &mut DriveController {
        &mut self.drive
    }

    pub fn arm(&mut self) -> &mut ArmController {
        &mut self.arm
    }

    /// Forward, backward, left, right, stop; then home the arm and step through the demo angles
    pub async fn run_demo(&mut self) {
        info!("Demo: drive sequence ({} ticks per movement)", self.demo_ticks);
        for motion in DEMO_MOTIONS {
            self.drive.drive(motion, self.demo_ticks).await;
        }
        self.drive.stop();

        info!("Demo: arm sequence");
        if let Err(e) = self.arm.initialize() {
            warn!("Arm initialization incomplete: {}", e);
        }
        sleep(self.arm_settle).await;

        for (joint, angle) in DEMO_ARM_SEQUENCE {
            self.set_joint(joint, angle);
            sleep(self.arm_settle).await;
        }
        info!("Demo finished");
    }

    /// Best-effort joint move: a rejected or failed command is logged and yields None
    pub fn set_joint(&mut self, joint: Joint, angle: i32) -> Option<f64> {
        match self.arm.set_servo_angle(joint, angle) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring arm command: {}", e);
                None
            }
        }
    }

    pub fn capture(&mut self, path: &Path) -> CaptureOutcome {
        capture_image(&mut self.camera, path)
    }

    /// Release the motors and servos before exit
    pub fn shutdown(&mut self) -> Result<(), ArmError> {
        self.drive.stop();
        self.arm.detach()
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub async fn run(cli: Cli) -> Result<(), BoxError> {
    let config = resolve_config(&cli)?;
    let command = cli.command.unwrap_or(Command::Demo);

    // Planning never opens hardware
    if let Command::Plan { motion, ticks } = command {
        let ticks = ticks.unwrap_or(config.demo_ticks);
        println!("{}", plan_json(motion, ticks, config.tick_delay())?);
        return Ok(());
    }

    let hardware = HardwareContext::from_config(&config)?;
    run_with(command, hardware, &config).await
}

/// Config file (or defaults) with `--simulate` applied on top
pub fn resolve_config(cli: &Cli) -> Result<RuntimeConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    if cli.simulate {
        config.hardware_enabled = false;
    }
    Ok(config)
}

/// Run one command on an already built hardware context, then release the motors and servos
/// whether or not the command succeeded
pub async fn run_with(
    command: Command,
    hardware: HardwareContext,
    config: &RuntimeConfig,
) -> Result<(), BoxError> {
    let mut runtime = Runtime::new(hardware, config);
    info!(
        "Runtime ready: {}ms tick, hardware {}",
        config.tick_delay_ms,
        if config.hardware_enabled { "enabled" } else { "simulated" }
    );

    let result = execute(&mut runtime, command, config).await;

    if let Err(e) = runtime.shutdown() {
        warn!("Shutdown incomplete: {}", e);
    }
    result
}

async fn execute(
    runtime: &mut Runtime,
    command: Command,
    config: &RuntimeConfig,
) -> Result<(), BoxError> {
    let default_ticks = config.demo_ticks;
    match command {
        Command::Demo => runtime.run_demo().await,
        Command::Drive { motion, ticks } => {
            runtime
                .drive()
                .drive(motion, ticks.unwrap_or(default_ticks))
                .await;
            runtime.drive().stop();
        }
        Command::DriveRaw { directions, ticks } => {
            let raw: [i64; 4] = directions
                .as_slice()
                .try_into()
                .map_err(|_| format!("expected 4 directions, got {}", directions.len()))?;
            runtime
                .drive()
                .execute_raw(raw, ticks.unwrap_or(default_ticks))
                .await?;
            runtime.drive().stop();
        }
        Command::Stop => runtime.drive().stop(),
        Command::Arm { joint, angle } => {
            runtime.arm().set_servo_angle(joint, angle)?;
        }
        Command::ArmInit => runtime.arm().initialize()?,
        Command::Capture { path } => {
            let outcome = runtime.capture(&path);
            info!("Capture finished: {:?}", outcome);
        }
        Command::Plan { motion, ticks } => {
            let ticks = ticks.unwrap_or(default_ticks);
            println!("{}", plan_json(motion, ticks, config.tick_delay())?);
        }
    }
    Ok(())
}

/// Tick schedule of one movement as pretty-printed JSON
pub fn plan_json(
    motion: Motion,
    ticks: u32,
    delay: Duration,
) -> Result<String, serde_json::Error> {
    let plan: Vec<_> = schedule(direction_vector(motion), ticks, delay).collect();
    serde_json::to_string_pretty(&plan)
}
