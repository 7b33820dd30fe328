// End-to-end checks of the demonstration sequence and command dispatch against recording hardware

use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use image::DynamicImage;
use serde_json::{json, Value};
use tokio::time::Instant;

use quadbot_runtime::camera::{CameraDevice, CameraError, CaptureOutcome};
use quadbot_runtime::cli::{Cli, Command};
use quadbot_runtime::config::RuntimeConfig;
use quadbot_runtime::hardware::{HardwareContext, HardwareError, MotorOutput, ServoOutput};
use quadbot_runtime::messages::{Direction, InvalidDirection, Joint, Motion};
use quadbot_runtime::runtime::{self, Runtime};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Motor(usize, Direction),
    Servo(usize, f64),
    Detach(usize),
}

type EventLog = Arc<Mutex<Vec<Event>>>;

struct Motor {
    id: usize,
    log: EventLog,
}

impl MotorOutput for Motor {
    fn forward(&mut self) {
        self.log.lock().unwrap().push(Event::Motor(self.id, Direction::Forward));
    }

    fn backward(&mut self) {
        self.log.lock().unwrap().push(Event::Motor(self.id, Direction::Backward));
    }

    fn stop(&mut self) {
        self.log.lock().unwrap().push(Event::Motor(self.id, Direction::Stop));
    }
}

struct Servo {
    id: usize,
    log: EventLog,
}

impl ServoOutput for Servo {
    fn set_value(&mut self, value: f64) -> Result<(), HardwareError> {
        self.log.lock().unwrap().push(Event::Servo(self.id, value));
        Ok(())
    }

    fn detach(&mut self) -> Result<(), HardwareError> {
        self.log.lock().unwrap().push(Event::Detach(self.id));
        Ok(())
    }
}

struct NoCamera;

impl CameraDevice for NoCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        Err(CameraError::Unavailable("test".to_string()))
    }

    fn read_frame(&mut self) -> Result<DynamicImage, CameraError> {
        Err(CameraError::NotOpen)
    }

    fn release(&mut self) {}
}

fn test_config() -> RuntimeConfig {
    RuntimeConfig {
        hardware_enabled: false,
        demo_ticks: 3,
        arm_settle_ms: 200,
        ..RuntimeConfig::default()
    }
}

fn recording_hardware() -> (HardwareContext, EventLog) {
    let log = EventLog::default();
    let hardware = HardwareContext {
        motors: [0, 1, 2, 3].map(|id| {
            Box::new(Motor {
                id,
                log: log.clone(),
            }) as Box<dyn MotorOutput + Send>
        }),
        servos: [0, 1, 2, 3].map(|id| {
            Box::new(Servo {
                id,
                log: log.clone(),
            }) as Box<dyn ServoOutput + Send>
        }),
        camera: Box::new(NoCamera),
    };
    (hardware, log)
}

fn recording_runtime(config: &RuntimeConfig) -> (Runtime, EventLog) {
    let (hardware, log) = recording_hardware();
    (Runtime::new(hardware, config), log)
}

fn shutdown_events() -> Vec<Event> {
    (0..4)
        .map(|i| Event::Motor(i, Direction::Stop))
        .chain((0..4).map(Event::Detach))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn demo_drives_then_moves_arm() {
    let config = test_config();
    let (mut runtime, log) = recording_runtime(&config);
    let start = Instant::now();

    runtime.run_demo().await;

    // 4 movements x 3 ticks x 100ms, then 7 arm settles x 200ms
    assert_eq!(start.elapsed(), Duration::from_millis(1200 + 1400));

    let events = log.lock().unwrap();
    let (motor_events, servo_events) = events.split_at(4 * 3 * 4 + 4);

    let expected_rounds = [
        [1, 1, 1, 1],
        [-1, -1, -1, -1],
        [-1, 1, -1, 1],
        [1, -1, 1, -1],
    ];
    for (movement, raw) in expected_rounds.iter().enumerate() {
        for tick in 0..3 {
            for motor in 0..4 {
                let event = &motor_events[movement * 12 + tick * 4 + motor];
                let direction = Direction::try_from(raw[motor] as i64).unwrap();
                assert_eq!(*event, Event::Motor(motor, direction));
            }
        }
    }
    for (motor, event) in motor_events[48..].iter().enumerate() {
        assert_eq!(*event, Event::Motor(motor, Direction::Stop));
    }

    let values: Vec<(usize, f64)> = servo_events
        .iter()
        .map(|e| match e {
            Event::Servo(id, value) => (*id, *value),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    let expected = [
        (0, -1.0),
        (1, -1.0),
        (2, -1.0),
        (3, -1.0),
        (Joint::Base.index(), -0.5),
        (Joint::Shoulder.index(), 30.0 / 90.0 - 1.0),
        (Joint::Elbow.index(), 60.0 / 90.0 - 1.0),
        (Joint::Gripper.index(), 0.0),
        (Joint::Gripper.index(), -1.0),
        (Joint::Base.index(), -1.0),
    ];
    assert_eq!(values.len(), expected.len());
    for ((id, value), (expected_id, expected_value)) in values.iter().zip(expected.iter()) {
        assert_eq!(id, expected_id);
        assert!((value - expected_value).abs() < 1e-9);
    }
}

#[tokio::test(start_paused = true)]
async fn rejected_joint_command_keeps_running() {
    let config = test_config();
    let (mut runtime, log) = recording_runtime(&config);

    assert_eq!(runtime.set_joint(Joint::Elbow, -45), None);
    assert_eq!(runtime.set_joint(Joint::Elbow, 120), None);
    assert_eq!(runtime.set_joint(Joint::Elbow, 45), Some(-0.5));

    assert_eq!(*log.lock().unwrap(), [Event::Servo(2, -0.5)]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_motors_and_detaches_servos() {
    let config = test_config();
    let (mut runtime, log) = recording_runtime(&config);

    runtime.shutdown().unwrap();

    assert_eq!(*log.lock().unwrap(), shutdown_events());
}

#[test]
fn capture_without_camera_reports_unavailable() {
    let config = test_config();
    let (mut runtime, _log) = recording_runtime(&config);
    let path = std::env::temp_dir().join(format!("quadbot-it-{}.png", std::process::id()));

    let outcome = runtime.capture(&path);

    assert_eq!(outcome, CaptureOutcome::DeviceUnavailable);
    assert!(!path.exists());
}

#[tokio::test(start_paused = true)]
async fn simulated_context_runs_demo() {
    let config = test_config();
    let hardware = HardwareContext::from_config(&config).unwrap();
    let mut runtime = Runtime::new(hardware, &config);

    runtime.run_demo().await;
    runtime.shutdown().unwrap();
}

#[test]
fn simulate_flag_overrides_config_file() {
    let path = std::env::temp_dir().join(format!("quadbot-cfg-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"hardware_enabled": true, "tick_delay_ms": 50}"#).unwrap();
    let path_arg = path.to_str().unwrap();

    let cli = Cli::try_parse_from(["quadbot-runtime", "--config", path_arg, "stop"]).unwrap();
    let config = runtime::resolve_config(&cli).unwrap();
    assert!(config.hardware_enabled);
    assert_eq!(config.tick_delay_ms, 50);

    let cli =
        Cli::try_parse_from(["quadbot-runtime", "--config", path_arg, "--simulate", "stop"])
            .unwrap();
    let config = runtime::resolve_config(&cli).unwrap();
    assert!(!config.hardware_enabled);
    assert_eq!(config.tick_delay_ms, 50);

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn plan_needs_no_hardware() {
    // Default config has GPIO enabled, so opening hardware here would fail off-target
    let cli = Cli::try_parse_from(["quadbot-runtime", "plan", "left", "-t", "2"]).unwrap();
    runtime::run(cli).await.unwrap();

    let text = runtime::plan_json(Motion::Left, 2, Duration::from_millis(100)).unwrap();
    let plan: Value = serde_json::from_str(&text).unwrap();
    let ticks = plan.as_array().unwrap();
    assert_eq!(ticks.len(), 2);
    assert_eq!(
        ticks[0]["directions"],
        json!(["backward", "forward", "backward", "forward"])
    );
    assert_eq!(ticks[1]["index"], 1);
    assert_eq!(ticks[1]["start"], json!({"secs": 0, "nanos": 100_000_000}));
}

#[tokio::test(start_paused = true)]
async fn invalid_drive_raw_still_shuts_down() {
    let config = test_config();
    let (hardware, log) = recording_hardware();
    let command = Command::DriveRaw {
        directions: vec![1, 1, 2, 1],
        ticks: Some(3),
    };
    let start = Instant::now();

    let err = runtime::run_with(command, hardware, &config)
        .await
        .unwrap_err();

    assert_eq!(
        err.downcast_ref::<InvalidDirection>(),
        Some(&InvalidDirection("2".to_string()))
    );
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(*log.lock().unwrap(), shutdown_events());
}

#[tokio::test(start_paused = true)]
async fn drive_command_ends_with_stop() {
    let config = test_config();
    let (hardware, log) = recording_hardware();
    let command = Command::Drive {
        motion: Motion::Forward,
        ticks: Some(2),
    };
    let start = Instant::now();

    runtime::run_with(command, hardware, &config).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_millis(200));
    let events = log.lock().unwrap();
    let mut expected: Vec<Event> = (0..2)
        .flat_map(|_| (0..4).map(|i| Event::Motor(i, Direction::Forward)))
        .collect();
    expected.extend((0..4).map(|i| Event::Motor(i, Direction::Stop)));
    expected.extend(shutdown_events());
    assert_eq!(*events, expected);
}

#[test]
fn unvalidated_config_is_rejected_before_hardware_opens() {
    let config = RuntimeConfig {
        tick_delay_ms: 0,
        ..test_config()
    };
    assert!(matches!(
        HardwareContext::from_config(&config),
        Err(HardwareError::Config(_))
    ));
}
