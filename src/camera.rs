// Single frame capture
//
// capture_image never fails: every problem is logged and reported through CaptureOutcome,
// and the device is released whatever happened.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use rscam::{Camera, Config};
use tracing::{debug, error, info};

use crate::config::CameraConfig;

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("Could not open camera {device}: {source}")]
    Open {
        device: String,
        source: std::io::Error,
    },

    #[error("Could not start camera: {0}")]
    Start(#[from] rscam::Error),

    #[error("Camera {0} is not available")]
    Unavailable(String),

    #[error("Camera is not open")]
    NotOpen,

    #[error("Could not capture frame: {0}")]
    Capture(#[from] std::io::Error),

    #[error("Could not decode frame: {0}")]
    Decode(#[from] image::ImageError),
}

/// A capture device that can be opened, read from and released
pub trait CameraDevice {
    fn open(&mut self) -> Result<(), CameraError>;
    fn read_frame(&mut self) -> Result<DynamicImage, CameraError>;
    fn release(&mut self);
}

impl<T: CameraDevice + ?Sized> CameraDevice for Box<T> {
    fn open(&mut self) -> Result<(), CameraError> {
        (**self).open()
    }

    fn read_frame(&mut self) -> Result<DynamicImage, CameraError> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Result of one capture attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Saved(PathBuf),
    DeviceUnavailable,
    FrameUnavailable,
    WriteFailed,
}

/// Grab one frame from `camera` and write it to `path` (format from the extension)
pub fn capture_image<C>(camera: &mut C, path: impl AsRef<Path>) -> CaptureOutcome
where
    C: CameraDevice + ?Sized,
{
    let path = path.as_ref();

    if let Err(e) = camera.open() {
        error!("Could not open camera: {}", e);
        camera.release();
        return CaptureOutcome::DeviceUnavailable;
    }

    let outcome = match camera.read_frame() {
        Ok(frame) => match frame.save(path) {
            Ok(()) => {
                info!("Image saved to {}", path.display());
                CaptureOutcome::Saved(path.to_path_buf())
            }
            Err(e) => {
                error!("Could not write image to {}: {}", path.display(), e);
                CaptureOutcome::WriteFailed
            }
        },
        Err(e) => {
            error!("Could not capture image: {}", e);
            CaptureOutcome::FrameUnavailable
        }
    };

    camera.release();
    outcome
}

/// V4L2 camera streaming MJPG frames
pub struct V4lCamera {
    device: String,
    resolution: (u32, u32),
    camera: Option<Camera>,
}

impl V4lCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            device: config.device.clone(),
            resolution: config.resolution,
            camera: None,
        }
    }
}

impl CameraDevice for V4lCamera {
    fn open(&mut self) -> Result<(), CameraError> {
        let mut camera = Camera::new(&self.device).map_err(|source| CameraError::Open {
            device: self.device.clone(),
            source,
        })?;
        camera.start(&Config {
            interval: (1, 30),
            resolution: self.resolution,
            format: b"MJPG",
            ..Default::default()
        })?;
        debug!("Camera {} started at {:?}", self.device, self.resolution);
        self.camera = Some(camera);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<DynamicImage, CameraError> {
        let camera = self.camera.as_mut().ok_or(CameraError::NotOpen)?;
        let frame = camera.capture()?;
        Ok(image::load_from_memory_with_format(&frame, ImageFormat::Jpeg)?)
    }

    fn release(&mut self) {
        if let Some(mut camera) = self.camera.take() {
            if let Err(e) = camera.stop() {
                debug!("Camera {} did not stop cleanly: {}", self.device, e);
            }
        }
    }
}

impl Drop for V4lCamera {
    fn drop(&mut self) {
        self.release();
    }
}
