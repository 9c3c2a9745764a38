//!
//! nokhwa-backed capture
//!

use nokhwa::{
    pixel_format::RgbAFormat,
    query,
    utils::{
        ApiBackend, CameraFormat, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
    Camera, NokhwaError,
};

use super::{pick_device, CaptureDevice, CaptureSession, DeviceDescriptor, StreamRequest};
use crate::{error::Error, raster::Raster};

/// A host webcam, opened through nokhwa's native backend
pub struct Webcam;

impl Webcam {
    pub fn new() -> Self {
        Self
    }

    /// Enumerate the capture devices the platform exposes
    pub fn enumerate() -> Result<Vec<DeviceDescriptor>, Error> {
        let devices = query(ApiBackend::Auto).map_err(|err| {
            error!("failed to enumerate capture devices: {err}");
            Error::DeviceUnavailable
        })?;

        Ok(devices
            .iter()
            .enumerate()
            .map(|(i, info)| DeviceDescriptor {
                index: i as u32,
                name: info.human_name(),
            })
            .collect())
    }
}

impl Default for Webcam {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureDevice for Webcam {
    type Session = WebcamSession;

    fn open(&mut self, request: &StreamRequest) -> Result<WebcamSession, Error> {
        let devices = query(ApiBackend::Auto).map_err(|err| {
            error!("failed to enumerate capture devices: {err}");
            Error::DeviceUnavailable
        })?;

        let descriptors: Vec<DeviceDescriptor> = devices
            .iter()
            .enumerate()
            .map(|(i, info)| DeviceDescriptor {
                index: i as u32,
                name: info.human_name(),
            })
            .collect();

        let picked = pick_device(&descriptors, request).ok_or_else(|| {
            error!("no capture devices present");
            Error::DeviceUnavailable
        })?;
        debug!("opening capture device {:?}", descriptors[picked].name);

        let format = match &request.settings {
            Some(settings) => {
                let frame_rate = settings.frame_rate.approx().round() as u32;
                RequestedFormat::new::<RgbAFormat>(RequestedFormatType::Closest(
                    CameraFormat::new(
                        Resolution::new(settings.width, settings.height),
                        FrameFormat::MJPEG,
                        frame_rate.max(1),
                    ),
                ))
            }
            None => {
                RequestedFormat::new::<RgbAFormat>(RequestedFormatType::AbsoluteHighestResolution)
            }
        };

        let index = devices[picked].index().clone();
        let mut camera = Camera::new(index, format).map_err(open_error)?;
        camera.open_stream().map_err(open_error)?;

        let resolution = camera.resolution();
        info!(
            "capture session open on {:?} at {}x{}",
            descriptors[picked].name,
            resolution.width(),
            resolution.height()
        );

        Ok(WebcamSession { camera, open: true })
    }
}

/// An open stream on a [Webcam]
pub struct WebcamSession {
    camera: Camera,
    open: bool,
}

impl CaptureSession for WebcamSession {
    fn ready(&self) -> bool {
        self.open && self.camera.is_stream_open()
    }

    fn dimensions(&self) -> (u32, u32) {
        let resolution = self.camera.resolution();
        (resolution.width(), resolution.height())
    }

    fn capture_into(&mut self, raster: &mut Raster) -> Result<(), Error> {
        if !self.open {
            return Err(Error::StreamClosed);
        }

        let frame = self.camera.frame().map_err(|err| {
            error!("failed to pull frame: {err}");
            Error::FailedToMapFrame
        })?;
        let image = frame.decode_image::<RgbAFormat>().map_err(|err| {
            error!("failed to map frame to RGBA: {err}");
            Error::FailedToMapFrame
        })?;

        let (width, height) = image.dimensions();
        raster.fill_from(&image.into_raw(), width, height);

        Ok(())
    }

    fn release(&mut self) {
        if self.open {
            if let Err(err) = self.camera.stop_stream() {
                warn!("failed to stop stream cleanly: {err}");
            }
            self.open = false;
        }
    }
}

impl Drop for WebcamSession {
    fn drop(&mut self) {
        self.release();
    }
}

fn open_error(err: NokhwaError) -> Error {
    error!("failed to open capture device: {err}");
    let msg = err.to_string().to_ascii_lowercase();
    if msg.contains("permission") || msg.contains("denied") || msg.contains("access") {
        Error::PermissionDenied
    } else {
        Error::DeviceUnavailable
    }
}
