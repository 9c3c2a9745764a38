//!
//! Capture devices and sessions
//!
//! The scan loop never talks to camera hardware directly. It is handed a
//! [CaptureSession] by whoever opened the device. A session is moved into
//! the loop that scans it, so at most one loop exists per open stream.
//!

#[cfg(feature = "camera")]
mod webcam;

#[cfg(feature = "camera")]
pub use webcam::Webcam;

use crate::{
    config::{CameraConfig, CameraSettings},
    error::Error,
    raster::Raster,
};

/// Which way the preferred camera should face
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Rear camera, pointed at the world (preferred for scanning)
    Environment,
    /// Front camera, pointed at the user
    User,
    /// No preference
    Any,
}

/// A request for a video stream
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub facing: Facing,
    pub device_name: Option<String>,
    pub settings: Option<CameraSettings>,
}

impl StreamRequest {
    pub fn new(facing: Facing) -> Self {
        Self {
            facing,
            device_name: None,
            settings: None,
        }
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            facing: config.facing,
            device_name: config.name.clone(),
            settings: config.settings.clone(),
        }
    }
}

/// An enumerated capture device, before a stream is opened on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub index: u32,
    pub name: String,
}

/// Something that can open a video stream
pub trait CaptureDevice {
    type Session: CaptureSession;

    /// Open a stream on the device best matching the request
    ///
    /// Denial and unavailability are distinct failures here, not silence:
    /// [Error::PermissionDenied] when the platform refuses access,
    /// [Error::DeviceUnavailable] when no usable device exists.
    fn open(&mut self, request: &StreamRequest) -> Result<Self::Session, Error>;
}

/// An open video stream
///
/// Owned exclusively by the scan loop for its lifetime.
pub trait CaptureSession: Send + 'static {
    /// Whether a full frame is currently available
    fn ready(&self) -> bool;

    /// Dimensions of the current frame
    fn dimensions(&self) -> (u32, u32);

    /// Copy the current frame into the raster
    fn capture_into(&mut self, raster: &mut Raster) -> Result<(), Error>;

    /// Close the stream and release the device
    fn release(&mut self);
}

const REAR_HINTS: [&str; 4] = ["back", "rear", "environment", "world"];
const FRONT_HINTS: [&str; 3] = ["front", "user", "integrated"];

/// Pick the device best matching the request
///
/// An explicitly configured device name wins; otherwise the facing
/// preference is matched against the device's human-readable name, falling
/// back to the first enumerated device.
pub fn pick_device(devices: &[DeviceDescriptor], request: &StreamRequest) -> Option<usize> {
    if devices.is_empty() {
        return None;
    }

    if let Some(name) = &request.device_name {
        if let Some(i) = devices.iter().position(|dev| &dev.name == name) {
            return Some(i);
        }
        warn!("configured camera {name:?} not present, falling back to facing preference");
    }

    let hints: &[&str] = match request.facing {
        Facing::Environment => &REAR_HINTS,
        Facing::User => &FRONT_HINTS,
        Facing::Any => &[],
    };

    if let Some(i) = devices.iter().position(|dev| {
        let name = dev.name.to_ascii_lowercase();
        hints.iter().any(|hint| name.contains(hint))
    }) {
        return Some(i);
    }

    Some(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devices(names: &[&str]) -> Vec<DeviceDescriptor> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| DeviceDescriptor {
                index: i as u32,
                name: (*name).to_string(),
            })
            .collect()
    }

    #[test]
    fn prefers_rear_facing() {
        let devs = devices(&["Integrated Front Camera", "USB Rear Camera"]);
        let picked = pick_device(&devs, &StreamRequest::new(Facing::Environment));
        assert_eq!(picked, Some(1));
    }

    #[test]
    fn falls_back_to_first_device() {
        let devs = devices(&["Capture Card A", "Capture Card B"]);
        let picked = pick_device(&devs, &StreamRequest::new(Facing::Environment));
        assert_eq!(picked, Some(0));
    }

    #[test]
    fn explicit_name_wins_over_facing() {
        let devs = devices(&["Back Camera", "Document Scanner"]);
        let mut request = StreamRequest::new(Facing::Environment);
        request.device_name = Some(String::from("Document Scanner"));
        assert_eq!(pick_device(&devs, &request), Some(1));
    }

    #[test]
    fn missing_name_falls_back_to_facing() {
        let devs = devices(&["Front Camera", "World Facing Camera"]);
        let mut request = StreamRequest::new(Facing::Environment);
        request.device_name = Some(String::from("Gone Camera"));
        assert_eq!(pick_device(&devs, &request), Some(1));
    }

    #[test]
    fn no_devices_is_none() {
        assert_eq!(pick_device(&[], &StreamRequest::new(Facing::Any)), None);
    }
}
