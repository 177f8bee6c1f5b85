use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical camera module class to request from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    WideAngle,
    UltraWide,
    Telephoto,
}

impl DeviceKind {
    /// Snake-case string identifier used in layout files and logs.
    pub fn as_id_str(self) -> &'static str {
        match self {
            Self::WideAngle => "wide_angle",
            Self::UltraWide => "ultra_wide",
            Self::Telephoto => "telephoto",
        }
    }
}

/// Which way the camera faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevicePosition {
    Back,
    Front,
}

impl DevicePosition {
    pub fn as_id_str(self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Front => "front",
        }
    }
}

/// Identifies which physical camera to request: a (kind, position) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraSelector {
    pub kind: DeviceKind,
    pub position: DevicePosition,
}

impl CameraSelector {
    pub const fn new(kind: DeviceKind, position: DevicePosition) -> Self {
        Self { kind, position }
    }

    pub const fn wide_back() -> Self {
        Self::new(DeviceKind::WideAngle, DevicePosition::Back)
    }

    pub const fn ultra_wide_back() -> Self {
        Self::new(DeviceKind::UltraWide, DevicePosition::Back)
    }

    pub const fn wide_front() -> Self {
        Self::new(DeviceKind::WideAngle, DevicePosition::Front)
    }
}

impl fmt::Display for CameraSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.as_id_str(), self.position.as_id_str())
    }
}

/// Axis-aligned rectangle in surface points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A rect anchored at the origin. Surface bounds are always expressed this way.
    pub const fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Media carried by an input port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Video,
    Audio,
    Metadata,
    DepthData,
}

/// How a preview layer fits video into its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoGravity {
    /// Stretch to fill, ignoring aspect ratio.
    Resize,
    /// Letterbox to preserve aspect ratio.
    #[default]
    ResizeAspect,
    /// Fill and crop, preserving aspect ratio.
    ResizeAspectFill,
}
