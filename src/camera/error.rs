use thiserror::Error;

use crate::camera::types::CameraSelector;

/// Capture subsystem errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    #[error("multi-camera capture is not supported on this device")]
    MultiCamUnsupported,

    #[error("device input for {selector} could not be created: {reason}")]
    DeviceInput {
        selector: CameraSelector,
        reason: String,
    },
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CaptureError>;
