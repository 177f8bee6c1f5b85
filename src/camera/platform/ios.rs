//! AVFoundation multi-camera backend.
//!
//! Thin wrappers over `AVCaptureMultiCamSession` and friends. All
//! AVFoundation calls are `unsafe` in objc2; each wrapper upholds the
//! framework's contract by only passing objects it created itself.

use objc2::rc::Retained;
use objc2::AllocAnyThread;
use objc2_av_foundation::{
    AVCaptureConnection, AVCaptureDevice, AVCaptureDeviceInput, AVCaptureDevicePosition,
    AVCaptureInputPort, AVCaptureMultiCamSession, AVCaptureVideoDataOutput,
    AVCaptureVideoPreviewLayer, AVMediaTypeVideo,
};
use objc2_core_foundation::{CGPoint, CGRect, CGSize};
use objc2_foundation::{ns_string, NSArray, NSString};
use objc2_quartz_core::CALayer;
use tracing::debug;

use crate::camera::backend::{
    CaptureBackend, DeviceInput, DisplaySurface, InputPort, MultiCamSession, PreviewLayer,
};
use crate::camera::error::{CaptureError, Result};
use crate::camera::types::{
    CameraSelector, DeviceKind, DevicePosition, MediaType, Rect, VideoGravity,
};

fn device_type(kind: DeviceKind) -> &'static NSString {
    match kind {
        DeviceKind::WideAngle => ns_string!("AVCaptureDeviceTypeBuiltInWideAngleCamera"),
        DeviceKind::UltraWide => ns_string!("AVCaptureDeviceTypeBuiltInUltraWideCamera"),
        DeviceKind::Telephoto => ns_string!("AVCaptureDeviceTypeBuiltInTelephotoCamera"),
    }
}

fn device_position(position: DevicePosition) -> AVCaptureDevicePosition {
    match position {
        DevicePosition::Back => AVCaptureDevicePosition::Back,
        DevicePosition::Front => AVCaptureDevicePosition::Front,
    }
}

/// `AVMediaTypeVideo`, absent only when AVFoundation is not linked.
fn video_media_type() -> Option<&'static NSString> {
    unsafe { AVMediaTypeVideo }
}

fn gravity_name(gravity: VideoGravity) -> &'static NSString {
    match gravity {
        VideoGravity::Resize => ns_string!("AVLayerVideoGravityResize"),
        VideoGravity::ResizeAspect => ns_string!("AVLayerVideoGravityResizeAspect"),
        VideoGravity::ResizeAspectFill => ns_string!("AVLayerVideoGravityResizeAspectFill"),
    }
}

fn to_cg_rect(rect: Rect) -> CGRect {
    CGRect {
        origin: CGPoint {
            x: rect.x,
            y: rect.y,
        },
        size: CGSize {
            width: rect.width,
            height: rect.height,
        },
    }
}

fn from_cg_rect(rect: CGRect) -> Rect {
    Rect::new(
        rect.origin.x,
        rect.origin.y,
        rect.size.width,
        rect.size.height,
    )
}

/// Multi-camera backend for iPhone/iPad hardware.
pub struct AppleBackend;

impl AppleBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AppleBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for AppleBackend {
    type Session = AppleSession;

    fn is_multi_cam_supported(&self) -> bool {
        unsafe { AVCaptureMultiCamSession::isMultiCamSupported() }
    }

    fn new_session(&self) -> AppleSession {
        AppleSession {
            session: unsafe { AVCaptureMultiCamSession::new() },
        }
    }

    fn default_device(&self, selector: CameraSelector) -> Option<AppleDevice> {
        let media_type = video_media_type()?;
        let device = unsafe {
            AVCaptureDevice::defaultDeviceWithDeviceType_mediaType_position(
                device_type(selector.kind),
                Some(media_type),
                device_position(selector.position),
            )
        }?;
        let name = unsafe { device.localizedName() };
        debug!("Camera {selector}: found {name}");
        Some(AppleDevice { selector, device })
    }

    fn device_input(&self, device: &AppleDevice) -> Result<AppleInput> {
        let input = unsafe { AVCaptureDeviceInput::deviceInputWithDevice_error(&device.device) }
            .map_err(|e| CaptureError::DeviceInput {
                selector: device.selector,
                reason: unsafe { e.localizedDescription() }.to_string(),
            })?;
        Ok(AppleInput(input))
    }
}

/// A resolved camera and the selector it was resolved from.
pub struct AppleDevice {
    selector: CameraSelector,
    device: Retained<AVCaptureDevice>,
}

/// An `AVCaptureMultiCamSession`.
pub struct AppleSession {
    session: Retained<AVCaptureMultiCamSession>,
}

// SAFETY: AVCaptureSession is documented as safe to start from a
// background queue. The controller serialises every call through a mutex.
unsafe impl Send for AppleSession {}

impl MultiCamSession for AppleSession {
    type Device = AppleDevice;
    type Input = AppleInput;
    type Output = Retained<AVCaptureVideoDataOutput>;
    type Connection = Retained<AVCaptureConnection>;
    type PreviewLayer = ApplePreviewLayer;

    fn begin_configuration(&mut self) {
        unsafe { self.session.beginConfiguration() }
    }

    fn commit_configuration(&mut self) {
        unsafe { self.session.commitConfiguration() }
    }

    fn can_add_input(&self, input: &AppleInput) -> bool {
        unsafe { self.session.canAddInput(&input.0) }
    }

    fn add_input_with_no_connections(&mut self, input: &AppleInput) {
        unsafe { self.session.addInputWithNoConnections(&input.0) }
    }

    fn new_video_output(&self) -> Retained<AVCaptureVideoDataOutput> {
        unsafe { AVCaptureVideoDataOutput::new() }
    }

    fn can_add_output(&self, output: &Retained<AVCaptureVideoDataOutput>) -> bool {
        unsafe { self.session.canAddOutput(output) }
    }

    fn add_output_with_no_connections(&mut self, output: &Retained<AVCaptureVideoDataOutput>) {
        unsafe { self.session.addOutputWithNoConnections(output) }
    }

    fn output_connection(
        &self,
        ports: &[ApplePort],
        output: &Retained<AVCaptureVideoDataOutput>,
    ) -> Retained<AVCaptureConnection> {
        let ports: Vec<Retained<AVCaptureInputPort>> = ports.iter().map(|p| p.0.clone()).collect();
        let ports = NSArray::from_retained_slice(&ports);
        unsafe {
            AVCaptureConnection::initWithInputPorts_output(
                AVCaptureConnection::alloc(),
                &ports,
                output,
            )
        }
    }

    fn preview_connection(
        &self,
        port: &ApplePort,
        layer: &ApplePreviewLayer,
    ) -> Retained<AVCaptureConnection> {
        unsafe {
            AVCaptureConnection::initWithInputPort_videoPreviewLayer(
                AVCaptureConnection::alloc(),
                &port.0,
                &layer.0,
            )
        }
    }

    fn can_add_connection(&self, connection: &Retained<AVCaptureConnection>) -> bool {
        unsafe { self.session.canAddConnection(connection) }
    }

    fn add_connection(&mut self, connection: &Retained<AVCaptureConnection>) {
        unsafe { self.session.addConnection(connection) }
    }

    fn new_preview_layer(&mut self) -> ApplePreviewLayer {
        let layer = unsafe { AVCaptureVideoPreviewLayer::new() };
        unsafe { layer.setSessionWithNoConnection(&self.session) };
        ApplePreviewLayer(layer)
    }

    fn start_running(&mut self) {
        unsafe { self.session.startRunning() }
    }

    fn is_running(&self) -> bool {
        unsafe { self.session.isRunning() }
    }
}

pub struct AppleInput(Retained<AVCaptureDeviceInput>);

impl DeviceInput for AppleInput {
    type Port = ApplePort;

    fn ports(&self) -> Vec<ApplePort> {
        unsafe { self.0.ports() }
            .to_vec()
            .into_iter()
            .map(ApplePort)
            .collect()
    }
}

pub struct ApplePort(Retained<AVCaptureInputPort>);

impl InputPort for ApplePort {
    fn media_type(&self) -> MediaType {
        // AVMediaType values are four-character codes.
        match unsafe { self.0.mediaType() }.to_string().as_str() {
            "vide" => MediaType::Video,
            "soun" => MediaType::Audio,
            "dpth" => MediaType::DepthData,
            _ => MediaType::Metadata,
        }
    }
}

#[derive(Clone)]
pub struct ApplePreviewLayer(Retained<AVCaptureVideoPreviewLayer>);

impl PreviewLayer for ApplePreviewLayer {
    fn set_video_gravity(&mut self, gravity: VideoGravity) {
        unsafe { self.0.setVideoGravity(gravity_name(gravity)) }
    }

    fn video_gravity(&self) -> VideoGravity {
        let current = unsafe { self.0.videoGravity() };
        [
            VideoGravity::Resize,
            VideoGravity::ResizeAspect,
            VideoGravity::ResizeAspectFill,
        ]
        .into_iter()
        .find(|g| current.isEqualToString(gravity_name(*g)))
        .unwrap_or_default()
    }

    fn set_frame(&mut self, frame: Rect) {
        unsafe { self.0.setFrame(to_cg_rect(frame)) }
    }

    fn frame(&self) -> Rect {
        from_cg_rect(unsafe { self.0.frame() })
    }
}

/// The backing layer of a host view.
pub struct LayerSurface {
    layer: Retained<CALayer>,
}

impl LayerSurface {
    pub fn new(layer: Retained<CALayer>) -> Self {
        Self { layer }
    }
}

impl DisplaySurface for LayerSurface {
    type Layer = ApplePreviewLayer;

    fn bounds(&self) -> Rect {
        from_cg_rect(unsafe { self.layer.bounds() })
    }

    fn add_sublayer(&mut self, layer: &ApplePreviewLayer) {
        unsafe { self.layer.addSublayer(&layer.0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cg_rect_conversion_keeps_every_edge() {
        let rect = Rect::new(10.0, 20.0, 300.0, 400.0);
        assert_eq!(from_cg_rect(to_cg_rect(rect)), rect);
    }

    #[test]
    fn gravity_names_match_avfoundation_constants() {
        assert_eq!(
            gravity_name(VideoGravity::ResizeAspectFill).to_string(),
            "AVLayerVideoGravityResizeAspectFill"
        );
    }

    #[test]
    fn video_media_type_is_the_vide_code() {
        let media_type = video_media_type().expect("AVFoundation linked");
        assert_eq!(media_type.to_string(), "vide");
    }
}
