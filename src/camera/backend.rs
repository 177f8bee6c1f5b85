use crate::camera::error::Result;
use crate::camera::types::{CameraSelector, MediaType, Rect, VideoGravity};

/// Platform multi-camera capture framework.
///
/// Implemented per-platform (AVFoundation on iOS) and by the simulated
/// `DummyBackend`. Provides the capability query, device lookup, and the
/// factory for sessions that pipelines attach to.
pub trait CaptureBackend {
    type Session: MultiCamSession;

    /// Whether the hardware can run several cameras concurrently.
    fn is_multi_cam_supported(&self) -> bool;

    /// Create a fresh, empty session.
    fn new_session(&self) -> Self::Session;

    /// Resolve the default physical camera for a selector, if one exists.
    fn default_device(&self, selector: CameraSelector) -> Option<DeviceOf<Self>>;

    /// Open a device input for a resolved camera.
    fn device_input(&self, device: &DeviceOf<Self>) -> Result<InputOf<Self>>;
}

/// Device handle type of a backend's session.
pub type DeviceOf<B> = <<B as CaptureBackend>::Session as MultiCamSession>::Device;
/// Input handle type of a backend's session.
pub type InputOf<B> = <<B as CaptureBackend>::Session as MultiCamSession>::Input;
/// Preview layer type of a backend's session.
pub type LayerOf<B> = <<B as CaptureBackend>::Session as MultiCamSession>::PreviewLayer;

/// A session aggregating several camera pipelines.
///
/// Inputs and outputs are added without implicit connections; every link
/// is an explicit connection checked with `can_add_connection` first.
/// Mutating methods take `&mut self`, so configuration and `start_running`
/// can never overlap on the same session.
pub trait MultiCamSession: Send + 'static {
    type Device;
    type Input: DeviceInput;
    type Output;
    type Connection;
    type PreviewLayer: PreviewLayer + Clone;

    /// Open a configuration transaction.
    fn begin_configuration(&mut self);

    /// Apply everything attached since `begin_configuration` in one step.
    fn commit_configuration(&mut self);

    fn can_add_input(&self, input: &Self::Input) -> bool;
    fn add_input_with_no_connections(&mut self, input: &Self::Input);

    /// Create a video frame output sink.
    fn new_video_output(&self) -> Self::Output;
    fn can_add_output(&self, output: &Self::Output) -> bool;
    fn add_output_with_no_connections(&mut self, output: &Self::Output);

    /// Build a connection from input ports to a frame output.
    fn output_connection(
        &self,
        ports: &[<Self::Input as DeviceInput>::Port],
        output: &Self::Output,
    ) -> Self::Connection;

    /// Build a connection from a single input port to a preview layer.
    fn preview_connection(
        &self,
        port: &<Self::Input as DeviceInput>::Port,
        layer: &Self::PreviewLayer,
    ) -> Self::Connection;

    fn can_add_connection(&self, connection: &Self::Connection) -> bool;
    fn add_connection(&mut self, connection: &Self::Connection);

    /// Create a preview layer bound to this session with no connection.
    fn new_preview_layer(&mut self) -> Self::PreviewLayer;

    /// Start frame flow. May block while camera hardware initialises.
    fn start_running(&mut self);

    fn is_running(&self) -> bool;
}

/// A device input feeding a session.
pub trait DeviceInput {
    type Port: InputPort;

    fn ports(&self) -> Vec<Self::Port>;
}

/// One media stream exposed by a device input.
pub trait InputPort {
    fn media_type(&self) -> MediaType;
}

/// A render target displaying a live camera feed.
pub trait PreviewLayer {
    fn set_video_gravity(&mut self, gravity: VideoGravity);
    fn video_gravity(&self) -> VideoGravity;
    fn set_frame(&mut self, frame: Rect);
    fn frame(&self) -> Rect;
}

/// A rectangular drawing target supplied by the hosting view.
pub trait DisplaySurface {
    type Layer;

    /// Current bounds in the surface's own coordinate space.
    fn bounds(&self) -> Rect;

    fn add_sublayer(&mut self, layer: &Self::Layer);
}
