//! Simulated multi-camera hardware for running without a real device.
//!
//! Uses a builder pattern to configure which cameras exist and which
//! admission checks the session refuses.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::camera::backend::{
    CaptureBackend, DeviceInput, DisplaySurface, InputPort, MultiCamSession, PreviewLayer,
};
use crate::camera::error::{CaptureError, Result};
use crate::camera::types::{CameraSelector, MediaType, Rect, VideoGravity};

/// Fault and capability configuration shared by a backend and its sessions.
#[derive(Debug, Clone)]
struct DummyRules {
    multi_cam_supported: bool,
    input_failures: HashSet<CameraSelector>,
    port_overrides: HashMap<CameraSelector, Vec<MediaType>>,
    rejected_inputs: HashSet<CameraSelector>,
    output_limit: Option<usize>,
    rejected_output_connections: HashSet<CameraSelector>,
    rejected_preview_connections: HashSet<CameraSelector>,
    start_delay: Option<Duration>,
}

impl Default for DummyRules {
    fn default() -> Self {
        Self {
            multi_cam_supported: true,
            input_failures: HashSet::new(),
            port_overrides: HashMap::new(),
            rejected_inputs: HashSet::new(),
            output_limit: None,
            rejected_output_connections: HashSet::new(),
            rejected_preview_connections: HashSet::new(),
            start_delay: None,
        }
    }
}

/// A fake multi-camera backend.
///
/// Starts out as a phone with wide/back, ultra-wide/back and wide/front
/// cameras that supports concurrent capture and admits everything.
///
/// Enable via `DUMMY_CAMERA=1` environment variable.
pub struct DummyBackend {
    cameras: Vec<CameraSelector>,
    rules: DummyRules,
}

impl DummyBackend {
    pub fn new() -> Self {
        Self {
            cameras: vec![
                CameraSelector::wide_back(),
                CameraSelector::ultra_wide_back(),
                CameraSelector::wide_front(),
            ],
            rules: DummyRules::default(),
        }
    }

    /// Whether the dummy camera is enabled via environment variable.
    pub fn is_enabled() -> bool {
        std::env::var("DUMMY_CAMERA").is_ok_and(|v| v == "1" || v == "true")
    }

    /// Report that concurrent capture is unavailable.
    pub fn unsupported(mut self) -> Self {
        self.rules.multi_cam_supported = false;
        self
    }

    /// Add a camera module.
    pub fn with_camera(mut self, selector: CameraSelector) -> Self {
        if !self.cameras.contains(&selector) {
            self.cameras.push(selector);
        }
        self
    }

    /// Remove a camera module.
    pub fn without_camera(mut self, selector: CameraSelector) -> Self {
        self.cameras.retain(|c| *c != selector);
        self
    }

    /// Make opening an input for this camera fail (e.g. device in use).
    pub fn with_input_failure(mut self, selector: CameraSelector) -> Self {
        self.rules.input_failures.insert(selector);
        self
    }

    /// Override the media types of the camera's input ports.
    pub fn with_ports(mut self, selector: CameraSelector, ports: Vec<MediaType>) -> Self {
        self.rules.port_overrides.insert(selector, ports);
        self
    }

    /// Sessions refuse inputs for this camera.
    pub fn rejecting_input(mut self, selector: CameraSelector) -> Self {
        self.rules.rejected_inputs.insert(selector);
        self
    }

    /// Sessions accept at most `limit` frame outputs.
    pub fn with_output_limit(mut self, limit: usize) -> Self {
        self.rules.output_limit = Some(limit);
        self
    }

    /// Sessions refuse output connections sourced from this camera.
    pub fn rejecting_output_connection(mut self, selector: CameraSelector) -> Self {
        self.rules.rejected_output_connections.insert(selector);
        self
    }

    /// Sessions refuse preview connections sourced from this camera.
    pub fn rejecting_preview_connection(mut self, selector: CameraSelector) -> Self {
        self.rules.rejected_preview_connections.insert(selector);
        self
    }

    /// `start_running` blocks for this long before the session runs.
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.rules.start_delay = Some(delay);
        self
    }

    fn ports_for(&self, selector: CameraSelector) -> Vec<MediaType> {
        self.rules
            .port_overrides
            .get(&selector)
            .cloned()
            .unwrap_or_else(|| vec![MediaType::Video])
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for DummyBackend {
    type Session = DummySession;

    fn is_multi_cam_supported(&self) -> bool {
        self.rules.multi_cam_supported
    }

    fn new_session(&self) -> DummySession {
        DummySession::new(self.rules.clone())
    }

    fn default_device(&self, selector: CameraSelector) -> Option<DummyDevice> {
        self.cameras
            .iter()
            .find(|c| **c == selector)
            .map(|c| DummyDevice {
                selector: *c,
                unique_id: format!("dummy:{c}"),
            })
    }

    fn device_input(&self, device: &DummyDevice) -> Result<DummyInput> {
        if self.rules.input_failures.contains(&device.selector) {
            return Err(CaptureError::DeviceInput {
                selector: device.selector,
                reason: "device is in use".to_string(),
            });
        }
        Ok(DummyInput {
            selector: device.selector,
            ports: self.ports_for(device.selector),
        })
    }
}

/// A simulated physical camera.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyDevice {
    pub selector: CameraSelector,
    pub unique_id: String,
}

/// A simulated device input. One per physical camera per session.
#[derive(Debug, Clone, PartialEq)]
pub struct DummyInput {
    selector: CameraSelector,
    ports: Vec<MediaType>,
}

impl DummyInput {
    pub fn selector(&self) -> CameraSelector {
        self.selector
    }
}

impl DeviceInput for DummyInput {
    type Port = DummyPort;

    fn ports(&self) -> Vec<DummyPort> {
        self.ports
            .iter()
            .map(|media_type| DummyPort {
                source: self.selector,
                media_type: *media_type,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DummyPort {
    pub source: CameraSelector,
    pub media_type: MediaType,
}

impl InputPort for DummyPort {
    fn media_type(&self) -> MediaType {
        self.media_type
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DummyOutput {
    pub id: usize,
}

/// An explicit link inside a simulated session.
#[derive(Debug, Clone, PartialEq)]
pub enum DummyConnection {
    Output {
        /// Camera of the first port; `None` when built from no ports.
        source: Option<CameraSelector>,
        media: Vec<MediaType>,
        output: usize,
    },
    Preview {
        source: CameraSelector,
        layer: usize,
    },
}

impl DummyConnection {
    pub fn source(&self) -> Option<CameraSelector> {
        match self {
            Self::Output { source, .. } => *source,
            Self::Preview { source, .. } => Some(*source),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DummyPreviewLayer {
    pub id: usize,
    gravity: VideoGravity,
    frame: Rect,
    bound_to_session: bool,
}

impl DummyPreviewLayer {
    pub fn is_bound_to_session(&self) -> bool {
        self.bound_to_session
    }
}

impl PreviewLayer for DummyPreviewLayer {
    fn set_video_gravity(&mut self, gravity: VideoGravity) {
        self.gravity = gravity;
    }

    fn video_gravity(&self) -> VideoGravity {
        self.gravity
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn frame(&self) -> Rect {
        self.frame
    }
}

/// Attached resources of a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DummyGraph {
    pub inputs: Vec<DummyInput>,
    pub outputs: Vec<DummyOutput>,
    pub connections: Vec<DummyConnection>,
}

impl DummyGraph {
    fn has_input(&self, selector: CameraSelector) -> bool {
        self.inputs.iter().any(|i| i.selector == selector)
    }

    fn has_output(&self, id: usize) -> bool {
        self.outputs.iter().any(|o| o.id == id)
    }

    fn has_preview_for(&self, layer: usize) -> bool {
        self.connections
            .iter()
            .any(|c| matches!(c, DummyConnection::Preview { layer: l, .. } if *l == layer))
    }
}

/// A simulated multi-camera session.
///
/// Attachments made between `begin_configuration` and
/// `commit_configuration` are staged and only become visible through
/// `committed()` once the transaction commits.
#[derive(Debug)]
pub struct DummySession {
    rules: DummyRules,
    next_id: AtomicUsize,
    committed: DummyGraph,
    pending: Option<DummyGraph>,
    bound_layers: Vec<usize>,
    commits: usize,
    running: bool,
    start_calls: usize,
}

impl DummySession {
    fn new(rules: DummyRules) -> Self {
        Self {
            rules,
            next_id: AtomicUsize::new(1),
            committed: DummyGraph::default(),
            pending: None,
            bound_layers: Vec::new(),
            commits: 0,
            running: false,
            start_calls: 0,
        }
    }

    /// Resources visible to the running session.
    pub fn committed(&self) -> &DummyGraph {
        &self.committed
    }

    pub fn is_configuring(&self) -> bool {
        self.pending.is_some()
    }

    pub fn commit_count(&self) -> usize {
        self.commits
    }

    pub fn start_count(&self) -> usize {
        self.start_calls
    }

    fn current(&self) -> &DummyGraph {
        self.pending.as_ref().unwrap_or(&self.committed)
    }

    fn current_mut(&mut self) -> &mut DummyGraph {
        self.pending.as_mut().unwrap_or(&mut self.committed)
    }

    fn allocate_id(&self) -> usize {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl MultiCamSession for DummySession {
    type Device = DummyDevice;
    type Input = DummyInput;
    type Output = DummyOutput;
    type Connection = DummyConnection;
    type PreviewLayer = DummyPreviewLayer;

    fn begin_configuration(&mut self) {
        if self.pending.is_none() {
            self.pending = Some(self.committed.clone());
        }
    }

    fn commit_configuration(&mut self) {
        if let Some(graph) = self.pending.take() {
            self.committed = graph;
            self.commits += 1;
        }
    }

    fn can_add_input(&self, input: &DummyInput) -> bool {
        !self.rules.rejected_inputs.contains(&input.selector)
            && !self.current().has_input(input.selector)
    }

    fn add_input_with_no_connections(&mut self, input: &DummyInput) {
        self.current_mut().inputs.push(input.clone());
    }

    fn new_video_output(&self) -> DummyOutput {
        DummyOutput {
            id: self.allocate_id(),
        }
    }

    fn can_add_output(&self, output: &DummyOutput) -> bool {
        let graph = self.current();
        let within_limit = match self.rules.output_limit {
            Some(limit) => graph.outputs.len() < limit,
            None => true,
        };
        within_limit && !graph.has_output(output.id)
    }

    fn add_output_with_no_connections(&mut self, output: &DummyOutput) {
        self.current_mut().outputs.push(*output);
    }

    fn output_connection(&self, ports: &[DummyPort], output: &DummyOutput) -> DummyConnection {
        DummyConnection::Output {
            source: ports.first().map(|p| p.source),
            media: ports.iter().map(|p| p.media_type).collect(),
            output: output.id,
        }
    }

    fn preview_connection(&self, port: &DummyPort, layer: &DummyPreviewLayer) -> DummyConnection {
        DummyConnection::Preview {
            source: port.source,
            layer: layer.id,
        }
    }

    fn can_add_connection(&self, connection: &DummyConnection) -> bool {
        let graph = self.current();
        match connection {
            DummyConnection::Output {
                source,
                media,
                output,
            } => match source {
                Some(source) => {
                    !media.is_empty()
                        && graph.has_input(*source)
                        && graph.has_output(*output)
                        && !self.rules.rejected_output_connections.contains(source)
                }
                None => false,
            },
            DummyConnection::Preview { source, layer } => {
                graph.has_input(*source)
                    && self.bound_layers.contains(layer)
                    && !graph.has_preview_for(*layer)
                    && !self.rules.rejected_preview_connections.contains(source)
            }
        }
    }

    fn add_connection(&mut self, connection: &DummyConnection) {
        self.current_mut().connections.push(connection.clone());
    }

    fn new_preview_layer(&mut self) -> DummyPreviewLayer {
        let id = self.allocate_id();
        self.bound_layers.push(id);
        DummyPreviewLayer {
            id,
            gravity: VideoGravity::default(),
            frame: Rect::default(),
            bound_to_session: true,
        }
    }

    fn start_running(&mut self) {
        if let Some(delay) = self.rules.start_delay {
            std::thread::sleep(delay);
        }
        self.start_calls += 1;
        self.running = true;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// A simulated on-screen view that hosts one preview layer.
#[derive(Debug, Clone)]
pub struct DummySurface {
    label: String,
    bounds: Rect,
    sublayers: Vec<DummyPreviewLayer>,
}

impl DummySurface {
    pub fn new(label: impl Into<String>, bounds: Rect) -> Self {
        Self {
            label: label.into(),
            bounds,
            sublayers: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resize the surface. Layers already attached keep their frame.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn sublayers(&self) -> &[DummyPreviewLayer] {
        &self.sublayers
    }
}

impl DisplaySurface for DummySurface {
    type Layer = DummyPreviewLayer;

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn add_sublayer(&mut self, layer: &DummyPreviewLayer) {
        self.sublayers.push(layer.clone());
    }
}
