use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tokio::runtime::Handle;
use tracing::{debug, info};

use crate::camera::backend::{CaptureBackend, DisplaySurface, LayerOf, MultiCamSession};
use crate::camera::error::Result;
use crate::capture::slot::{CameraSlot, WiringReport};
use crate::capture::wiring::configure_session;

/// Owns the multi-camera session for the lifetime of a hosting view.
///
/// The view calls `view_did_load` once its surfaces have bounds, then
/// `view_did_appear` once it is visible. Start runs on the runtime's
/// blocking pool and is never awaited.
pub struct MultiCamController<B: CaptureBackend, V> {
    backend: B,
    session: Arc<Mutex<B::Session>>,
    slots: Vec<CameraSlot<V>>,
    preview_layers: Vec<LayerOf<B>>,
    report: Option<WiringReport>,
    runtime: Handle,
}

impl<B, V> MultiCamController<B, V>
where
    B: CaptureBackend,
    V: DisplaySurface<Layer = LayerOf<B>>,
{
    pub fn new(backend: B, slots: Vec<CameraSlot<V>>, runtime: Handle) -> Self {
        let session = Arc::new(Mutex::new(backend.new_session()));
        Self {
            backend,
            session,
            slots,
            preview_layers: Vec::new(),
            report: None,
            runtime,
        }
    }

    /// Wire every slot into the session.
    ///
    /// Runs once; later calls return the first report without touching
    /// the session again.
    pub fn view_did_load(&mut self) -> Result<WiringReport> {
        if let Some(report) = &self.report {
            debug!("Session already configured, ignoring reload");
            return Ok(report.clone());
        }

        let mut session = self.session.lock();
        let report = configure_session(
            &self.backend,
            &mut session,
            &mut self.slots,
            &mut self.preview_layers,
        )?;
        drop(session);

        self.report = Some(report.clone());
        Ok(report)
    }

    /// Dispatch `start_running` to a background worker.
    ///
    /// Does nothing if the session was never configured. There is no
    /// handle to cancel or observe the start.
    pub fn view_did_appear(&self) {
        if self.report.is_none() {
            debug!("Session not configured, not starting");
            return;
        }

        info!("Starting multi-camera session");
        let session = Arc::clone(&self.session);
        self.runtime.spawn_blocking(move || {
            session.lock().start_running();
            debug!("Multi-camera session running");
        });
    }

    /// Whether the session reports running. `false` while a start is
    /// still in flight.
    pub fn is_running(&self) -> bool {
        match self.session.try_lock() {
            Some(session) => session.is_running(),
            None => false,
        }
    }

    /// Lock the session for inspection. Blocks while a start is in flight.
    pub fn session(&self) -> MutexGuard<'_, B::Session> {
        self.session.lock()
    }

    pub fn report(&self) -> Option<&WiringReport> {
        self.report.as_ref()
    }

    /// Layers that were connected, in slot order.
    pub fn preview_layers(&self) -> &[LayerOf<B>] {
        &self.preview_layers
    }

    pub fn slots(&self) -> &[CameraSlot<V>] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [CameraSlot<V>] {
        &mut self.slots
    }
}
