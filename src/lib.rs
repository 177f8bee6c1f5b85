pub mod camera;
pub mod capture;
pub mod settings;

use thiserror::Error;
use tokio::runtime::Handle;

use camera::dummy::{DummyBackend, DummySurface};
use camera::error::CaptureError;
use capture::controller::MultiCamController;
use capture::slot::CameraSlot;
use settings::error::SettingsError;
use settings::store::LayoutStore;
use settings::types::LayoutFile;

/// Errors that stop the harness.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("no native multi-camera backend on this platform; set DUMMY_CAMERA=1")]
    NoBackend,

    #[error("waiting for shutdown signal failed: {0}")]
    Signal(std::io::Error),
}

/// Initialise the `tracing` subscriber, honouring `RUST_LOG`.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(env_filter).try_init();
}

/// Build one slot per layout entry, each with a simulated surface.
pub fn dummy_slots(layout: &LayoutFile) -> Vec<CameraSlot<DummySurface>> {
    layout
        .slots
        .iter()
        .map(|slot| {
            CameraSlot::new(
                slot.selector(),
                DummySurface::new(slot.surface.clone(), slot.bounds),
            )
        })
        .collect()
}

/// Load the layout, wire it, start the session and keep it alive until
/// Ctrl-C.
///
/// Native backends need surfaces from a host view, so the standalone
/// harness only drives the simulated camera (`DUMMY_CAMERA=1`).
pub async fn run() -> Result<(), RunError> {
    if !DummyBackend::is_enabled() {
        return Err(RunError::NoBackend);
    }

    let store = LayoutStore::from_env();
    let layout = store.load_or_init()?;
    tracing::info!(
        "Loaded {} camera slots from {}",
        layout.slots.len(),
        store.path().display()
    );

    let mut controller =
        MultiCamController::new(DummyBackend::new(), dummy_slots(&layout), Handle::current());
    controller.view_did_load()?;
    controller.view_did_appear();

    tokio::signal::ctrl_c().await.map_err(RunError::Signal)?;
    tracing::info!("Shutting down");
    Ok(())
}
