use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::camera::types::{CameraSelector, DeviceKind, DevicePosition, Rect};
use crate::settings::error::SettingsError;

/// One camera feed and the surface it renders into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlotConfig {
    /// Label of the hosting surface, e.g. `"view1"`.
    pub surface: String,
    pub kind: DeviceKind,
    pub position: DevicePosition,
    /// Surface bounds used when the host does not supply its own views.
    #[serde(default)]
    pub bounds: Rect,
}

impl SlotConfig {
    pub fn selector(&self) -> CameraSelector {
        CameraSelector::new(self.kind, self.position)
    }
}

/// Top-level layout file — ordered camera slots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutFile {
    pub slots: Vec<SlotConfig>,
}

impl Default for LayoutFile {
    /// Wide/back, ultra-wide/back and wide/front on three equal surfaces.
    fn default() -> Self {
        let slot = |surface: &str, selector: CameraSelector| SlotConfig {
            surface: surface.to_string(),
            kind: selector.kind,
            position: selector.position,
            bounds: Rect::sized(390.0, 280.0),
        };
        Self {
            slots: vec![
                slot("view1", CameraSelector::wide_back()),
                slot("view2", CameraSelector::ultra_wide_back()),
                slot("view3", CameraSelector::wide_front()),
            ],
        }
    }
}

impl LayoutFile {
    /// Labels of surfaces whose bounds have no area. Their preview layers
    /// are wired but render nothing.
    pub fn empty_surfaces(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|slot| slot.bounds.is_empty())
            .map(|slot| slot.surface.as_str())
            .collect()
    }

    /// Reject layouts that cannot be wired one camera per surface.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let mut selectors = HashSet::new();
        let mut surfaces = HashSet::new();
        for slot in &self.slots {
            if slot.surface.trim().is_empty() {
                return Err(SettingsError::Invalid("empty surface label".to_string()));
            }
            if !surfaces.insert(slot.surface.as_str()) {
                return Err(SettingsError::Invalid(format!(
                    "surface '{}' used twice",
                    slot.surface
                )));
            }
            if !selectors.insert(slot.selector()) {
                return Err(SettingsError::Invalid(format!(
                    "camera {} used twice",
                    slot.selector()
                )));
            }
        }
        for surface in self.empty_surfaces() {
            tracing::warn!("Surface '{surface}' has empty bounds; its preview will not be visible");
        }
        Ok(())
    }
}
