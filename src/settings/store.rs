use std::path::{Path, PathBuf};

use crate::settings::error::SettingsError;
use crate::settings::types::LayoutFile;

/// Default layout file name, relative to the working directory.
pub const DEFAULT_LAYOUT_PATH: &str = "multicam.json";

/// JSON-backed camera layout.
pub struct LayoutStore {
    path: PathBuf,
}

impl LayoutStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at `MULTICAM_LAYOUT`, or `multicam.json` when unset.
    pub fn from_env() -> Self {
        let path = std::env::var_os("MULTICAM_LAYOUT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LAYOUT_PATH));
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate a layout, returning the default on missing file.
    pub fn load(path: &Path) -> Result<LayoutFile, SettingsError> {
        if !path.exists() {
            return Ok(LayoutFile::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let layout: LayoutFile = serde_json::from_str(&contents)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Save a layout atomically (write .tmp then rename).
    pub fn save(&self, layout: &LayoutFile) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(layout)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Load the layout, writing the default to disk first if the file
    /// does not exist yet.
    pub fn load_or_init(&self) -> Result<LayoutFile, SettingsError> {
        if !self.path.exists() {
            let layout = LayoutFile::default();
            self.save(&layout)?;
            tracing::info!("Wrote default layout to {}", self.path.display());
            return Ok(layout);
        }
        Self::load(&self.path)
    }
}
