//! File-backed persistence for project -> repository defaults.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use client_core::{DefaultsStore, ProjectDefaults};

pub struct JsonDefaultsStore {
    path: PathBuf,
}

impl JsonDefaultsStore {
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => dirs::config_dir()
                .context("no user config directory")?
                .join("board_tui")
                .join("defaults.json"),
        };
        Ok(Self { path })
    }
}

impl DefaultsStore for JsonDefaultsStore {
    fn load(&self) -> ProjectDefaults {
        // A missing file is the normal first run; a corrupt one is dropped.
        let Ok(bytes) = fs::read(&self.path) else {
            return ProjectDefaults::default();
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|err| {
            tracing::warn!(%err, path = %self.path.display(), "ignoring corrupt defaults file");
            ProjectDefaults::default()
        })
    }

    fn save(&self, defaults: &ProjectDefaults) -> Result<(), std::io::Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(defaults)?;
        fs::write(&self.path, bytes)
    }
}
