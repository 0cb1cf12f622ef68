//! Cross-platform application paths

use std::fs;
use std::path::PathBuf;

use crate::error::{DaemonError, Result};

#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    pub fn new() -> Result<Self> {
        let base = dirs::data_dir().ok_or(DaemonError::NoDataDir)?;
        Self::at(base.join("neuroscape"))
    }

    /// Use an explicit directory, creating it if needed.
    pub fn at(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Optional `LandscapeConfig` overrides, read once at startup.
    pub fn config_file(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn svg_file(&self) -> PathBuf {
        self.data_dir.join("frame.svg")
    }
}
