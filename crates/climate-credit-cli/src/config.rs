use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use climate_credit_core::reference::{ReferenceData, ReferencePaths};

use crate::GlobalOpts;

/// Data directory used when neither the flag nor the config names one.
const DEFAULT_DATA_DIR: &str = "reference-data";

/// CLI configuration file.
///
/// ```yaml
/// data_dir: /srv/climate/reference-data
/// orderly_expected_loss: false
/// paths:
///   overseas_pd: PD_Conversion/Overseas_Credit_2024.json
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data_dir: Option<PathBuf>,
    pub orderly_expected_loss: bool,
    pub paths: ReferencePaths,
}

impl Config {
    /// Parse YAML, or JSON for `.json` files.
    pub fn read(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let config = if is_json {
            serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse config '{}': {}", path.display(), e))?
        } else {
            serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse config '{}': {}", path.display(), e))?
        };
        Ok(config)
    }

    pub fn load(global: &GlobalOpts) -> Result<Self, Box<dyn std::error::Error>> {
        match &global.config {
            Some(path) => Config::read(path),
            None => Ok(Config::default()),
        }
    }

    /// `--data-dir`, else the config's `data_dir`, else `reference-data`.
    pub fn data_dir(&self, global: &GlobalOpts) -> PathBuf {
        global
            .data_dir
            .clone()
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }

    pub fn reference_data(&self, global: &GlobalOpts) -> Result<ReferenceData, Box<dyn std::error::Error>> {
        let dir = self.data_dir(global);
        tracing::debug!(dir = %dir.display(), "loading reference data");
        Ok(ReferenceData::load(&dir, &self.paths)?)
    }
}
