use std::fmt;
use std::path::Path;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::data::FsAccess;

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.5;
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Newline separated label file, one label per class.
    pub labels_path: Option<String>,
    /// ONNX model, only read for its declared shapes and `names` metadata.
    pub model_path: Option<String>,
    pub conf_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            labels_path: None,
            model_path: None,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
        }
    }
}

impl DetectorConfig {
    pub fn new(labels_path: Option<String>, model_path: Option<String>, conf_threshold: f32) -> Self {
        Self {
            labels_path,
            model_path,
            conf_threshold,
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Malformed detector config")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detector config {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Reads `<config dir>/coin_detect/config.json`, or returns the defaults when there is none.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = FsAccess::Config.path()?.join(CONFIG_FILE);
        if !path.exists() {
            log::info!("No detector config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::from_file(path)
    }
}

impl fmt::Display for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Labels Path: {}\n\
        Model Path: {}\n\
        Detection Threshold: {}",
               self.labels_path.as_deref().unwrap_or("-"),
               self.model_path.as_deref().unwrap_or("-"),
               self.conf_threshold)
    }
}
