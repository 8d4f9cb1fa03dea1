use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LookoutError, Result};

/// Score at or above which a candidate is accepted as the main artifact.
pub const DEFAULT_MAIN_THRESHOLD: f64 = 90.0;
/// Recency bonus awarded to the very last invocation.
pub const DEFAULT_RECENCY_WEIGHT: f64 = 30.0;

pub const ENV_MAIN_THRESHOLD: &str = "LOOKOUT_MAIN_THRESHOLD";
pub const ENV_RECENCY_WEIGHT: &str = "LOOKOUT_RECENCY_WEIGHT";
pub const ENV_SKIP_TECHNICAL: &str = "LOOKOUT_SKIP_TECHNICAL";

/// Tunables for detection and navigation.
///
/// Stored in `.lookout/config.json` under the key `detection`. Every field is
/// optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub main_threshold: f64,
    pub recency_weight: f64,
    /// Path prefixes stripped before measuring path depth.
    pub workspace_roots: Vec<String>,
    /// Default for "skip technical" when stepping.
    pub skip_technical: bool,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            main_threshold: DEFAULT_MAIN_THRESHOLD,
            recency_weight: DEFAULT_RECENCY_WEIGHT,
            workspace_roots: vec!["/workspace/".to_string()],
            skip_technical: true,
        }
    }
}

impl DetectionConfig {
    /// Project-local config path: `<dir>/.lookout/config.json`.
    pub fn project_path(dir: &Path) -> PathBuf {
        dir.join(".lookout").join("config.json")
    }

    /// Per-user config path: `<config dir>/lookout/config.json`.
    pub fn user_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("lookout").join("config.json"))
    }

    /// Read the `detection` section of a config file.
    ///
    /// `Ok(None)` when the file or the section is missing.
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|source| LookoutError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let val: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| LookoutError::Config {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        let section = match val.get("detection") {
            Some(v) => v.clone(),
            None => return Ok(None),
        };
        let config = serde_json::from_value(section).map_err(|e| LookoutError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Some(config))
    }

    /// Project config, then user config, then defaults; env overrides last.
    ///
    /// Unreadable files are logged and skipped.
    pub fn discover(dir: &Path) -> Self {
        Self::discover_from(dir, Self::user_path(), |key| std::env::var(key).ok())
    }

    /// [`discover`](Self::discover) with the user file and env lookup supplied.
    pub fn discover_from(
        dir: &Path,
        user_path: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let candidates = std::iter::once(Self::project_path(dir)).chain(user_path);
        let mut config = Self::default();
        for path in candidates {
            match Self::from_file(&path) {
                Ok(Some(found)) => {
                    tracing::debug!(path = %path.display(), "loaded detection config");
                    config = found;
                    break;
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("ignoring config: {e}"),
            }
        }
        config.apply_overrides(lookup);
        config
    }

    /// Apply `LOOKOUT_*` overrides from `lookup`.
    ///
    /// Unparsable and non-finite numbers are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_MAIN_THRESHOLD).and_then(|v| parse_finite(&v)) {
            self.main_threshold = v;
        }
        if let Some(v) = lookup(ENV_RECENCY_WEIGHT).and_then(|v| parse_finite(&v)) {
            self.recency_weight = v;
        }
        if let Some(v) = lookup(ENV_SKIP_TECHNICAL) {
            match v.trim() {
                "1" | "true" | "on" => self.skip_technical = true,
                "0" | "false" | "off" => self.skip_technical = false,
                _ => {}
            }
        }
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
