//! # Configuration Module
//!
//! Runtime settings for Moodtune, read from an optional JSON file.
//!
//! ## Location
//!
//! The default file lives in the platform configuration directory:
//! - Linux: `~/.config/moodtune/config.json`
//! - macOS: `~/Library/Application Support/moodtune/config.json`
//! - Windows: `%APPDATA%\moodtune\config.json`
//!
//! Every key is optional:
//!
//! ```json
//! {
//!   "default_emotion": "Happy",
//!   "playlist_limit": 10,
//!   "analyzer": { "program": "moodtune-analyze", "args": ["--backend", "opencv"] },
//!   "frame": { "width": 640, "height": 480, "channels": 3 }
//! }
//! ```

use crate::frame::FrameGeometry;
use crate::playlist::DEFAULT_LIMIT;
use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Emotion used by `playlist` when none is given.
pub const DEFAULT_EMOTION: &str = "Happy";

/// Analyzer program used when neither the config nor the CLI names one.
pub const DEFAULT_ANALYZER: &str = "moodtune-analyze";

/// Returns the default configuration file path.
///
/// Nothing is created here; a missing file simply means defaults.
///
/// # Errors
///
/// Fails only when the platform has no configuration directory.
pub fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system config directory. Pass --config to choose a file explicitly."
        )
    })?;

    Ok(config_dir.join("moodtune").join("config.json"))
}

/// External analyzer command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_ANALYZER.to_string(),
            args: Vec::new(),
        }
    }
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub default_emotion: String,
    pub playlist_limit: usize,
    pub analyzer: AnalyzerConfig,
    pub frame: FrameGeometry,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_emotion: DEFAULT_EMOTION.to_string(),
            playlist_limit: DEFAULT_LIMIT,
            analyzer: AnalyzerConfig::default(),
            frame: FrameGeometry::default(),
        }
    }
}

impl RuntimeConfig {
    /// Loads configuration.
    ///
    /// With `explicit` set, that file must exist. Otherwise the default
    /// location is tried and defaults are used if it is absent.
    ///
    /// # Errors
    ///
    /// Fails when an explicit file is missing, or when the file that is read
    /// is not valid configuration JSON.
    ///
    /// # Examples
    ///
    /// ```
    /// use moodtune::config::RuntimeConfig;
    ///
    /// let file = tempfile::NamedTempFile::new()?;
    /// std::fs::write(file.path(), r#"{"playlist_limit": 3}"#)?;
    ///
    /// let config = RuntimeConfig::load(Some(file.path()))?;
    /// assert_eq!(config.playlist_limit, 3);
    /// assert_eq!(config.default_emotion, "Happy");
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = match get_config_path() {
                    Ok(path) => path,
                    Err(e) => {
                        debug!("{e}; using default configuration");
                        return Ok(Self::default());
                    }
                };
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    debug!("No config at {}, using defaults", path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reads and parses one configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
