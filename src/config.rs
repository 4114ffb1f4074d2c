//! User configuration loaded from `~/.pdf-navigator-config.json`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name of the per-user config file in the home directory.
pub const CONFIG_FILE_NAME: &str = ".pdf-navigator-config.json";

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "PDF_NAVIGATOR_CONFIG";

/// Server configuration.
///
/// Every key is optional in the file; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Viewer identifier (`skim`, `zathura`, `evince`, `sumatrapdf`, `acrobat`).
    /// `None` means auto-detect.
    pub pdf_reader: Option<String>,
    /// Executable location override for the viewer.
    pub reader_path: Option<PathBuf>,
    /// Characters of context around each search match.
    pub search_context_chars: usize,
    /// Maximum matches returned by a search.
    pub max_search_results: usize,
    /// Maximum matches collected from a single page.
    pub max_results_per_page: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pdf_reader: None,
            reader_path: None,
            search_context_chars: 100,
            max_search_results: 10,
            max_results_per_page: 3,
        }
    }
}

impl Config {
    /// Default config location: `$PDF_NAVIGATOR_CONFIG`, else the home directory.
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load the config from its default location.
    pub fn load_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => {
                tracing::warn!("No home directory; using default configuration");
                Self::default()
            }
        }
    }

    /// Load the config from `path`.
    ///
    /// A missing file yields the defaults. An unreadable or malformed file is
    /// logged and also yields the defaults, so a broken config never prevents
    /// the server from starting.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file");
                return Self::default();
            }
        };

        match serde_json::from_str::<Config>(&raw) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded configuration");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }
}
