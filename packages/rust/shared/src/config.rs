//! Application configuration for docreport.
//!
//! User config lives at `~/.docreport/docreport.toml`.
//! Missing file means defaults; CLI flags override nothing here — they are
//! runtime switches (output target, cache clearing), not site settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DocReportError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docreport.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docreport";

/// Cache database file name under the config directory.
const CACHE_FILE_NAME: &str = "http-cache.db";

// ---------------------------------------------------------------------------
// Config structs (matching docreport.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scraped site endpoints.
    #[serde(default)]
    pub site: SiteConfig,

    /// Output locations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[site]` section — the two base URLs everything resolves against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Root of the versioned documentation tree.
    #[serde(default = "default_docs_url")]
    pub docs_url: String,

    /// Root of the proposal index site.
    #[serde(default = "default_peps_url")]
    pub peps_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            docs_url: default_docs_url(),
            peps_url: default_peps_url(),
        }
    }
}

fn default_docs_url() -> String {
    "https://docs.python.org/3/".into()
}
fn default_peps_url() -> String {
    "https://peps.python.org/".into()
}

impl SiteConfig {
    /// Parsed documentation base URL.
    pub fn docs_url(&self) -> Result<Url> {
        parse_base_url(&self.docs_url)
    }

    /// Parsed proposal index base URL.
    pub fn peps_url(&self) -> Result<Url> {
        parse_base_url(&self.peps_url)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| DocReportError::config(format!("invalid base URL {raw:?}: {e}")))
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for delimited report files, relative to the working directory.
    #[serde(default = "default_results_dir")]
    pub results_dir: String,

    /// Directory for downloaded archives, relative to the working directory.
    #[serde(default = "default_downloads_dir")]
    pub downloads_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            downloads_dir: default_downloads_dir(),
        }
    }
}

fn default_results_dir() -> String {
    "results".into()
}
fn default_downloads_dir() -> String {
    "downloads".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docreport/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DocReportError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docreport/docreport.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Get the path to the HTTP response cache database.
pub fn cache_db_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CACHE_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocReportError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocReportError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocReportError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DocReportError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocReportError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
