//! Configuration for zotlit.
//!
//! Sources (highest priority first):
//! 1. Environment variables (ZOTERO_LIBRARY_ID, ZOTERO_LIBRARY_TYPE,
//!    ZOTERO_API_KEY, ZOTLIT_OUTPUT_DIR)
//! 2. Config file (.zotlit/config.yaml, searched from the current directory
//!    upwards, then the home directory)
//! 3. Defaults (library type "user", output directory "output")
//!
//! Credentials are validated before any network activity; a missing library
//! id or API key is a fatal configuration error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::LibraryType;

/// Raw config file schema (matches the YAML structure).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    pub library_id: Option<String>,
    pub library_type: Option<String>,
    pub api_key: Option<String>,
    pub output_dir: Option<String>,
}

/// Resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub library_id: Option<String>,
    pub library_type: LibraryType,
    pub api_key: Option<String>,
    pub output_dir: PathBuf,
    /// Path to the config file, if one was found.
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from all sources.
    pub fn load() -> Result<Self> {
        let config_path = find_config_file();
        let file = match &config_path {
            Some(path) => load_config_file(path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(file, config_path)
    }

    fn resolve(file: ConfigFile, config_file: Option<PathBuf>) -> Result<Self> {
        let library_id = std::env::var("ZOTERO_LIBRARY_ID")
            .ok()
            .or(file.library_id);

        let library_type = std::env::var("ZOTERO_LIBRARY_TYPE")
            .ok()
            .or(file.library_type)
            .map(|s| LibraryType::parse(&s))
            .transpose()?
            .unwrap_or(LibraryType::User);

        let api_key = std::env::var("ZOTERO_API_KEY").ok().or(file.api_key);

        let output_dir = std::env::var("ZOTLIT_OUTPUT_DIR")
            .ok()
            .or(file.output_dir)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output"));

        Ok(Self {
            library_id,
            library_type,
            api_key,
            output_dir,
            config_file,
        })
    }

    /// The credentials needed to talk to the API, or a configuration error
    /// naming what is missing.
    pub fn credentials(&self) -> Result<(String, LibraryType, String)> {
        let library_id = self.library_id.clone().context(
            "No library ID configured. Set ZOTERO_LIBRARY_ID or pass --library-id",
        )?;
        let api_key = self
            .api_key
            .clone()
            .context("No API key configured. Set ZOTERO_API_KEY or pass --api-key")?;
        Ok((library_id, self.library_type, api_key))
    }
}

/// Find the config file by searching the current directory and its parents,
/// then the home directory.
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".zotlit").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".zotlit").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse a config file.
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}
