//! Configuration loading
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (handled by the CLI layer via `clap` `env`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not fatal: a warning is logged and compiled
//! defaults are used. A config file that exists but does not parse is an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::{Error, Result};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "CH_CONFIG";

const APP_DIR: &str = "citizen-analytics";

/// A dashboard login; the password is stored as a SHA-256 hex digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password_sha256: String,
}

/// Contents of `config.toml`; every field optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TomlConfig {
    pub title: Option<String>,
    /// Annotation tool database (documents, labels, users)
    pub annotations_db: Option<PathBuf>,
    /// Action log datastore
    pub datastore_db: Option<PathBuf>,
    pub port: Option<u16>,
    pub page_size: Option<i64>,
    pub expert_username: Option<String>,
    #[serde(default)]
    pub users: Vec<Credential>,
}

/// Compiled fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub title: String,
    pub annotations_db: PathBuf,
    pub datastore_db: PathBuf,
    pub port: u16,
    pub page_size: i64,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let data_dir = dirs::data_local_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("./citizen_analytics_data"));
        Self {
            title: "CitizenHelper".to_string(),
            annotations_db: data_dir.join("doccano.db"),
            datastore_db: data_dir.join("datastore.db"),
            port: 5730,
            page_size: 10,
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub annotations_db: Option<PathBuf>,
    pub datastore_db: Option<PathBuf>,
    pub port: Option<u16>,
    pub expert_username: Option<String>,
}

/// Fully resolved dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub title: String,
    pub annotations_db: PathBuf,
    pub datastore_db: PathBuf,
    pub port: u16,
    pub page_size: i64,
    pub expert_username: Option<String>,
    pub users: Vec<Credential>,
}

impl DashboardConfig {
    pub fn resolve(file: TomlConfig, overrides: Overrides) -> Self {
        let defaults = CompiledDefaults::for_current_platform();
        Self {
            title: file.title.unwrap_or(defaults.title),
            annotations_db: overrides
                .annotations_db
                .or(file.annotations_db)
                .unwrap_or(defaults.annotations_db),
            datastore_db: overrides
                .datastore_db
                .or(file.datastore_db)
                .unwrap_or(defaults.datastore_db),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            page_size: file
                .page_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),
            expert_username: overrides
                .expert_username
                .or(file.expert_username)
                .filter(|name| !name.trim().is_empty()),
            users: file.users,
        }
    }

    /// Page title, optionally suffixed: `"CitizenHelper - Home"`
    pub fn page_title(&self, suffix: Option<&str>) -> String {
        match suffix {
            Some(suffix) => format!("{} - {}", self.title, suffix),
            None => self.title.clone(),
        }
    }

    /// Authentication is disabled when no users are configured
    pub fn auth_enabled(&self) -> bool {
        !self.users.is_empty()
    }
}

/// Platform config file location: `<config_dir>/citizen-analytics/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Locate, read and resolve the configuration
///
/// An explicitly named file (CLI or [`CONFIG_ENV_VAR`]) must exist; the
/// platform default may be absent.
pub fn load_config(cli_path: Option<&Path>, overrides: Overrides) -> Result<DashboardConfig> {
    let explicit = cli_path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from));

    let file = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!("Config file not found: {}", path.display())));
            }
            info!("Loading config from {}", path.display());
            load_toml_config(&path)?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                load_toml_config(&path)?
            }
            Some(path) => {
                warn!("No config file at {}; using defaults", path.display());
                TomlConfig::default()
            }
            None => {
                warn!("Could not determine config directory; using defaults");
                TomlConfig::default()
            }
        },
    };

    Ok(DashboardConfig::resolve(file, overrides))
}
