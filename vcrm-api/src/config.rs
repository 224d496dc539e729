use config::{Config, ConfigError, Environment, File};
use importers::{OrphanPolicy, WizardPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ApiConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CorsConfig {
    /// Empty means any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct DatabaseConfig {
    /// Falls back to the platform data directory when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ImportConfig {
    #[serde(default)]
    pub auto_import_when_all_known: bool,
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default)]
    pub orphan_policy: OrphanPolicy,
}

fn default_max_rows() -> usize {
    10_000
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            auto_import_when_all_known: false,
            max_rows: default_max_rows(),
            orphan_policy: OrphanPolicy::default(),
        }
    }
}

impl ImportConfig {
    pub fn wizard_policy(&self) -> WizardPolicy {
        WizardPolicy {
            auto_import_when_all_known: self.auto_import_when_all_known,
        }
    }
}

const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[cors]
allowed_origins = ["http://localhost:3000"]

[database]
# path = "/var/lib/vcrm/vcrm.sqlite3"

[import]
auto_import_when_all_known = false
max_rows = 10000
# "preserve" keeps custom values whose field definition was deleted, "drop" removes them on save
orphan_policy = "preserve"
"#;

impl ApiConfig {
    pub fn load() -> Result<(Self, PathBuf), ConfigError> {
        let config_path = get_config_path();

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let config = Self::load_from(&config_path)?;
        Ok((config, config_path))
    }

    /// Reads one file (which may be missing) and layers `VCRM__*` env vars on top,
    /// e.g. `VCRM__SERVER__PORT=9000`
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("VCRM").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Serializes the effective configuration, used by `--print-config`
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("vcrm").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
