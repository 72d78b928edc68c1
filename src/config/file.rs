use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional TOML configuration file. Every field is optional; anything left
/// out falls back to the CLI flag or the built-in default.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    pub source: Option<SourceSection>,
    pub warehouse: Option<WarehouseSection>,
    pub run: Option<RunSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourceSection {
    pub endpoint: Option<String>,
    pub lookback_days: Option<u32>,
    pub page_limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WarehouseSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunSection {
    pub retries: Option<u32>,
    pub retry_delay_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| EtlError::ConfigFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| EtlError::ConfigFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
