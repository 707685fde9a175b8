use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::AtlasError;

pub const DEFAULT_SAMPLE_SIZE: usize = 100;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub index_url: Option<String>,
    #[serde(default)]
    pub admin_url: Option<String>,
    #[serde(default)]
    pub sample_size: Option<usize>,
    #[serde(default)]
    pub failed_output: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub index_url: String,
    pub admin_url: String,
    pub sample_size: usize,
    pub failed_output: Option<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, AtlasError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from("sc-atlas.json"),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config {
                index_url: None,
                admin_url: None,
                sample_size: None,
                failed_output: None,
            });
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| AtlasError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| AtlasError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, AtlasError> {
        Ok(ResolvedConfig {
            index_url: config
                .index_url
                .unwrap_or_else(|| "http://localhost:8983/solr/scxa-analytics".to_string()),
            admin_url: config
                .admin_url
                .unwrap_or_else(|| "http://localhost:8080/admin".to_string()),
            sample_size: config.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE),
            failed_output: config.failed_output,
        })
    }
}
