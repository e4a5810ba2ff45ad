use super::CardConfig;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: 'obj_path' is required")]
    MissingModelPath,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub fn parse_config(json: &str) -> Result<CardConfig> {
    let config: CardConfig = serde_json::from_str(json)?;
    if config.obj_path.trim().is_empty() {
        return Err(ConfigError::MissingModelPath);
    }
    Ok(config)
}

pub fn load_config_from_file(path: &Path) -> Result<CardConfig> {
    let json = std::fs::read_to_string(path)?;
    parse_config(&json)
}
