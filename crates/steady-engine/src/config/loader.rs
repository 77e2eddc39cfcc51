use super::schema::SteadyConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid {section} polling: {reason}")]
    Invalid {
        section: &'static str,
        reason: String,
    },
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./steady.yaml
    /// 2. ~/.steady/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<SteadyConfig, ConfigError> {
        let local_config = PathBuf::from("./steady.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".steady").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(SteadyConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<SteadyConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse and validate a YAML document.
    pub fn parse(content: &str) -> Result<SteadyConfig, ConfigError> {
        let config: SteadyConfig = serde_yaml::from_str(content)?;
        config
            .wait
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                section: "wait",
                reason,
            })?;
        config
            .interaction
            .readiness
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                section: "interaction.readiness",
                reason,
            })?;
        Ok(config)
    }
}
