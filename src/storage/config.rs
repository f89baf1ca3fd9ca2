//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_dir};

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Load the config at the default location, creating defaults if missing
    pub fn new() -> AppResult<Self> {
        Self::open(config_path()?)
    }

    /// Load the config at `path`, creating defaults if missing
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let config_path = path.into();
        if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }

        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            tracing::info!(path = %config_path.display(), "creating default config");
            let default_config = AppConfig::default();
            Self::save_to_file(&config_path, &default_config)?;
            default_config
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Override the bind address for this run (not persisted)
    pub fn set_bind_address(&mut self, bind: impl Into<String>) -> AppResult<()> {
        let mut config = self.config.clone();
        config.bind_address = bind.into();
        config.validate().map_err(AppError::validation)?;
        self.config = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_config_file(config: &AppConfig) -> (NamedTempFile, PathBuf) {
        let mut file = NamedTempFile::new().unwrap();
        let content = serde_json::to_string_pretty(config).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let path = file.path().to_path_buf();
        (file, path)
    }

    #[test]
    fn test_load_config_from_file() {
        let config = AppConfig {
            chat_model: "gemini-2.5-flash".to_string(),
            ..Default::default()
        };
        let (_file, path) = create_test_config_file(&config);
        let service = ConfigService::open(&path).unwrap();
        assert_eq!(service.get_config().chat_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_open_creates_default_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let service = ConfigService::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(service.path(), path.as_path());
        let loaded = ConfigService::load_from_file(&path).unwrap();
        assert_eq!(loaded.chat_model, service.get_config().chat_model);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..Default::default()
        };
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&config).unwrap().as_bytes())
            .unwrap();

        let err = ConfigService::open(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_unparsable_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let err = ConfigService::open(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_set_bind_address() {
        let (_file, path) = create_test_config_file(&AppConfig::default());
        let mut service = ConfigService::open(&path).unwrap();

        service.set_bind_address("0.0.0.0:8080").unwrap();
        assert_eq!(service.get_config().bind_address, "0.0.0.0:8080");

        assert!(service.set_bind_address("nope").is_err());
        assert_eq!(service.get_config().bind_address, "0.0.0.0:8080");
    }
}
