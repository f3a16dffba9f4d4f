//! Export configuration.
//!
//! The config is the project's global variables file. Only `model`,
//! `masterdata` and `access` are read for metadata; an optional `export`
//! section tunes this tool. Other top-level sections are ignored.
use crate::error::ConfigError;
use crate::keyword::KeywordPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Directory the archive is written under; the working directory when unset.
    pub root: Option<PathBuf>,
    pub keyword_policy: KeywordPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExportConfig {
    pub model: ModelConfig,
    #[serde(default)]
    pub masterdata: serde_yaml::Value,
    #[serde(default)]
    pub access: serde_yaml::Value,
    #[serde(default)]
    pub export: ExportSection,
}

impl ExportConfig {
    pub fn export_root(&self) -> PathBuf {
        self.export
            .root
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Load and validate a YAML config file.
pub fn load_config(path: &Path) -> Result<ExportConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound {
            path: path.to_path_buf(),
        },
        _ => ConfigError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let config = parse_config(path, &contents)?;
    tracing::debug!(
        path = %path.display(),
        model = %config.model.name,
        policy = ?config.export.keyword_policy,
        "loaded config"
    );
    Ok(config)
}

fn parse_config(path: &Path, contents: &str) -> Result<ExportConfig, ConfigError> {
    let config: ExportConfig =
        serde_yaml::from_str(contents).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            line: err.location().map(|location| location.line()),
            message: err.to_string(),
        })?;
    validate_config(path, &config)?;
    Ok(config)
}

fn validate_config(path: &Path, config: &ExportConfig) -> Result<(), ConfigError> {
    if config.model.name.trim().is_empty() {
        return Err(ConfigError::Validation {
            path: path.to_path_buf(),
            message: "model.name must be non-empty".to_string(),
        });
    }
    for (label, value) in [("masterdata", &config.masterdata), ("access", &config.access)] {
        if !(value.is_null() || value.is_mapping()) {
            return Err(ConfigError::Validation {
                path: path.to_path_buf(),
                message: format!("{label} must be a mapping"),
            });
        }
    }
    Ok(())
}
