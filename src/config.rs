//! Project configuration loaded from `luming.toml`
//!
//! ```toml
//! [preview]
//! title = "Dashboard"
//! gap = "10px"
//! terminus_label = "recursive"
//!
//! [preview.node]
//! background-color = "#f1f5f9"
//!
//! [generate]
//! framework = "vue"
//! out_dir = "src/components"
//! ```
//!
//! Every key is optional; missing ones keep their defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::generator::{Framework, GenerateConfig};
use crate::renderer::PreviewConfig;

/// Errors that can occur when loading or parsing a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Resolved project configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub preview: PreviewConfig,
    pub generate: GenerateConfig,
}

/// TOML structure for deserializing config files
#[derive(Deserialize)]
struct TomlConfig {
    preview: Option<TomlPreview>,
    generate: Option<TomlGenerate>,
}

#[derive(Deserialize)]
struct TomlPreview {
    title: Option<String>,
    gap: Option<String>,
    terminus_label: Option<String>,
    node: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
struct TomlGenerate {
    framework: Option<Framework>,
    out_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load config from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Config::default();

        if let Some(preview) = parsed.preview {
            if let Some(title) = preview.title {
                config.preview.title = title;
            }
            if let Some(gap) = preview.gap {
                config.preview.gap = gap;
            }
            if let Some(label) = preview.terminus_label {
                config.preview.terminus_label = label;
            }
            config.preview.node_styles.extend(preview.node.unwrap_or_default());
        }

        if let Some(generate) = parsed.generate {
            if let Some(framework) = generate.framework {
                config.generate.framework = framework;
            }
            if let Some(out_dir) = generate.out_dir {
                config.generate.out_dir = out_dir;
            }
        }

        Ok(config)
    }
}
