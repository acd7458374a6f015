//! Codec limits and output settings, loadable from YAML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, RequestError};

/// YAML-configurable settings shared by the encoders and decoders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Maximum nesting depth accepted while decoding or normalizing.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Whether top-level nodes without a recognized discriminator are returned
    /// unchanged instead of rejected.
    #[serde(default = "default_allow_foreign_nodes")]
    pub allow_foreign_nodes: bool,
    /// Whether file writers emit indented JSON.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_max_depth() -> usize {
    128
}

fn default_allow_foreign_nodes() -> bool {
    true
}

fn default_pretty() -> bool {
    true
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            allow_foreign_nodes: default_allow_foreign_nodes(),
            pretty: default_pretty(),
        }
    }
}

impl CodecConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, RequestError> {
        serde_yaml::from_str(text).map_err(|err| {
            RequestError::Config(ErrorInfo::new("config-parse", err.to_string()))
        })
    }

    /// Loads a configuration file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RequestError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            RequestError::Io(
                ErrorInfo::new("config-read", "failed to read codec configuration")
                    .with_context("path", path.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    /// Fails with [`RequestError::DepthExceeded`] once `depth` passes the limit.
    pub fn check_depth(&self, depth: usize) -> Result<(), RequestError> {
        if depth > self.max_depth {
            return Err(RequestError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        Ok(())
    }
}
