pub mod check;
pub mod fingerprint;
pub mod normalize;
pub mod version;

use std::error::Error;
use std::path::PathBuf;

use cpr_core::CodecConfig;

/// Loads the codec configuration, falling back to defaults when no file is given.
pub(crate) fn load_config(path: Option<&PathBuf>) -> Result<CodecConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(CodecConfig::load(path)?),
        None => Ok(CodecConfig::default()),
    }
}
