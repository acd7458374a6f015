//! Reading and writing request documents.

use std::fs;
use std::path::Path;

use cpr_core::{CodecConfig, ErrorInfo, RequestError};
use serde::Serialize;
use tracing::debug;

use crate::request::ExperimentalRequest;

/// Reads and decodes a request document.
pub fn load_request(
    path: impl AsRef<Path>,
    config: &CodecConfig,
) -> Result<ExperimentalRequest, RequestError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|err| {
        RequestError::Io(
            ErrorInfo::new("request-read", "failed to read request document")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    debug!(path = %path.display(), bytes = text.len(), "loaded request document");
    ExperimentalRequest::from_json_str(&text, config)
}

/// Encodes `request` and writes it to `path`, creating parent directories.
pub fn write_request(
    path: impl AsRef<Path>,
    request: &ExperimentalRequest,
    config: &CodecConfig,
) -> Result<(), RequestError> {
    write_document(path, request, config)
}

/// Encodes any document as JSON and writes it to `path` with a trailing
/// newline, creating parent directories. Indentation follows `config.pretty`.
pub fn write_document<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    document: &T,
    config: &CodecConfig,
) -> Result<(), RequestError> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let encoded = if config.pretty {
        serde_json::to_string_pretty(document)
    } else {
        serde_json::to_string(document)
    };
    let mut text = encoded.map_err(|err| RequestError::serde("encode-json", err))?;
    text.push('\n');
    fs::write(path, text).map_err(|err| {
        RequestError::Io(
            ErrorInfo::new("document-write", "failed to write document")
                .with_context("path", path.display().to_string())
                .with_hint(err.to_string()),
        )
    })?;
    debug!(path = %path.display(), "wrote document");
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), RequestError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            RequestError::Io(
                ErrorInfo::new("document-create", "failed to create output directory")
                    .with_context("path", parent.display().to_string())
                    .with_hint(err.to_string()),
            )
        })?
    }
    Ok(())
}
