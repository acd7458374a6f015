//! Structured error types shared across the request crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace a named symbol is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Subjects and reagents ([`crate::NamedEntity`]).
    Entity,
    /// Experimental factors ([`crate::Treatment`]).
    Treatment,
    /// Labeled design blocks.
    Design,
}

impl SymbolKind {
    /// Returns the lowercase name used in messages and error codes.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Entity => "entity",
            SymbolKind::Treatment => "treatment",
            SymbolKind::Design => "design",
        }
    }
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured payload attached to library-failure variants of [`RequestError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (field names, paths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for request construction, encoding and decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RequestError {
    /// A node carries a recognized discriminator but lacks a required field.
    #[error("malformed `{node_type}` node: missing field `{field}`")]
    MalformedNode {
        /// Discriminator value of the offending node.
        node_type: String,
        /// Name of the absent field.
        field: String,
    },
    /// A required field is present with the wrong JSON shape.
    #[error("malformed `{node_type}` node: field `{field}` must be {expected}")]
    InvalidField {
        /// Discriminator value of the offending node.
        node_type: String,
        /// Name of the offending field.
        field: String,
        /// Description of the accepted shape.
        expected: String,
    },
    /// A name or label is absent from the governing symbol table.
    #[error("unresolved {kind} reference `{name}`")]
    UnresolvedReference {
        /// Namespace that was searched.
        kind: SymbolKind,
        /// Name that could not be found.
        name: String,
    },
    /// A different object is already registered under the same name.
    #[error("duplicate {kind} symbol `{name}`")]
    DuplicateSymbol {
        /// Namespace of the collision.
        kind: SymbolKind,
        /// Colliding name.
        name: String,
    },
    /// A child position holds something other than the required typed node.
    #[error("expected {expected} node, found {found}")]
    UnexpectedNode {
        /// Kind of node the position requires.
        expected: String,
        /// Short description of what was found instead.
        found: String,
    },
    /// Following references revisited a design block label.
    #[error("reference cycle: {}", .path.join(" -> "))]
    ReferenceCycle {
        /// Labels on the walk, ending with the revisited one.
        path: Vec<String>,
    },
    /// Nesting exceeded the configured limit.
    #[error("nesting deeper than {limit} levels")]
    DepthExceeded {
        /// Configured maximum depth.
        limit: usize,
    },
    /// No valid argument combination was supplied to an attribute factory.
    #[error("cannot create attribute: {0}")]
    CannotCreateAttribute(ErrorInfo),
    /// No valid argument combination was supplied to a treatment factory.
    #[error("cannot create treatment: {0}")]
    CannotCreateTreatment(ErrorInfo),
    /// Serialization and schema errors raised by the JSON layer.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
    /// Configuration loading errors.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// Filesystem errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
}

impl RequestError {
    /// Shorthand for [`RequestError::MalformedNode`].
    pub fn malformed(node_type: impl Into<String>, field: impl Into<String>) -> Self {
        RequestError::MalformedNode {
            node_type: node_type.into(),
            field: field.into(),
        }
    }

    /// Shorthand for [`RequestError::InvalidField`].
    pub fn invalid_field(
        node_type: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        RequestError::InvalidField {
            node_type: node_type.into(),
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Shorthand for [`RequestError::UnresolvedReference`].
    pub fn unresolved(kind: SymbolKind, name: impl Into<String>) -> Self {
        RequestError::UnresolvedReference {
            kind,
            name: name.into(),
        }
    }

    /// Shorthand for [`RequestError::UnexpectedNode`].
    pub fn unexpected(expected: impl Into<String>, found: impl Into<String>) -> Self {
        RequestError::UnexpectedNode {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Wraps a serialization library failure.
    pub fn serde(code: &str, err: impl ToString) -> Self {
        RequestError::Serde(ErrorInfo::new(code, err.to_string()))
    }

    /// Stable machine readable code for the error.
    pub fn code(&self) -> &str {
        match self {
            RequestError::MalformedNode { .. } => "malformed-node",
            RequestError::InvalidField { .. } => "invalid-field",
            RequestError::UnresolvedReference { .. } => "unresolved-reference",
            RequestError::DuplicateSymbol { .. } => "duplicate-symbol",
            RequestError::UnexpectedNode { .. } => "unexpected-node",
            RequestError::ReferenceCycle { .. } => "reference-cycle",
            RequestError::DepthExceeded { .. } => "depth-exceeded",
            RequestError::CannotCreateAttribute(info)
            | RequestError::CannotCreateTreatment(info)
            | RequestError::Serde(info)
            | RequestError::Config(info)
            | RequestError::Io(info) => &info.code,
        }
    }

    /// Returns the structured payload for library-failure variants.
    pub fn info(&self) -> Option<&ErrorInfo> {
        match self {
            RequestError::CannotCreateAttribute(info)
            | RequestError::CannotCreateTreatment(info)
            | RequestError::Serde(info)
            | RequestError::Config(info)
            | RequestError::Io(info) => Some(info),
            _ => None,
        }
    }
}
