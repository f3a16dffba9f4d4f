//! Failure taxonomy for the export pipeline.
//!
//! Each enum covers one failure domain. Whether a failure is fatal or a
//! per-candidate skip is decided by the caller that owns the decision:
//! the binder downgrades `PropertyParseError` to a skip, everything else
//! propagates to `main` and aborts the run.
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while tokenizing GRDECL text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrdeclError {
    #[error("keyword {keyword} is not terminated by '/'")]
    MissingTerminator { keyword: String },

    #[error("unexpected token {token:?} outside a keyword block at line {line}")]
    UnexpectedToken { line: usize, token: String },

    #[error("invalid value {token:?} for {keyword} at line {line}")]
    InvalidValue {
        keyword: String,
        line: usize,
        token: String,
    },

    #[error("{keyword} at line {line} expands past {limit} values")]
    TooManyValues {
        keyword: String,
        line: usize,
        limit: usize,
    },
}

/// Grid load failures. All of them abort the run.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read grid {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("grid {path} is not valid text")]
    NotText { path: PathBuf },

    #[error("failed to parse grid {path}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: GrdeclError,
    },

    #[error("grid {path} has no {keyword} keyword")]
    MissingKeyword { path: PathBuf, keyword: &'static str },

    #[error("grid {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Value-level property failures. The binder treats these as skips.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PropertyParseError {
    #[error("keyword {keyword:?} not found")]
    KeywordNotFound { keyword: String },

    #[error(transparent)]
    Grdecl(#[from] GrdeclError),

    #[error("expected {expected} values (one per grid cell), found {found}")]
    CountMismatch { expected: usize, found: usize },
}

/// Failures the binder does not recover from.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("failed to read property file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Export sink failures.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("refusing to export {kind} with an empty name")]
    EmptyName { kind: &'static str },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize metadata for {name}")]
    Metadata {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Configuration load failures. All of them abort the run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path} at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("invalid config {path}: {message}")]
    Validation { path: PathBuf, message: String },
}
