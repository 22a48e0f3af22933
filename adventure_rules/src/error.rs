//! Error types for definition loading, configuration, and the condition language.

use std::path::PathBuf;
use thiserror::Error;

/// A definition source could not be read or parsed.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The engine configuration file could not be read or parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A condition expression is outside the supported grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character {found:?} at offset {pos}")]
    UnexpectedChar { found: char, pos: usize },

    #[error("unexpected token {0}")]
    Unexpected(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("trailing input starting at {0}")]
    TrailingInput(String),

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}
