use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::models::Role;
use crate::scope::EntityKind;

/// A role asked for an entity kind it may never see.
///
/// Returned before any scoping runs, so callers can tell "not allowed" apart
/// from "allowed, but nothing to show".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{role} may not view {kind}")]
pub struct AccessDenied {
    pub role: Role,
    pub kind: EntityKind,
}

/// A filter parameter that could not be applied. The pipeline drops the
/// predicate and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidFilter {
    #[error("unknown filter key `{0}`")]
    UnknownKey(String),
    #[error("`{key}` has an invalid value `{value}`")]
    BadValue { key: String, value: String },
    #[error("date range starts {from} after it ends {to}")]
    InvertedRange { from: String, to: String },
    #[error("`{0}` cannot sort this list")]
    UnsupportedSort(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("note {0} not found")]
    NoteNotFound(i64),
    #[error("notification {0} not found")]
    NotificationNotFound(i64),
    #[error("folder {0} not found")]
    FolderNotFound(Uuid),
    #[error("folder name must not be empty")]
    EmptyFolderName,
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid date 2025-{month:02}-{day:02} {hour:02}:{minute:02}")]
    InvalidDate {
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read identity directory {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse identity directory {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("display name `{name}` is claimed by both {first} and {second}")]
    DuplicateName {
        name: String,
        first: String,
        second: String,
    },
}
