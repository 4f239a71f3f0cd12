//! Error taxonomy shared by the service and data-access layers

use thiserror::Error;

use crate::filter::FilterError;
use crate::render::RenderError;

/// Failure raised by a database backend
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("failed to decode document: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("{0}")]
    Backend(String),
}

/// Coarse classification used by the HTTP layer to pick a status code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    BadRequest,
    Forbidden,
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("invalid profile id")]
    InvalidProfileId,

    #[error("the server is running in read-only mode")]
    ReadOnly,

    #[error("{0} not found")]
    NotFound(String),

    /// The caller's permitted locations could not be resolved
    #[error("cannot list the locations of user {user}: {source}")]
    LocationLookup {
        user: String,
        #[source]
        source: DatabaseError,
    },

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl InventoryError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Filter(_) | Self::Validation(_) | Self::LocationLookup { .. } => {
                ErrorKind::Validation
            }
            Self::BadRequest(_) | Self::InvalidProfileId => ErrorKind::BadRequest,
            Self::ReadOnly => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Database(_) | Self::Render(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T, E = InventoryError> = std::result::Result<T, E>;

/// Per-item failures collected while serving a multi-profile request.
///
/// Rendered as `"1 error occurred: 'x'"` or `"2 errors occurred: 'x', 'y'"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialFailure {
    errors: Vec<String>,
}

impl PartialFailure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl std::fmt::Display for PartialFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let quoted: Vec<String> = self.errors.iter().map(|e| format!("'{e}'")).collect();
        match self.errors.len() {
            1 => write!(f, "1 error occurred: {}", quoted.join(", ")),
            n => write!(f, "{n} errors occurred: {}", quoted.join(", ")),
        }
    }
}
