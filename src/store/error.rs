use thiserror::Error;

/// Errors returned by [`Database`](super::Database) operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// An insert referenced a row that does not exist.
    #[error("{entity} {id} does not exist")]
    MissingParent { entity: &'static str, id: String },

    #[error("{entity} named {name:?} already exists")]
    Duplicate { entity: &'static str, name: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("failed to access database file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize database: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn missing_parent(entity: &'static str, id: impl ToString) -> Self {
        Self::MissingParent {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns true for errors caused by the caller's input rather than I/O.
    #[must_use]
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::MissingParent { .. } | Self::Duplicate { .. } | Self::InvalidInput(_)
        )
    }
}
