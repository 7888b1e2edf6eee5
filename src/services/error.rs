use thiserror::Error;

/// Error taxonomy shared by every record service. All variants surface on the
/// GraphQL error channel as human-readable messages.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No valid session; terminal for the request before any data access.
    #[error("Authentication required")]
    Authentication,

    /// Session valid but the caller lacks the required privilege. Always
    /// thrown, for reads as well as writes.
    #[error("Missing privilege: {0}")]
    Authorization(String),

    /// User-facing validation failure; no partial write was performed.
    #[error("{0}")]
    Validation(String),

    /// Referenced entity absent on update/delete.
    #[error("{0}")]
    Integrity(String),

    /// Envelope or hop token failed verification; never silently ignored.
    #[error("Invalid token: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("Malformed filters: {err}"))
    }
}
