/// Errors that can occur within the storage layer.
///
/// A lookup that finds nothing is not an error: [`crate::WalletStore`]
/// returns `Ok(None)` and [`crate::ChamaStore`] an empty roster. These
/// variants cover writes against missing records and backend failures.
///
/// # Examples
///
/// ```rust
/// use chama_store::error::StorageError;
///
/// let err = StorageError::NotFound {
///     entity: "wallet",
///     id: "w-99".to_string(),
/// };
/// assert!(err.to_string().contains("wallet"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A required record was not found.
    #[error("Storage: {entity} not found (id={id})")]
    NotFound { entity: &'static str, id: String },

    /// A record with the same id already exists.
    #[error("Storage: {entity} already exists (id={id})")]
    AlreadyExists { entity: &'static str, id: String },

    /// The backend could not serve the request (connection loss, timeout).
    #[error("Storage: backend unavailable: {0}")]
    Unavailable(String),

    /// Generic storage error for cases not covered by other variants.
    #[error("Storage: {0}")]
    Other(String),
}

/// Convenience `Result` alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
