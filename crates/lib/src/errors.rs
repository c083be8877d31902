use thiserror::Error;

/// Custom error types for the menu core.
#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not authorized to access this menu")]
    NotAuthorized,
    #[error("Category still contains menu items")]
    CategoryNotEmpty,
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Object store request failed: {0}")]
    AssetRequest(reqwest::Error),
    #[error("Object store returned status {status}: {body}")]
    AssetApi { status: u16, body: String },
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),
    #[error("Missing configuration value: {0}")]
    MissingConfig(String),
}
