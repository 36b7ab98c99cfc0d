use thiserror::Error;

/// Errors produced by the use-case and storage layers.
///
/// Use cases build [`BankError::Application`] explicitly when a business rule
/// rejects a request. Every other variant is an infrastructure failure whose
/// detail must stay out of client responses.
#[derive(Error, Debug)]
pub enum BankError {
    #[error("{0}")]
    Application(String),
    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Resource '{resource}' is unavailable: {detail}")]
    ResourceUnavailable {
        resource: &'static str,
        detail: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BankError {
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Storage(message.into())
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BankError {
    fn from(err: rocksdb::Error) -> Self {
        Self::Storage(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BankError>;
