use super::envelope::ApiFailure;
use crate::error::BankError;
use axum::http::StatusCode;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
    Read,
    Delete,
}

/// Identifies the handler operation an error came from, for messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub resource: &'static str,
    pub kind: OperationKind,
}

impl Operation {
    pub const fn new(resource: &'static str, kind: OperationKind) -> Self {
        Self { resource, kind }
    }

    /// Caller-facing text used in place of an infrastructure error's detail.
    pub fn fallback_message(&self) -> String {
        match self.kind {
            OperationKind::Create | OperationKind::Update => {
                format!("An error occurred while saving {} data", self.resource)
            }
            OperationKind::Read => {
                format!("An error occurred while retrieving {} data", self.resource)
            }
            OperationKind::Delete => format!("Failed to delete {}", self.resource),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Read => "read",
            OperationKind::Delete => "delete",
        };
        write!(f, "{}.{verb}", self.resource)
    }
}

/// The two tiers an error from the use-case layer falls into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedError {
    /// Expected rejection; the message is safe to show the caller.
    Application(String),
    /// Anything else; the detail is for operators only.
    Infrastructure(String),
}

impl ClassifiedError {
    pub fn classify(err: &BankError) -> Self {
        match err {
            BankError::Application(message) => Self::Application(message.clone()),
            other => Self::Infrastructure(other.to_string()),
        }
    }

    // Business rejections and infrastructure failures both map to 500.
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn message(&self, operation: Operation) -> String {
        match self {
            Self::Application(message) => message.clone(),
            Self::Infrastructure(_) => operation.fallback_message(),
        }
    }
}

impl ApiFailure {
    /// Classifies a use-case error, records it, and shapes the caller-facing failure.
    pub fn from_error(operation: Operation, err: BankError) -> Self {
        let classified = record(operation, &err);
        Self::new(classified.status(), classified.message(operation))
    }

    /// Like [`ApiFailure::from_error`], but the caller only ever sees the
    /// operation's fallback message, whatever the classification.
    pub fn masked(operation: Operation, err: BankError) -> Self {
        let classified = record(operation, &err);
        Self::new(classified.status(), operation.fallback_message())
    }
}

/// Logs the classified error under the operation's label.
fn record(operation: Operation, err: &BankError) -> ClassifiedError {
    let classified = ClassifiedError::classify(err);
    match &classified {
        ClassifiedError::Application(message) => tracing::warn!(
            resource = operation.resource,
            operation = %operation,
            error = %message,
            "Request rejected by use case"
        ),
        ClassifiedError::Infrastructure(detail) => tracing::error!(
            resource = operation.resource,
            operation = %operation,
            error = %detail,
            "Request failed"
        ),
    }
    classified
}
