use std::fmt;

use aws_sdk_sqs::config::http::HttpResponse;
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Result type alias for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Error codes the queue service (and the token services in front of it) use
/// to report rejected or expired credentials
const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "AuthFailure",
    "ExpiredToken",
    "IncompleteSignature",
    "InvalidAccessKeyId",
    "InvalidClientTokenId",
    "MissingAuthenticationToken",
    "RequestExpired",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

/// Remote queue operations, used to tag service errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `CreateQueue`
    CreateQueue,
    /// `ListQueues`
    ListQueues,
    /// `ReceiveMessage`
    ReceiveMessage,
    /// `SendMessage`
    SendMessage,
    /// `DeleteMessage`
    DeleteMessage,
    /// `GetQueueAttributes`
    GetQueueAttributes,
    /// `SetQueueAttributes`
    SetQueueAttributes,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateQueue => "CreateQueue",
            Self::ListQueues => "ListQueues",
            Self::ReceiveMessage => "ReceiveMessage",
            Self::SendMessage => "SendMessage",
            Self::DeleteMessage => "DeleteMessage",
            Self::GetQueueAttributes => "GetQueueAttributes",
            Self::SetQueueAttributes => "SetQueueAttributes",
        };
        f.write_str(name)
    }
}

/// A failure reported by the remote queue service or the SDK transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// Operation that failed
    pub operation: Operation,
    /// Service error code, when the service returned one
    pub code: Option<String>,
    /// Human-readable error message
    pub message: String,
    /// HTTP status of the raw response, when one was received
    pub status: Option<u16>,
}

impl ServiceError {
    /// Creates a service error without a raw response status
    #[must_use]
    pub fn new(operation: Operation, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            operation,
            code: code.map(ToString::to_string),
            message: message.into(),
            status: None,
        }
    }

    /// Sets the HTTP status of the raw response
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Converts an SDK error into a service error tagged with its operation
    #[must_use]
    pub fn from_sdk<E>(operation: Operation, err: &SdkError<E, HttpResponse>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        let message = err
            .message()
            .map_or_else(|| DisplayErrorContext(err).to_string(), ToString::to_string);

        Self {
            operation,
            code: err.code().map(ToString::to_string),
            message,
            status: err.raw_response().map(|raw| raw.status().as_u16()),
        }
    }

    /// Checks if this error means the credentials were rejected or expired
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        if matches!(self.status, Some(401 | 403)) {
            return true;
        }
        self.code
            .as_deref()
            .is_some_and(|code| AUTH_ERROR_CODES.contains(&code))
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} failed ({code}): {}", self.operation, self.message),
            None => write!(f, "{} failed: {}", self.operation, self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Error types for queue operations
#[derive(Error, Debug)]
pub enum QueueError {
    /// The queue service rejected or failed the request
    #[error("Queue service error: {0}")]
    Service(#[from] ServiceError),

    /// Message index is outside the last received batch
    #[error("Message index {index} out of range for {len} received messages")]
    MessageIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of messages in the last received batch
        len: usize,
    },

    /// The service did not return a requested queue attribute
    #[error("Queue attribute not returned: {0}")]
    MissingAttribute(&'static str),

    /// The service response lacked a required field
    #[error("Missing field in queue service response: {0}")]
    MissingField(&'static str),

    /// Error serializing the queue policy document
    #[error("Failed to serialize queue policy: {0}")]
    PolicySerialization(#[from] serde_json::Error),
}
