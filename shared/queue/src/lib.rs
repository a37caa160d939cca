//! Queue facade over Amazon SQS
//!
//! Procedural helpers to create queues, list them, send, receive and delete
//! messages, look up a queue ARN and let a notification topic publish into a
//! queue. Service errors are reported to a [`CredentialManager`] so rejected
//! credentials can be wiped before the caller retries.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Queue service trait
pub mod client;
pub mod credentials;
/// Error types for queue operations
pub mod error;
pub mod facade;
pub mod policy;
pub mod sqs_queue;
/// Common types for queue operations
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use client::QueueService;
pub use credentials::{CachedCredentials, CredentialManager};
pub use error::{Operation, QueueError, QueueResult, ServiceError};
pub use facade::QueueFacade;
pub use policy::QueuePolicy;
pub use sqs_queue::SqsQueueService;
pub use types::{CreatedQueue, LastReceived, ReceiveOptions, ReceivedMessage, SendReceipt};
