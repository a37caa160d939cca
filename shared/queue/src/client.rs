use std::collections::HashMap;

use aws_sdk_sqs::types::QueueAttributeName;

use crate::error::QueueResult;
use crate::types::{ReceiveOptions, ReceivedMessage, SendReceipt};

/// Trait for the remote queue service
///
/// Every method is a single request to the service (`list_queues` may page).
/// Implementations report failures as `QueueError::Service`.
#[async_trait::async_trait]
pub trait QueueService: Send + Sync {
    /// Creates a queue, or returns the existing one with the same name, and
    /// returns its URL
    async fn create_queue(&self, queue_name: &str) -> QueueResult<String>;

    /// Lists the URLs of all queues visible to the caller
    async fn list_queues(&self) -> QueueResult<Vec<String>>;

    /// Receives messages from a queue
    async fn receive_messages(
        &self,
        queue_url: &str,
        options: &ReceiveOptions,
    ) -> QueueResult<Vec<ReceivedMessage>>;

    /// Sends a message to a queue
    async fn send_message(&self, queue_url: &str, body: &str) -> QueueResult<SendReceipt>;

    /// Deletes a received message using its receipt handle
    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> QueueResult<()>;

    /// Fetches the requested queue attributes
    async fn get_queue_attributes(
        &self,
        queue_url: &str,
        names: Vec<QueueAttributeName>,
    ) -> QueueResult<HashMap<QueueAttributeName, String>>;

    /// Sets queue attributes
    async fn set_queue_attributes(
        &self,
        queue_url: &str,
        attributes: HashMap<QueueAttributeName, String>,
    ) -> QueueResult<()>;
}
