//! Queue facade
//!
//! Procedural operations over a [`QueueService`]. Every service error is
//! logged, reported once to the [`CredentialManager`] and returned to the
//! caller. Nothing is retried here; retrying after re-authentication is up to
//! the caller.

use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_sqs::types::QueueAttributeName;

use crate::client::QueueService;
use crate::credentials::CredentialManager;
use crate::error::{QueueError, QueueResult};
use crate::policy::QueuePolicy;
use crate::types::{CreatedQueue, LastReceived, ReceiveOptions, SendReceipt};

/// Facade over a queue service that reports service errors to a credential manager
#[derive(Clone)]
pub struct QueueFacade {
    service: Arc<dyn QueueService>,
    credentials: Arc<dyn CredentialManager>,
    receive_options: ReceiveOptions,
}

impl QueueFacade {
    /// Creates a new queue facade
    ///
    /// # Arguments
    ///
    /// * `service` - Queue service every operation is forwarded to
    /// * `credentials` - Credential manager notified of service errors
    #[must_use]
    pub fn new(service: Arc<dyn QueueService>, credentials: Arc<dyn CredentialManager>) -> Self {
        Self {
            service,
            credentials,
            receive_options: ReceiveOptions::default(),
        }
    }

    /// Uses `options` for every receive call
    #[must_use]
    pub fn with_receive_options(mut self, options: ReceiveOptions) -> Self {
        self.receive_options = options;
        self
    }

    /// Options used for receive calls
    #[must_use]
    pub const fn receive_options(&self) -> ReceiveOptions {
        self.receive_options
    }

    /// Creates a queue, or returns the existing queue with the same name
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Service` if the service rejects the request
    pub async fn create_queue(&self, queue_name: &str) -> QueueResult<CreatedQueue> {
        let queue_url = self.observe(self.service.create_queue(queue_name).await)?;
        Ok(CreatedQueue { queue_url })
    }

    /// Lists the URLs of all queues
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Service` if the service rejects the request
    pub async fn queue_urls(&self) -> QueueResult<Vec<String>> {
        self.observe(self.service.list_queues().await)
    }

    /// Receives messages and returns their bodies in order
    ///
    /// On success `last` is overwritten with the received messages.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Service` if the receive fails; `last` is left untouched
    pub async fn receive_message_bodies(
        &self,
        queue_url: &str,
        last: &mut LastReceived,
    ) -> QueueResult<Vec<String>> {
        self.receive_into(queue_url, last).await?;
        Ok(last
            .messages()
            .iter()
            .map(|message| message.body.clone())
            .collect())
    }

    /// Receives messages and returns their IDs in order
    ///
    /// On success `last` is overwritten with the received messages, the same
    /// batch [`Self::receive_message_bodies`] writes.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Service` if the receive fails; `last` is left untouched
    pub async fn receive_message_ids(
        &self,
        queue_url: &str,
        last: &mut LastReceived,
    ) -> QueueResult<Vec<String>> {
        self.receive_into(queue_url, last).await?;
        Ok(last
            .messages()
            .iter()
            .map(|message| message.message_id.clone())
            .collect())
    }

    /// Sends a message to a queue
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Service` if the service rejects the request
    pub async fn send_message(&self, queue_url: &str, body: &str) -> QueueResult<SendReceipt> {
        self.observe(self.service.send_message(queue_url, body).await)
    }

    /// Deletes a message from the queue named `queue_name`
    ///
    /// The name is resolved to a URL with a create-queue call, which returns
    /// the existing queue when it already exists.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Service` if either call fails
    pub async fn delete_message(&self, queue_name: &str, receipt_handle: &str) -> QueueResult<()> {
        let result = async {
            let queue_url = self.service.create_queue(queue_name).await?;
            self.service.delete_message(&queue_url, receipt_handle).await
        }
        .await;

        self.observe(result)
    }

    /// Returns the ARN of a queue
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Service` if the service rejects the request, or
    /// `QueueError::MissingAttribute` if the ARN is not returned
    pub async fn queue_arn(&self, queue_url: &str) -> QueueResult<String> {
        let result = self.fetch_queue_arn(queue_url).await;
        self.observe(result)
    }

    /// Allows the notification topic `topic_arn` to send messages into a queue
    ///
    /// Replaces the queue's `Policy` attribute.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::Service` if looking up the queue ARN or setting the
    /// policy fails
    pub async fn allow_notifications(&self, queue_url: &str, topic_arn: &str) -> QueueResult<()> {
        let result = async {
            let queue_arn = self.fetch_queue_arn(queue_url).await?;
            let policy = QueuePolicy::allow_topic(&queue_arn, topic_arn).to_json()?;

            let attributes = HashMap::from([(QueueAttributeName::Policy, policy)]);
            self.service
                .set_queue_attributes(queue_url, attributes)
                .await
        }
        .await;

        self.observe(result)
    }

    async fn receive_into(&self, queue_url: &str, last: &mut LastReceived) -> QueueResult<()> {
        let messages = self.observe(
            self.service
                .receive_messages(queue_url, &self.receive_options)
                .await,
        )?;
        last.replace(messages);
        Ok(())
    }

    async fn fetch_queue_arn(&self, queue_url: &str) -> QueueResult<String> {
        let mut attributes = self
            .service
            .get_queue_attributes(queue_url, vec![QueueAttributeName::QueueArn])
            .await?;

        attributes
            .remove(&QueueAttributeName::QueueArn)
            .ok_or(QueueError::MissingAttribute("QueueArn"))
    }

    /// Reports a service error to the credential manager before handing it back
    fn observe<T>(&self, result: QueueResult<T>) -> QueueResult<T> {
        if let Err(QueueError::Service(err)) = &result {
            tracing::warn!(
                error = %err,
                operation = %err.operation,
                "Queue operation failed"
            );
            self.credentials.wipe_credentials_on_auth_error(err);
        }
        result
    }
}

impl std::fmt::Debug for QueueFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueFacade")
            .field("receive_options", &self.receive_options)
            .finish_non_exhaustive()
    }
}
