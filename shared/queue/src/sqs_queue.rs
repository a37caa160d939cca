//! SQS implementation of the queue service
//!
//! Wraps a pre-configured `aws_sdk_sqs::Client`. The client is expected to be
//! safe to reuse across calls and is shared through an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use aws_config::SdkConfig;
use aws_sdk_sqs::config::IdentityCache;
use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sqs::Client as SqsClient;

use crate::client::QueueService;
use crate::credentials::CachedCredentials;
use crate::error::{Operation, QueueError, QueueResult, ServiceError};
use crate::types::{ReceiveOptions, ReceivedMessage, SendReceipt};

/// Largest page `ListQueues` accepts; the service only returns a `NextToken`
/// when `MaxResults` is set
const LIST_QUEUES_PAGE_SIZE: i32 = 1000;

/// Queue service backed by AWS SQS
#[derive(Debug, Clone)]
pub struct SqsQueueService {
    sqs_client: Arc<SqsClient>,
}

impl SqsQueueService {
    /// Creates a new SQS queue service
    ///
    /// # Arguments
    ///
    /// * `sqs_client` - Pre-configured SQS client
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>) -> Self {
        Self { sqs_client }
    }

    /// Creates an SQS queue service whose requests sign with `credentials`
    ///
    /// The SDK identity cache is disabled so every request asks `credentials`
    /// again, and a wipe after an auth error takes effect on the next call.
    #[must_use]
    pub fn from_sdk_config(sdk_config: &SdkConfig, credentials: CachedCredentials) -> Self {
        let sqs_config = aws_sdk_sqs::config::Builder::from(sdk_config)
            .credentials_provider(credentials)
            .identity_cache(IdentityCache::no_cache())
            .build();

        Self::new(Arc::new(SqsClient::from_conf(sqs_config)))
    }
}

#[async_trait::async_trait]
impl QueueService for SqsQueueService {
    async fn create_queue(&self, queue_name: &str) -> QueueResult<String> {
        let result = self
            .sqs_client
            .create_queue()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|e| ServiceError::from_sdk(Operation::CreateQueue, &e))?;

        result
            .queue_url()
            .map(ToString::to_string)
            .ok_or(QueueError::MissingField("QueueUrl"))
    }

    async fn list_queues(&self) -> QueueResult<Vec<String>> {
        let mut queue_urls = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .sqs_client
                .list_queues()
                .max_results(LIST_QUEUES_PAGE_SIZE)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| ServiceError::from_sdk(Operation::ListQueues, &e))?;

            queue_urls.extend(output.queue_urls().iter().cloned());

            match output.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(queue_urls)
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        options: &ReceiveOptions,
    ) -> QueueResult<Vec<ReceivedMessage>> {
        let options = options.clamped();
        let result = self
            .sqs_client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(options.max_messages)
            .set_visibility_timeout(options.visibility_timeout)
            .set_wait_time_seconds(options.wait_time_seconds)
            .send()
            .await
            .map_err(|e| ServiceError::from_sdk(Operation::ReceiveMessage, &e))?;

        let messages = result
            .messages()
            .iter()
            .map(|msg| {
                let message_id = msg
                    .message_id()
                    .ok_or(QueueError::MissingField("MessageId"))?;

                Ok(ReceivedMessage {
                    message_id: message_id.to_string(),
                    receipt_handle: msg.receipt_handle().unwrap_or_default().to_string(),
                    body: msg.body().unwrap_or_default().to_string(),
                })
            })
            .collect::<QueueResult<Vec<_>>>()?;

        tracing::debug!("Received {} messages from {}", messages.len(), queue_url);

        Ok(messages)
    }

    async fn send_message(&self, queue_url: &str, body: &str) -> QueueResult<SendReceipt> {
        let result = self
            .sqs_client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| ServiceError::from_sdk(Operation::SendMessage, &e))?;

        Ok(SendReceipt {
            message_id: result
                .message_id()
                .map(ToString::to_string)
                .ok_or(QueueError::MissingField("MessageId"))?,
            md5_of_message_body: result.md5_of_message_body().map(ToString::to_string),
            sequence_number: result.sequence_number().map(ToString::to_string),
        })
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> QueueResult<()> {
        self.sqs_client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|e| ServiceError::from_sdk(Operation::DeleteMessage, &e))?;

        Ok(())
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
        names: Vec<QueueAttributeName>,
    ) -> QueueResult<HashMap<QueueAttributeName, String>> {
        let result = self
            .sqs_client
            .get_queue_attributes()
            .queue_url(queue_url)
            .set_attribute_names(Some(names))
            .send()
            .await
            .map_err(|e| ServiceError::from_sdk(Operation::GetQueueAttributes, &e))?;

        Ok(result.attributes().cloned().unwrap_or_default())
    }

    async fn set_queue_attributes(
        &self,
        queue_url: &str,
        attributes: HashMap<QueueAttributeName, String>,
    ) -> QueueResult<()> {
        self.sqs_client
            .set_queue_attributes()
            .queue_url(queue_url)
            .set_attributes(Some(attributes))
            .send()
            .await
            .map_err(|e| ServiceError::from_sdk(Operation::SetQueueAttributes, &e))?;

        Ok(())
    }
}
