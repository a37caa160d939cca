use serde::Serialize;

use crate::error::{QueueError, QueueResult};

/// Upper bound SQS accepts for `MaxNumberOfMessages`
pub const MAX_MESSAGES_PER_RECEIVE: i32 = 10;

/// A queue returned by a create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedQueue {
    /// Service-assigned queue URL
    pub queue_url: String,
}

/// A message returned by a receive call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceivedMessage {
    /// Message ID
    pub message_id: String,
    /// Receipt handle for deleting the message
    pub receipt_handle: String,
    /// The message body
    pub body: String,
}

/// Confirmation of a sent message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    /// Service-assigned message ID
    pub message_id: String,
    /// MD5 digest of the message body, as computed by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5_of_message_body: Option<String>,
    /// Sequence number, only returned by FIFO queues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
}

/// Parameters for receive calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveOptions {
    /// Maximum number of messages to retrieve (1 to 10)
    pub max_messages: i32,
    /// Visibility timeout for received messages (in seconds)
    pub visibility_timeout: Option<i32>,
    /// Wait time for long polling (in seconds)
    pub wait_time_seconds: Option<i32>,
}

impl Default for ReceiveOptions {
    /// Matches the service defaults: one message, queue visibility timeout, short polling
    fn default() -> Self {
        Self {
            max_messages: 1,
            visibility_timeout: None,
            wait_time_seconds: None,
        }
    }
}

impl ReceiveOptions {
    /// Returns these options with `max_messages` clamped to what the service accepts
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            max_messages: self.max_messages.clamp(1, MAX_MESSAGES_PER_RECEIVE),
            ..self
        }
    }
}

/// The most recent batch of messages returned by a receive call
///
/// Both [`crate::QueueFacade::receive_message_bodies`] and
/// [`crate::QueueFacade::receive_message_ids`] overwrite the same batch, so a
/// body lookup after an id-only receive still returns bodies of that receive.
#[derive(Debug, Clone, Default)]
pub struct LastReceived {
    messages: Option<Vec<ReceivedMessage>>,
}

impl LastReceived {
    /// Creates an empty handle; nothing has been received yet
    #[must_use]
    pub const fn new() -> Self {
        Self { messages: None }
    }

    /// Replaces the cached batch
    pub(crate) fn replace(&mut self, messages: Vec<ReceivedMessage>) {
        self.messages = Some(messages);
    }

    /// Messages of the last receive, empty if nothing was received
    #[must_use]
    pub fn messages(&self) -> &[ReceivedMessage] {
        self.messages.as_deref().unwrap_or_default()
    }

    /// Number of messages in the last receive
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages().len()
    }

    /// Whether the last receive returned no messages (or none happened)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }

    /// Returns the body of the message at `index` in the last receive
    ///
    /// Returns an empty string for any index if nothing has been received yet.
    ///
    /// # Errors
    ///
    /// Returns `QueueError::MessageIndexOutOfRange` if `index` is outside the
    /// last received batch
    pub fn message_body(&self, index: usize) -> QueueResult<&str> {
        match &self.messages {
            None => Ok(""),
            Some(messages) => messages
                .get(index)
                .map(|message| message.body.as_str())
                .ok_or(QueueError::MessageIndexOutOfRange {
                    index,
                    len: messages.len(),
                }),
        }
    }

    /// Returns the receipt handle of the message at `index` in the last receive
    ///
    /// # Errors
    ///
    /// Returns `QueueError::MessageIndexOutOfRange` if `index` is outside the
    /// last received batch, including when nothing has been received
    pub fn receipt_handle(&self, index: usize) -> QueueResult<&str> {
        let messages = self.messages();
        messages
            .get(index)
            .map(|message| message.receipt_handle.as_str())
            .ok_or(QueueError::MessageIndexOutOfRange {
                index,
                len: messages.len(),
            })
    }
}
