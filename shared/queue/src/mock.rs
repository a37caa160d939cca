//! In-memory queue service, credential manager and credentials provider for tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use aws_credential_types::provider::{future, ProvideCredentials};
use aws_credential_types::Credentials;
use aws_sdk_sqs::types::QueueAttributeName;

use crate::client::QueueService;
use crate::credentials::CredentialManager;
use crate::error::{Operation, QueueResult, ServiceError};
use crate::types::{ReceiveOptions, ReceivedMessage, SendReceipt};

/// Base URL for queues created by the mock, matching `LocalStack`
pub const MOCK_QUEUE_URL_PREFIX: &str = "http://localhost:4566/000000000000/";

/// ARN prefix for queues created by the mock
pub const MOCK_QUEUE_ARN_PREFIX: &str = "arn:aws:sqs:us-east-1:000000000000:";

/// A call received by [`MockQueueService`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    /// `create_queue`
    CreateQueue {
        /// Requested queue name
        queue_name: String,
    },
    /// `list_queues`
    ListQueues,
    /// `receive_messages`
    ReceiveMessages {
        /// Queue URL
        queue_url: String,
        /// Requested maximum number of messages
        max_messages: i32,
    },
    /// `send_message`
    SendMessage {
        /// Queue URL
        queue_url: String,
        /// Message body
        body: String,
    },
    /// `delete_message`
    DeleteMessage {
        /// Queue URL
        queue_url: String,
        /// Receipt handle
        receipt_handle: String,
    },
    /// `get_queue_attributes`
    GetQueueAttributes {
        /// Queue URL
        queue_url: String,
    },
    /// `set_queue_attributes`
    SetQueueAttributes {
        /// Queue URL
        queue_url: String,
    },
}

#[derive(Debug, Default)]
struct MockQueue {
    name: String,
    visible: VecDeque<ReceivedMessage>,
    attributes: HashMap<QueueAttributeName, String>,
}

#[derive(Debug, Default)]
struct MockState {
    queues: HashMap<String, MockQueue>,
    in_flight: HashMap<String, String>,
    calls: Vec<MockCall>,
    failures: HashMap<Operation, ServiceError>,
    next_message: usize,
}

impl MockState {
    fn take_failure(&mut self, operation: Operation) -> QueueResult<()> {
        match self.failures.remove(&operation) {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }

    fn queue_mut(&mut self, operation: Operation, queue_url: &str) -> QueueResult<&mut MockQueue> {
        self.queues.get_mut(queue_url).ok_or_else(|| {
            ServiceError::new(
                operation,
                Some("AWS.SimpleQueueService.NonExistentQueue"),
                "The specified queue does not exist.",
            )
            .with_status(400)
            .into()
        })
    }
}

/// In-memory queue service that records every call it receives
#[derive(Debug, Default)]
pub struct MockQueueService {
    state: Mutex<MockState>,
}

impl MockQueueService {
    /// Creates an empty mock service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes the next call of `operation` fail with `error`
    pub fn fail_next(&self, operation: Operation, error: ServiceError) {
        self.state().failures.insert(operation, error);
    }

    /// Calls received so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Number of messages visible in the queue at `queue_url`
    #[must_use]
    pub fn visible_messages(&self, queue_url: &str) -> usize {
        self.state()
            .queues
            .get(queue_url)
            .map_or(0, |queue| queue.visible.len())
    }

    /// Current value of a queue attribute
    #[must_use]
    pub fn attribute(&self, queue_url: &str, name: &QueueAttributeName) -> Option<String> {
        self.state()
            .queues
            .get(queue_url)
            .and_then(|queue| queue.attributes.get(name).cloned())
    }
}

#[async_trait::async_trait]
impl QueueService for MockQueueService {
    async fn create_queue(&self, queue_name: &str) -> QueueResult<String> {
        let mut state = self.state();
        state.calls.push(MockCall::CreateQueue {
            queue_name: queue_name.to_string(),
        });
        state.take_failure(Operation::CreateQueue)?;

        let queue_url = format!("{MOCK_QUEUE_URL_PREFIX}{queue_name}");
        state
            .queues
            .entry(queue_url.clone())
            .or_insert_with(|| MockQueue {
                name: queue_name.to_string(),
                ..MockQueue::default()
            });

        Ok(queue_url)
    }

    async fn list_queues(&self) -> QueueResult<Vec<String>> {
        let mut state = self.state();
        state.calls.push(MockCall::ListQueues);
        state.take_failure(Operation::ListQueues)?;

        let mut urls: Vec<String> = state.queues.keys().cloned().collect();
        urls.sort();
        Ok(urls)
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        options: &ReceiveOptions,
    ) -> QueueResult<Vec<ReceivedMessage>> {
        let options = options.clamped();
        let mut state = self.state();
        state.calls.push(MockCall::ReceiveMessages {
            queue_url: queue_url.to_string(),
            max_messages: options.max_messages,
        });
        state.take_failure(Operation::ReceiveMessage)?;

        let queue = state.queue_mut(Operation::ReceiveMessage, queue_url)?;
        let count = usize::try_from(options.max_messages)
            .unwrap_or(1)
            .min(queue.visible.len());
        let received: Vec<ReceivedMessage> = queue.visible.drain(..count).collect();

        for message in &received {
            state
                .in_flight
                .insert(message.receipt_handle.clone(), queue_url.to_string());
        }

        Ok(received)
    }

    async fn send_message(&self, queue_url: &str, body: &str) -> QueueResult<SendReceipt> {
        let mut state = self.state();
        state.calls.push(MockCall::SendMessage {
            queue_url: queue_url.to_string(),
            body: body.to_string(),
        });
        state.take_failure(Operation::SendMessage)?;

        let n = state.next_message;
        state.next_message += 1;

        let message = ReceivedMessage {
            message_id: format!("message-{n}"),
            receipt_handle: format!("receipt-{n}"),
            body: body.to_string(),
        };
        let message_id = message.message_id.clone();
        state
            .queue_mut(Operation::SendMessage, queue_url)?
            .visible
            .push_back(message);

        Ok(SendReceipt {
            message_id,
            md5_of_message_body: None,
            sequence_number: None,
        })
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> QueueResult<()> {
        let mut state = self.state();
        state.calls.push(MockCall::DeleteMessage {
            queue_url: queue_url.to_string(),
            receipt_handle: receipt_handle.to_string(),
        });
        state.take_failure(Operation::DeleteMessage)?;
        state.queue_mut(Operation::DeleteMessage, queue_url)?;

        let in_flight_here = state
            .in_flight
            .get(receipt_handle)
            .is_some_and(|owner| owner == queue_url);
        if !in_flight_here {
            return Err(ServiceError::new(
                Operation::DeleteMessage,
                Some("ReceiptHandleIsInvalid"),
                format!("The input receipt handle \"{receipt_handle}\" is not valid."),
            )
            .with_status(400)
            .into());
        }

        state.in_flight.remove(receipt_handle);
        Ok(())
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
        names: Vec<QueueAttributeName>,
    ) -> QueueResult<HashMap<QueueAttributeName, String>> {
        let mut state = self.state();
        state.calls.push(MockCall::GetQueueAttributes {
            queue_url: queue_url.to_string(),
        });
        state.take_failure(Operation::GetQueueAttributes)?;

        let queue = state.queue_mut(Operation::GetQueueAttributes, queue_url)?;
        let mut attributes = HashMap::new();
        for name in names {
            let value = match &name {
                QueueAttributeName::QueueArn => Some(format!("{MOCK_QUEUE_ARN_PREFIX}{}", queue.name)),
                other => queue.attributes.get(other).cloned(),
            };
            if let Some(value) = value {
                attributes.insert(name, value);
            }
        }

        Ok(attributes)
    }

    async fn set_queue_attributes(
        &self,
        queue_url: &str,
        attributes: HashMap<QueueAttributeName, String>,
    ) -> QueueResult<()> {
        let mut state = self.state();
        state.calls.push(MockCall::SetQueueAttributes {
            queue_url: queue_url.to_string(),
        });
        state.take_failure(Operation::SetQueueAttributes)?;

        state
            .queue_mut(Operation::SetQueueAttributes, queue_url)?
            .attributes
            .extend(attributes);

        Ok(())
    }
}

/// Credential manager that records every error reported to it
#[derive(Debug, Default)]
pub struct RecordingCredentialManager {
    reported: Mutex<Vec<ServiceError>>,
}

impl RecordingCredentialManager {
    /// Creates a manager with nothing recorded
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors reported so far, in order
    #[must_use]
    pub fn reported(&self) -> Vec<ServiceError> {
        self.reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CredentialManager for RecordingCredentialManager {
    fn wipe_credentials_on_auth_error(&self, error: &ServiceError) {
        self.reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.clone());
    }
}

/// Credentials provider that counts resolutions and hands out `AKID0`,
/// `AKID1`, ... as access key ids
///
/// Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct CountingCredentialsProvider {
    calls: Arc<AtomicUsize>,
    expires_after: Option<SystemTime>,
}

impl CountingCredentialsProvider {
    /// Creates a provider whose credentials never expire
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider whose credentials expire at `expiry`
    #[must_use]
    pub fn expiring_at(expiry: SystemTime) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            expires_after: Some(expiry),
        }
    }

    /// Number of times credentials were resolved
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProvideCredentials for CountingCredentialsProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        future::ProvideCredentials::ready(Ok(Credentials::new(
            format!("AKID{n}"),
            "secret",
            None,
            self.expires_after,
            "counting",
        )))
    }
}
