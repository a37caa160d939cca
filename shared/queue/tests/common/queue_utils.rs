//! Queue test setup utilities

#![allow(dead_code)]

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_sqs::Client as SqsClient;
use queue_facade::mock::RecordingCredentialManager;
use queue_facade::{CachedCredentials, QueueFacade, ReceiveOptions, SqsQueueService};
use uuid::Uuid;

/// `LocalStack` edge endpoint
pub const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Test context that provides an SQS-backed facade and a unique queue name
pub struct QueueTestContext {
    pub sqs_client: Arc<SqsClient>,
    pub facade: QueueFacade,
    pub credentials: Arc<RecordingCredentialManager>,
    pub queue_name: String,
    queue_url: Option<String>,
}

impl QueueTestContext {
    /// Creates a new test context; the queue itself is created by the test
    pub async fn new(test_name: &str) -> Self {
        let queue_name = format!("{}-{}", test_name, Uuid::new_v4());

        // Setup LocalStack client with hardcoded credentials for CI
        let static_credentials = Credentials::from_keys(
            "test", // AWS_ACCESS_KEY_ID
            "test", // AWS_SECRET_ACCESS_KEY
            None,   // no session token
        );
        let cached = CachedCredentials::new(SharedCredentialsProvider::new(static_credentials));

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(LOCALSTACK_ENDPOINT)
            .region(aws_config::Region::new("us-east-1"))
            .credentials_provider(cached)
            .load()
            .await;

        let sqs_client = Arc::new(SqsClient::new(&config));
        let credentials = Arc::new(RecordingCredentialManager::new());
        let facade = QueueFacade::new(
            Arc::new(SqsQueueService::new(sqs_client.clone())),
            credentials.clone(),
        )
        .with_receive_options(ReceiveOptions {
            max_messages: 10,
            visibility_timeout: Some(60),
            wait_time_seconds: Some(0), // No wait for tests
        });

        Self {
            sqs_client,
            facade,
            credentials,
            queue_name,
            queue_url: None,
        }
    }

    /// Creates the test queue and remembers it for cleanup
    pub async fn create_queue(&mut self) -> String {
        let created = self
            .facade
            .create_queue(&self.queue_name)
            .await
            .expect("Failed to create test queue");
        self.queue_url = Some(created.queue_url.clone());
        created.queue_url
    }
}

impl Drop for QueueTestContext {
    fn drop(&mut self) {
        // Clean up the queue
        let Some(queue_url) = self.queue_url.take() else {
            return;
        };
        let client = self.sqs_client.clone();

        // Use tokio runtime to delete queue
        let handle = tokio::runtime::Handle::try_current();
        if let Ok(handle) = handle {
            handle.spawn(async move {
                let _ = client.delete_queue().queue_url(&queue_url).send().await;
            });
        }
    }
}
