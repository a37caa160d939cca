//! Environment configuration for different deployment stages

use std::env;
use std::time::Duration;

use anyhow::Context;
use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use queue_facade::{CachedCredentials, ReceiveOptions, SqsQueueService};

/// Application environment configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Log filter used when `RUST_LOG` is not set
    #[must_use]
    pub const fn default_log_filter(&self) -> &'static str {
        match self {
            Self::Production | Self::Staging => "info",
            Self::Development => "debug",
        }
    }

    /// Returns the endpoint URL to use for SQS, honouring `SQS_ENDPOINT_URL`
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<String> {
        if let Ok(endpoint) = env::var("SQS_ENDPOINT_URL") {
            return Some(endpoint);
        }

        match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some("http://localhost:4566".to_string()),
        }
    }

    /// Receive options with environment variable overrides
    #[must_use]
    pub fn receive_options(&self) -> ReceiveOptions {
        let defaults = ReceiveOptions::default();

        ReceiveOptions {
            max_messages: parse_env("SQS_MAX_MESSAGES").unwrap_or(defaults.max_messages),
            visibility_timeout: parse_env("SQS_VISIBILITY_TIMEOUT_SECS"),
            wait_time_seconds: parse_env("SQS_WAIT_TIME_SECS"),
        }
        .clamped()
    }

    /// AWS configuration with retry and timeout settings
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let retry_config = RetryConfig::standard()
            .with_max_attempts(3)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(retry_config)
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// SQS queue service whose credentials can be wiped after an authorization failure
    ///
    /// # Errors
    ///
    /// Returns an error if no credentials provider could be configured
    pub async fn queue_service(&self) -> anyhow::Result<(SqsQueueService, CachedCredentials)> {
        let aws_config = self.aws_config().await;
        let source = aws_config
            .credentials_provider()
            .context("No AWS credentials provider configured")?;
        let credentials = CachedCredentials::new(source);

        Ok((
            SqsQueueService::from_sdk_config(&aws_config, credentials.clone()),
            credentials,
        ))
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|val| val.trim().parse().ok())
}
