//! Credential handling for queue clients
//!
//! The facade reports every service error to a [`CredentialManager`]. The
//! manager decides whether the error means the credentials are no longer
//! usable and wipes them so the next request acquires fresh ones.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use aws_credential_types::provider::{self, future, ProvideCredentials, SharedCredentialsProvider};
use aws_credential_types::Credentials;

use crate::error::ServiceError;

/// Holds and invalidates the credentials used by a queue client
pub trait CredentialManager: Send + Sync {
    /// Called with every service error a queue operation produced. Wipes the
    /// held credentials if the error is an authorization failure.
    fn wipe_credentials_on_auth_error(&self, error: &ServiceError);
}

/// Credentials provider that caches what an upstream provider resolves and
/// drops the cache on authorization failures
///
/// Cloning shares the cache, so one clone can be installed as the SDK
/// credentials provider while another is handed to the facade.
#[derive(Debug, Clone)]
pub struct CachedCredentials {
    source: SharedCredentialsProvider,
    cached: Arc<RwLock<Option<Credentials>>>,
}

impl CachedCredentials {
    /// Creates a cache in front of `source`; nothing is resolved until first use
    #[must_use]
    pub fn new(source: SharedCredentialsProvider) -> Self {
        Self {
            source,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    /// Whether unexpired credentials are currently held
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.current().is_some()
    }

    /// Drops the held credentials unconditionally
    pub fn invalidate(&self) {
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn current(&self) -> Option<Credentials> {
        let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
        cached
            .as_ref()
            .filter(|credentials| !is_expired(credentials))
            .cloned()
    }

    async fn resolve(&self) -> provider::Result {
        if let Some(credentials) = self.current() {
            return Ok(credentials);
        }

        tracing::debug!("Resolving queue credentials from upstream provider");
        let credentials = self.source.provide_credentials().await?;
        *self.cached.write().unwrap_or_else(PoisonError::into_inner) = Some(credentials.clone());

        Ok(credentials)
    }
}

fn is_expired(credentials: &Credentials) -> bool {
    credentials
        .expiry()
        .is_some_and(|expiry| expiry <= SystemTime::now())
}

impl ProvideCredentials for CachedCredentials {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::new(self.resolve())
    }
}

impl CredentialManager for CachedCredentials {
    fn wipe_credentials_on_auth_error(&self, error: &ServiceError) {
        if error.is_auth_error() {
            tracing::warn!(
                error = %error,
                operation = %error.operation,
                "Wiping queue credentials after authorization failure"
            );
            self.invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Operation;
    use crate::mock::CountingCredentialsProvider;
    use std::time::Duration;

    fn cached_credentials(
        provider: CountingCredentialsProvider,
    ) -> (CachedCredentials, CountingCredentialsProvider) {
        (
            CachedCredentials::new(SharedCredentialsProvider::new(provider.clone())),
            provider,
        )
    }

    #[tokio::test]
    async fn test_resolves_once_and_serves_from_cache() {
        let (credentials, provider) = cached_credentials(CountingCredentialsProvider::new());
        assert!(!credentials.is_cached());

        let first = credentials.provide_credentials().await.unwrap();
        let second = credentials.provide_credentials().await.unwrap();

        assert_eq!(first.access_key_id(), "AKID0");
        assert_eq!(second.access_key_id(), "AKID0");
        assert_eq!(provider.calls(), 1);
        assert!(credentials.is_cached());
    }

    #[tokio::test]
    async fn test_auth_error_wipes_credentials() {
        let (credentials, provider) = cached_credentials(CountingCredentialsProvider::new());
        credentials.provide_credentials().await.unwrap();

        let error = ServiceError::new(Operation::SendMessage, Some("ExpiredToken"), "expired");
        credentials.wipe_credentials_on_auth_error(&error);
        assert!(!credentials.is_cached());

        let refreshed = credentials.provide_credentials().await.unwrap();
        assert_eq!(refreshed.access_key_id(), "AKID1");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_non_auth_error_keeps_credentials() {
        let (credentials, provider) = cached_credentials(CountingCredentialsProvider::new());
        credentials.provide_credentials().await.unwrap();

        let error = ServiceError::new(
            Operation::CreateQueue,
            Some("QueueDeletedRecently"),
            "wait 60 seconds",
        )
        .with_status(400);
        credentials.wipe_credentials_on_auth_error(&error);

        assert!(credentials.is_cached());
        credentials.provide_credentials().await.unwrap();
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_expired_credentials_are_resolved_again() {
        let expired = SystemTime::now() - Duration::from_secs(60);
        let (credentials, provider) =
            cached_credentials(CountingCredentialsProvider::expiring_at(expired));

        credentials.provide_credentials().await.unwrap();
        credentials.provide_credentials().await.unwrap();

        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_the_cache() {
        let (credentials, _provider) = cached_credentials(CountingCredentialsProvider::new());
        let installed = credentials.clone();
        installed.provide_credentials().await.unwrap();
        assert!(credentials.is_cached());

        credentials.invalidate();
        assert!(!installed.is_cached());
    }
}
