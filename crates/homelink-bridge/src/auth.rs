//! Authentication context for command dispatch.
//!
//! Writes to remote units require an authenticated session. Instead of a
//! process-wide session singleton, handlers receive an explicit
//! [`AuthContext`] and log in on demand before a command is invoked. The
//! authentication flow itself lives behind the [`Session`] trait.

use std::sync::Arc;

use async_trait::async_trait;

use homelink_model::RegistryError;

/// A session against the remote middleware.
#[async_trait]
pub trait Session: Send + Sync {
    /// Whether the session currently holds valid credentials.
    fn is_authenticated(&self) -> bool;

    /// Establish the session.
    async fn login(&self) -> Result<(), RegistryError>;
}

/// No-op session for deployments without authentication.
#[derive(Debug, Default)]
pub struct AnonymousSession;

#[async_trait]
impl Session for AnonymousSession {
    fn is_authenticated(&self) -> bool {
        true
    }

    async fn login(&self) -> Result<(), RegistryError> {
        Ok(())
    }
}

/// Credential context handed to each unit handler.
#[derive(Clone)]
pub struct AuthContext {
    session: Arc<dyn Session>,
}

impl AuthContext {
    /// Wrap a session.
    pub fn new(session: Arc<dyn Session>) -> Self {
        Self { session }
    }

    /// Context that never authenticates.
    pub fn anonymous() -> Self {
        Self::new(Arc::new(AnonymousSession))
    }

    /// Log in if the session is not authenticated yet.
    pub async fn ensure_login(&self) -> Result<(), RegistryError> {
        if self.session.is_authenticated() {
            return Ok(());
        }
        self.session.login().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSession {
        logins: AtomicUsize,
    }

    #[async_trait]
    impl Session for CountingSession {
        fn is_authenticated(&self) -> bool {
            self.logins.load(Ordering::SeqCst) > 0
        }

        async fn login(&self) -> Result<(), RegistryError> {
            self.logins.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_login_on_demand_happens_once() {
        let session = Arc::new(CountingSession {
            logins: AtomicUsize::new(0),
        });
        let auth = AuthContext::new(session.clone());

        auth.ensure_login().await.unwrap();
        auth.ensure_login().await.unwrap();

        assert_eq!(session.logins.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_anonymous_session_never_fails() {
        let auth = AuthContext::anonymous();
        assert!(auth.ensure_login().await.is_ok());
    }
}
