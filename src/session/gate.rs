use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const HOME_ROUTE: &str = "/";
pub const SIGN_IN_ROUTE: &str = "/signin";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session store error: {0}")]
    Store(String),

    #[error("Sign-out failed: {0}")]
    SignOut(String),
}

/// An authenticated caller, as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub email: Option<String>,
    pub provider_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// `<email>.<PROVIDER>`, the owner key for trades.
    pub fn trader_identifier(&self) -> String {
        format!(
            "{}.{}",
            self.email.as_deref().unwrap_or_default(),
            self.provider_id
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or_else(|| "UNKNOWN".to_string())
        )
    }
}

/// Access to the external session store
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The caller's session, if any
    async fn get_session(&self) -> Result<Option<Session>, SessionError>;

    /// End the caller's session
    async fn sign_out(&self, session: &Session) -> Result<(), SessionError>;
}

/// Outcome of an access check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access<T> {
    Granted(T),
    Redirect(String),
}

impl<T> Access<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Access<U> {
        match self {
            Access::Granted(value) => Access::Granted(f(value)),
            Access::Redirect(to) => Access::Redirect(to),
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Access::Granted(_) => None,
            Access::Redirect(to) => Some(to),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutePolicy {
    Public,
    Authenticated,
}

/// Browsing and sign-in are open; everything else needs a session.
pub fn route_policy(path: &str) -> RoutePolicy {
    let public = path == HOME_ROUTE
        || path == SIGN_IN_ROUTE
        || path == "/dex"
        || path.starts_with("/dex/")
        || path.starts_with("/api")
        || path.starts_with("/_next")
        || path.ends_with(".png");
    if public {
        RoutePolicy::Public
    } else {
        RoutePolicy::Authenticated
    }
}

pub struct SessionGate<P: SessionProvider + ?Sized> {
    provider: Arc<P>,
}

impl<P: SessionProvider + ?Sized> Clone for SessionGate<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<P: SessionProvider + ?Sized> SessionGate<P> {
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// The current, unexpired session.
    pub async fn get_session(&self) -> Result<Option<Session>, SessionError> {
        let session = self.provider.get_session().await?;
        Ok(session.filter(|s| {
            let expired = s.is_expired(Utc::now());
            if expired {
                log::debug!("Ignoring expired session {}", s.id);
            }
            !expired
        }))
    }

    /// Grants the session, or redirects to `redirect_target` (the sign-in
    /// entry point) when there is none.
    pub async fn require_authenticated(
        &self,
        redirect_target: &str,
    ) -> Result<Access<Session>, SessionError> {
        match self.get_session().await? {
            Some(session) => Ok(Access::Granted(session)),
            None => {
                log::info!("Unauthenticated access, redirecting to {}", redirect_target);
                Ok(Access::Redirect(redirect_target.to_string()))
            }
        }
    }

    /// Applies [`route_policy`] to a request path.
    pub async fn guard_route(
        &self,
        path: &str,
        sign_in_route: &str,
    ) -> Result<Access<Option<Session>>, SessionError> {
        match route_policy(path) {
            RoutePolicy::Public => Ok(Access::Granted(self.get_session().await?)),
            RoutePolicy::Authenticated => Ok(self
                .require_authenticated(sign_in_route)
                .await?
                .map(Some)),
        }
    }

    /// Signs a present session out and heads home; sends anyone else to sign in.
    pub async fn update_auth_status(
        &self,
        session: Option<&Session>,
        sign_in_route: &str,
    ) -> Result<String, SessionError> {
        match session {
            Some(session) => {
                self.provider.sign_out(session).await?;
                log::info!("Signed out session {}", session.id);
                Ok(HOME_ROUTE.to_string())
            }
            None => Ok(sign_in_route.to_string()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_route_policy() {
        for path in ["/", "/signin", "/dex", "/api/auth/callback/github", "/logo.png"] {
            assert_eq!(route_policy(path), RoutePolicy::Public, "{}", path);
        }
        for path in ["/trading", "/trading/create", "/trading/create/confirm", "/profile"] {
            assert_eq!(route_policy(path), RoutePolicy::Authenticated, "{}", path);
        }
    }

    #[tokio::test]
    async fn test_require_authenticated_redirects_without_session() {
        let gate = SessionGate::new(Arc::new(StaticSessionProvider::signed_out()));
        let access = gate.require_authenticated("/signin").await.unwrap();
        assert_eq!(access, Access::Redirect("/signin".to_string()));
    }

    #[tokio::test]
    async fn test_require_authenticated_grants_live_session() {
        let gate = SessionGate::new(Arc::new(StaticSessionProvider::signed_in()));
        let access = gate.require_authenticated("/signin").await.unwrap();
        assert!(matches!(access, Access::Granted(ref s) if s.user_id == "user-1"));
    }

    #[tokio::test]
    async fn test_expired_session_counts_as_absent() {
        let provider = StaticSessionProvider {
            session: std::sync::Mutex::new(Some(session_expiring_in(chrono::Duration::minutes(-5)))),
        };
        let gate = SessionGate::new(Arc::new(provider));
        assert_eq!(gate.get_session().await.unwrap(), None);
        assert!(gate
            .require_authenticated("/signin")
            .await
            .unwrap()
            .redirect_target()
            .is_some());
    }

    #[tokio::test]
    async fn test_guard_route_lets_browsing_through() {
        let gate = SessionGate::new(Arc::new(StaticSessionProvider::signed_out()));
        assert_eq!(
            gate.guard_route("/dex", "/signin").await.unwrap(),
            Access::Granted(None)
        );
        assert_eq!(
            gate.guard_route("/trading/create", "/signin").await.unwrap(),
            Access::Redirect("/signin".to_string())
        );
    }

    #[tokio::test]
    async fn test_update_auth_status() {
        let provider = Arc::new(StaticSessionProvider::signed_in());
        let gate = SessionGate::new(Arc::clone(&provider));

        let session = gate.get_session().await.unwrap().unwrap();
        assert_eq!(gate.update_auth_status(Some(&session), "/signin").await.unwrap(), "/");
        assert_eq!(gate.get_session().await.unwrap(), None);

        assert_eq!(gate.update_auth_status(None, "/signin").await.unwrap(), "/signin");
    }

    #[test]
    fn test_trader_identifier() {
        let session = session_expiring_in(chrono::Duration::hours(1));
        assert_eq!(session.trader_identifier(), "ash@example.com.GITHUB");
    }
}
