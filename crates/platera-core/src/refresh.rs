//! Single-flight access token refresh.
//!
//! Requests that hit a 401 queue on one async mutex. The first waiter calls
//! the refresh endpoint; every later waiter compares the token it was sent
//! with against the stored one and, if a refresh already replaced it, replays
//! with the new token without calling the endpoint again. After a failed
//! refresh the store is empty, so later waiters fail without a network call.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use platera_types::RefreshResponse;
use tokio::sync::Mutex as AsyncMutex;

use crate::error::{ApiError, ApiResult};
use crate::store::{self, TokenStore, keys};

/// Interceptor state, observable for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    /// Requests flow normally.
    #[default]
    Normal,
    /// A refresh call is in flight; 401'd requests are parked.
    Refreshing,
    /// The last refresh failed and the session was cleared.
    Failed,
}

/// Failed refresh attempt.
#[derive(Debug)]
pub struct RefreshFailure {
    pub error: ApiError,
    /// True when this attempt moved the interceptor into `Failed`.
    pub ended_session: bool,
}

#[derive(Debug, Default)]
pub struct RefreshGate {
    in_flight: AsyncMutex<()>,
    state: Mutex<RefreshState>,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RefreshState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: RefreshState) -> RefreshState {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *state, next)
    }

    /// Returns to `Normal` (after a fresh login).
    pub fn reset(&self) {
        self.set_state(RefreshState::Normal);
    }

    /// Obtains an access token to replay a request that was rejected while
    /// carrying `sent_with`.
    ///
    /// `call` performs the refresh request given the stored refresh token.
    pub async fn refresh<F, Fut>(
        &self,
        store: &dyn TokenStore,
        sent_with: Option<&str>,
        call: F,
    ) -> Result<String, RefreshFailure>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = ApiResult<RefreshResponse>>,
    {
        let _in_flight = self.in_flight.lock().await;

        if let Some(current) = store::access_token(store)
            && sent_with != Some(current.as_str())
        {
            tracing::debug!("access token already refreshed by a concurrent request");
            return Ok(current);
        }

        let Some(refresh_token) = store::refresh_token(store) else {
            return Err(self.fail(
                store,
                ApiError::session_expired("Session expired: no refresh token available"),
            ));
        };

        self.set_state(RefreshState::Refreshing);
        tracing::info!("refreshing access token");

        match call(refresh_token).await {
            Ok(tokens) if !tokens.access.is_empty() => {
                store.set(keys::ACCESS_TOKEN, &tokens.access);
                if let Some(rotated) = tokens.refresh.as_deref().filter(|r| !r.is_empty()) {
                    store.set(keys::REFRESH_TOKEN, rotated);
                }
                self.set_state(RefreshState::Normal);
                Ok(tokens.access)
            }
            Ok(_) => Err(self.fail(
                store,
                ApiError::session_expired("Session expired: refresh returned no access token"),
            )),
            Err(err) => {
                tracing::warn!(error = %err, kind = %err.kind, "token refresh failed");
                let mut expired = ApiError::session_expired(format!("Session expired: {err}"));
                expired.payload = err.payload;
                Err(self.fail(store, expired))
            }
        }
    }

    fn fail(&self, store: &dyn TokenStore, error: ApiError) -> RefreshFailure {
        store.clear_session();
        let previous = self.set_state(RefreshState::Failed);
        RefreshFailure {
            error,
            ended_session: previous != RefreshState::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::ApiErrorKind;
    use crate::store::MemoryStore;

    fn tokens(access: &str, refresh: Option<&str>) -> RefreshResponse {
        RefreshResponse {
            access: access.to_string(),
            refresh: refresh.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_successful_refresh_stores_new_token() {
        let store = MemoryStore::new();
        store::store_tokens(&store, "old", "r1");
        let gate = RefreshGate::new();

        let token = gate
            .refresh(&store, Some("old"), |refresh| async move {
                assert_eq!(refresh, "r1");
                Ok(tokens("new", None))
            })
            .await
            .unwrap();

        assert_eq!(token, "new");
        assert_eq!(store::access_token(&store).as_deref(), Some("new"));
        assert_eq!(store::refresh_token(&store).as_deref(), Some("r1"));
        assert_eq!(gate.state(), RefreshState::Normal);
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_is_stored() {
        let store = MemoryStore::new();
        store::store_tokens(&store, "old", "r1");
        let gate = RefreshGate::new();

        gate.refresh(&store, Some("old"), |_| async {
            Ok(tokens("new", Some("r2")))
        })
        .await
        .unwrap();

        assert_eq!(store::refresh_token(&store).as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_failure_clears_session() {
        let store = MemoryStore::new();
        store::store_tokens(&store, "old", "r1");
        store.set(keys::USER, r#"{"id":1}"#);
        let gate = RefreshGate::new();

        let failure = gate
            .refresh(&store, Some("old"), |_| async {
                Err(ApiError::from_status(401, r#"{"detail":"Token is invalid or expired"}"#))
            })
            .await
            .unwrap_err();

        assert_eq!(failure.error.kind, ApiErrorKind::SessionExpired);
        assert!(failure.ended_session);
        assert!(store.is_empty());
        assert_eq!(gate.state(), RefreshState::Failed);
    }

    #[tokio::test]
    async fn test_network_failure_is_treated_as_rejection() {
        let store = MemoryStore::new();
        store::store_tokens(&store, "old", "r1");
        let gate = RefreshGate::new();

        let failure = gate
            .refresh(&store, Some("old"), |_| async {
                Err(ApiError::new(ApiErrorKind::Network, "connection refused"))
            })
            .await
            .unwrap_err();

        assert_eq!(failure.error.kind, ApiErrorKind::SessionExpired);
        assert!(failure.ended_session);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_refresh_token_fails_without_call() {
        let store = MemoryStore::new();
        store.set(keys::ACCESS_TOKEN, "old");
        let gate = RefreshGate::new();
        let calls = AtomicUsize::new(0);

        let failure = gate
            .refresh(&store, Some("old"), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(tokens("never", None)) }
            })
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(failure.ended_session);
        assert!(store::access_token(&store).is_none());
    }

    #[tokio::test]
    async fn test_stale_waiter_reuses_new_token() {
        let store = MemoryStore::new();
        store::store_tokens(&store, "already-new", "r1");
        let gate = RefreshGate::new();
        let calls = AtomicUsize::new(0);

        let token = gate
            .refresh(&store, Some("old"), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(tokens("other", None)) }
            })
            .await
            .unwrap();

        assert_eq!(token, "already-new");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_waiters_share_one_refresh() {
        let store = Arc::new(MemoryStore::new());
        store::store_tokens(store.as_ref(), "old", "r1");
        let gate = Arc::new(RefreshGate::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let gate = Arc::clone(&gate);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                gate.refresh(store.as_ref(), Some("old"), |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async {
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        Ok(tokens("new", None))
                    }
                })
                .await
                .map_err(|f| f.error)
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), "new");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_failure_does_not_end_session_again() {
        let store = MemoryStore::new();
        let gate = RefreshGate::new();

        let first = gate
            .refresh(&store, Some("old"), |_| async { Ok(tokens("x", None)) })
            .await
            .unwrap_err();
        let second = gate
            .refresh(&store, Some("old"), |_| async { Ok(tokens("x", None)) })
            .await
            .unwrap_err();

        assert!(first.ended_session);
        assert!(!second.ended_session);

        gate.reset();
        assert_eq!(gate.state(), RefreshState::Normal);
    }
}
