//! The signed-in user, as seen by the rest of the application.
//!
//! A [`Session`] is created once at start-up around an [`ApiClient`] and
//! lives until shutdown. It owns the in-memory profile and the loading flag;
//! tokens stay in the client's [`TokenStore`](crate::store::TokenStore).

use std::sync::{Mutex, MutexGuard, PoisonError};

use platera_types::{Role, UserProfile};
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::http::{ApiClient, SessionEvent};
use crate::store;

/// Snapshot of the session for guards and views.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<UserProfile>,
    /// True until the first [`Session::hydrate`] (or login) completes
    pub loading: bool,
    /// An access token is stored and a profile is loaded
    pub is_authenticated: bool,
    pub role: Role,
    pub is_manager: bool,
    pub is_admin: bool,
}

impl AuthState {
    fn new(user: Option<UserProfile>, loading: bool, has_token: bool) -> Self {
        let role = user.as_ref().map(|u| u.role).unwrap_or_default();
        Self {
            is_authenticated: has_token && user.is_some(),
            is_manager: role.is_manager(),
            is_admin: role.is_admin(),
            role,
            loading,
            user,
        }
    }
}

struct Inner {
    user: Option<UserProfile>,
    loading: bool,
    events: broadcast::Receiver<SessionEvent>,
}

pub struct Session {
    client: ApiClient,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Starts in the loading state; call [`Session::hydrate`] next.
    pub fn new(client: ApiClient) -> Self {
        let events = client.subscribe();
        Self {
            client,
            inner: Mutex::new(Inner {
                user: None,
                loading: true,
                events,
            }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let lagged = drain_events(&mut inner);
        // A missed Expired or LoggedOut still leaves the store without a token.
        if lagged && store::access_token(self.client.store()).is_none() {
            inner.user = None;
        }
        inner
    }

    /// Current snapshot.
    pub fn state(&self) -> AuthState {
        let inner = self.lock();
        let has_token = store::access_token(self.client.store()).is_some();
        AuthState::new(inner.user.clone(), inner.loading, has_token)
    }

    /// Restores the session from storage and revalidates it with the server.
    ///
    /// A cached profile is used immediately. If the server cannot confirm the
    /// session, a cached profile is kept; without one the stored credentials
    /// are cleared.
    pub async fn hydrate(&self) -> AuthState {
        if store::access_token(self.client.store()).is_none() {
            let mut inner = self.lock();
            inner.user = None;
            inner.loading = false;
            drop(inner);
            return self.state();
        }

        let cached = store::cached_user(self.client.store());
        self.lock().user.clone_from(&cached);

        match self.client.auth().current_user().await {
            Ok(profile) => {
                store::store_user(self.client.store(), &profile);
                tracing::debug!(user = %profile.username, role = %profile.role, "session revalidated");
                self.lock().user = Some(profile);
            }
            Err(err) if cached.is_some() => {
                tracing::warn!(error = %err, "could not refresh user profile, using cached copy");
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load user, clearing stored credentials");
                self.client.store().clear_session();
                self.lock().user = None;
            }
        }

        self.lock().loading = false;
        self.state()
    }

    /// Records a freshly signed-in profile. Tokens must already be stored.
    pub fn login(&self, profile: UserProfile) -> AuthState {
        store::store_user(self.client.store(), &profile);
        tracing::info!(user = %profile.username, role = %profile.role, "signed in");
        {
            let mut inner = self.lock();
            inner.user = Some(profile);
            inner.loading = false;
        }
        self.state()
    }

    /// Clears every stored session key and the in-memory profile.
    pub fn logout(&self) {
        self.client.end_session();
        let mut inner = self.lock();
        inner.user = None;
        inner.loading = false;
        tracing::info!("signed out");
    }
}

/// Applies pending events; returns whether any were dropped.
fn drain_events(inner: &mut Inner) -> bool {
    let mut lagged = false;
    loop {
        match inner.events.try_recv() {
            Ok(SessionEvent::Expired | SessionEvent::LoggedOut) => inner.user = None,
            Ok(SessionEvent::LoggedIn) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "session event receiver lagged");
                lagged = true;
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return lagged,
        }
    }
}
