//! Per-visitor auth sessions for the PocketBase client and the HTTP layer.
//!
//! Each session's changes are published on a `watch` channel; anything that mirrors the
//! session (logging, UI state) subscribes instead of polling.

use crate::pocketbase::{ClientError, PocketBase};
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::info;
use uuid::Uuid;

pub const USERS_COLLECTION: &str = "users";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthState {
    #[serde(skip)]
    pub token: Option<String>,
    pub user: Option<Value>,
    pub is_authenticated: bool,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// A token is valid when its payload decodes and any `exp` claim lies in the
/// future. Tokens that cannot be decoded count as expired.
pub fn token_is_valid(token: &str) -> bool {
    let Some(payload) = token.split('.').nth(1) else {
        return false;
    };
    let Ok(bytes) = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) else {
        return false;
    };
    match serde_json::from_slice::<Claims>(&bytes) {
        Ok(Claims { exp: Some(exp) }) => exp > Utc::now().timestamp(),
        Ok(Claims { exp: None }) => true,
        Err(_) => false,
    }
}

#[derive(Clone)]
pub struct AuthStore {
    tx: Arc<watch::Sender<AuthState>>,
}

impl Default for AuthStore {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(AuthState::default());
        Self { tx: Arc::new(tx) }
    }
}

impl AuthStore {
    pub fn snapshot(&self) -> AuthState {
        self.tx.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token.clone()
    }

    pub fn is_valid(&self) -> bool {
        self.tx.borrow().token.as_deref().is_some_and(token_is_valid)
    }

    pub fn save(&self, token: String, user: Option<Value>) {
        let is_authenticated = token_is_valid(&token);
        self.tx.send_replace(AuthState {
            token: Some(token),
            user,
            is_authenticated,
        });
    }

    pub fn clear(&self) {
        self.tx.send_replace(AuthState::default());
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.tx.subscribe()
    }
}

/// Name of the cookie carrying a visitor's session id.
pub const SESSION_COOKIE: &str = "qd_session";

/// One [`AuthStore`] per visitor, keyed by the session cookie.
///
/// Visitors without a session talk to PocketBase anonymously.
#[derive(Clone)]
pub struct SessionRegistry {
    client: PocketBase,
    sessions: Arc<RwLock<HashMap<String, AuthStore>>>,
}

impl SessionRegistry {
    pub fn new(client: PocketBase) -> Self {
        Self {
            client,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn store(&self, session_id: Option<&str>) -> Option<AuthStore> {
        let id = session_id?;
        self.sessions.read().await.get(id).cloned()
    }

    /// Client carrying the session's token, or the anonymous client.
    pub async fn client_for(&self, session_id: Option<&str>) -> PocketBase {
        match self.store(session_id).await {
            Some(store) => self.client.authed(store),
            None => self.client.clone(),
        }
    }

    pub async fn snapshot(&self, session_id: Option<&str>) -> AuthState {
        self.store(session_id)
            .await
            .map(|store| store.snapshot())
            .unwrap_or_default()
    }

    /// Signs in and returns the session id the caller should keep using.
    /// A failed attempt leaves any existing session untouched.
    pub async fn login(
        &self,
        session_id: Option<&str>,
        email: &str,
        password: &str,
    ) -> Result<(String, AuthState), ClientError> {
        let existing = match session_id {
            Some(id) => self.store(Some(id)).await.map(|store| (id.to_string(), store)),
            None => None,
        };
        let (id, store, is_new) = match existing {
            Some((id, store)) => (id, store, false),
            None => (Uuid::new_v4().to_string(), AuthStore::default(), true),
        };

        self.client
            .authed(store.clone())
            .auth_with_password(USERS_COLLECTION, email, password)
            .await?;

        if is_new {
            spawn_change_logger(&id, &store);
            self.sessions.write().await.insert(id.clone(), store.clone());
        }
        info!(email, "user signed in");
        Ok((id, store.snapshot()))
    }

    pub async fn logout(&self, session_id: Option<&str>) {
        let Some(id) = session_id else {
            return;
        };
        if let Some(store) = self.sessions.write().await.remove(id) {
            store.clear();
            info!("user signed out");
        }
    }
}

fn spawn_change_logger(id: &str, store: &AuthStore) {
    let session = id.chars().take(8).collect::<String>();
    let mut changes = store.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let authenticated = changes.borrow_and_update().is_authenticated;
            info!(session = %session, authenticated, "auth state changed");
        }
    });
}

/// Session id from the request's `Cookie` header, if present.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
