use crate::domain_model::*;
use crate::domain_port::KeyValueStore;
use std::sync::{Arc, RwLock};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Owner of the client's credentials.
///
/// Reads are served from memory. Every mutation swaps both tokens and mirrors
/// them to the durable store under one write lock. Storage failures are
/// logged and otherwise ignored so that every operation stays total.
pub struct TokenStore {
    session: RwLock<Session>,
    storage: Option<Arc<dyn KeyValueStore>>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            session: RwLock::new(Session::default()),
            storage: Some(storage),
        }
    }

    /// A store that lives in memory only.
    pub fn ephemeral() -> Self {
        Self {
            session: RwLock::new(Session::default()),
            storage: None,
        }
    }

    pub fn access_token(&self) -> Option<AccessToken> {
        self.snapshot().access_token
    }

    pub fn refresh_token(&self) -> Option<RefreshToken> {
        self.snapshot().refresh_token
    }

    pub fn snapshot(&self) -> Session {
        match self.session.read() {
            Ok(session) => session.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set_tokens(&self, access_token: AccessToken, refresh_token: Option<RefreshToken>) {
        let session = Session {
            access_token: Some(access_token),
            refresh_token,
        };
        self.replace(session);
    }

    /// Installs a refreshed access token. The refresh token is only replaced
    /// when the backend rotated it.
    pub fn apply_refresh(&self, tokens: TokenPair) {
        let mut guard = self.write();
        let refresh_token = tokens.refresh_token.or_else(|| guard.refresh_token.take());
        *guard = Session {
            access_token: Some(tokens.access_token),
            refresh_token,
        };
        self.persist(&guard);
    }

    pub fn clear(&self) {
        self.replace(Session::default());
        tracing::debug!("session cleared");
    }

    /// Hydrates memory from durable storage. Calling it again yields the same
    /// state; without storage it does nothing.
    pub fn load_from_storage(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let read = |key: &str| match storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!(key, "failed to read session from storage: {}", e);
                None
            }
        };
        let session = Session {
            access_token: read(ACCESS_TOKEN_KEY).map(AccessToken),
            refresh_token: read(REFRESH_TOKEN_KEY).map(RefreshToken),
        };
        tracing::debug!(
            has_access = session.access_token.is_some(),
            has_refresh = session.refresh_token.is_some(),
            "session loaded from storage"
        );
        *self.write() = session;
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        match self.session.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn replace(&self, session: Session) {
        let mut guard = self.write();
        *guard = session;
        self.persist(&guard);
    }

    fn persist(&self, session: &Session) {
        let Some(storage) = &self.storage else {
            return;
        };
        let entries = [
            (ACCESS_TOKEN_KEY, session.access_token.as_ref().map(AccessToken::as_str)),
            (REFRESH_TOKEN_KEY, session.refresh_token.as_ref().map(RefreshToken::as_str)),
        ];
        for (key, value) in entries {
            let result = match value {
                Some(value) => storage.set(key, value),
                None => storage.remove(key),
            };
            if let Err(e) = result {
                tracing::warn!(key, "failed to persist session: {}", e);
            }
        }
    }
}
