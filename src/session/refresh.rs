use crate::domain_model::*;
use crate::domain_port::*;
use crate::session::{EventBus, RefreshError, TokenStore};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use std::sync::{Arc, Mutex, PoisonError};

type PendingRefresh = Shared<BoxFuture<'static, Result<TokenPair, RefreshError>>>;

struct RefreshContext {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<TokenStore>,
    events: Arc<EventBus>,
    refresh_path: String,
}

impl RefreshContext {
    async fn run(&self) -> Result<TokenPair, RefreshError> {
        let outcome = self.exchange().await;
        match &outcome {
            Ok(tokens) => {
                self.tokens.apply_refresh(tokens.clone());
                tracing::info!(rotated = tokens.refresh_token.is_some(), "access token refreshed");
            }
            Err(RefreshError::MissingToken) => {
                tracing::warn!("unauthorized without a refresh token, session expired");
                self.tokens.clear();
                self.events.emit(SessionEvent::SessionExpired);
            }
            Err(e) if e.is_terminal() => {
                tracing::warn!("token refresh failed, ending session: {}", e);
                self.tokens.clear();
                self.events.emit(SessionEvent::RefreshFailed);
            }
            Err(e) => {
                tracing::warn!("token refresh could not reach the backend: {}", e);
            }
        }
        outcome
    }

    async fn exchange(&self) -> Result<TokenPair, RefreshError> {
        let refresh_token = self
            .tokens
            .refresh_token()
            .ok_or(RefreshError::MissingToken)?;
        let body = serde_json::to_value(RefreshRequest {
            refresh_token: refresh_token.as_str(),
        })
        .map_err(|e| RefreshError::Decode(e.to_string()))?;

        let response = self
            .transport
            .send(HttpRequest {
                method: HttpMethod::Post,
                path: self.refresh_path.clone(),
                bearer: None,
                body: Some(body),
            })
            .await
            .map_err(RefreshError::Network)?;

        if !response.is_success() {
            return Err(RefreshError::Rejected {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str::<TokenPair>(&response.body)
            .map_err(|e| RefreshError::Decode(e.to_string()))
    }
}

/// Exchanges the refresh token for a new access token, at most one exchange
/// at a time.
///
/// The first caller starts the exchange and parks it in `pending`; callers
/// arriving while it runs await the same shared result. Ending the session
/// on a terminal failure happens inside the shared exchange, so it runs once
/// no matter how many callers are waiting.
pub struct TokenRefresher {
    context: Arc<RefreshContext>,
    pending: Mutex<Option<PendingRefresh>>,
}

impl TokenRefresher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<TokenStore>,
        events: Arc<EventBus>,
        refresh_path: impl Into<String>,
    ) -> Self {
        Self {
            context: Arc::new(RefreshContext {
                transport,
                tokens,
                events,
                refresh_path: refresh_path.into(),
            }),
            pending: Mutex::new(None),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.context.tokens
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.context.events
    }

    pub fn refresh_path(&self) -> &str {
        &self.context.refresh_path
    }

    pub fn is_refreshing(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub async fn refresh(&self) -> Result<TokenPair, RefreshError> {
        let pending = self.join_or_start();
        let outcome = pending.clone().await;
        self.release(&pending);
        outcome
    }

    fn join_or_start(&self) -> PendingRefresh {
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pending) = slot.as_ref() {
            tracing::debug!("joining in-flight token refresh");
            return pending.clone();
        }
        let context = self.context.clone();
        let pending = async move { context.run().await }.boxed().shared();
        *slot = Some(pending.clone());
        pending
    }

    fn release(&self, finished: &PendingRefresh) {
        let mut slot = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|p| p.ptr_eq(finished)) {
            *slot = None;
        }
    }
}
