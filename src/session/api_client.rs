use crate::domain_model::AccessToken;
use crate::domain_port::*;
use crate::session::{ApiError, RefreshError, TokenRefresher, TokenStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Shared HTTP entry point for every backend call.
///
/// Attaches the current access token and recovers from a 401 by renewing the
/// session through [`TokenRefresher`] and retrying the request exactly once.
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    refresher: Arc<TokenRefresher>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>, refresher: Arc<TokenRefresher>) -> Self {
        Self {
            transport,
            refresher,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        self.refresher.tokens()
    }

    pub fn refresher(&self) -> &Arc<TokenRefresher> {
        &self.refresher
    }

    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse, ApiError> {
        let sent_with = self.tokens().access_token();
        let response = self.send(method, path, &body, sent_with.as_ref()).await?;

        if !response.is_unauthorized() || self.is_refresh_path(path) {
            return Self::check(response);
        }

        tracing::debug!(%method, path, "unauthorized, renewing session");
        let current = self.tokens().access_token();
        let retry_with = if current.is_some() && current != sent_with {
            // Someone else renewed the session while this request was out.
            current
        } else if sent_with.is_some() && current.is_none() {
            // The session already ended while this request was out.
            return Err(ApiError::SessionExpired {
                status: response.status,
                body: response.body,
            });
        } else {
            match self.refresher.refresh().await {
                Ok(tokens) => Some(tokens.access_token),
                Err(RefreshError::Network(e)) => return Err(ApiError::Network(e)),
                Err(_) => {
                    return Err(ApiError::SessionExpired {
                        status: response.status,
                        body: response.body,
                    });
                }
            }
        };

        let retried = self.send(method, path, &body, retry_with.as_ref()).await?;
        Self::check(retried)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(HttpMethod::Get, path, None).await?;
        Self::decode(&response)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Post, path, body).await
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Put, path, body).await
    }

    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(HttpMethod::Patch, path, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.request(HttpMethod::Delete, path, None).await?;
        Ok(())
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.request(HttpMethod::Delete, path, None).await?;
        Self::decode(&response)
    }

    /// Posts without credentials and without the refresh-and-retry path, for
    /// endpoints that establish or revoke a session.
    pub async fn post_public<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.send(HttpMethod::Post, path, &Some(body), None).await?;
        Self::decode(&Self::check(response)?)
    }

    async fn send_json<B, T>(&self, method: HttpMethod, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self.request(method, path, Some(body)).await?;
        Self::decode(&response)
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: &Option<Value>,
        token: Option<&AccessToken>,
    ) -> Result<HttpResponse, ApiError> {
        let request = HttpRequest {
            method,
            path: path.to_owned(),
            bearer: token.map(|t| t.as_str().to_owned()),
            body: body.clone(),
        };
        let response = self.transport.send(request).await?;
        tracing::trace!(%method, path, status = response.status, "response received");
        Ok(response)
    }

    fn is_refresh_path(&self, path: &str) -> bool {
        let bare = path.split('?').next().unwrap_or(path);
        bare == self.refresher.refresh_path()
    }

    fn check(response: HttpResponse) -> Result<HttpResponse, ApiError> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(ApiError::Status {
                status: response.status,
                body: response.body,
            })
        }
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
        // 204 and friends carry no body; let `()` and `Option<_>` decode from null.
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        Ok(serde_json::from_str(body)?)
    }
}
