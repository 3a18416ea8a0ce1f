use crate::application_port::*;
use crate::domain_model::*;
use crate::session::{ApiClient, ApiError};
use serde::de::IgnoredAny;
use std::sync::Arc;

pub struct HttpAuthService {
    api: Arc<ApiClient>,
}

impl HttpAuthService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn establish(&self, result: &LoginResult) {
        self.api.tokens().set_tokens(
            result.tokens.access_token.clone(),
            result.tokens.refresh_token.clone(),
        );
        match &result.user {
            Some(user) => tracing::info!(user_id = %user.id, "signed in"),
            None => tracing::info!("signed in"),
        }
    }
}

#[async_trait::async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, input: LoginInput) -> Result<LoginResult, ApiError> {
        let result: LoginResult = self.api.post_public("/auth/login", &input).await?;
        self.establish(&result);
        Ok(result)
    }

    async fn register(&self, input: RegisterInput) -> Result<LoginResult, ApiError> {
        let result: LoginResult = self.api.post_public("/auth/register", &input).await?;
        self.establish(&result);
        Ok(result)
    }

    async fn identity_login(&self, input: IdentityLoginInput) -> Result<LoginResult, ApiError> {
        let result: LoginResult = self
            .api
            .post_public("/auth/identity-login", &input)
            .await?;
        self.establish(&result);
        Ok(result)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let refresh_token = self.api.tokens().refresh_token();
        self.api.tokens().clear();
        tracing::info!("signed out");

        let Some(refresh_token) = refresh_token else {
            return Ok(());
        };
        let body = RefreshRequest {
            refresh_token: refresh_token.as_str(),
        };
        let revoked: Result<IgnoredAny, ApiError> =
            self.api.post_public("/auth/logout", &body).await;
        if let Err(e) = &revoked {
            tracing::warn!("backend logout failed: {}", e);
        }
        revoked.map(|_| ())
    }

    async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.api.get_json("/auth/me").await
    }

    fn is_signed_in(&self) -> bool {
        self.api.tokens().refresh_token().is_some() || self.api.tokens().access_token().is_some()
    }
}
