use crate::domain_model::*;
use crate::session::ApiError;

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Signs in with email and password and stores the issued tokens.
    async fn login(&self, input: LoginInput) -> Result<LoginResult, ApiError>;
    async fn register(&self, input: RegisterInput) -> Result<LoginResult, ApiError>;
    /// Exchanges a wallet / identity-provider token for our own tokens.
    async fn identity_login(&self, input: IdentityLoginInput) -> Result<LoginResult, ApiError>;
    /// Local tokens are dropped even when the backend call fails.
    async fn logout(&self) -> Result<(), ApiError>;
    async fn profile(&self) -> Result<UserProfile, ApiError>;
    fn is_signed_in(&self) -> bool;
}
