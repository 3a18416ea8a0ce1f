use crate::domain_model::*;
use crate::session::ApiError;

#[async_trait::async_trait]
pub trait BillingService: Send + Sync {
    async fn plans(&self) -> Result<Vec<Plan>, ApiError>;
    async fn top_up(&self, input: TopUpInput) -> Result<TopUpReceipt, ApiError>;
}
