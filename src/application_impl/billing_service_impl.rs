use crate::application_port::*;
use crate::domain_model::*;
use crate::session::{ApiClient, ApiError};
use std::sync::Arc;

pub struct HttpBillingService {
    api: Arc<ApiClient>,
}

impl HttpBillingService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl BillingService for HttpBillingService {
    async fn plans(&self) -> Result<Vec<Plan>, ApiError> {
        self.api.get_json("/billing/plans").await
    }

    async fn top_up(&self, input: TopUpInput) -> Result<TopUpReceipt, ApiError> {
        let receipt: TopUpReceipt = self.api.post_json("/billing/top-up", &input).await?;
        tracing::info!(
            plan = %input.plan_id,
            credits_added = receipt.credits_added,
            balance = receipt.balance,
            "credits topped up"
        );
        Ok(receipt)
    }
}
