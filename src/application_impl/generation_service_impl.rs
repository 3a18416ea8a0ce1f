use crate::application_port::*;
use crate::domain_model::prompt;
use crate::domain_model::*;
use crate::session::{ApiClient, ApiError};
use std::sync::Arc;
use std::time::Duration;

pub struct HttpGenerationService {
    api: Arc<ApiClient>,
}

impl HttpGenerationService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl GenerationService for HttpGenerationService {
    async fn request_generation(&self, input: GenerationInput) -> Result<Generation, ApiError> {
        let generation: Generation = self.api.post_json("/generations", &input).await?;
        tracing::info!(id = %generation.id, status = ?generation.status, "generation requested");
        Ok(generation)
    }

    async fn status(&self, id: GenerationId) -> Result<Generation, ApiError> {
        self.api.get_json(&format!("/generations/{}", id)).await
    }

    async fn history(&self, page: Page) -> Result<Paged<Generation>, ApiError> {
        self.api
            .get_json(&format!("/generations?page={}", page.0))
            .await
    }

    async fn wait_for_completion(
        &self,
        id: GenerationId,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<Generation, GenerationError> {
        let poll = async {
            loop {
                let generation = self.status(id).await?;
                if generation.status.is_terminal() {
                    return Ok::<_, ApiError>(generation);
                }
                tracing::debug!(%id, status = ?generation.status, "generation still running");
                tokio::time::sleep(poll_interval).await;
            }
        };
        match tokio::time::timeout(timeout, poll).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(GenerationError::TimedOut(id)),
        }
    }

    async fn similar_in_history(
        &self,
        prompt_text: &str,
        threshold: f64,
    ) -> Result<Vec<SimilarGeneration>, ApiError> {
        let history = self.history(Page::default()).await?;
        let mut similar: Vec<SimilarGeneration> = history
            .items
            .into_iter()
            .filter_map(|generation| {
                let score = prompt::overlap(prompt_text, &generation.prompt);
                (score >= threshold).then_some(SimilarGeneration { generation, score })
            })
            .collect();
        similar.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(similar)
    }
}
