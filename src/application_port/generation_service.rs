use crate::domain_model::*;
use crate::session::ApiError;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("generation {0} did not finish in time")]
    TimedOut(GenerationId),
}

#[derive(Debug, Clone)]
pub struct SimilarGeneration {
    pub generation: Generation,
    pub score: f64,
}

#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    async fn request_generation(&self, input: GenerationInput) -> Result<Generation, ApiError>;
    async fn status(&self, id: GenerationId) -> Result<Generation, ApiError>;
    async fn history(&self, page: Page) -> Result<Paged<Generation>, ApiError>;
    /// Polls `status` until the generation reaches a terminal state.
    async fn wait_for_completion(
        &self,
        id: GenerationId,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<Generation, GenerationError>;
    /// Recent generations whose prompt overlaps `prompt` by at least
    /// `threshold`, best match first.
    async fn similar_in_history(
        &self,
        prompt: &str,
        threshold: f64,
    ) -> Result<Vec<SimilarGeneration>, ApiError>;
}
