use crate::domain_model::*;
use crate::session::ApiError;

#[async_trait::async_trait]
pub trait ProjectService: Send + Sync {
    async fn list(&self) -> Result<Vec<Project>, ApiError>;
    async fn get(&self, id: ProjectId) -> Result<Project, ApiError>;
    async fn create(&self, input: NewProject) -> Result<Project, ApiError>;
    async fn update(&self, id: ProjectId, patch: ProjectPatch) -> Result<Project, ApiError>;
    async fn delete(&self, id: ProjectId) -> Result<(), ApiError>;
}
