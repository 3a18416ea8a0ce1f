use crate::application_port::*;
use crate::domain_model::*;
use crate::session::{ApiClient, ApiError};
use std::sync::Arc;

pub struct HttpProjectService {
    api: Arc<ApiClient>,
}

impl HttpProjectService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl ProjectService for HttpProjectService {
    async fn list(&self) -> Result<Vec<Project>, ApiError> {
        self.api.get_json("/projects").await
    }

    async fn get(&self, id: ProjectId) -> Result<Project, ApiError> {
        self.api.get_json(&format!("/projects/{}", id)).await
    }

    async fn create(&self, input: NewProject) -> Result<Project, ApiError> {
        self.api.post_json("/projects", &input).await
    }

    async fn update(&self, id: ProjectId, patch: ProjectPatch) -> Result<Project, ApiError> {
        self.api
            .patch_json(&format!("/projects/{}", id), &patch)
            .await
    }

    async fn delete(&self, id: ProjectId) -> Result<(), ApiError> {
        self.api.delete(&format!("/projects/{}", id)).await
    }
}
