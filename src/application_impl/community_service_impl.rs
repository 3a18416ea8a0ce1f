use crate::application_port::*;
use crate::domain_model::*;
use crate::session::{ApiClient, ApiError};
use std::sync::Arc;

pub struct HttpCommunityService {
    api: Arc<ApiClient>,
}

impl HttpCommunityService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl CommunityService for HttpCommunityService {
    async fn feed(&self, page: Page) -> Result<Paged<FeedItem>, ApiError> {
        self.api
            .get_json(&format!("/community/feed?page={}", page.0))
            .await
    }

    async fn like(&self, post: PostId) -> Result<LikeState, ApiError> {
        self.api
            .post_json(&format!("/community/posts/{}/like", post), &serde_json::json!({}))
            .await
    }

    async fn unlike(&self, post: PostId) -> Result<LikeState, ApiError> {
        self.api
            .delete_json(&format!("/community/posts/{}/like", post))
            .await
    }

    async fn comment(&self, post: PostId, input: CommentInput) -> Result<Comment, ApiError> {
        self.api
            .post_json(&format!("/community/posts/{}/comments", post), &input)
            .await
    }
}
