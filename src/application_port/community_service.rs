use crate::domain_model::*;
use crate::session::ApiError;

#[async_trait::async_trait]
pub trait CommunityService: Send + Sync {
    async fn feed(&self, page: Page) -> Result<Paged<FeedItem>, ApiError>;
    async fn like(&self, post: PostId) -> Result<LikeState, ApiError>;
    async fn unlike(&self, post: PostId) -> Result<LikeState, ApiError>;
    async fn comment(&self, post: PostId, input: CommentInput) -> Result<Comment, ApiError>;
}
