use async_trait::async_trait;

use crate::domain::comment::Comment;
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Posts every comment and fails with an aggregate error if any of them failed.
    async fn post_issue_comments(&self, comments: Vec<Comment>) -> AppResult<()>;
}
