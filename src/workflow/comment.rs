use tracing::info;

use crate::context::AppContext;
use crate::domain::comment::Comment;
use crate::error::{AppError, AppResult};

#[derive(Debug)]
pub struct CommentWorkflowOutcome {
    pub posted: usize,
}

/// Posts `body` to every issue in `issue_keys`. Blank keys are skipped.
pub async fn post_comment_to_issues(
    ctx: &AppContext,
    issue_keys: &[String],
    body: &str,
) -> AppResult<CommentWorkflowOutcome> {
    if body.trim().is_empty() {
        return Err(AppError::Configuration(
            "comment body must not be empty".to_string(),
        ));
    }

    let comments: Vec<Comment> = issue_keys
        .iter()
        .filter(|key| !key.trim().is_empty())
        .map(|key| Comment::new(key.as_str(), body))
        .collect();
    let posted = comments.len();

    info!(
        base_url = ctx.config.jira_base_url.as_deref().unwrap_or("<not set>"),
        "Posting comment to {posted} issue(s)"
    );
    ctx.issue_tracker.post_issue_comments(comments).await?;

    Ok(CommentWorkflowOutcome { posted })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::config::AppConfig;
    use crate::services::IssueTrackerService;

    #[derive(Default)]
    struct RecordingTracker {
        posted: Mutex<Vec<Comment>>,
    }

    #[async_trait]
    impl IssueTrackerService for RecordingTracker {
        async fn post_issue_comments(&self, comments: Vec<Comment>) -> AppResult<()> {
            if comments.is_empty() {
                return Err(AppError::NoComments);
            }
            self.posted.lock().unwrap().extend(comments);
            Ok(())
        }
    }

    fn context(tracker: Arc<RecordingTracker>) -> AppContext {
        AppContext::new(AppConfig::default(), tracker)
    }

    #[tokio::test]
    async fn posts_same_body_to_every_issue() {
        let tracker = Arc::new(RecordingTracker::default());
        let ctx = context(tracker.clone());
        let keys = vec!["APP-1".to_string(), " ".to_string(), "APP-2 ".to_string()];

        let outcome = post_comment_to_issues(&ctx, &keys, "Shipped in 1.4.0")
            .await
            .unwrap();

        assert_eq!(outcome.posted, 2);
        let posted = tracker.posted.lock().unwrap();
        let keys: Vec<&str> = posted.iter().map(Comment::ticket_key).collect();
        assert_eq!(keys, vec!["APP-1", "APP-2"]);
        assert!(posted.iter().all(|c| c.body() == "Shipped in 1.4.0"));
    }

    #[tokio::test]
    async fn only_blank_keys_is_no_comments() {
        let tracker = Arc::new(RecordingTracker::default());
        let ctx = context(tracker);
        let keys = vec!["  ".to_string()];

        let err = post_comment_to_issues(&ctx, &keys, "body").await.unwrap_err();
        assert!(matches!(err, AppError::NoComments));
    }

    #[tokio::test]
    async fn rejects_empty_body() {
        let tracker = Arc::new(RecordingTracker::default());
        let ctx = context(tracker.clone());
        let keys = vec!["APP-1".to_string()];

        let err = post_comment_to_issues(&ctx, &keys, "\n").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(tracker.posted.lock().unwrap().is_empty());
    }
}
