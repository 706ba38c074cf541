use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{
    Client, Request, Url,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderName},
    redirect::Policy,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::comment::{Comment, DispatchReport, TaskResult};
use crate::error::{AppError, AppResult, CommentError};
use crate::services::IssueTrackerService;

const ISSUE_PATH: [&str; 4] = ["rest", "api", "2", "issue"];
const COMMENT_PATH: &str = "comment";

/// Jira REST client. Cloning is cheap and clones share one connection pool.
#[derive(Clone)]
pub struct JiraClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    base_url: String,
    headers: Vec<(HeaderName, String)>,
}

impl JiraClient {
    /// `token` is the already encoded basic credential.
    pub fn new(token: &str, base_url: impl Into<String>) -> Self {
        // 3xx responses are classified by status, never followed.
        let http = Client::builder()
            .redirect(Policy::none())
            .build()
            .expect("failed to initialise the Jira HTTP client");

        Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: base_url.into(),
                headers: vec![
                    (AUTHORIZATION, format!("Basic {token}")),
                    (CONTENT_TYPE, "application/json".to_string()),
                ],
            }),
        }
    }

    /// Posts every comment concurrently and collects one result per comment.
    ///
    /// All requests are in flight before the first result is awaited, and a
    /// failing comment never cancels the others. Returns the results in
    /// completion order.
    pub async fn dispatch_comments(&self, comments: Vec<Comment>) -> AppResult<DispatchReport> {
        if comments.is_empty() {
            return Err(AppError::NoComments);
        }

        let client = self.clone();
        let report = fan_out(comments, move |comment| {
            let client = client.clone();
            async move { client.post_issue_comment(&comment).await }
        })
        .await;
        Ok(report)
    }

    async fn post_issue_comment(&self, comment: &Comment) -> Result<(), CommentError> {
        let url = comment_url(&self.inner.base_url, comment.ticket_key())?;
        let request = self.build_request(url, comment.body())?;
        debug!(
            method = %request.method(),
            url = %request.url(),
            body = comment.body(),
            "sending comment request"
        );

        let response = self
            .inner
            .http
            .execute(request)
            .await
            .map_err(|err| CommentError::Transport(err.to_string()))?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| CommentError::BodyRead(err.to_string()))?;
        let body = String::from_utf8_lossy(&bytes).into_owned();
        debug!(status, body = %body, "comment response");

        if !is_accepted_status(status) {
            return Err(CommentError::HttpStatus { code: status, body });
        }
        Ok(())
    }

    fn build_request(&self, url: Url, body: &str) -> Result<Request, CommentError> {
        let mut builder = self.inner.http.post(url);
        for (name, value) in &self.inner.headers {
            builder = builder.header(name.clone(), value.as_str());
        }
        // Header and serialization failures both surface from `build`.
        builder
            .json(&CommentPayload { body })
            .build()
            .map_err(|err| CommentError::RequestBuild(err.to_string()))
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn post_issue_comments(&self, comments: Vec<Comment>) -> AppResult<()> {
        let report = self.dispatch_comments(comments).await?;
        let failed = report.failures().count();
        if failed > 0 {
            return Err(AppError::PartialFailure {
                failed,
                total: report.total(),
            });
        }
        Ok(())
    }
}

/// Runs `post` for every comment on its own task and waits for all of them.
async fn fan_out<F, Fut>(comments: Vec<Comment>, post: F) -> DispatchReport
where
    F: Fn(Comment) -> Fut,
    Fut: Future<Output = Result<(), CommentError>> + Send + 'static,
{
    let total = comments.len();
    let (tx, mut rx) = mpsc::channel::<(usize, TaskResult)>(total);
    let mut ticket_keys = Vec::with_capacity(total);

    for (index, comment) in comments.into_iter().enumerate() {
        let ticket_key = comment.ticket_key().to_string();
        ticket_keys.push(ticket_key.clone());
        let task = post(comment);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = TaskResult {
                ticket_key,
                error: task.await.err(),
            };
            if tx.send((index, result)).await.is_err() {
                debug!("comment collector dropped before result was delivered");
            }
        });
    }
    drop(tx);

    let mut reported = vec![false; total];
    let mut report = DispatchReport::default();
    while report.total() < total {
        let Some((index, result)) = rx.recv().await else {
            break;
        };
        reported[index] = true;
        info!("{}", result.status_line());
        report.results.push(result);
    }

    // A task that panicked drops its sender without reporting.
    for (index, ticket_key) in ticket_keys.into_iter().enumerate() {
        if !reported[index] {
            let result = TaskResult {
                ticket_key,
                error: Some(CommentError::TaskAborted),
            };
            info!("{}", result.status_line());
            report.results.push(result);
        }
    }

    debug!(
        succeeded = report.succeeded().count(),
        total,
        "comment dispatch finished"
    );
    if !report.is_success() {
        info!("Errors during posting comments:");
        for failure in report.failures() {
            if let Some(error) = &failure.error {
                warn!(
                    "Error during posting comment to - {} - : {error}",
                    failure.ticket_key
                );
            }
        }
    }

    report
}

fn comment_url(base_url: &str, ticket_key: &str) -> Result<Url, CommentError> {
    if ticket_key.is_empty() {
        return Err(CommentError::UrlBuild("ticket key is empty".to_string()));
    }

    let mut url = Url::parse(base_url)
        .map_err(|err| CommentError::UrlBuild(format!("invalid base URL '{base_url}': {err}")))?;
    url.path_segments_mut()
        .map_err(|_| CommentError::UrlBuild(format!("'{base_url}' cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(ISSUE_PATH)
        .push(ticket_key)
        .push(COMMENT_PATH);
    Ok(url)
}

/// Jira answers 201 on success; anything up to and including 300 is accepted.
fn is_accepted_status(code: u16) -> bool {
    (200..=300).contains(&code)
}

#[derive(Serialize)]
struct CommentPayload<'a> {
    body: &'a str,
}
