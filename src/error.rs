use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("no comment has been added")]
    NoComments,
    #[error("{failed} of {total} comments failed to be posted to Jira")]
    PartialFailure { failed: usize, total: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Failure of a single comment post. Never aborts the rest of the batch.
#[derive(Debug, Error)]
pub enum CommentError {
    #[error("failed to build request URL: {0}")]
    UrlBuild(String),
    #[error("failed to build request: {0}")]
    RequestBuild(String),
    #[error("failed to perform request: {0}")]
    Transport(String),
    #[error("failed to read response body: {0}")]
    BodyRead(String),
    #[error("response status: {code} - body: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("comment task terminated before reporting")]
    TaskAborted,
}
