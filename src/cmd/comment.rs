use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::workflow::comment::{CommentWorkflowOutcome, post_comment_to_issues};

#[derive(Args, Debug, Clone)]
pub struct CommentArgs {
    /// Issue key to comment on. Repeat the flag or separate keys with '|'.
    #[arg(short, long = "issue", value_delimiter = '|', required = true)]
    pub issues: Vec<String>,
    /// Comment text.
    #[arg(short, long, conflicts_with = "body_file")]
    pub body: Option<String>,
    /// Read the comment text from a file.
    #[arg(long)]
    pub body_file: Option<PathBuf>,
    /// Override the configured Jira base URL.
    #[arg(long)]
    pub base_url: Option<String>,
}

impl CommentArgs {
    fn resolve_body(&self) -> AppResult<String> {
        match (&self.body, &self.body_file) {
            (Some(body), _) => Ok(body.clone()),
            (None, Some(path)) => Ok(fs::read_to_string(path)?),
            (None, None) => Err(AppError::Configuration(
                "no comment body supplied; use --body or --body-file".to_string(),
            )),
        }
    }
}

pub async fn run(ctx: &AppContext, args: CommentArgs) -> AppResult<CommentWorkflowOutcome> {
    let body = args.resolve_body()?;
    post_comment_to_issues(ctx, &args.issues, &body).await
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: CommentArgs,
    }

    fn parse(argv: &[&str]) -> Result<CommentArgs, clap::Error> {
        TestCli::try_parse_from(std::iter::once("jira-comment").chain(argv.iter().copied()))
            .map(|cli| cli.args)
    }

    #[test]
    fn splits_pipe_separated_issues() {
        let args = parse(&["--issue", "APP-1|APP-2", "-i", "APP-3", "--body", "done"]).unwrap();
        assert_eq!(args.issues, vec!["APP-1", "APP-2", "APP-3"]);
        assert_eq!(args.resolve_body().unwrap(), "done");
    }

    #[test]
    fn requires_an_issue() {
        assert!(parse(&["--body", "done"]).is_err());
    }

    #[test]
    fn body_and_body_file_conflict() {
        assert!(parse(&["-i", "APP-1", "--body", "a", "--body-file", "notes.md"]).is_err());
    }

    #[test]
    fn reads_body_from_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "Released build 42").unwrap();
        let path = file.path().to_str().unwrap();

        let args = parse(&["-i", "APP-1", "--body-file", path]).unwrap();
        assert_eq!(args.resolve_body().unwrap(), "Released build 42");
    }

    #[test]
    fn missing_body_is_configuration_error() {
        let args = parse(&["-i", "APP-1"]).unwrap();
        assert!(matches!(
            args.resolve_body(),
            Err(AppError::Configuration(_))
        ));
    }
}
