use crate::error::CommentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    body: String,
    ticket_key: String,
}

impl Comment {
    pub fn new(ticket_key: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ticket_key: ticket_key.into(),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Ticket key with surrounding whitespace removed, as used in request URLs.
    pub fn ticket_key(&self) -> &str {
        self.ticket_key.trim()
    }
}

/// Outcome of posting one comment.
#[derive(Debug)]
pub struct TaskResult {
    pub ticket_key: String,
    pub error: Option<CommentError>,
}

impl TaskResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn status_line(&self) -> String {
        let status = if self.succeeded() { "SUCCESS" } else { "FAILED" };
        format!("Posting comment to - {} - : {status}", self.ticket_key)
    }
}

/// Every task result of one dispatch, in completion order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub results: Vec<TaskResult>,
}

impl DispatchReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|result| !result.succeeded())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|result| result.succeeded())
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(TaskResult::succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_ticket_key() {
        let comment = Comment::new("  ABC-123  ", "Deployed to staging");
        assert_eq!(comment.ticket_key(), "ABC-123");
        assert_eq!(comment.body(), "Deployed to staging");
    }

    #[test]
    fn formats_status_line() {
        let ok = TaskResult {
            ticket_key: "ABC-1".to_string(),
            error: None,
        };
        let failed = TaskResult {
            ticket_key: "ABC-2".to_string(),
            error: Some(CommentError::TaskAborted),
        };
        assert_eq!(ok.status_line(), "Posting comment to - ABC-1 - : SUCCESS");
        assert_eq!(failed.status_line(), "Posting comment to - ABC-2 - : FAILED");
    }

    #[test]
    fn report_splits_failures() {
        let report = DispatchReport {
            results: vec![
                TaskResult {
                    ticket_key: "A-1".to_string(),
                    error: None,
                },
                TaskResult {
                    ticket_key: "A-2".to_string(),
                    error: Some(CommentError::HttpStatus {
                        code: 404,
                        body: "Issue does not exist".to_string(),
                    }),
                },
            ],
        };

        assert_eq!(report.total(), 2);
        assert!(!report.is_success());
        let failed: Vec<_> = report.failures().map(|r| r.ticket_key.as_str()).collect();
        assert_eq!(failed, vec!["A-2"]);
        assert_eq!(report.succeeded().count(), 1);
    }
}
