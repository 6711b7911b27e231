use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single request on the wire
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response body: {0}")]
    Decode(String),
    #[error("invalid session configuration: {0}")]
    Config(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Rejection of a raw response by a response transform
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("unexpected response shape: {0}")]
    Shape(String),
    #[error("remote operation failed: {0}")]
    Remote(String),
}

impl TransformError {
    pub fn shape(message: impl Into<String>) -> Self {
        TransformError::Shape(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        TransformError::Remote(message.into())
    }
}

/// Failure of one queued operation, tagged with its queue position
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    #[error("operation {index} failed to dispatch: {source}")]
    Dispatch {
        index: usize,
        #[source]
        source: TransportError,
    },
    #[error("operation {index} response rejected: {source}")]
    Transform {
        index: usize,
        #[source]
        source: TransformError,
    },
}

impl OperationError {
    pub fn index(&self) -> usize {
        match self {
            OperationError::Dispatch { index, .. } | OperationError::Transform { index, .. } => {
                *index
            }
        }
    }
}

/// Every failure of one round, ordered by queue position
#[derive(Debug, Clone, PartialEq)]
pub struct RoundFailure {
    failures: Vec<OperationError>,
    total: usize,
}

impl RoundFailure {
    pub fn new(mut failures: Vec<OperationError>, total: usize) -> Self {
        failures.sort_by_key(OperationError::index);
        Self { failures, total }
    }

    pub fn failures(&self) -> &[OperationError] {
        &self.failures
    }

    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(OperationError::index).collect()
    }

    /// Number of operations in the round, failed or not
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn into_failures(self) -> Vec<OperationError> {
        self.failures
    }
}

impl fmt::Display for RoundFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} operations failed",
            self.failures.len(),
            self.total
        )?;
        for failure in &self.failures {
            write!(f, "; {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for RoundFailure {}

/// Outcome of a failed `submit`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BatchError {
    #[error("batch is empty, nothing to submit")]
    EmptyBatch,
    #[error("failed to open transport session: {0}")]
    Session(#[source] TransportError),
    #[error("round failed: {0}")]
    Round(#[from] RoundFailure),
}

impl BatchError {
    /// The aggregate failure, if the round got as far as dispatching
    pub fn round(&self) -> Option<&RoundFailure> {
        match self {
            BatchError::Round(failure) => Some(failure),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_failure_sorted_by_index() {
        let failure = RoundFailure::new(
            vec![
                OperationError::Transform {
                    index: 4,
                    source: TransformError::shape("not an object"),
                },
                OperationError::Dispatch {
                    index: 1,
                    source: TransportError::Timeout(Duration::from_millis(50)),
                },
            ],
            6,
        );
        assert_eq!(failure.failed_indices(), vec![1, 4]);
        assert_eq!(failure.total(), 6);
    }

    #[test]
    fn test_round_failure_display_lists_every_index() {
        let failure = RoundFailure::new(
            vec![
                OperationError::Dispatch {
                    index: 2,
                    source: TransportError::Status {
                        status: 500,
                        body: "boom".to_string(),
                    },
                },
                OperationError::Dispatch {
                    index: 0,
                    source: TransportError::Connection("refused".to_string()),
                },
            ],
            5,
        );
        let text = failure.to_string();
        assert!(text.starts_with("2 of 5 operations failed"));
        assert!(text.contains("operation 0 failed to dispatch: connection failed: refused"));
        assert!(text.contains("operation 2 failed to dispatch: HTTP status 500: boom"));
    }

    #[test]
    fn test_transport_error_helpers() {
        assert!(TransportError::Timeout(Duration::from_secs(1)).is_timeout());
        let status = TransportError::Status {
            status: 404,
            body: String::new(),
        };
        assert_eq!(status.status(), Some(404));
        assert!(!status.is_timeout());
    }

    #[test]
    fn test_batch_error_round_accessor() {
        let err: BatchError = RoundFailure::new(vec![], 0).into();
        assert!(err.round().is_some());
        assert!(BatchError::EmptyBatch.round().is_none());
    }
}
