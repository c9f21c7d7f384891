use thiserror::Error;

/// Failure linking or evaluating a data script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("data script does not parse: {0}")]
    Syntax(String),

    #[error("unknown binding `{0}` in data script")]
    UnknownBinding(String),

    #[error("data script failed: {0}")]
    Evaluation(String),
}
