//! Request-boundary errors.

use thiserror::Error;

use crate::compiler::CompileError;
use crate::sandbox::LinkError;

/// Routing failure before any handler runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("Page not found.")]
    NotFound,
}

/// What a failed request turns into: a status, a message and, for
/// developers, the detail behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status} {message}")]
pub struct HandlerError {
    pub status: u16,
    pub message: String,
    pub stack: Option<String>,
}

impl HandlerError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            stack: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl From<CompileError> for HandlerError {
    fn from(err: CompileError) -> Self {
        let stack = err.to_string();
        Self::internal(err.message).with_stack(stack)
    }
}

impl From<LinkError> for HandlerError {
    fn from(err: LinkError) -> Self {
        Self::internal("Data script failed.").with_stack(err.to_string())
    }
}

impl From<RouteError> for HandlerError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::NotFound => Self::new(404, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = HandlerError::from(RouteError::NotFound);
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "Page not found.");
        assert!(err.stack.is_none());
    }

    #[test]
    fn test_compile_error_keeps_location() {
        let source = "a\n<Nav />";
        let compile = CompileError::new("/src/a.page", "unknown component `Nav`").at(source, 2, 7);
        let err = HandlerError::from(compile);
        assert_eq!(err.status, 500);
        assert_eq!(err.message, "unknown component `Nav`");
        assert_eq!(err.stack.as_deref(), Some("/src/a.page:2:1: unknown component `Nav`"));
    }

    #[test]
    fn test_link_error() {
        let err = HandlerError::from(LinkError::Evaluation("boom".into()));
        assert_eq!(err.status, 500);
        assert!(err.stack.unwrap().contains("boom"));
    }
}
