use crate::github_api::GitHubApiError;
use crate::model::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input, caught before any request is dispatched.
    User,
    /// Missing or invalid credential (401/403).
    Auth,
    /// Unknown login or repository (404).
    NotFound,
    /// Transport failures, server errors, malformed responses.
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AppError {
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::User,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Auth,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Runtime,
            message: message.into(),
        }
    }

    /// Classifies a gateway failure, preferring the server-supplied message
    /// over the per-operation fallback.
    pub fn from_github_api(error: GitHubApiError, fallback: &'static str) -> Self {
        match error {
            GitHubApiError::Http {
                status: 401 | 403,
                message,
            } => Self::auth(prefer(message, fallback)),
            GitHubApiError::Http {
                status: 404,
                message,
            } => Self::not_found(prefer(message, fallback)),
            GitHubApiError::Http { message, .. } => Self::runtime(prefer(message, fallback)),
            GitHubApiError::Transport(_) | GitHubApiError::InvalidResponse(_) => {
                Self::runtime(fallback)
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind {
            ErrorKind::User => 2,
            ErrorKind::Auth => 3,
            ErrorKind::NotFound => 4,
            ErrorKind::Runtime => 1,
        }
    }
}

fn prefer(message: String, fallback: &'static str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        Self::user(value.to_string())
    }
}
