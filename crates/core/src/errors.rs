use std::path::PathBuf;

use thiserror::Error;

/// Request-level failures returned to the caller. Never retried: every operation is
/// deterministic, so a retry reproduces the same error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unknown ingredient `{token}`")]
    NotFound { token: String },
}

impl DomainError {
    pub fn not_found(token: impl Into<String>) -> Self {
        Self::NotFound { token: token.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
        }
    }
}

/// Fatal load-time failures: the knowledge base violates a catalog or graph invariant.
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("could not read knowledge base `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse knowledge base: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("duplicate ingredient id `{0}`")]
    DuplicateIngredient(String),
    #[error("ingredient `{0}` has an empty id or name")]
    BlankIngredient(String),
    #[error("alias `{alias}` is shared by `{first}` and `{second}`")]
    DuplicateAlias { alias: String, first: String, second: String },
    #[error("interaction `{0}` references the same ingredient on both ends")]
    SelfLoop(String),
    #[error("interaction `{a}`/`{b}` references unknown ingredient `{missing}`")]
    DanglingEdge { a: String, b: String, missing: String },
    #[error("duplicate interaction for pair `{a}`/`{b}`")]
    DuplicateEdge { a: String, b: String },
    #[error("interaction `{a}`/`{b}` has severity {severity} (expected 1..=10)")]
    InvalidSeverity { a: String, b: String, severity: u8 },
    #[error("interaction `{a}`/`{b}` has inconsistent wait_minutes: {reason}")]
    InvalidWait { a: String, b: String, reason: &'static str },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, token: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => {
                "One of the ingredients is not in the knowledge base. Check the spelling or try another name."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl DomainError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let message = self.to_string();
        match self {
            Self::Validation(_) => InterfaceError::BadRequest { message, correlation_id },
            Self::NotFound { token } => InterfaceError::NotFound { message, token, correlation_id },
        }
    }
}

impl KnowledgeBaseError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        InterfaceError::Internal { message: self.to_string(), correlation_id: correlation_id.into() }
    }
}
