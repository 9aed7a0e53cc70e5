//! Unified application error model and mapping helpers.
//! Every filesystem operation and HTTP handler reports failures through `AppError`;
//! the HTTP layer turns it into a status code plus a JSON body.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::io;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    Forbidden { code: String, message: String },
    NotFound { code: String, message: String },
    NotADirectory { code: String, message: String },
    Conflict { code: String, message: String },
    PayloadTooLarge { code: String, message: String },
    Io { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::NotADirectory { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::PayloadTooLarge { code, .. }
            | AppError::Io { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::NotADirectory { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::PayloadTooLarge { message, .. }
            | AppError::Io { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn forbidden<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }
    pub fn not_found<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn not_a_directory<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::NotADirectory { code: code.into(), message: msg.into() } }
    pub fn conflict<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Conflict { code: code.into(), message: msg.into() } }
    pub fn too_large<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::PayloadTooLarge { code: code.into(), message: msg.into() } }
    pub fn io<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Io { code: code.into(), message: msg.into() } }
    pub fn internal<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self { AppError::Internal { code: code.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::Forbidden { .. } => 403,
            AppError::NotFound { .. } => 404,
            AppError::NotADirectory { .. } => 400,
            AppError::Conflict { .. } => 409,
            AppError::PayloadTooLarge { .. } => 413,
            AppError::Io { .. } => 500,
            AppError::Internal { .. } => 500,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal { code: "internal_error".into(), message: err.to_string() }
    }
}

/// Build a mapper from `io::Error` to `AppError` that keeps the OS message verbatim.
/// `NotFound` surfaces as 404; everything else (permissions, disk, cross-device) as 500.
pub fn io_failure(context: &'static str) -> impl FnOnce(io::Error) -> AppError {
    move |err| match err.kind() {
        io::ErrorKind::NotFound => AppError::not_found("not_found", format!("{}: {}", context, err)),
        _ => AppError::io("io_error", format!("{}: {}", context, err)),
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod error_tests;
