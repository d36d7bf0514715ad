//! The result record returned by every public operation.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Outcome of a tool-style operation.
///
/// Serialises flat: `{"status":"success", ...payload fields...}` or
/// `{"status":"error","error_message":"..."}`. Operations return this instead
/// of propagating errors, so the payload type `T` must serialise as a map.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResult<T> {
    Success(T),
    Error { error_message: String },
}

impl<T> ToolResult<T> {
    pub fn error(message: impl Into<String>) -> Self {
        ToolResult::Error {
            error_message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            ToolResult::Success(payload) => Some(payload),
            ToolResult::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ToolResult::Success(_) => None,
            ToolResult::Error { error_message } => Some(error_message),
        }
    }

    pub fn into_result(self) -> Result<T, String> {
        match self {
            ToolResult::Success(payload) => Ok(payload),
            ToolResult::Error { error_message } => Err(error_message),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for ToolResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(payload) => ToolResult::Success(payload),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}
