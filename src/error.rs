// src/error.rs
//! Errors that reach the caller. Source failures never appear here: fetchers
//! degrade to not-found on their own.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Blank or absent identifier. Raised before any fetch is started.
    #[error("identifier is required")]
    MissingIdentifier,
}

#[derive(Debug, Error)]
pub enum AssistantError {
    /// No API key configured; the provider was not contacted.
    #[error("assistant is not configured: {0} is not set")]
    MissingCredential(&'static str),

    #[error("assistant provider failed: {0}")]
    Upstream(String),
}

impl AssistantError {
    pub fn upstream(e: impl std::fmt::Display) -> Self {
        AssistantError::Upstream(e.to_string())
    }
}
