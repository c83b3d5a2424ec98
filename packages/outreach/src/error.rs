//! Typed errors for the outreach pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors raised by a single rendering-session call.
///
/// Most variants are transient: one element was missing, stale, or slow.
/// Only [`SessionError::SessionLost`] is fatal, meaning the session itself
/// is unusable and the run must abort. Callers branch on
/// [`SessionError::is_fatal`] rather than matching variants directly.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A queried element was not present in the rendered view.
    #[error("element missing: {0}")]
    ElementMissing(String),

    /// An interaction did not complete within its bounded wait.
    #[error("interaction timed out: {0}")]
    Timeout(String),

    /// An interaction primitive failed (click rejected, input not focusable).
    #[error("interaction failed: {0}")]
    Interaction(String),

    /// The session itself is gone (window closed, connection dropped).
    #[error("session lost: {0}")]
    SessionLost(String),
}

impl SessionError {
    /// Whether this error means the whole session is unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::SessionLost(_))
    }
}

/// Errors from the durable ledger and cursor stores.
///
/// Always fatal to a run: without the ledger the pipeline cannot
/// guarantee an item is acted on at most once.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A state file exists but cannot be interpreted.
    #[error("corrupt state file {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Run-level errors surfaced by the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The rendering session became unusable mid-run.
    #[error("session unusable: {0}")]
    Session(#[from] SessionError),

    /// Ledger or cursor persistence failed.
    #[error("state store failure: {0}")]
    Storage(#[from] StorageError),

    /// The range directive was rejected before discovery began.
    #[error("invalid range directive: {reason}")]
    InvalidDirective { reason: String },
}

/// Result alias for session calls.
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Result alias for store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
