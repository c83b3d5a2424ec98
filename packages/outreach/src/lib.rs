//! Resumable Outreach Pipeline
//!
//! Incrementally discovers entries of a lazily-growing, UI-rendered
//! connection list and applies an idempotent outreach action (a
//! templated message, or a note-less invite) to each eligible profile
//! exactly once, across process restarts and transient failures of
//! the interaction layer.
//!
//! # Design Philosophy
//!
//! - The ledger is the truth: an id recorded there is never acted on again
//! - Forward progress over completeness: broken profiles are recorded, not retried forever
//! - Explicit result variants, not swallowed exceptions
//! - One session, strictly sequential; scoped views released on every path
//!
//! # Usage
//!
//! ```rust,ignore
//! use outreach::{
//!     FileCursor, FileLedger, Pipeline, PipelineConfig, RangeDirective,
//!     SubmissionStrategy,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! let session = /* your RenderingSession implementation */;
//! let ledger = FileLedger::open("state/seen.txt").await?;
//! let cursor = FileCursor::new("state/cursor.txt");
//! let config = PipelineConfig::new().with_skip_words(["acme corp"]);
//! let strategy = SubmissionStrategy::Message { text: template };
//!
//! let pipeline = Pipeline::new(session, ledger, cursor, config, strategy);
//! let report = pipeline
//!     .run(&RangeDirective::resume(), CancellationToken::new())
//!     .await?;
//! println!("sent {}, skipped {}", report.actioned, report.skipped);
//! ```
//!
//! # Modules
//!
//! - [`session`] - Collaborator traits the pipeline drives
//! - [`feed`] - Incremental discovery with convergence detection
//! - [`classify`] - Eligible/skip decisions via ordered signal strategies
//! - [`submit`] - Bounded-retry execution with an idempotency guard
//! - [`store`] - Durable ledger and cursor (file-backed and in-memory)
//! - [`pipeline`] - The orchestrating run loop
//! - [`testing`] - Scripted mock collaborators

pub mod classify;
pub mod config;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod session;
pub mod store;
pub mod submit;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use classify::{ProfileClassifier, SignalStrategy, SkipReason, Verdict};
pub use config::{PipelineConfig, RangeDirective, SkipList, UnclassifiedPolicy};
pub use error::{PipelineError, SessionError, StorageError};
pub use feed::DiscoveryFeed;
pub use pipeline::Pipeline;
pub use session::{ProfileView, RenderingSession, ThreadView};
pub use store::{
    CursorStore, FileCursor, FileLedger, MemoryCursor, MemoryLedger, SeenLedger,
};
pub use submit::{OutreachExecutor, SubmissionStrategy};
pub use types::{
    ActionOutcome, ActionTarget, CardHandle, ProfileId, RunOutcome, RunReport,
};

// Re-export testing utilities
pub use testing::{MockSession, ProfileScript, SessionCall, ThreadScript};
