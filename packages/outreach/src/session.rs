//! Collaborator traits for the rendering session the pipeline drives.
//!
//! The pipeline owns exactly one logical session for a whole run and
//! calls it strictly sequentially. Implementations wrap whatever drives
//! the real UI; the [`testing`](crate::testing) module provides scripted
//! mocks. Locator strategy is entirely the implementation's concern;
//! the pipeline only sees handles, signals, and booleans.

use async_trait::async_trait;

use crate::error::SessionResult;
use crate::types::{ActionTarget, CardHandle, ProfileId};

/// One focused browsing context over the connection list.
///
/// Every method is a blocking (awaited) interaction; the session is not
/// safely shareable across concurrent operations and the pipeline never
/// tries to.
#[async_trait]
pub trait RenderingSession: Send + Sync {
    /// Location of the list view currently rendered.
    async fn current_location(&self) -> SessionResult<String>;

    /// All connection cards currently rendered, in list order.
    ///
    /// The result supersedes any previous one; callers diff by length.
    async fn connection_cards(&self) -> SessionResult<Vec<CardHandle>>;

    /// Trigger one "load more" action. Returns whether a control was
    /// found to trigger; `false` is not an error, it directs the caller
    /// to the [`scroll_to_end`](RenderingSession::scroll_to_end) fallback.
    async fn trigger_reveal(&self) -> SessionResult<bool>;

    /// Generic fallback reveal: scroll the list to its end.
    async fn scroll_to_end(&self) -> SessionResult<()>;

    /// Open the scoped profile detail view for classification.
    async fn open_profile(&self, profile: &ProfileId) -> SessionResult<Box<dyn ProfileView>>;

    /// Open the scoped action view where the submission happens.
    async fn open_thread(&self, target: &ActionTarget) -> SessionResult<Box<dyn ThreadView>>;
}

/// Scoped detail view over one profile.
///
/// Opened per classification and closed on every exit path; [`close`]
/// returns focus to the list view. Reads are ordered cheapest-first by
/// the classifier, so implementations should not prefetch.
///
/// [`close`]: ProfileView::close
#[async_trait]
pub trait ProfileView: Send {
    /// Primary signal: the raw current-affiliation label, when rendered
    /// (e.g. `"Current company: Acme Corp. Click for details"`).
    async fn current_company_label(&mut self) -> SessionResult<Option<String>>;

    /// Secondary signal: whether the experience/history section exists.
    async fn has_experience_section(&mut self) -> SessionResult<bool>;

    /// Tertiary signal: raw text of the first experience entry, when
    /// readable (e.g. `"Globex · Full-time"`).
    async fn company_from_experience(&mut self) -> SessionResult<Option<String>>;

    /// Release the view and return to the list. Best effort: a view that
    /// fails to close is abandoned, never left blocking the caller.
    async fn close(self: Box<Self>);
}

/// Scoped action view for one outreach target.
#[async_trait]
pub trait ThreadView: Send {
    /// Whether a conversation thread already exists, which is evidence
    /// the action was completed through another path.
    async fn has_existing_thread(&mut self) -> SessionResult<bool>;

    /// Short descriptive label shown in the view (e.g. the contact's
    /// title line), used for precondition skip checks.
    async fn subtitle(&mut self) -> SessionResult<Option<String>>;

    /// Perform one submission attempt with the given content (empty for
    /// note-less invites). `Ok(false)` means the primitives were present
    /// but the submission was not confirmed.
    async fn submit(&mut self, content: &str) -> SessionResult<bool>;

    /// Release the view and return to the list. Best effort.
    async fn close(self: Box<Self>);
}
