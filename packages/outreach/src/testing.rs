//! Scripted mock collaborators for testing.
//!
//! [`MockSession`] plays back a configured growth schedule and per-card
//! scripts without a real UI, and records every call so tests can
//! assert exactly which side effects happened. Useful for testing
//! applications that embed the pipeline as well as for the crate's own
//! tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{SessionError, SessionResult};
use crate::session::{ProfileView, RenderingSession, ThreadView};
use crate::types::{ActionTarget, CardHandle, ProfileId};

/// Deterministic card for position `n`.
pub fn card(n: usize) -> CardHandle {
    CardHandle {
        profile: ProfileId::parse(&format!("https://network.example/in/member-{}", n))
            .expect("static test url"),
        target: ActionTarget::new(format!("https://network.example/msg/member-{}", n)),
    }
}

/// The first `n` deterministic cards.
pub fn cards(n: usize) -> Vec<CardHandle> {
    (0..n).map(card).collect()
}

/// Scripted behavior of one profile detail view.
#[derive(Debug, Clone, Default)]
pub struct ProfileScript {
    /// Raw affiliation label, when rendered.
    pub company_label: Option<String>,

    /// Whether the experience section exists.
    pub has_experience: bool,

    /// Raw first experience entry, when readable.
    pub experience_company: Option<String>,

    /// The view fails to open (transient element-missing error).
    pub fail_open: bool,
}

/// Scripted behavior of one action view.
#[derive(Debug, Clone, Default)]
pub struct ThreadScript {
    /// Short label shown in the view.
    pub subtitle: Option<String>,

    /// Whether a conversation thread already exists.
    pub has_thread: bool,

    /// How many leading submission attempts fail transiently
    /// (`u32::MAX` for always).
    pub failing_attempts: u32,

    /// The view fails to open (transient element-missing error).
    pub fail_open: bool,
}

/// Record of one call made to the mock session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    ListCards,
    TriggerReveal,
    ScrollToEnd,
    OpenProfile(ProfileId),
    OpenThread(ActionTarget),
    Submit(ActionTarget),
}

#[derive(Default)]
struct MockSessionState {
    /// Successive list snapshots; the last one repeats forever.
    snapshots: RwLock<Vec<Vec<CardHandle>>>,
    list_polls: AtomicUsize,
    reveal_control: RwLock<bool>,
    fail_reveal: RwLock<bool>,
    /// List queries at or after this index fail fatally.
    lose_after_cards: RwLock<Option<usize>>,
    profiles: RwLock<HashMap<ProfileId, ProfileScript>>,
    threads: RwLock<HashMap<ActionTarget, ThreadScript>>,
    submit_attempts: RwLock<HashMap<ActionTarget, u32>>,
    calls: RwLock<Vec<SessionCall>>,
    submissions: RwLock<Vec<(ActionTarget, String)>>,
    profile_opens: AtomicUsize,
    profile_closes: AtomicUsize,
    thread_opens: AtomicUsize,
    thread_closes: AtomicUsize,
}

impl MockSessionState {
    fn record(&self, call: SessionCall) {
        self.calls.write().unwrap().push(call);
    }
}

/// Scripted rendering session. State is shared across clones, so a test
/// keeps a handle for assertions while the pipeline owns another.
#[derive(Clone)]
pub struct MockSession {
    state: Arc<MockSessionState>,
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSession {
    pub fn new() -> Self {
        let state = MockSessionState::default();
        *state.reveal_control.write().unwrap() = true;
        Self {
            state: Arc::new(state),
        }
    }

    /// Set the growth schedule: snapshot returned per list query, last
    /// repeating forever.
    pub fn with_cards(self, snapshots: Vec<Vec<CardHandle>>) -> Self {
        *self.state.snapshots.write().unwrap() = snapshots;
        self
    }

    /// Script the detail view for a profile.
    pub fn with_profile(self, profile: &ProfileId, script: ProfileScript) -> Self {
        self.state
            .profiles
            .write()
            .unwrap()
            .insert(profile.clone(), script);
        self
    }

    /// Script the action view for a target.
    pub fn with_thread(self, target: &ActionTarget, script: ThreadScript) -> Self {
        self.state
            .threads
            .write()
            .unwrap()
            .insert(target.clone(), script);
        self
    }

    /// Whether a load-more control is present (default true).
    pub fn with_reveal_control(self, present: bool) -> Self {
        *self.state.reveal_control.write().unwrap() = present;
        self
    }

    /// Make every reveal attempt fail transiently.
    pub fn failing_reveal(self) -> Self {
        *self.state.fail_reveal.write().unwrap() = true;
        self
    }

    /// Fail list queries fatally from the given query index on.
    pub fn lose_session_after_cards(self, queries: usize) -> Self {
        *self.state.lose_after_cards.write().unwrap() = Some(queries);
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<SessionCall> {
        self.state.calls.read().unwrap().clone()
    }

    /// All confirmed submissions: (target, content).
    pub fn submissions(&self) -> Vec<(ActionTarget, String)> {
        self.state.submissions.read().unwrap().clone()
    }

    /// Every opened profile view was also closed.
    pub fn profile_views_balanced(&self) -> bool {
        self.state.profile_opens.load(Ordering::SeqCst)
            == self.state.profile_closes.load(Ordering::SeqCst)
    }

    /// Every opened action view was also closed.
    pub fn thread_views_balanced(&self) -> bool {
        self.state.thread_opens.load(Ordering::SeqCst)
            == self.state.thread_closes.load(Ordering::SeqCst)
    }

    /// Build a detail view directly, bypassing the session trait.
    /// Lets classifier tests drive a view without a pipeline.
    pub fn open_profile_view(&self, profile: &ProfileId) -> MockProfileView {
        let script = self
            .state
            .profiles
            .read()
            .unwrap()
            .get(profile)
            .cloned()
            .unwrap_or_default();
        MockProfileView {
            script,
            state: self.state.clone(),
        }
    }
}

#[async_trait]
impl RenderingSession for MockSession {
    async fn current_location(&self) -> SessionResult<String> {
        Ok("https://network.example/connections".into())
    }

    async fn connection_cards(&self) -> SessionResult<Vec<CardHandle>> {
        self.state.record(SessionCall::ListCards);
        let index = self.state.list_polls.fetch_add(1, Ordering::SeqCst);
        if let Some(after) = *self.state.lose_after_cards.read().unwrap() {
            if index >= after {
                return Err(SessionError::SessionLost("rendering session gone".into()));
            }
        }
        let snapshots = self.state.snapshots.read().unwrap();
        match snapshots.len() {
            0 => Ok(Vec::new()),
            len => Ok(snapshots[index.min(len - 1)].clone()),
        }
    }

    async fn trigger_reveal(&self) -> SessionResult<bool> {
        self.state.record(SessionCall::TriggerReveal);
        if *self.state.fail_reveal.read().unwrap() {
            return Err(SessionError::Interaction("load-more click failed".into()));
        }
        Ok(*self.state.reveal_control.read().unwrap())
    }

    async fn scroll_to_end(&self) -> SessionResult<()> {
        self.state.record(SessionCall::ScrollToEnd);
        Ok(())
    }

    async fn open_profile(&self, profile: &ProfileId) -> SessionResult<Box<dyn ProfileView>> {
        self.state.record(SessionCall::OpenProfile(profile.clone()));
        let script = self
            .state
            .profiles
            .read()
            .unwrap()
            .get(profile)
            .cloned()
            .unwrap_or_default();
        if script.fail_open {
            return Err(SessionError::ElementMissing(format!(
                "profile view for {}",
                profile
            )));
        }
        self.state.profile_opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockProfileView {
            script,
            state: self.state.clone(),
        }))
    }

    async fn open_thread(&self, target: &ActionTarget) -> SessionResult<Box<dyn ThreadView>> {
        self.state.record(SessionCall::OpenThread(target.clone()));
        let script = self
            .state
            .threads
            .read()
            .unwrap()
            .get(target)
            .cloned()
            .unwrap_or_default();
        if script.fail_open {
            return Err(SessionError::ElementMissing(format!(
                "action view for {}",
                target
            )));
        }
        self.state.thread_opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockThreadView {
            target: target.clone(),
            script,
            state: self.state.clone(),
        }))
    }
}

/// Scripted profile detail view.
pub struct MockProfileView {
    script: ProfileScript,
    state: Arc<MockSessionState>,
}

#[async_trait]
impl ProfileView for MockProfileView {
    async fn current_company_label(&mut self) -> SessionResult<Option<String>> {
        Ok(self.script.company_label.clone())
    }

    async fn has_experience_section(&mut self) -> SessionResult<bool> {
        Ok(self.script.has_experience)
    }

    async fn company_from_experience(&mut self) -> SessionResult<Option<String>> {
        Ok(self.script.experience_company.clone())
    }

    async fn close(self: Box<Self>) {
        self.state.profile_closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted action view.
pub struct MockThreadView {
    target: ActionTarget,
    script: ThreadScript,
    state: Arc<MockSessionState>,
}

#[async_trait]
impl ThreadView for MockThreadView {
    async fn has_existing_thread(&mut self) -> SessionResult<bool> {
        Ok(self.script.has_thread)
    }

    async fn subtitle(&mut self) -> SessionResult<Option<String>> {
        Ok(self.script.subtitle.clone())
    }

    async fn submit(&mut self, content: &str) -> SessionResult<bool> {
        self.state.record(SessionCall::Submit(self.target.clone()));
        {
            let mut attempts = self.state.submit_attempts.write().unwrap();
            let made = attempts.entry(self.target.clone()).or_insert(0);
            *made += 1;
            if *made <= self.script.failing_attempts {
                return Err(SessionError::Timeout(format!(
                    "send control for {}",
                    self.target
                )));
            }
        }
        self.state
            .submissions
            .write()
            .unwrap()
            .push((self.target.clone(), content.to_string()));
        Ok(true)
    }

    async fn close(self: Box<Self>) {
        self.state.thread_closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn growth_schedule_repeats_last_snapshot() {
        let session = MockSession::new().with_cards(vec![cards(2), cards(5)]);
        assert_eq!(session.connection_cards().await.unwrap().len(), 2);
        assert_eq!(session.connection_cards().await.unwrap().len(), 5);
        assert_eq!(session.connection_cards().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn submit_honors_failing_attempts() {
        let target = card(0).target;
        let script = ThreadScript {
            failing_attempts: 1,
            ..ThreadScript::default()
        };
        let session = MockSession::new().with_thread(&target, script);
        let mut view = session.open_thread(&target).await.unwrap();

        assert!(view.submit("hello").await.is_err());
        assert!(view.submit("hello").await.unwrap());
        assert_eq!(session.submissions().len(), 1);
    }
}
