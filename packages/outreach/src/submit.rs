//! Outreach execution: bounded-retry submission with an idempotency guard.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{PipelineConfig, SkipList};
use crate::error::{PipelineError, SessionError};
use crate::session::{RenderingSession, ThreadView};
use crate::store::SeenLedger;
use crate::types::{ActionOutcome, ActionTarget, ProfileId};

/// How the effectful submission is performed once preconditions pass.
///
/// The divergent submit flows of manual outreach collapse into these
/// variants; the session implementation owns the concrete key/click
/// sequence behind [`ThreadView::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStrategy {
    /// Compose a templated message in the conversation thread.
    Message {
        /// Message body, built by the caller.
        text: String,
    },

    /// Confirm an invitation dialog without attaching a note.
    InviteWithoutNote,
}

impl SubmissionStrategy {
    /// Content handed to the submission primitive; empty for note-less
    /// invites.
    pub fn content(&self) -> &str {
        match self {
            SubmissionStrategy::Message { text } => text,
            SubmissionStrategy::InviteWithoutNote => "",
        }
    }

    async fn submit(&self, view: &mut dyn ThreadView) -> Result<bool, SessionError> {
        view.submit(self.content()).await
    }
}

/// Performs the outreach action for one eligible profile.
///
/// Ledger first, preconditions second, submission last. The scoped
/// action view is released on every exit path.
pub struct OutreachExecutor<'a, S, L> {
    session: &'a S,
    ledger: &'a L,
    strategy: &'a SubmissionStrategy,
    skip_words: &'a SkipList,
    retry_limit: u32,
    retry_delay: Duration,
}

impl<'a, S: RenderingSession, L: SeenLedger> OutreachExecutor<'a, S, L> {
    pub fn new(
        session: &'a S,
        ledger: &'a L,
        strategy: &'a SubmissionStrategy,
        config: &'a PipelineConfig,
    ) -> Self {
        Self {
            session,
            ledger,
            strategy,
            skip_words: &config.skip_words,
            retry_limit: config.retry_limit,
            retry_delay: config.retry_delay,
        }
    }

    /// Attempt the action for `profile` inside the view at `target`.
    ///
    /// Returns [`ActionOutcome::AlreadyDone`] without any side effect
    /// when the ledger already has the profile. Transient failures
    /// degrade the outcome; only fatal session errors and store
    /// failures surface as errors.
    pub async fn attempt(
        &self,
        profile: &ProfileId,
        target: &ActionTarget,
    ) -> Result<ActionOutcome, PipelineError> {
        if self.ledger.contains(profile).await? {
            debug!(profile = %profile, "already in ledger, no attempt");
            return Ok(ActionOutcome::AlreadyDone);
        }

        let mut view = match self.session.open_thread(target).await {
            Ok(view) => view,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(profile = %profile, error = %e, "action view failed to open");
                return Ok(ActionOutcome::Failed { attempts: 0 });
            }
        };

        let outcome = self.drive(profile, view.as_mut()).await;
        view.close().await;
        Ok(outcome?)
    }

    /// Preconditions plus the bounded retry loop, inside the open view.
    /// Only fatal errors escape.
    async fn drive(
        &self,
        profile: &ProfileId,
        view: &mut dyn ThreadView,
    ) -> Result<ActionOutcome, SessionError> {
        match view.subtitle().await {
            Ok(Some(text)) if self.skip_words.matches_text(&text) => {
                info!(profile = %profile, "skip word in subtitle");
                return Ok(ActionOutcome::Skipped);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => debug!(profile = %profile, error = %e, "subtitle unreadable, proceeding"),
            _ => {}
        }

        match view.has_existing_thread().await {
            Ok(true) => {
                info!(profile = %profile, "conversation already exists");
                return Ok(ActionOutcome::AlreadyDone);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => debug!(profile = %profile, error = %e, "thread check failed, proceeding"),
            Ok(false) => {}
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.strategy.submit(view).await {
                Ok(true) => {
                    info!(profile = %profile, attempt, "submission confirmed");
                    return Ok(ActionOutcome::Actioned);
                }
                Ok(false) => {
                    warn!(profile = %profile, attempt, "submission not confirmed");
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(profile = %profile, attempt, error = %e, "submission attempt failed");
                }
            }
            if attempt >= self.retry_limit {
                warn!(profile = %profile, attempts = attempt, "submission attempts exhausted");
                return Ok(ActionOutcome::Failed { attempts: attempt });
            }
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedger;
    use crate::testing::{MockSession, SessionCall, ThreadScript};

    fn profile() -> ProfileId {
        ProfileId::parse("https://network.example/in/alice").unwrap()
    }

    fn target() -> ActionTarget {
        ActionTarget::new("https://network.example/msg/alice")
    }

    fn quick_config() -> PipelineConfig {
        PipelineConfig::new()
            .with_retry_delay(Duration::ZERO)
            .with_skip_words(["recruiter"])
    }

    fn message() -> SubmissionStrategy {
        SubmissionStrategy::Message {
            text: "Hi, happy to connect!".into(),
        }
    }

    #[tokio::test]
    async fn first_attempt_success_submits_once() {
        let session = MockSession::new().with_thread(&target(), ThreadScript::default());
        let ledger = MemoryLedger::new();
        let config = quick_config();
        let strategy = message();
        let executor = OutreachExecutor::new(&session, &ledger, &strategy, &config);

        let outcome = executor.attempt(&profile(), &target()).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Actioned);
        assert_eq!(session.submissions().len(), 1);
        assert_eq!(session.submissions()[0].1, "Hi, happy to connect!");
    }

    #[tokio::test]
    async fn ledger_hit_short_circuits_with_no_side_effects() {
        let session = MockSession::new().with_thread(&target(), ThreadScript::default());
        let ledger = MemoryLedger::new();
        ledger.add(&profile()).await.unwrap();
        let config = quick_config();
        let strategy = message();
        let executor = OutreachExecutor::new(&session, &ledger, &strategy, &config);

        let outcome = executor.attempt(&profile(), &target()).await.unwrap();
        assert_eq!(outcome, ActionOutcome::AlreadyDone);
        assert!(session.calls().is_empty());
        assert!(session.submissions().is_empty());
    }

    #[tokio::test]
    async fn retry_bound_is_exact() {
        let script = ThreadScript {
            failing_attempts: u32::MAX,
            ..ThreadScript::default()
        };
        let session = MockSession::new().with_thread(&target(), script);
        let ledger = MemoryLedger::new();
        let config = quick_config();
        let strategy = message();
        let executor = OutreachExecutor::new(&session, &ledger, &strategy, &config);

        let outcome = executor.attempt(&profile(), &target()).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Failed { attempts: 3 });
        let submit_calls = session
            .calls()
            .iter()
            .filter(|c| matches!(c, SessionCall::Submit(_)))
            .count();
        assert_eq!(submit_calls, 3);
    }

    #[tokio::test]
    async fn second_attempt_after_recording_is_already_done() {
        let session = MockSession::new().with_thread(&target(), ThreadScript::default());
        let ledger = MemoryLedger::new();
        let config = quick_config();
        let strategy = message();
        let executor = OutreachExecutor::new(&session, &ledger, &strategy, &config);

        let first = executor.attempt(&profile(), &target()).await.unwrap();
        assert_eq!(first, ActionOutcome::Actioned);
        ledger.add(&profile()).await.unwrap();

        let second = executor.attempt(&profile(), &target()).await.unwrap();
        assert_eq!(second, ActionOutcome::AlreadyDone);
        assert_eq!(session.submissions().len(), 1);
    }

    #[tokio::test]
    async fn transient_failures_then_success() {
        let script = ThreadScript {
            failing_attempts: 2,
            ..ThreadScript::default()
        };
        let session = MockSession::new().with_thread(&target(), script);
        let ledger = MemoryLedger::new();
        let config = quick_config();
        let strategy = message();
        let executor = OutreachExecutor::new(&session, &ledger, &strategy, &config);

        let outcome = executor.attempt(&profile(), &target()).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Actioned);
        assert_eq!(session.submissions().len(), 1);
    }

    #[tokio::test]
    async fn skip_word_in_subtitle_aborts_without_submission() {
        let script = ThreadScript {
            subtitle: Some("Technical Recruiter at Globex".into()),
            ..ThreadScript::default()
        };
        let session = MockSession::new().with_thread(&target(), script);
        let ledger = MemoryLedger::new();
        let config = quick_config();
        let strategy = message();
        let executor = OutreachExecutor::new(&session, &ledger, &strategy, &config);

        let outcome = executor.attempt(&profile(), &target()).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Skipped);
        assert!(session.submissions().is_empty());
    }

    #[tokio::test]
    async fn existing_thread_is_already_done_without_submission() {
        let script = ThreadScript {
            has_thread: true,
            ..ThreadScript::default()
        };
        let session = MockSession::new().with_thread(&target(), script);
        let ledger = MemoryLedger::new();
        let config = quick_config();
        let strategy = message();
        let executor = OutreachExecutor::new(&session, &ledger, &strategy, &config);

        let outcome = executor.attempt(&profile(), &target()).await.unwrap();
        assert_eq!(outcome, ActionOutcome::AlreadyDone);
        assert!(session.submissions().is_empty());
    }

    #[tokio::test]
    async fn invite_without_note_submits_empty_content() {
        let session = MockSession::new().with_thread(&target(), ThreadScript::default());
        let ledger = MemoryLedger::new();
        let config = quick_config();
        let strategy = SubmissionStrategy::InviteWithoutNote;
        let executor = OutreachExecutor::new(&session, &ledger, &strategy, &config);

        let outcome = executor.attempt(&profile(), &target()).await.unwrap();
        assert_eq!(outcome, ActionOutcome::Actioned);
        assert_eq!(session.submissions()[0].1, "");
    }

    #[tokio::test]
    async fn action_view_is_released_on_every_path() {
        for script in [
            ThreadScript::default(),
            ThreadScript {
                subtitle: Some("recruiter".into()),
                ..ThreadScript::default()
            },
            ThreadScript {
                failing_attempts: u32::MAX,
                ..ThreadScript::default()
            },
        ] {
            let session = MockSession::new().with_thread(&target(), script);
            let ledger = MemoryLedger::new();
            let config = quick_config();
            let strategy = message();
            let executor = OutreachExecutor::new(&session, &ledger, &strategy, &config);
            executor.attempt(&profile(), &target()).await.unwrap();
            assert!(session.thread_views_balanced());
        }
    }
}
