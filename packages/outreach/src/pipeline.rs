//! The run loop: discover → classify → act, with durable resume state.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classify::{ProfileClassifier, Verdict};
use crate::config::{PipelineConfig, RangeDirective};
use crate::error::{PipelineError, Result};
use crate::feed::DiscoveryFeed;
use crate::session::RenderingSession;
use crate::store::{CursorStore, SeenLedger};
use crate::submit::{OutreachExecutor, SubmissionStrategy};
use crate::types::{ActionOutcome, CardHandle, ProfileId, RunOutcome, RunReport};

/// Drives one session through discovery, classification, and outreach.
///
/// Owns the session for the whole run and calls it strictly
/// sequentially. The ledger and cursor make the run resumable: a
/// restart continues where the last one stopped, and no profile is
/// ever acted on twice.
pub struct Pipeline<S, L, C> {
    session: S,
    ledger: L,
    cursor: C,
    classifier: ProfileClassifier,
    strategy: SubmissionStrategy,
    config: PipelineConfig,
}

impl<S, L, C> Pipeline<S, L, C>
where
    S: RenderingSession,
    L: SeenLedger,
    C: CursorStore,
{
    pub fn new(
        session: S,
        ledger: L,
        cursor: C,
        config: PipelineConfig,
        strategy: SubmissionStrategy,
    ) -> Self {
        Self {
            classifier: ProfileClassifier::from_config(&config),
            session,
            ledger,
            cursor,
            strategy,
            config,
        }
    }

    /// Run until the list converges, the directive is satisfied, the
    /// session dies, or cancellation is requested.
    ///
    /// Cancellation is honored at item boundaries only: an in-flight
    /// item finishes its side effects and ledger write first, so
    /// external state and the ledger never disagree.
    pub async fn run(
        &self,
        directive: &RangeDirective,
        cancel: CancellationToken,
    ) -> Result<RunReport> {
        directive.validate()?;
        if directive.reset_cursor {
            self.cursor.reset().await?;
        }

        let persisted = self.cursor.load().await?;
        let resume = directive.start.unwrap_or(persisted);
        info!(
            resume,
            end = ?directive.end,
            limit = ?directive.limit,
            "outreach run starting"
        );

        let mut report = RunReport::new();
        let mut feed = DiscoveryFeed::new(&self.session, &self.config);
        let mut next = resume;
        let mut cursor_pos = persisted;

        let outcome = 'run: loop {
            if cancel.is_cancelled() {
                break 'run RunOutcome::Cancelled;
            }

            if let Err(e) = feed.poll().await {
                warn!(error = %e, "discovery aborted");
                break 'run RunOutcome::Aborted {
                    reason: e.to_string(),
                };
            }
            report.discovered = feed.len();

            let upper = directive.end.map_or(feed.len(), |end| end.min(feed.len()));
            if next >= upper {
                let end_satisfied = directive.end.is_some_and(|end| next >= end);
                if end_satisfied || feed.is_converged() {
                    break 'run RunOutcome::Converged;
                }
                // The requested range is beyond what is rendered so
                // far and the list may still grow.
                continue;
            }

            while next < upper {
                // Crash barrier: the in-flight item is the most a
                // restart can lose.
                self.cursor.save(next).await?;
                cursor_pos = next;

                if cancel.is_cancelled() {
                    break 'run RunOutcome::Cancelled;
                }

                if directive.limit.is_some_and(|limit| report.actioned >= limit) {
                    debug!(limit = ?directive.limit, "submission limit reached");
                    break 'run RunOutcome::Converged;
                }

                let card = feed.batch()[next].clone();
                if let Err(e) = self.process_card(&card, next, &mut report).await {
                    match e {
                        PipelineError::Session(s) => {
                            warn!(position = next, error = %s, "session lost mid-run");
                            break 'run RunOutcome::Aborted {
                                reason: s.to_string(),
                            };
                        }
                        other => return Err(other),
                    }
                }
                next += 1;
            }

            // Delta complete: everything before `next` is settled.
            self.cursor.save(next).await?;
            cursor_pos = next;
        };

        report.cursor = cursor_pos;
        report.outcome = outcome;
        info!(
            discovered = report.discovered,
            actioned = report.actioned,
            skipped = report.skipped,
            failed = report.failed,
            already_done = report.already_done,
            deferred = report.deferred,
            cursor = report.cursor,
            outcome = ?report.outcome,
            "outreach run finished"
        );
        Ok(report)
    }

    /// One item through classification and action. Every terminal
    /// decision lands in the ledger before this returns; only fatal
    /// session errors and store failures escape.
    async fn process_card(
        &self,
        card: &CardHandle,
        position: usize,
        report: &mut RunReport,
    ) -> Result<()> {
        let profile = &card.profile;

        if self.ledger.contains(profile).await? {
            debug!(profile = %profile, position, "ledger hit, nothing to do");
            report.already_done += 1;
            return Ok(());
        }

        match self.classify_card(profile).await? {
            Verdict::Eligible => {
                let executor = OutreachExecutor::new(
                    &self.session,
                    &self.ledger,
                    &self.strategy,
                    &self.config,
                );
                let outcome = executor.attempt(profile, &card.target).await?;
                match outcome {
                    ActionOutcome::Actioned => report.actioned += 1,
                    ActionOutcome::AlreadyDone => report.already_done += 1,
                    ActionOutcome::Skipped => report.skipped += 1,
                    ActionOutcome::Failed { .. } => report.failed += 1,
                }
                // Failed items are recorded too: a structurally broken
                // detail page must not trap every future run.
                self.ledger.add(profile).await?;
                info!(profile = %profile, position, outcome = ?outcome, "card handled");
            }
            Verdict::Skip(reason) => {
                info!(profile = %profile, position, %reason, "card skipped");
                self.ledger.add(profile).await?;
                report.skipped += 1;
            }
            Verdict::Undetermined => {
                debug!(profile = %profile, position, "left for a later run");
                report.deferred += 1;
            }
        }
        Ok(())
    }

    /// Open the scoped detail view, classify, and release the view on
    /// every exit path.
    async fn classify_card(&self, profile: &ProfileId) -> Result<Verdict> {
        let mut view = match self.session.open_profile(profile).await {
            Ok(view) => view,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                warn!(profile = %profile, error = %e, "profile view failed to open");
                return Ok(Verdict::Skip(crate::classify::SkipReason::DetailUnreadable));
            }
        };
        let verdict = self.classifier.classify(view.as_mut()).await;
        view.close().await;
        Ok(verdict?)
    }
}
