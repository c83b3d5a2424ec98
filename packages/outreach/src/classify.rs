//! Profile classification: decide eligible / skip from a scoped detail view.

use std::fmt;

use tracing::debug;

use crate::config::{PipelineConfig, SkipList, UnclassifiedPolicy};
use crate::error::{SessionError, SessionResult};
use crate::session::ProfileView;

/// Prefix of the rendered current-affiliation label.
const AFFILIATION_PREFIX: &str = "Current company:";

/// Classification decision for one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Act on this profile.
    Eligible,

    /// Do not act; permanent, ledgered immediately by the orchestrator.
    Skip(SkipReason),

    /// No signal and the policy defers the decision to a later run.
    /// Never ledgered.
    Undetermined,
}

/// Why a profile was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The extracted affiliation matched the skip list.
    AffiliationMatched(String),

    /// No readable signal anywhere on the profile.
    NoSignal,

    /// The detail view could not be opened or read at all.
    DetailUnreadable,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AffiliationMatched(company) => {
                write!(f, "affiliation matched skip list: {}", company)
            }
            SkipReason::NoSignal => f.write_str("no classification signal"),
            SkipReason::DetailUnreadable => f.write_str("detail view unreadable"),
        }
    }
}

/// One way to obtain an affiliation signal from the detail view.
///
/// Strategies are tried in order; the first that yields a signal decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalStrategy {
    /// The current-affiliation label rendered near the profile header.
    AffiliationLabel,

    /// The experience/history section: its presence alone is a signal,
    /// and the first entry may still yield a company name.
    ExperienceHistory,
}

/// What a signal strategy observed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CompanySignal {
    /// An affiliation was extracted; decide by skip-list membership.
    Company(String),

    /// The profile has detail but the affiliation is unreadable;
    /// proceed optimistically.
    Unreadable,
}

impl SignalStrategy {
    async fn probe(
        &self,
        view: &mut dyn ProfileView,
    ) -> SessionResult<Option<CompanySignal>> {
        match self {
            SignalStrategy::AffiliationLabel => {
                let label = view.current_company_label().await?;
                Ok(label
                    .as_deref()
                    .and_then(affiliation_company)
                    .map(CompanySignal::Company))
            }
            SignalStrategy::ExperienceHistory => {
                if !view.has_experience_section().await? {
                    return Ok(None);
                }
                match view.company_from_experience().await {
                    Ok(Some(raw)) => Ok(Some(
                        experience_company(&raw)
                            .map(CompanySignal::Company)
                            .unwrap_or(CompanySignal::Unreadable),
                    )),
                    Ok(None) => Ok(Some(CompanySignal::Unreadable)),
                    Err(e) if e.is_fatal() => Err(e),
                    // The section exists; an unreadable entry does not
                    // disqualify the profile.
                    Err(_) => Ok(Some(CompanySignal::Unreadable)),
                }
            }
        }
    }
}

/// Extract the company name from the raw affiliation label.
///
/// The label reads `"Current company: Acme Corp. <trailing text>"`; the
/// name is everything between the prefix and the first period.
fn affiliation_company(raw: &str) -> Option<String> {
    let (_, rest) = raw.split_once(AFFILIATION_PREFIX)?;
    let company = rest.split('.').next().unwrap_or("").trim();
    (!company.is_empty()).then(|| company.to_string())
}

/// Extract the company name from an experience entry such as
/// `"Globex · Full-time"`.
fn experience_company(raw: &str) -> Option<String> {
    let company = raw.split('·').next().unwrap_or("").trim();
    (!company.is_empty()).then(|| company.to_string())
}

/// Classifies profiles through the ordered signal strategies.
pub struct ProfileClassifier {
    skip_words: SkipList,
    policy: UnclassifiedPolicy,
    strategies: Vec<SignalStrategy>,
}

impl ProfileClassifier {
    pub fn new(skip_words: SkipList, policy: UnclassifiedPolicy) -> Self {
        Self {
            skip_words,
            policy,
            strategies: vec![
                SignalStrategy::AffiliationLabel,
                SignalStrategy::ExperienceHistory,
            ],
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.skip_words.clone(), config.unclassified)
    }

    /// Override the strategy order.
    pub fn with_strategies(mut self, strategies: Vec<SignalStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Classify the profile behind an open detail view.
    ///
    /// Only fatal session errors escape; a transient failure in one
    /// strategy falls through to the next, and exhausting all
    /// strategies resolves by the unclassified policy, never an error.
    pub async fn classify(&self, view: &mut dyn ProfileView) -> Result<Verdict, SessionError> {
        for strategy in &self.strategies {
            let signal = match strategy.probe(view).await {
                Ok(signal) => signal,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    debug!(strategy = ?strategy, error = %e, "signal probe failed");
                    continue;
                }
            };
            match signal {
                Some(CompanySignal::Company(company)) => {
                    return Ok(if self.skip_words.matches_company(&company) {
                        Verdict::Skip(SkipReason::AffiliationMatched(company))
                    } else {
                        Verdict::Eligible
                    });
                }
                Some(CompanySignal::Unreadable) => return Ok(Verdict::Eligible),
                None => continue,
            }
        }

        Ok(match self.policy {
            UnclassifiedPolicy::RecordSkip => Verdict::Skip(SkipReason::NoSignal),
            UnclassifiedPolicy::RetryLater => Verdict::Undetermined,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockSession, ProfileScript};
    use crate::types::ProfileId;

    fn classifier(skip: &[&str]) -> ProfileClassifier {
        ProfileClassifier::new(SkipList::new(skip.iter().copied()), UnclassifiedPolicy::RecordSkip)
    }

    fn profile() -> ProfileId {
        ProfileId::parse("https://network.example/in/alice").unwrap()
    }

    async fn classify_with(script: ProfileScript, skip: &[&str]) -> Verdict {
        let id = profile();
        let session = MockSession::new().with_profile(&id, script);
        let mut view = session.open_profile_view(&id);
        classifier(skip).classify(&mut view).await.unwrap()
    }

    #[test]
    fn affiliation_label_parsing() {
        assert_eq!(
            affiliation_company("Current company: Acme Corp. Click for details"),
            Some("Acme Corp".to_string())
        );
        assert_eq!(affiliation_company("Current company:  Globex "), Some("Globex".to_string()));
        assert_eq!(affiliation_company("Followers: 120"), None);
        assert_eq!(affiliation_company("Current company: ."), None);
    }

    #[test]
    fn experience_entry_parsing() {
        assert_eq!(experience_company("Globex · Full-time"), Some("Globex".to_string()));
        assert_eq!(experience_company("  Initech  "), Some("Initech".to_string()));
        assert_eq!(experience_company(" · Part-time"), None);
    }

    #[tokio::test]
    async fn affiliation_match_skips() {
        let script = ProfileScript {
            company_label: Some("Current company: Acme Corp. More".into()),
            ..ProfileScript::default()
        };
        let verdict = classify_with(script, &["acme corp"]).await;
        assert_eq!(
            verdict,
            Verdict::Skip(SkipReason::AffiliationMatched("Acme Corp".into()))
        );
    }

    #[tokio::test]
    async fn affiliation_without_match_is_eligible() {
        let script = ProfileScript {
            company_label: Some("Current company: Initech. More".into()),
            ..ProfileScript::default()
        };
        assert_eq!(classify_with(script, &["acme corp"]).await, Verdict::Eligible);
    }

    #[tokio::test]
    async fn experience_presence_is_optimistically_eligible() {
        let script = ProfileScript {
            has_experience: true,
            ..ProfileScript::default()
        };
        assert_eq!(classify_with(script, &["acme corp"]).await, Verdict::Eligible);
    }

    #[tokio::test]
    async fn experience_entry_match_skips() {
        let script = ProfileScript {
            has_experience: true,
            experience_company: Some("Acme Corp · Full-time".into()),
            ..ProfileScript::default()
        };
        assert_eq!(
            classify_with(script, &["acme corp"]).await,
            Verdict::Skip(SkipReason::AffiliationMatched("Acme Corp".into()))
        );
    }

    #[tokio::test]
    async fn no_signal_is_permanent_skip_by_default() {
        let verdict = classify_with(ProfileScript::default(), &["acme corp"]).await;
        assert_eq!(verdict, Verdict::Skip(SkipReason::NoSignal));
    }

    #[tokio::test]
    async fn retry_later_policy_defers_instead_of_skipping() {
        let id = profile();
        let session = MockSession::new().with_profile(&id, ProfileScript::default());
        let mut view = session.open_profile_view(&id);
        let classifier = ProfileClassifier::new(
            SkipList::new(["acme corp"]),
            UnclassifiedPolicy::RetryLater,
        );
        assert_eq!(classifier.classify(&mut view).await.unwrap(), Verdict::Undetermined);
    }

    #[tokio::test]
    async fn primary_signal_wins_over_experience() {
        // Affiliation label says Initech (not skipped) even though the
        // experience entry would match the skip list.
        let script = ProfileScript {
            company_label: Some("Current company: Initech. More".into()),
            has_experience: true,
            experience_company: Some("Acme Corp · Full-time".into()),
            ..ProfileScript::default()
        };
        assert_eq!(classify_with(script, &["acme corp"]).await, Verdict::Eligible);
    }
}
