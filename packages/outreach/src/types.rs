//! Core data types for the outreach pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

// ============================================================================
// IDENTITY
// ============================================================================

/// Stable identity of a profile: its canonicalized URL.
///
/// Query string and fragment are stripped so the same profile reached
/// through different tracking parameters dedups to one identity. The
/// rendered list may reorder across runs, so positions are advisory;
/// this id is what the ledger records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Parse and canonicalize a profile URL.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let mut url = Url::parse(raw.trim())?;
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self(url.to_string().trim_end_matches('/').to_string()))
    }

    /// The canonical string form, as stored in the ledger.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Locator of the view where the outreach action is performed for one
/// profile (e.g. its message-thread URL). Distinct from [`ProfileId`]:
/// the id identifies, the target is where the effect happens.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionTarget(String);

impl ActionTarget {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// DISCOVERED ITEMS
// ============================================================================

/// One entry of the rendered connection list.
///
/// Opaque to the discovery feed, which only counts handles; the session
/// implementation resolves the profile and action-target links when it
/// surfaces the card. Position within the batch is implicit (index).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardHandle {
    /// Identity used for dedup against the ledger.
    pub profile: ProfileId,

    /// Where the outreach action for this card takes place.
    pub target: ActionTarget,
}

// ============================================================================
// OUTCOMES
// ============================================================================

/// Result of one outreach attempt on an eligible profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The submission was confirmed.
    Actioned,

    /// The profile was already handled: ledger hit, or an existing
    /// thread showed the action completed through another path.
    AlreadyDone,

    /// A precondition inside the action context aborted the attempt
    /// (skip word in the thread subtitle). Not retried, not a failure.
    Skipped,

    /// All retry attempts were exhausted.
    Failed {
        /// How many submission attempts were made.
        attempts: u32,
    },
}

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The list stopped growing, or the requested range/count was satisfied.
    Converged,

    /// The session became unusable; the cursor marks the last completed item.
    Aborted { reason: String },

    /// Cancellation was requested and honored at an item boundary.
    Cancelled,
}

/// Per-run accounting returned to the caller.
///
/// Counts are exact: every item the run touched lands in exactly one
/// bucket, and every terminal classification is in the ledger before the
/// report is returned, even on abort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Length of the discovered batch when the run ended.
    pub discovered: usize,

    /// Submissions confirmed this run.
    pub actioned: usize,

    /// Profiles permanently skipped (classification or precondition).
    pub skipped: usize,

    /// Profiles that exhausted all submission attempts.
    pub failed: usize,

    /// Ledger hits and out-of-band completions.
    pub already_done: usize,

    /// Unclassifiable profiles left out of the ledger for a later run
    /// (only under [`UnclassifiedPolicy::RetryLater`]).
    ///
    /// [`UnclassifiedPolicy::RetryLater`]: crate::config::UnclassifiedPolicy::RetryLater
    pub deferred: usize,

    /// Final persisted cursor position.
    pub cursor: usize,

    /// How the run ended.
    pub outcome: RunOutcome,
}

impl RunReport {
    pub(crate) fn new() -> Self {
        Self {
            discovered: 0,
            actioned: 0,
            skipped: 0,
            failed: 0,
            already_done: 0,
            deferred: 0,
            cursor: 0,
            outcome: RunOutcome::Converged,
        }
    }

    /// Total items this run classified or acted on (excludes ledger hits).
    pub fn touched(&self) -> usize {
        self.actioned + self.skipped + self.failed + self.deferred
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_id_strips_query_and_fragment() {
        let a = ProfileId::parse("https://network.example/in/alice?trk=feed#about").unwrap();
        let b = ProfileId::parse("https://network.example/in/alice").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://network.example/in/alice");
    }

    #[test]
    fn profile_id_trims_whitespace_and_trailing_slash() {
        let a = ProfileId::parse("  https://network.example/in/alice/  ").unwrap();
        let b = ProfileId::parse("https://network.example/in/alice").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn profile_id_rejects_garbage() {
        assert!(ProfileId::parse("not a url").is_err());
    }
}
