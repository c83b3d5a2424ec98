//! Configuration for the outreach pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Consecutive no-growth polls before the feed reports convergence.
pub const DEFAULT_STALL_LIMIT: u32 = 3;

/// Submission attempts before an eligible profile degrades to failed.
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Fixed delay between submission attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Settle time after each reveal side effect, before re-measuring the list.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(2);

/// Words that disqualify a profile from outreach.
///
/// Matched against extracted company names (exact, after trimming and
/// lowercasing) and against thread subtitles (substring). Normalization
/// happens once at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipList {
    words: Vec<String>,
}

impl SkipList {
    pub fn new(words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|w| w.into().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Exact match against a company name.
    pub fn matches_company(&self, company: &str) -> bool {
        let company = company.trim().to_lowercase();
        self.words.iter().any(|w| *w == company)
    }

    /// Substring match against free text such as a thread subtitle.
    pub fn matches_text(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.words.iter().any(|w| text.contains(w.as_str()))
    }
}

/// What to do with a profile that yields no classification signal at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnclassifiedPolicy {
    /// Record the profile in the ledger as permanently skipped.
    /// Guarantees forward progress: it is never looked at again.
    RecordSkip,

    /// Leave the profile out of the ledger so a later run re-classifies
    /// it. Trades forward progress for completeness.
    RetryLater,
}

/// Tunables for one pipeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Consecutive no-growth polls before discovery converges.
    pub stall_limit: u32,

    /// Submission attempts per eligible profile.
    pub retry_limit: u32,

    /// Fixed delay between submission attempts.
    pub retry_delay: Duration,

    /// Settle time after each reveal side effect.
    pub poll_delay: Duration,

    /// Disqualifying words for affiliations and thread subtitles.
    pub skip_words: SkipList,

    /// Policy for profiles with no classification signal.
    pub unclassified: UnclassifiedPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stall_limit: DEFAULT_STALL_LIMIT,
            retry_limit: DEFAULT_RETRY_LIMIT,
            retry_delay: DEFAULT_RETRY_DELAY,
            poll_delay: DEFAULT_POLL_DELAY,
            skip_words: SkipList::default(),
            unclassified: UnclassifiedPolicy::RecordSkip,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the skip-word list.
    pub fn with_skip_words(mut self, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.skip_words = SkipList::new(words);
        self
    }

    /// Set the convergence stall limit.
    pub fn with_stall_limit(mut self, limit: u32) -> Self {
        self.stall_limit = limit;
        self
    }

    /// Set the submission retry limit.
    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Set the delay between submission attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the settle delay after each reveal.
    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    /// Set the unclassified-profile policy.
    pub fn with_unclassified_policy(mut self, policy: UnclassifiedPolicy) -> Self {
        self.unclassified = policy;
        self
    }
}

/// One run's processing window, resolved before the loop starts.
///
/// Any interactive "continue?" decision lives outside the pipeline and
/// produces a fresh directive for a fresh run, never recursion inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeDirective {
    /// First position to process. `None` resumes from the persisted cursor.
    pub start: Option<usize>,

    /// Exclusive upper position bound. `None` runs to convergence.
    pub end: Option<usize>,

    /// Maximum number of confirmed submissions this run.
    pub limit: Option<usize>,

    /// Reset the persisted cursor to 0 before resolving `start`.
    pub reset_cursor: bool,
}

impl RangeDirective {
    /// Resume from the persisted cursor, no bounds.
    pub fn resume() -> Self {
        Self::default()
    }

    /// Start over from position 0, no bounds.
    pub fn from_start() -> Self {
        Self {
            start: Some(0),
            reset_cursor: true,
            ..Self::default()
        }
    }

    /// Process exactly the positions `[start, end)`.
    pub fn range(start: usize, end: usize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    /// Cap the number of confirmed submissions.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Reject malformed directives before any discovery begins.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if end < start {
                return Err(PipelineError::InvalidDirective {
                    reason: format!("end {} is before start {}", end, start),
                });
            }
        }
        if self.limit == Some(0) {
            return Err(PipelineError::InvalidDirective {
                reason: "limit of 0 would process nothing".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_list_normalizes_on_construction() {
        let skip = SkipList::new(["  Acme Corp ", "GLOBEX"]);
        assert!(skip.matches_company("acme corp"));
        assert!(skip.matches_company(" ACME CORP  "));
        assert!(skip.matches_company("Globex"));
        assert!(!skip.matches_company("Initech"));
    }

    #[test]
    fn skip_list_company_match_is_exact() {
        let skip = SkipList::new(["Acme"]);
        assert!(!skip.matches_company("Acme Corp"));
    }

    #[test]
    fn skip_list_text_match_is_substring() {
        let skip = SkipList::new(["recruiter"]);
        assert!(skip.matches_text("Senior Recruiter at Globex"));
        assert!(!skip.matches_text("Backend Engineer"));
    }

    #[test]
    fn empty_words_are_dropped() {
        let skip = SkipList::new(["", "  "]);
        assert!(skip.is_empty());
        assert!(!skip.matches_text("anything"));
    }

    #[test]
    fn directive_rejects_inverted_range() {
        let directive = RangeDirective::range(10, 5);
        assert!(matches!(
            directive.validate(),
            Err(PipelineError::InvalidDirective { .. })
        ));
    }

    #[test]
    fn directive_rejects_zero_limit() {
        let directive = RangeDirective::resume().with_limit(0);
        assert!(directive.validate().is_err());
    }

    #[test]
    fn directive_accepts_open_bounds() {
        assert!(RangeDirective::resume().validate().is_ok());
        assert!(RangeDirective::range(5, 5).validate().is_ok());
    }
}
