//! Incremental discovery over the lazily-growing connection list.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::SessionResult;
use crate::session::RenderingSession;
use crate::types::CardHandle;

/// Surfaces the connection list batch by batch, triggering reveal side
/// effects until the list stops growing.
///
/// Growth resets the stall counter; a no-growth poll (including an empty
/// list that may still be loading) increments it. After `stall_limit`
/// consecutive no-growth polls the feed is converged: no further reveal
/// side effects, every later poll returns the final batch. Total polls
/// are bounded by distinct growth events plus the stall limit.
pub struct DiscoveryFeed<'a, S> {
    session: &'a S,
    stall_limit: u32,
    poll_delay: Duration,
    cards: Vec<CardHandle>,
    stalls: u32,
    converged: bool,
}

impl<'a, S: RenderingSession> DiscoveryFeed<'a, S> {
    pub fn new(session: &'a S, config: &PipelineConfig) -> Self {
        Self {
            session,
            stall_limit: config.stall_limit,
            poll_delay: config.poll_delay,
            cards: Vec::new(),
            stalls: 0,
            converged: false,
        }
    }

    /// The full batch as currently known.
    pub fn batch(&self) -> &[CardHandle] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether the list is known to have stopped growing.
    pub fn is_converged(&self) -> bool {
        self.converged
    }

    /// Measure the list once, reveal more if it may still grow, and
    /// return the full current batch.
    ///
    /// Only a fatal session error escapes; a transient failure to query
    /// or reveal counts as a stall, since an unreadable list and a
    /// stopped list are indistinguishable from here.
    pub async fn poll(&mut self) -> SessionResult<&[CardHandle]> {
        if self.converged {
            return Ok(&self.cards);
        }

        match self.session.connection_cards().await {
            Ok(latest) if latest.len() > self.cards.len() => {
                self.stalls = 0;
                debug!(total = latest.len(), "connection list grew");
                self.cards = latest;
            }
            Ok(_) => {
                self.stalls += 1;
                debug!(
                    total = self.cards.len(),
                    stalls = self.stalls,
                    "no growth"
                );
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                self.stalls += 1;
                warn!(error = %e, stalls = self.stalls, "list query failed");
            }
        }

        if self.stalls >= self.stall_limit {
            self.converged = true;
            info!(total = self.cards.len(), "connection list converged");
            return Ok(&self.cards);
        }

        self.reveal_more().await?;
        Ok(&self.cards)
    }

    /// One reveal side effect: the load-more control when present,
    /// otherwise a scroll to the end of the list. A transient failure
    /// here is a stall, never fatal to discovery.
    async fn reveal_more(&mut self) -> SessionResult<()> {
        let outcome = match self.session.trigger_reveal().await {
            Ok(true) => Ok(()),
            Ok(false) => self.session.scroll_to_end().await,
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => {
                tokio::time::sleep(self.poll_delay).await;
                Ok(())
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                self.stalls += 1;
                warn!(error = %e, stalls = self.stalls, "reveal failed");
                Ok(())
            }
        }
    }
}
