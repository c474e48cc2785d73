//! Quote gateway.
//!
//! Wraps the [`SwapVenue`] quote call with token policy checks, minimum
//! call spacing, a per-call timeout and bounded exponential backoff for
//! rate-limit class failures.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use super::limiter::RateLimiter;
use crate::domain::{
    id::Mint,
    quote::Quote,
    token::{Token, TokenPolicy},
};
use crate::error::VenueError;
use crate::port::outbound::venue::SwapVenue;

/// Why a quote could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteFailure {
    #[error("token {mint} is not permitted by policy")]
    PolicyRejected { mint: Mint },

    #[error("quote amount must be greater than zero")]
    ZeroAmount,

    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("quote timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("venue error: {0}")]
    Venue(String),
}

impl QuoteFailure {
    /// Transient failures worth another attempt.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout { .. })
    }
}

/// Tunables for the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Minimum spacing between venue calls.
    pub min_spacing: Duration,
    /// Retries after the first attempt for retryable failures.
    pub max_retries: u32,
    /// First backoff delay; doubles per retry.
    pub backoff_base: Duration,
    /// Upper bound on a single backoff delay.
    pub backoff_cap: Duration,
    /// Timeout for one venue call.
    pub call_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            min_spacing: Duration::from_millis(100),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
            backoff_cap: Duration::from_secs(10),
            call_timeout: Duration::from_secs(5),
        }
    }
}

/// Counters exposed for status output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GatewayStats {
    /// Venue calls made, retries included.
    pub calls: u64,
    /// Quotes returned successfully.
    pub quotes: u64,
    /// Calls rejected by token policy without reaching the venue.
    pub policy_rejections: u64,
    /// Rate-limit class failures observed.
    pub rate_limited: u64,
    /// Call timeouts observed.
    pub timeouts: u64,
    /// Non-retryable venue failures.
    pub failures: u64,
    /// Failed calls since the last success.
    pub consecutive_failures: u32,
}

/// Rate-limited, retrying quote client.
pub struct QuoteGateway {
    venue: Arc<dyn SwapVenue>,
    policy: TokenPolicy,
    settings: GatewaySettings,
    limiter: RateLimiter,
    stats: Mutex<GatewayStats>,
}

impl QuoteGateway {
    #[must_use]
    pub fn new(venue: Arc<dyn SwapVenue>, policy: TokenPolicy, settings: GatewaySettings) -> Self {
        Self {
            venue,
            policy,
            limiter: RateLimiter::new(settings.min_spacing),
            settings,
            stats: Mutex::new(GatewayStats::default()),
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &TokenPolicy {
        &self.policy
    }

    #[must_use]
    pub fn stats(&self) -> GatewayStats {
        *self.stats.lock()
    }

    /// Quote swapping `amount` atomic units of `input` into `output`.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteFailure::PolicyRejected`] without calling the venue
    /// when either token is not permitted. Rate-limit and timeout failures
    /// are retried up to `max_retries` times; the last failure is returned
    /// once the budget is spent. Any other venue error returns at once.
    pub async fn get_quote(
        &self,
        input: &Token,
        output: &Token,
        amount: u64,
        max_slippage_bps: u16,
    ) -> Result<Quote, QuoteFailure> {
        for mint in [input.mint(), output.mint()] {
            if !self.policy.permits(mint) {
                self.stats.lock().policy_rejections += 1;
                debug!(mint = %mint, "Quote rejected by token policy");
                return Err(QuoteFailure::PolicyRejected { mint: mint.clone() });
            }
        }
        if amount == 0 {
            return Err(QuoteFailure::ZeroAmount);
        }

        let mut attempt = 0u32;
        let mut delay = self.settings.backoff_base;
        loop {
            attempt += 1;
            self.limiter.acquire().await;
            self.stats.lock().calls += 1;

            let call = self
                .venue
                .quote(input.mint(), output.mint(), amount, max_slippage_bps);
            let failure = match timeout(self.settings.call_timeout, call).await {
                Ok(Ok(venue_quote)) => {
                    let mut stats = self.stats.lock();
                    stats.quotes += 1;
                    stats.consecutive_failures = 0;
                    return Ok(Quote::new(
                        input.mint().clone(),
                        output.mint().clone(),
                        amount,
                        venue_quote.out_amount,
                        max_slippage_bps,
                        venue_quote.route,
                        Utc::now(),
                    ));
                }
                Ok(Err(e)) if e.is_rate_limited() => {
                    self.note_failure(|s| s.rate_limited += 1);
                    QuoteFailure::RateLimited { attempts: attempt }
                }
                Ok(Err(VenueError::Timeout)) | Err(_) => {
                    self.note_failure(|s| s.timeouts += 1);
                    QuoteFailure::Timeout { attempts: attempt }
                }
                Ok(Err(e)) => {
                    self.note_failure(|s| s.failures += 1);
                    debug!(
                        venue = self.venue.name(),
                        input = %input.symbol(),
                        output = %output.symbol(),
                        error = %e,
                        "Quote failed"
                    );
                    return Err(QuoteFailure::Venue(e.to_string()));
                }
            };

            if attempt > self.settings.max_retries {
                warn!(
                    input = %input.symbol(),
                    output = %output.symbol(),
                    attempts = attempt,
                    error = %failure,
                    "Quote retries exhausted"
                );
                return Err(failure);
            }

            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Retrying quote after backoff"
            );
            sleep(delay).await;
            delay = delay.saturating_mul(2).min(self.settings.backoff_cap);
        }
    }

    fn note_failure(&self, bump: impl FnOnce(&mut GatewayStats)) {
        let mut stats = self.stats.lock();
        bump(&mut stats);
        stats.consecutive_failures = stats.consecutive_failures.saturating_add(1);
    }
}
