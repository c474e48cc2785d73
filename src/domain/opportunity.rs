//! Opportunity type with builder pattern.
//!
//! An [`Opportunity`] is the result of walking a [`Path`] with real quotes.
//! Use [`Opportunity::builder`] to construct one; the builder derives the
//! output amount and profit figures from the hop quotes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::path::Path;
use super::quote::Quote;

/// Error returned when building an Opportunity fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpportunityBuildError {
    /// Path is required but was not provided.
    MissingPath,
    /// Hop quotes are required but were not provided.
    MissingQuotes,
    /// Number of quotes does not match the number of hops.
    HopMismatch {
        /// Hops in the path.
        hops: usize,
        /// Quotes supplied.
        quotes: usize,
    },
    /// Input amount must be non-zero.
    ZeroInput,
}

impl fmt::Display for OpportunityBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPath => write!(f, "path is required"),
            Self::MissingQuotes => write!(f, "hop quotes are required"),
            Self::HopMismatch { hops, quotes } => {
                write!(f, "path has {hops} hops but {quotes} quotes were given")
            }
            Self::ZeroInput => write!(f, "input amount must be greater than zero"),
        }
    }
}

impl std::error::Error for OpportunityBuildError {}

/// Profit of a round trip in percent of the input.
#[must_use]
pub fn profit_percent(input_amount: u64, output_amount: u64) -> f64 {
    if input_amount == 0 {
        return 0.0;
    }
    let input = input_amount as f64;
    (output_amount as f64 - input) / input * 100.0
}

/// A walked cycle with its quotes and profit.
///
/// Read-only after construction.
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    id: Uuid,
    path: Path,
    input_amount: u64,
    output_amount: u64,
    profit_amount: i128,
    profit_percent: f64,
    quotes: Vec<Quote>,
    found_at: DateTime<Utc>,
}

impl Opportunity {
    /// Create a new builder for constructing an Opportunity.
    #[must_use]
    pub fn builder() -> OpportunityBuilder {
        OpportunityBuilder::new()
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Atomic amount of the base token put in on the first hop.
    #[must_use]
    pub const fn input_amount(&self) -> u64 {
        self.input_amount
    }

    /// Atomic amount of the base token received from the last hop.
    #[must_use]
    pub const fn output_amount(&self) -> u64 {
        self.output_amount
    }

    /// `output - input` in atomic units; negative for losing cycles.
    #[must_use]
    pub const fn profit_amount(&self) -> i128 {
        self.profit_amount
    }

    #[must_use]
    pub const fn profit_percent(&self) -> f64 {
        self.profit_percent
    }

    #[must_use]
    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    #[must_use]
    pub const fn found_at(&self) -> DateTime<Utc> {
        self.found_at
    }
}

/// Builder for constructing `Opportunity` instances.
///
/// # Example
///
/// ```ignore
/// let opportunity = Opportunity::builder()
///     .path(path)
///     .input_amount(1_000_000)
///     .quotes(quotes)
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct OpportunityBuilder {
    path: Option<Path>,
    input_amount: Option<u64>,
    quotes: Vec<Quote>,
    found_at: Option<DateTime<Utc>>,
}

impl OpportunityBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the walked path.
    #[must_use]
    pub fn path(mut self, path: Path) -> Self {
        self.path = Some(path);
        self
    }

    /// Set the initial input amount. Defaults to the first quote's input.
    #[must_use]
    pub const fn input_amount(mut self, amount: u64) -> Self {
        self.input_amount = Some(amount);
        self
    }

    /// Set the per-hop quotes, in hop order.
    #[must_use]
    pub fn quotes(mut self, quotes: Vec<Quote>) -> Self {
        self.quotes = quotes;
        self
    }

    /// Override the discovery timestamp (defaults to now).
    #[must_use]
    pub const fn found_at(mut self, at: DateTime<Utc>) -> Self {
        self.found_at = Some(at);
        self
    }

    /// Build the Opportunity, calculating derived fields.
    ///
    /// # Errors
    ///
    /// Returns `OpportunityBuildError` if a required field is missing or the
    /// quotes do not cover every hop.
    pub fn build(self) -> Result<Opportunity, OpportunityBuildError> {
        let path = self.path.ok_or(OpportunityBuildError::MissingPath)?;
        let first = self.quotes.first().ok_or(OpportunityBuildError::MissingQuotes)?;
        if self.quotes.len() != path.hop_count() {
            return Err(OpportunityBuildError::HopMismatch {
                hops: path.hop_count(),
                quotes: self.quotes.len(),
            });
        }

        let input_amount = self.input_amount.unwrap_or_else(|| first.in_amount());
        if input_amount == 0 {
            return Err(OpportunityBuildError::ZeroInput);
        }
        let output_amount = self.quotes.last().map_or(0, Quote::out_amount);

        Ok(Opportunity {
            id: Uuid::new_v4(),
            path,
            input_amount,
            output_amount,
            profit_amount: i128::from(output_amount) - i128::from(input_amount),
            profit_percent: profit_percent(input_amount, output_amount),
            quotes: self.quotes,
            found_at: self.found_at.unwrap_or_else(Utc::now),
        })
    }
}
