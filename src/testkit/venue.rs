//! Scripted [`SwapVenue`] for tests.
//!
//! Quotes are computed from a fixed rate table: `out = floor(in * rate)`.
//! Pairs without a rate fail with [`VenueError::Rejected`]. Failures queued
//! with [`ScriptedVenue::fail_next`] are returned before any rate lookup,
//! one per call.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{id::Mint, quote::Quote, wallet::WalletEntry};
use crate::error::VenueError;
use crate::port::outbound::venue::{ExecutionReceipt, SwapVenue, VenueQuote};

pub struct ScriptedVenue {
    rates: Mutex<HashMap<(Mint, Mint), f64>>,
    failures: Mutex<VecDeque<VenueError>>,
    broken_pairs: Mutex<HashMap<(Mint, Mint), VenueError>>,
    execute_results: Mutex<VecDeque<Result<ExecutionReceipt, VenueError>>>,
    quote_delay: Option<Duration>,
    quote_calls: AtomicUsize,
    execute_calls: AtomicUsize,
    simulated_calls: AtomicUsize,
    executed_wallets: Mutex<Vec<String>>,
}

impl ScriptedVenue {
    pub fn new() -> Self {
        Self {
            rates: Mutex::new(HashMap::new()),
            failures: Mutex::new(VecDeque::new()),
            broken_pairs: Mutex::new(HashMap::new()),
            execute_results: Mutex::new(VecDeque::new()),
            quote_delay: None,
            quote_calls: AtomicUsize::new(0),
            execute_calls: AtomicUsize::new(0),
            simulated_calls: AtomicUsize::new(0),
            executed_wallets: Mutex::new(Vec::new()),
        }
    }

    /// Add a directed conversion rate.
    pub fn with_rate(self, input: &str, output: &str, rate: f64) -> Self {
        self.set_rate(input, output, rate);
        self
    }

    /// Sleep this long inside every quote call.
    pub fn with_quote_delay(mut self, delay: Duration) -> Self {
        self.quote_delay = Some(delay);
        self
    }

    pub fn set_rate(&self, input: &str, output: &str, rate: f64) {
        self.rates
            .lock()
            .insert((Mint::from(input), Mint::from(output)), rate);
    }

    /// Queue a failure for the next quote call.
    pub fn fail_next(&self, error: VenueError) {
        self.failures.lock().push_back(error);
    }

    /// Make every quote for a pair fail.
    pub fn break_pair(&self, input: &str, output: &str, error: VenueError) {
        self.broken_pairs
            .lock()
            .insert((Mint::from(input), Mint::from(output)), error);
    }

    /// Queue a result for the next execute call. Defaults to success.
    pub fn push_execution(&self, result: Result<ExecutionReceipt, VenueError>) {
        self.execute_results.lock().push_back(result);
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn execute_calls(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }

    pub fn simulated_calls(&self) -> usize {
        self.simulated_calls.load(Ordering::SeqCst)
    }

    /// Wallet ids passed to execute, in call order.
    pub fn executed_wallets(&self) -> Vec<String> {
        self.executed_wallets.lock().clone()
    }
}

impl Default for ScriptedVenue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SwapVenue for ScriptedVenue {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn quote(
        &self,
        input: &Mint,
        output: &Mint,
        amount: u64,
        _slippage_bps: u16,
    ) -> Result<VenueQuote, VenueError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.quote_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failures.lock().pop_front() {
            return Err(error);
        }
        let pair = (input.clone(), output.clone());
        if let Some(error) = self.broken_pairs.lock().get(&pair) {
            return Err(error.clone());
        }
        let rate = self
            .rates
            .lock()
            .get(&pair)
            .copied()
            .ok_or_else(|| VenueError::Rejected(format!("no route {input} -> {output}")))?;
        Ok(VenueQuote {
            out_amount: (amount as f64 * rate).floor() as u64,
            route: serde_json::json!({ "in": input.as_str(), "out": output.as_str() }),
        })
    }

    async fn execute(
        &self,
        _route: &[Quote],
        wallet: &WalletEntry,
        simulate: bool,
    ) -> Result<ExecutionReceipt, VenueError> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        if simulate {
            self.simulated_calls.fetch_add(1, Ordering::SeqCst);
        }
        self.executed_wallets
            .lock()
            .push(wallet.id().as_str().to_string());
        self.execute_results.lock().pop_front().unwrap_or(Ok(ExecutionReceipt {
            success: true,
            tx_ref: Some(format!("sim-{}", self.execute_calls())),
        }))
    }
}
