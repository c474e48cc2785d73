//! Arbitrage orchestration.
//!
//! One cycle runs these stages in order:
//!
//! 1. **Gate**: advance breaker recovery; skip the cycle when halted
//! 2. **Scan**: walk catalog candidates, emit opportunities
//! 3. **Allocate**: split capital across opportunities by score
//! 4. **Per opportunity**: size, policy, wallet, re-quote, execute
//! 5. **Feedback**: history, breaker, wallet usage, policy counters, events
//!
//! # Modules
//!
//! - `context`: the explicit state bundle handed to the orchestrator
//! - `orchestrator`: cycle logic and the periodic loop

mod context;
mod orchestrator;

pub use context::{EngineContext, EngineSettings};
pub use orchestrator::{
    CycleOutcome, CycleReport, Orchestrator, SkipReason, TradeRecord, TradeSkip, TradeSkipReason,
};
