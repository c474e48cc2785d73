//! CLI module graph.

pub mod command;
pub mod diagnostic;
mod dispatch;
pub mod output;
pub mod paths;
pub mod run;
pub mod status;

pub use dispatch::dispatch;
