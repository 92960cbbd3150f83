//! # fi-execution
//!
//! Order generation and routing for the FI back-office pipeline: the
//! algo-execution stage that fires on tight spreads, and the execution
//! stage that routes generated orders to a venue.

pub mod algo_exec;
pub mod service;

pub use algo_exec::{AlgoExecution, AlgoExecutionListener, AlgoExecutionService};
pub use service::{ExecutionListener, ExecutionService};
