//! # fi-recorder
//!
//! Historical persistence for the FI back-office pipeline: five parallel
//! sinks that cache the latest value per key and append every update as a
//! timestamped row to an output file: executions, streams, positions,
//! risk (per bond and per sector through one service), and inquiries.

pub mod execution_history;
pub mod inquiry_history;
pub mod position_history;
pub mod risk_history;
pub mod streaming_history;

pub use execution_history::{
    ExecutionHistoryConnector, ExecutionHistoryListener, ExecutionHistoryService,
};
pub use inquiry_history::{InquiryHistoryConnector, InquiryHistoryListener, InquiryHistoryService};
pub use position_history::{
    PositionHistoryConnector, PositionHistoryListener, PositionHistoryService,
};
pub use risk_history::{RiskHistoryConnector, RiskHistoryListener, RiskHistoryService};
pub use streaming_history::{
    StreamingHistoryConnector, StreamingHistoryListener, StreamingHistoryService,
};
