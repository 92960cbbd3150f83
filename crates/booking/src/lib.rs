//! # fi-booking
//!
//! The position-keeping half of the FI back-office pipeline: trade booking
//! (from the ingress file and from executions looped back), per-book
//! positions, and PV01 risk with bucketed sectors.

pub mod position;
pub mod risk;
pub mod trade_booking;

pub use position::{PositionListener, PositionService};
pub use risk::{RiskListener, RiskService};
pub use trade_booking::{TradeBookingFileConnector, TradeBookingListener, TradeBookingService};
