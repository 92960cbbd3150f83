//! Client inquiries and their lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::bond::Bond;
use super::trade::Side;

/// Lifecycle state of a client inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InquiryState {
    /// Received from the client, not yet quoted.
    Received,
    /// A quote has been sent back.
    Quoted,
    /// Completed.
    Done,
    /// Rejected by the desk.
    Rejected,
    /// Rejected by the customer after quoting.
    CustomerRejected,
}

impl InquiryState {
    /// Parse a state string. Unknown strings default to RECEIVED.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "QUOTED" => InquiryState::Quoted,
            "DONE" => InquiryState::Done,
            "REJECTED" => InquiryState::Rejected,
            "CUSTOMER_REJECTED" => InquiryState::CustomerRejected,
            _ => InquiryState::Received,
        }
    }
}

impl fmt::Display for InquiryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InquiryState::Received => write!(f, "RECEIVED"),
            InquiryState::Quoted => write!(f, "QUOTED"),
            InquiryState::Done => write!(f, "DONE"),
            InquiryState::Rejected => write!(f, "REJECTED"),
            InquiryState::CustomerRejected => write!(f, "CUSTOMER_REJECTED"),
        }
    }
}

/// A client price request with a lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    /// Inquiry identifier.
    pub inquiry_id: String,
    /// The inquired bond.
    pub product: Bond,
    /// Client side.
    pub side: Side,
    /// Requested quantity.
    pub quantity: i64,
    /// Price: the client's indication on ingress, the quoted price after.
    pub price: f64,
    /// Current lifecycle state.
    pub state: InquiryState,
}

impl Inquiry {
    /// Copy of this inquiry with a different state.
    pub fn with_state(&self, state: InquiryState) -> Self {
        Self {
            state,
            ..self.clone()
        }
    }

    /// Copy of this inquiry with a different price.
    pub fn with_price(&self, price: f64) -> Self {
        Self {
            price,
            ..self.clone()
        }
    }
}
