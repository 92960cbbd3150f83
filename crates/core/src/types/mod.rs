//! Entity types exchanged between pipeline stages.
//!
//! Every value that crosses a stage boundary is defined here. Stages pass
//! copies; nothing in this module aliases a service's internal cache.

pub mod bond;
pub mod execution;
pub mod fractional;
pub mod inquiry;
pub mod position;
pub mod price;
pub mod risk;
pub mod stream;
pub mod trade;

// Re-export primary types for convenient access via `fi_core::types::*`.
pub use bond::{Bond, BondIdType};
pub use execution::{ExecutionOrder, OrderType, Venue};
pub use inquiry::{Inquiry, InquiryState};
pub use position::Position;
pub use price::Price;
pub use risk::{BucketedSector, Pv01};
pub use stream::{PriceStream, PriceStreamOrder, PricingSide};
pub use trade::{Side, Trade};
