//! # fi-pricing
//!
//! The price-driven half of the FI back-office pipeline: the pricing
//! ingress stage, the algo-streaming stage that turns prices into two-way
//! streams, the streaming stage that republishes them, and the throttled
//! GUI price publisher.

pub mod algo_stream;
pub mod gui;
pub mod service;
pub mod streaming;

pub use algo_stream::{AlgoStream, AlgoStreamingListener, AlgoStreamingService};
pub use gui::{GuiFileConnector, GuiListener, GuiService};
pub use service::{PricingFileConnector, PricingService};
pub use streaming::{StreamingListener, StreamingService};
