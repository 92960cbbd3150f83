//! # fi-market-data
//!
//! Market depth handling for the FI back-office pipeline: the order book
//! entity, the market data service with its aggregation rule, and the
//! depth-snapshot file connector.

pub mod connector;
pub mod orderbook;
pub mod service;

pub use connector::MarketDataFileConnector;
pub use orderbook::{BidOffer, Order, OrderBook};
pub use service::MarketDataService;
