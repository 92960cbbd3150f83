//! # fi-core
//!
//! Shared building blocks for the FI back-office pipeline.
//!
//! This crate provides the foundations used across all other crates in the
//! workspace: the bond/trade/position/risk/inquiry entity types, the US
//! Treasury fractional price codec, the service/listener/connector
//! abstraction every pipeline stage is built on, the product reference-data
//! service, layered configuration, and the logging framework.

pub mod config;
pub mod logging;
pub mod products;
pub mod service;
pub mod sink;
pub mod types;
