//! Capability traits
//!
//! Every remote backend is reached through [`ProviderAdapter`]; the orchestrator never
//! branches on which concrete provider it is talking to.

pub mod adapter;

pub use adapter::{ImageFrame, ProviderAdapter, ProviderKind, RawResponse};
