//! # SwapX Clients
//!
//! Gateways to the SwapX pool and its ERC-20 token, plus the configuration
//! and wallet state a client needs before it can talk to them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swapx_clients::prelude::*;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let chain = SandboxChain::default();
//! let gateway = chain.gateway(Address::repeat_byte(0xaa));
//!
//! // Pool native balance and token reserve, fetched concurrently
//! let reserves = gateway.reserves().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`gateway`] - Capability traits and the shared [`ContractGateway`]
//! - [`failure`] - Revert decoding and failure classification
//! - [`sandbox`] - In-memory chain implementing every gateway trait
//! - [`wallet`] - Connected account and the network gate

pub mod config;
pub mod failure;
pub mod gateway;
pub mod prelude;
pub mod sandbox;
pub mod wallet;

pub use crate::gateway::ContractGateway;
