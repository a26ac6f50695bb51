//! # SwapX Core
//!
//! Client-side data types and math for a native/token constant-product pool:
//! the amount codec, reserves, slippage bounds and pool-share projections.
//! Pricing itself is enforced by the pool contract; nothing here is
//! authoritative.

#![allow(clippy::missing_errors_doc)]

pub mod amount;
pub mod asset;
pub mod error;
pub mod exchange_math;
pub mod reserves;
pub mod slippage_config;
pub mod util;

pub use alloy_primitives::{Address, U256};
