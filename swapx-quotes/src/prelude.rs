//! Common imports for swapx-quotes.

pub use anyhow::Result;
pub use swapx_clients::prelude::*;

pub use crate::{
  Operation, Quote, QuoteEngine, QuoteMetadata, QuoteResponse, QuoteStrategy,
  ReserveMathStrategy, SimulationStrategy,
};
