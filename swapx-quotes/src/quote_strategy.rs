use alloy_primitives::U256;
use anyhow::Result;
use async_trait::async_trait;
use swapx_core::asset::Direction;

use crate::Quote;

/// Trait for strategies that estimate the output of a swap.
#[async_trait]
pub trait QuoteStrategy: Send + Sync {
  /// Compute a quote for swapping `amount_in` in `direction`.
  ///
  /// # Errors
  /// Returns error if reserves or the output estimate cannot be fetched.
  async fn get_quote(&self, direction: Direction, amount_in: U256)
    -> Result<Quote>;
}
