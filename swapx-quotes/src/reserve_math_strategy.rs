//! Quotes computed locally from fetched reserves.

use alloy_primitives::U256;
use anyhow::{Context, Result};
use async_trait::async_trait;
use swapx_clients::ContractGateway;
use swapx_core::asset::Direction;
use swapx_core::exchange_math::constant_product_output;

use crate::{Quote, QuoteStrategy};

/// Applies the 0.3% fee constant-product formula to fresh reserves.
///
/// Skips the contract's estimate call, so a pool with a different fee
/// schedule would be mispriced here.
#[derive(Clone)]
pub struct ReserveMathStrategy {
  gateway: ContractGateway,
}

impl ReserveMathStrategy {
  #[must_use]
  pub fn new(gateway: ContractGateway) -> ReserveMathStrategy {
    ReserveMathStrategy { gateway }
  }
}

#[async_trait]
impl QuoteStrategy for ReserveMathStrategy {
  async fn get_quote(
    &self,
    direction: Direction,
    amount_in: U256,
  ) -> Result<Quote> {
    let reserves = self
      .gateway
      .reserves()
      .await
      .context("Failed to fetch pool reserves")?;
    let (input_reserve, output_reserve) = reserves.oriented(direction);
    let amount_out =
      constant_product_output(amount_in, input_reserve, output_reserve)?;
    Ok(Quote {
      direction,
      amount_in,
      amount_out,
      reserves,
    })
  }
}
