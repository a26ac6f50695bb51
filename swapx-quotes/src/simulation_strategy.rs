//! Quotes from the pool's own read-only output estimate.

use alloy_primitives::U256;
use anyhow::{Context, Result};
use async_trait::async_trait;
use swapx_clients::ContractGateway;
use swapx_core::asset::Direction;

use crate::{Quote, QuoteStrategy};

/// Asks the pool contract for the output implied by fresh reserves.
///
/// The estimate is exactly what the contract would compute, but costs two
/// reads and one call per quote.
#[derive(Clone)]
pub struct SimulationStrategy {
  gateway: ContractGateway,
}

impl SimulationStrategy {
  #[must_use]
  pub fn new(gateway: ContractGateway) -> SimulationStrategy {
    SimulationStrategy { gateway }
  }
}

#[async_trait]
impl QuoteStrategy for SimulationStrategy {
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
    let amount_out = self
      .gateway
      .pool()
      .simulate_output(amount_in, input_reserve, output_reserve)
      .await
      .context("Failed to simulate swap output")?;
    Ok(Quote {
      direction,
      amount_in,
      amount_out: amount_out.min(output_reserve),
      reserves,
    })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use alloy_primitives::{Address, TxHash};
  use more_asserts::assert_le;
  use swapx_clients::failure::GatewayError;
  use swapx_clients::gateway::{
    ChainGateway, GatewayResult, PoolGateway, Receipt, TokenGateway,
  };
  use swapx_core::amount::one;
  use swapx_core::slippage_config::SlippageTolerance;

  use super::*;
  use crate::{QuoteEngine, QuoteResponse};

  /// Pool whose estimate overshoots whatever reserve it is given.
  struct OvershootingPool;

  fn native_reserve() -> U256 {
    one() * U256::from(10)
  }

  fn token_reserve() -> U256 {
    one() * U256::from(2000)
  }

  fn unsupported<T>() -> GatewayResult<T> {
    Err(GatewayError::Transport("unsupported".to_string()))
  }

  #[async_trait]
  impl PoolGateway for OvershootingPool {
    fn address(&self) -> Address {
      Address::repeat_byte(0x5a)
    }

    async fn token_reserve(&self) -> GatewayResult<U256> {
      Ok(token_reserve())
    }

    async fn simulate_output(
      &self,
      _amount_in: U256,
      _input_reserve: U256,
      output_reserve: U256,
    ) -> GatewayResult<U256> {
      Ok(output_reserve * U256::from(2))
    }

    async fn lp_balance_of(&self, _account: Address) -> GatewayResult<U256> {
      unsupported()
    }

    async fn lp_total_supply(&self) -> GatewayResult<U256> {
      unsupported()
    }

    async fn simulate_deposit(
      &self,
      _token_amount: U256,
      _value: U256,
    ) -> GatewayResult<U256> {
      unsupported()
    }

    async fn deposit(
      &self,
      _token_amount: U256,
      _value: U256,
    ) -> GatewayResult<TxHash> {
      unsupported()
    }

    async fn withdraw(&self, _lp_amount: U256) -> GatewayResult<TxHash> {
      unsupported()
    }

    async fn swap_native_for_token(
      &self,
      _min_out: U256,
      _value: U256,
    ) -> GatewayResult<TxHash> {
      unsupported()
    }

    async fn swap_token_for_native(
      &self,
      _amount_in: U256,
      _min_out: U256,
    ) -> GatewayResult<TxHash> {
      unsupported()
    }
  }

  #[async_trait]
  impl TokenGateway for OvershootingPool {
    fn address(&self) -> Address {
      Address::repeat_byte(0x7a)
    }

    async fn balance_of(&self, _account: Address) -> GatewayResult<U256> {
      unsupported()
    }

    async fn allowance(
      &self,
      _owner: Address,
      _spender: Address,
    ) -> GatewayResult<U256> {
      unsupported()
    }

    async fn approve(
      &self,
      _spender: Address,
      _amount: U256,
    ) -> GatewayResult<TxHash> {
      unsupported()
    }
  }

  #[async_trait]
  impl ChainGateway for OvershootingPool {
    async fn chain_id(&self) -> GatewayResult<u64> {
      Ok(11_155_111)
    }

    async fn native_balance(&self, _account: Address) -> GatewayResult<U256> {
      Ok(native_reserve())
    }

    async fn wait_for_receipt(
      &self,
      _tx_hash: TxHash,
    ) -> GatewayResult<Receipt> {
      unsupported()
    }
  }

  fn overshooting_gateway() -> ContractGateway {
    let pool = Arc::new(OvershootingPool);
    ContractGateway::new(Address::ZERO, pool.clone(), pool.clone(), pool)
  }

  #[tokio::test]
  async fn estimate_is_clamped_to_output_reserve() {
    let strategy = SimulationStrategy::new(overshooting_gateway());

    let quote = strategy
      .get_quote(Direction::NativeToToken, one())
      .await
      .unwrap();
    assert_eq!(quote.amount_out, token_reserve());

    let quote = strategy
      .get_quote(Direction::TokenToNative, one())
      .await
      .unwrap();
    assert_eq!(quote.amount_out, native_reserve());
  }

  #[tokio::test]
  async fn minimum_never_exceeds_output_reserve() {
    let engine = QuoteEngine::simulated(overshooting_gateway());
    let QuoteResponse::Current(quote) =
      engine.quote(Direction::NativeToToken, one()).await
    else {
      panic!("latest request must be current");
    };
    assert_le!(quote.amount_out, token_reserve());
    for slippage in SlippageTolerance::PRESETS {
      assert_le!(quote.minimum_out(slippage), token_reserve());
    }
  }
}
