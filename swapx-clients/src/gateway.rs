//! Capability traits over the remote pool and token contracts.
//!
//! Handles are created once per connected account and shared read-only by
//! every workflow through [`ContractGateway`]. The signer lives behind the
//! trait objects, so write calls carry no sender argument.

use std::sync::Arc;

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use futures::try_join;
use log::debug;
use serde::{Deserialize, Serialize};
use swapx_core::reserves::Reserves;

use crate::failure::GatewayError;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Outcome recorded in a mined transaction's receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
  Success,
  Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
  pub tx_hash: TxHash,
  pub block_number: u64,
  pub status: TxStatus,
}

/// Automated-market-maker pool contract.
#[async_trait]
pub trait PoolGateway: Send + Sync {
  /// Address of the pool contract, the spender for token approvals.
  fn address(&self) -> Address;

  /// Token held by the pool (`getReserve`).
  async fn token_reserve(&self) -> GatewayResult<U256>;

  /// Read-only output estimate (`getOutputAmountFromSwap`).
  async fn simulate_output(
    &self,
    amount_in: U256,
    input_reserve: U256,
    output_reserve: U256,
  ) -> GatewayResult<U256>;

  async fn lp_balance_of(&self, account: Address) -> GatewayResult<U256>;

  async fn lp_total_supply(&self) -> GatewayResult<U256>;

  /// Static call of `addLiquidity`, returning the LP amount that would be
  /// minted.
  async fn simulate_deposit(
    &self,
    token_amount: U256,
    value: U256,
  ) -> GatewayResult<U256>;

  /// `addLiquidity(tokenAmount)` carrying `value` native.
  async fn deposit(
    &self,
    token_amount: U256,
    value: U256,
  ) -> GatewayResult<TxHash>;

  /// `removeLiquidity(lpAmount)`.
  async fn withdraw(&self, lp_amount: U256) -> GatewayResult<TxHash>;

  /// `ethToTokenSwap(minTokens)` carrying `value` native.
  async fn swap_native_for_token(
    &self,
    min_out: U256,
    value: U256,
  ) -> GatewayResult<TxHash>;

  /// `tokenToEthSwap(tokensSold, minEth)`.
  async fn swap_token_for_native(
    &self,
    amount_in: U256,
    min_out: U256,
  ) -> GatewayResult<TxHash>;
}

/// ERC-20 token contract.
#[async_trait]
pub trait TokenGateway: Send + Sync {
  fn address(&self) -> Address;

  async fn balance_of(&self, account: Address) -> GatewayResult<U256>;

  async fn allowance(
    &self,
    owner: Address,
    spender: Address,
  ) -> GatewayResult<U256>;

  async fn approve(
    &self,
    spender: Address,
    amount: U256,
  ) -> GatewayResult<TxHash>;
}

/// Chain-level reads not tied to either contract.
#[async_trait]
pub trait ChainGateway: Send + Sync {
  async fn chain_id(&self) -> GatewayResult<u64>;

  async fn native_balance(&self, account: Address) -> GatewayResult<U256>;

  /// Waits until the transaction is mined.
  async fn wait_for_receipt(&self, tx_hash: TxHash) -> GatewayResult<Receipt>;
}

/// Builds gateway handles signing for a connected account.
pub trait GatewayFactory: Send + Sync {
  fn connect(&self, account: Address) -> ContractGateway;
}

/// Capability object injected into quote and workflow components.
#[derive(Clone)]
pub struct ContractGateway {
  account: Address,
  pool: Arc<dyn PoolGateway>,
  token: Arc<dyn TokenGateway>,
  chain: Arc<dyn ChainGateway>,
}

impl ContractGateway {
  #[must_use]
  pub fn new(
    account: Address,
    pool: Arc<dyn PoolGateway>,
    token: Arc<dyn TokenGateway>,
    chain: Arc<dyn ChainGateway>,
  ) -> ContractGateway {
    ContractGateway {
      account,
      pool,
      token,
      chain,
    }
  }

  /// Connected account the handles sign for.
  #[must_use]
  pub fn account(&self) -> Address {
    self.account
  }

  #[must_use]
  pub fn pool(&self) -> &dyn PoolGateway {
    self.pool.as_ref()
  }

  #[must_use]
  pub fn token(&self) -> &dyn TokenGateway {
    self.token.as_ref()
  }

  #[must_use]
  pub fn chain(&self) -> &dyn ChainGateway {
    self.chain.as_ref()
  }

  /// Fresh reserves: the pool's native balance and its token reserve.
  ///
  /// # Errors
  /// * Either read fails
  pub async fn reserves(&self) -> GatewayResult<Reserves> {
    let (native, token) = try_join!(
      self.chain.native_balance(self.pool.address()),
      self.pool.token_reserve()
    )?;
    Ok(Reserves::new(native, token))
  }

  /// Waits for the transaction and fails if it was mined but reverted.
  ///
  /// # Errors
  /// * Receipt fetch fails
  /// * Receipt status is failure
  pub async fn confirm(&self, tx_hash: TxHash) -> GatewayResult<Receipt> {
    let receipt = self.chain.wait_for_receipt(tx_hash).await?;
    debug!(
      "Transaction {tx_hash} mined in block {} with status {:?}",
      receipt.block_number, receipt.status
    );
    match receipt.status {
      TxStatus::Success => Ok(receipt),
      TxStatus::Failed => Err(GatewayError::revert("transaction reverted")),
    }
  }
}
