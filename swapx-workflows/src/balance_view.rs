//! Mirror of the connected account's balances and its pool position.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use alloy_primitives::U256;
use futures::join;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use swapx_clients::gateway::GatewayResult;
use swapx_clients::ContractGateway;
use swapx_core::asset::Asset;
use swapx_core::exchange_math::{pool_share_percent, underlying_claim};
use swapx_core::reserves::Reserves;

/// Native coin kept back by [`Balances::max_input`] for gas: 0.001.
pub const GAS_RESERVE_UNITS: u64 = 1_000_000_000_000_000;

/// Last known values. Authoritative state lives in the contracts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Balances {
  pub native: U256,
  pub token: U256,
  pub lp: U256,
  pub lp_total_supply: U256,
  pub reserves: Reserves,
}

/// Account's position in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolInfo {
  pub lp_balance: U256,
  pub lp_total_supply: U256,
  /// Percentage of total supply, four places.
  pub share_percent: Decimal,
  /// Reserves redeemable for the account's LP balance.
  pub claim: Reserves,
}

impl Balances {
  #[must_use]
  pub fn of(&self, asset: Asset) -> U256 {
    match asset {
      Asset::Native => self.native,
      Asset::Token => self.token,
    }
  }

  #[must_use]
  pub fn pool_share_percent(&self) -> Decimal {
    pool_share_percent(self.lp, self.lp_total_supply)
  }

  #[must_use]
  pub fn pool_info(&self) -> PoolInfo {
    PoolInfo {
      lp_balance: self.lp,
      lp_total_supply: self.lp_total_supply,
      share_percent: self.pool_share_percent(),
      claim: underlying_claim(self.lp, self.lp_total_supply, &self.reserves),
    }
  }

  /// Largest spendable input: the whole token balance, or the native
  /// balance less the gas reserve.
  #[must_use]
  pub fn max_input(&self, asset: Asset) -> U256 {
    match asset {
      Asset::Native => self
        .native
        .saturating_sub(U256::from(GAS_RESERVE_UNITS)),
      Asset::Token => self.token,
    }
  }
}

/// Shared, refreshable [`Balances`]. Clones observe the same values.
#[derive(Clone)]
pub struct BalanceView {
  gateway: ContractGateway,
  balances: Arc<Mutex<Balances>>,
  refreshes: Arc<AtomicU64>,
}

impl BalanceView {
  #[must_use]
  pub fn new(gateway: ContractGateway) -> BalanceView {
    BalanceView {
      gateway,
      balances: Arc::default(),
      refreshes: Arc::default(),
    }
  }

  #[must_use]
  pub fn snapshot(&self) -> Balances {
    *self.lock()
  }

  /// Number of completed refreshes.
  #[must_use]
  pub fn refresh_count(&self) -> u64 {
    self.refreshes.load(Ordering::SeqCst)
  }

  /// Re-reads every field concurrently. Each read is independent: a failed
  /// one is logged and leaves its field at the previous value.
  pub async fn refresh(&self) -> Balances {
    let account = self.gateway.account();
    let pool = self.gateway.pool();
    let token = self.gateway.token();
    let chain = self.gateway.chain();
    let (native, token_balance, lp, lp_total_supply, pool_native, pool_token) =
      join!(
        chain.native_balance(account),
        token.balance_of(account),
        pool.lp_balance_of(account),
        pool.lp_total_supply(),
        chain.native_balance(pool.address()),
        pool.token_reserve()
      );

    let snapshot = {
      let mut balances = self.lock();
      update(&mut balances.native, native, "native balance");
      update(&mut balances.token, token_balance, "token balance");
      update(&mut balances.lp, lp, "LP balance");
      update(&mut balances.lp_total_supply, lp_total_supply, "LP total supply");
      update(&mut balances.reserves.native, pool_native, "native reserve");
      update(&mut balances.reserves.token, pool_token, "token reserve");
      *balances
    };
    let count = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
    debug!("Balances for {account} refreshed (#{count}): {snapshot:?}");
    snapshot
  }

  #[must_use]
  pub fn pool_info(&self) -> PoolInfo {
    self.snapshot().pool_info()
  }

  #[must_use]
  pub fn max_input(&self, asset: Asset) -> U256 {
    self.snapshot().max_input(asset)
  }

  fn lock(&self) -> MutexGuard<'_, Balances> {
    self.balances.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn update(field: &mut U256, read: GatewayResult<U256>, name: &str) {
  match read {
    Ok(value) => *field = value,
    Err(e) => warn!("Keeping previous {name}: {e}"),
  }
}
