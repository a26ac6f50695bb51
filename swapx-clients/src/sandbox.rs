//! Deterministic in-memory chain hosting a constant-product pool and its
//! ERC-20 token.
//!
//! Transactions are mined as soon as they are submitted; the receipt is
//! handed out by `wait_for_receipt`. Every call issued through a gateway
//! handle is appended to a journal so that ordering can be inspected, and
//! one-shot [`Fault`]s can be queued to make the next matching call fail.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{address, Address, TxHash, U256};
use async_trait::async_trait;
use log::debug;
use swapx_core::exchange_math::constant_product_output;
use swapx_core::reserves::Reserves;
use tokio::sync::Mutex;

use crate::config::SEPOLIA;
use crate::failure::{GatewayError, POOL_CUSTOM_ERRORS};
use crate::gateway::{
  ChainGateway, ContractGateway, GatewayFactory, GatewayResult, PoolGateway,
  Receipt, TokenGateway, TxStatus,
};

pub const POOL_ADDRESS: Address =
  address!("0x5a00000000000000000000000000000000000001");
pub const TOKEN_ADDRESS: Address =
  address!("0x7a00000000000000000000000000000000000002");

pub const INSUFFICIENT_OUTPUT: &str = "SwapX: insufficient output amount";
pub const INVALID_RESERVES: &str = "SwapX: invalid reserves";
pub const INSUFFICIENT_ALLOWANCE: &str = "ERC20: insufficient allowance";
pub const INSUFFICIENT_BALANCE: &str = "ERC20: transfer amount exceeds balance";

/// State-changing entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
  Approve,
  Deposit,
  Withdraw,
  SwapNativeForToken,
  SwapTokenForNative,
}

/// Read-only entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Read {
  ChainId,
  NativeBalance,
  TokenBalance,
  Allowance,
  TokenReserve,
  SimulateOutput,
  SimulateDeposit,
  LpBalance,
  LpTotalSupply,
}

/// One-shot failure applied to the next matching call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
  /// The wallet declines to sign.
  Reject(Method),
  /// The call reverts at submission.
  Revert(Method, GatewayError),
  /// The call is mined with a failed receipt.
  FailReceipt(Method),
  /// The read fails at the transport level.
  FailRead(Read),
  /// The read resolves only after the delay.
  Delay(Read, Duration),
}

impl Fault {
  fn method(&self) -> Option<Method> {
    match self {
      Fault::Reject(m) | Fault::Revert(m, _) | Fault::FailReceipt(m) => {
        Some(*m)
      }
      Fault::FailRead(_) | Fault::Delay(..) => None,
    }
  }

  fn read(&self) -> Option<Read> {
    match self {
      Fault::FailRead(r) | Fault::Delay(r, _) => Some(*r),
      _ => None,
    }
  }
}

/// Calls issued through gateway handles, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  Approve {
    owner: Address,
    spender: Address,
    amount: U256,
  },
  SimulateDeposit {
    from: Address,
    token_amount: U256,
    value: U256,
  },
  Deposit {
    from: Address,
    token_amount: U256,
    value: U256,
  },
  Withdraw {
    from: Address,
    lp_amount: U256,
  },
  SwapNativeForToken {
    from: Address,
    min_out: U256,
    value: U256,
  },
  SwapTokenForNative {
    from: Address,
    amount_in: U256,
    min_out: U256,
  },
  Confirm(TxHash),
}

impl Call {
  /// Whether the call changes chain state.
  #[must_use]
  pub fn is_mutation(&self) -> bool {
    !matches!(self, Call::SimulateDeposit { .. } | Call::Confirm(_))
  }
}

fn overflow() -> GatewayError {
  GatewayError::revert("arithmetic overflow")
}

fn mul_div(a: U256, b: U256, denominator: U256) -> GatewayResult<U256> {
  if denominator.is_zero() {
    return Err(GatewayError::revert("division by zero"));
  }
  a.checked_mul(b).map(|n| n / denominator).ok_or_else(overflow)
}

fn custom_error(name: &str) -> GatewayError {
  POOL_CUSTOM_ERRORS
    .iter()
    .find(|(_, known)| *known == name)
    .map_or_else(
      || GatewayError::revert(name),
      |(selector, _)| GatewayError::revert_data(selector.to_vec()),
    )
}

#[derive(Debug, Clone, Default)]
struct Ledger {
  chain_id: u64,
  block_number: u64,
  nonce: u64,
  native: HashMap<Address, U256>,
  token: HashMap<Address, U256>,
  allowances: HashMap<(Address, Address), U256>,
  lp: HashMap<Address, U256>,
  lp_total: U256,
  receipts: HashMap<TxHash, Receipt>,
  journal: Vec<Call>,
  faults: Vec<Fault>,
}

impl Ledger {
  fn native_of(&self, account: Address) -> U256 {
    self.native.get(&account).copied().unwrap_or_default()
  }

  fn token_of(&self, account: Address) -> U256 {
    self.token.get(&account).copied().unwrap_or_default()
  }

  fn lp_of(&self, account: Address) -> U256 {
    self.lp.get(&account).copied().unwrap_or_default()
  }

  fn allowance_of(&self, owner: Address, spender: Address) -> U256 {
    self
      .allowances
      .get(&(owner, spender))
      .copied()
      .unwrap_or_default()
  }

  fn reserves(&self) -> Reserves {
    Reserves::new(self.native_of(POOL_ADDRESS), self.token_of(POOL_ADDRESS))
  }

  fn take_fault(&mut self, matches: impl Fn(&Fault) -> bool) -> Option<Fault> {
    let index = self.faults.iter().position(matches)?;
    Some(self.faults.remove(index))
  }

  fn mine(&mut self, status: TxStatus) -> TxHash {
    self.nonce += 1;
    self.block_number += 1;
    let tx_hash = TxHash::from(U256::from(self.nonce));
    self.receipts.insert(
      tx_hash,
      Receipt {
        tx_hash,
        block_number: self.block_number,
        status,
      },
    );
    tx_hash
  }

  fn check_native(&self, from: Address, value: U256) -> GatewayResult<()> {
    if self.native_of(from) < value {
      return Err(GatewayError::Rpc {
        code: -32000,
        message: "insufficient funds for gas * price + value".to_string(),
      });
    }
    Ok(())
  }

  /// Checks a `transferFrom(from, pool, amount)` by the pool.
  fn check_token_pull(&self, from: Address, amount: U256) -> GatewayResult<()> {
    if self.allowance_of(from, POOL_ADDRESS) < amount {
      return Err(GatewayError::revert(INSUFFICIENT_ALLOWANCE));
    }
    if self.token_of(from) < amount {
      return Err(GatewayError::revert(INSUFFICIENT_BALANCE));
    }
    Ok(())
  }

  fn move_native(&mut self, from: Address, to: Address, amount: U256) {
    let from_balance = self.native_of(from) - amount;
    self.native.insert(from, from_balance);
    let to_balance = self.native_of(to) + amount;
    self.native.insert(to, to_balance);
  }

  fn move_token(&mut self, from: Address, to: Address, amount: U256) {
    let from_balance = self.token_of(from) - amount;
    self.token.insert(from, from_balance);
    let to_balance = self.token_of(to) + amount;
    self.token.insert(to, to_balance);
  }

  fn pull_token(&mut self, from: Address, amount: U256) {
    let allowance = self.allowance_of(from, POOL_ADDRESS) - amount;
    self.allowances.insert((from, POOL_ADDRESS), allowance);
    self.move_token(from, POOL_ADDRESS, amount);
  }

  fn add_liquidity(
    &mut self,
    from: Address,
    token_amount: U256,
    value: U256,
  ) -> GatewayResult<U256> {
    if value.is_zero() || token_amount.is_zero() {
      return Err(custom_error("InsufficientTokenAmount"));
    }
    let reserves = self.reserves();
    let (token_used, minted) = if self.lp_total.is_zero() {
      (token_amount, value)
    } else {
      let required = mul_div(value, reserves.token, reserves.native)?;
      if token_amount < required {
        return Err(custom_error("InsufficientTokenAmount"));
      }
      (required, mul_div(value, self.lp_total, reserves.native)?)
    };
    self.check_native(from, value)?;
    self.check_token_pull(from, token_used)?;

    self.move_native(from, POOL_ADDRESS, value);
    self.pull_token(from, token_used);
    let balance = self.lp_of(from) + minted;
    self.lp.insert(from, balance);
    self.lp_total += minted;
    Ok(minted)
  }

  fn remove_liquidity(
    &mut self,
    from: Address,
    lp_amount: U256,
  ) -> GatewayResult<Reserves> {
    if lp_amount.is_zero() || lp_amount > self.lp_of(from) {
      return Err(custom_error("InsufficientLiquidity"));
    }
    let reserves = self.reserves();
    let native_out = mul_div(lp_amount, reserves.native, self.lp_total)?;
    let token_out = mul_div(lp_amount, reserves.token, self.lp_total)?;

    let balance = self.lp_of(from) - lp_amount;
    self.lp.insert(from, balance);
    self.lp_total -= lp_amount;
    self.move_native(POOL_ADDRESS, from, native_out);
    self.move_token(POOL_ADDRESS, from, token_out);
    Ok(Reserves::new(native_out, token_out))
  }

  fn quote(
    amount_in: U256,
    input_reserve: U256,
    output_reserve: U256,
  ) -> GatewayResult<U256> {
    if input_reserve.is_zero() || output_reserve.is_zero() {
      return Err(GatewayError::revert(INVALID_RESERVES));
    }
    constant_product_output(amount_in, input_reserve, output_reserve)
      .map_err(|e| GatewayError::revert(e.to_string()))
  }

  fn swap_native_for_token(
    &mut self,
    from: Address,
    min_out: U256,
    value: U256,
  ) -> GatewayResult<U256> {
    self.check_native(from, value)?;
    let reserves = self.reserves();
    let out = Self::quote(value, reserves.native, reserves.token)?;
    if out.is_zero() || out < min_out {
      return Err(GatewayError::revert(INSUFFICIENT_OUTPUT));
    }
    self.move_native(from, POOL_ADDRESS, value);
    self.move_token(POOL_ADDRESS, from, out);
    Ok(out)
  }

  fn swap_token_for_native(
    &mut self,
    from: Address,
    amount_in: U256,
    min_out: U256,
  ) -> GatewayResult<U256> {
    self.check_token_pull(from, amount_in)?;
    let reserves = self.reserves();
    let out = Self::quote(amount_in, reserves.token, reserves.native)?;
    if out.is_zero() || out < min_out {
      return Err(GatewayError::revert(INSUFFICIENT_OUTPUT));
    }
    self.pull_token(from, amount_in);
    self.move_native(POOL_ADDRESS, from, out);
    Ok(out)
  }
}

/// Shared in-memory chain. Clones observe the same state.
#[derive(Clone)]
pub struct SandboxChain {
  ledger: Arc<Mutex<Ledger>>,
}

impl Default for SandboxChain {
  fn default() -> Self {
    Self::new(SEPOLIA.id)
  }
}

impl SandboxChain {
  #[must_use]
  pub fn new(chain_id: u64) -> SandboxChain {
    SandboxChain {
      ledger: Arc::new(Mutex::new(Ledger {
        chain_id,
        ..Ledger::default()
      })),
    }
  }

  /// Gateway handles signing as `account`.
  #[must_use]
  pub fn gateway(&self, account: Address) -> ContractGateway {
    let handle = Arc::new(SandboxHandle {
      chain: self.clone(),
      account,
    });
    ContractGateway::new(account, handle.clone(), handle.clone(), handle)
  }

  /// Credits native coin and token to an account.
  pub async fn fund(&self, account: Address, native: U256, token: U256) {
    let mut ledger = self.ledger.lock().await;
    let native = ledger.native_of(account) + native;
    ledger.native.insert(account, native);
    let token = ledger.token_of(account) + token;
    ledger.token.insert(account, token);
  }

  /// Funds `provider` and deposits liquidity on its behalf, outside the
  /// journal.
  ///
  /// # Errors
  /// * Deposit rejected by the pool
  pub async fn seed_liquidity(
    &self,
    provider: Address,
    native: U256,
    token: U256,
  ) -> GatewayResult<U256> {
    self.fund(provider, native, token).await;
    let mut ledger = self.ledger.lock().await;
    let allowance = ledger.allowance_of(provider, POOL_ADDRESS) + token;
    ledger.allowances.insert((provider, POOL_ADDRESS), allowance);
    ledger.add_liquidity(provider, token, native)
  }

  /// Native-for-token swap by another trader, outside the journal.
  ///
  /// # Errors
  /// * Swap rejected by the pool
  pub async fn external_swap_native(
    &self,
    trader: Address,
    value: U256,
  ) -> GatewayResult<U256> {
    self.fund(trader, value, U256::ZERO).await;
    let mut ledger = self.ledger.lock().await;
    ledger.swap_native_for_token(trader, U256::ZERO, value)
  }

  /// Queues a one-shot fault.
  pub async fn inject(&self, fault: Fault) {
    self.ledger.lock().await.faults.push(fault);
  }

  pub async fn journal(&self) -> Vec<Call> {
    self.ledger.lock().await.journal.clone()
  }

  pub async fn clear_journal(&self) {
    self.ledger.lock().await.journal.clear();
  }

  pub async fn reserves(&self) -> Reserves {
    self.ledger.lock().await.reserves()
  }

  pub async fn native_balance_of(&self, account: Address) -> U256 {
    self.ledger.lock().await.native_of(account)
  }

  pub async fn token_balance_of(&self, account: Address) -> U256 {
    self.ledger.lock().await.token_of(account)
  }

  pub async fn pool_allowance_of(&self, owner: Address) -> U256 {
    self.ledger.lock().await.allowance_of(owner, POOL_ADDRESS)
  }

  pub async fn lp_balance_of(&self, account: Address) -> U256 {
    self.ledger.lock().await.lp_of(account)
  }

  pub async fn lp_total_supply(&self) -> U256 {
    self.ledger.lock().await.lp_total
  }

  async fn read<T, F>(&self, read: Read, f: F) -> GatewayResult<T>
  where
    F: FnOnce(&Ledger) -> GatewayResult<T> + Send,
    T: Send,
  {
    let fault = self
      .ledger
      .lock()
      .await
      .take_fault(|fault| fault.read() == Some(read));
    match fault {
      Some(Fault::FailRead(_)) => {
        return Err(GatewayError::Transport(format!("{read:?} unavailable")));
      }
      Some(Fault::Delay(_, delay)) => tokio::time::sleep(delay).await,
      _ => {}
    }
    let ledger = self.ledger.lock().await;
    f(&ledger)
  }

  async fn submit<F>(
    &self,
    method: Method,
    call: Call,
    apply: F,
  ) -> GatewayResult<TxHash>
  where
    F: FnOnce(&mut Ledger) -> GatewayResult<()> + Send,
  {
    let mut ledger = self.ledger.lock().await;
    ledger.journal.push(call);
    match ledger.take_fault(|fault| fault.method() == Some(method)) {
      Some(Fault::Reject(_)) => return Err(GatewayError::UserRejected),
      Some(Fault::Revert(_, error)) => return Err(error),
      Some(Fault::FailReceipt(_)) => return Ok(ledger.mine(TxStatus::Failed)),
      _ => {}
    }
    apply(&mut ledger)?;
    let tx_hash = ledger.mine(TxStatus::Success);
    debug!("Sandbox mined {method:?} as {tx_hash}");
    Ok(tx_hash)
  }
}

impl GatewayFactory for SandboxChain {
  fn connect(&self, account: Address) -> ContractGateway {
    self.gateway(account)
  }
}

/// Gateway handle bound to one account.
struct SandboxHandle {
  chain: SandboxChain,
  account: Address,
}

#[async_trait]
impl PoolGateway for SandboxHandle {
  fn address(&self) -> Address {
    POOL_ADDRESS
  }

  async fn token_reserve(&self) -> GatewayResult<U256> {
    self
      .chain
      .read(Read::TokenReserve, |l| Ok(l.token_of(POOL_ADDRESS)))
      .await
  }

  async fn simulate_output(
    &self,
    amount_in: U256,
    input_reserve: U256,
    output_reserve: U256,
  ) -> GatewayResult<U256> {
    self
      .chain
      .read(Read::SimulateOutput, |_| {
        Ledger::quote(amount_in, input_reserve, output_reserve)
      })
      .await
  }

  async fn lp_balance_of(&self, account: Address) -> GatewayResult<U256> {
    self
      .chain
      .read(Read::LpBalance, |l| Ok(l.lp_of(account)))
      .await
  }

  async fn lp_total_supply(&self) -> GatewayResult<U256> {
    self
      .chain
      .read(Read::LpTotalSupply, |l| Ok(l.lp_total))
      .await
  }

  async fn simulate_deposit(
    &self,
    token_amount: U256,
    value: U256,
  ) -> GatewayResult<U256> {
    let from = self.account;
    self.chain.ledger.lock().await.journal.push(Call::SimulateDeposit {
      from,
      token_amount,
      value,
    });
    self
      .chain
      .read(Read::SimulateDeposit, |l| {
        l.clone().add_liquidity(from, token_amount, value)
      })
      .await
  }

  async fn deposit(
    &self,
    token_amount: U256,
    value: U256,
  ) -> GatewayResult<TxHash> {
    let from = self.account;
    let call = Call::Deposit {
      from,
      token_amount,
      value,
    };
    self
      .chain
      .submit(Method::Deposit, call, |l| {
        l.add_liquidity(from, token_amount, value).map(|_| ())
      })
      .await
  }

  async fn withdraw(&self, lp_amount: U256) -> GatewayResult<TxHash> {
    let from = self.account;
    let call = Call::Withdraw { from, lp_amount };
    self
      .chain
      .submit(Method::Withdraw, call, |l| {
        l.remove_liquidity(from, lp_amount).map(|_| ())
      })
      .await
  }

  async fn swap_native_for_token(
    &self,
    min_out: U256,
    value: U256,
  ) -> GatewayResult<TxHash> {
    let from = self.account;
    let call = Call::SwapNativeForToken {
      from,
      min_out,
      value,
    };
    self
      .chain
      .submit(Method::SwapNativeForToken, call, |l| {
        l.swap_native_for_token(from, min_out, value).map(|_| ())
      })
      .await
  }

  async fn swap_token_for_native(
    &self,
    amount_in: U256,
    min_out: U256,
  ) -> GatewayResult<TxHash> {
    let from = self.account;
    let call = Call::SwapTokenForNative {
      from,
      amount_in,
      min_out,
    };
    self
      .chain
      .submit(Method::SwapTokenForNative, call, |l| {
        l.swap_token_for_native(from, amount_in, min_out).map(|_| ())
      })
      .await
  }
}

#[async_trait]
impl TokenGateway for SandboxHandle {
  fn address(&self) -> Address {
    TOKEN_ADDRESS
  }

  async fn balance_of(&self, account: Address) -> GatewayResult<U256> {
    self
      .chain
      .read(Read::TokenBalance, |l| Ok(l.token_of(account)))
      .await
  }

  async fn allowance(
    &self,
    owner: Address,
    spender: Address,
  ) -> GatewayResult<U256> {
    self
      .chain
      .read(Read::Allowance, |l| Ok(l.allowance_of(owner, spender)))
      .await
  }

  async fn approve(
    &self,
    spender: Address,
    amount: U256,
  ) -> GatewayResult<TxHash> {
    let owner = self.account;
    let call = Call::Approve {
      owner,
      spender,
      amount,
    };
    self
      .chain
      .submit(Method::Approve, call, |l| {
        l.allowances.insert((owner, spender), amount);
        Ok(())
      })
      .await
  }
}

#[async_trait]
impl ChainGateway for SandboxHandle {
  async fn chain_id(&self) -> GatewayResult<u64> {
    self.chain.read(Read::ChainId, |l| Ok(l.chain_id)).await
  }

  async fn native_balance(&self, account: Address) -> GatewayResult<U256> {
    self
      .chain
      .read(Read::NativeBalance, |l| Ok(l.native_of(account)))
      .await
  }

  async fn wait_for_receipt(&self, tx_hash: TxHash) -> GatewayResult<Receipt> {
    let mut ledger = self.chain.ledger.lock().await;
    ledger.journal.push(Call::Confirm(tx_hash));
    ledger.receipts.get(&tx_hash).copied().ok_or_else(|| {
      GatewayError::Transport(format!("transaction {tx_hash} not found"))
    })
  }
}
