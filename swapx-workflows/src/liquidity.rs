//! Deposits into and withdrawals from the pool.
//!
//! Both operations share one tracker, so a deposit and a withdrawal never
//! run at the same time. A deposit approves the token side if needed,
//! dry-runs `addLiquidity` with a static call, then submits it. A withdrawal
//! always redeems the whole LP balance.

use alloy_primitives::{TxHash, U256};
use log::debug;
use swapx_clients::gateway::Receipt;
use swapx_core::amount::{normalize, to_decimal_string};
use tokio::sync::watch;

use crate::allowance::ensure_allowance;
use crate::balance_view::PoolInfo;
use crate::error::Stage;
use crate::phase::{OperationInputs, Phase, PendingOperation, Run, Tracker};
use crate::{WorkflowContext, WorkflowError};

pub struct LiquidityWorkflow {
  context: WorkflowContext,
  tracker: Tracker,
}

impl LiquidityWorkflow {
  #[must_use]
  pub fn new(context: WorkflowContext) -> LiquidityWorkflow {
    LiquidityWorkflow {
      context,
      tracker: Tracker::new(),
    }
  }

  #[must_use]
  pub fn phase(&self) -> Phase {
    self.tracker.phase()
  }

  #[must_use]
  pub fn subscribe(&self) -> watch::Receiver<Phase> {
    self.tracker.subscribe()
  }

  #[must_use]
  pub fn pending(&self) -> Option<PendingOperation> {
    self.tracker.pending()
  }

  /// Position derived from the last balance refresh.
  #[must_use]
  pub fn pool_info(&self) -> PoolInfo {
    self.context.balances().pool_info()
  }

  /// Token amount matching `native_raw` at the current reserve ratio, as a
  /// decimal string. `None` for an empty pool, where the first deposit sets
  /// the ratio.
  ///
  /// # Errors
  /// * Wallet disconnected or on the wrong network
  /// * Input rejected by the amount codec
  /// * Reserve read fails
  pub async fn suggest_token_amount(
    &self,
    native_raw: &str,
  ) -> Result<Option<String>, WorkflowError> {
    self.context.ensure_ready()?;
    let native = normalize(native_raw)?;
    if native.is_zero() {
      return Ok(None);
    }
    let reserves = self
      .context
      .gateway()
      .reserves()
      .await
      .map_err(WorkflowError::at(Stage::Read))?;
    Ok(
      reserves
        .proportional_token(native.units())
        .map(to_decimal_string),
    )
  }

  /// Adds `native_raw` native and `token_raw` token to the pool.
  ///
  /// # Errors
  /// * Either amount missing or rejected by the amount codec
  /// * Wallet disconnected or on the wrong network
  /// * Another operation in progress
  /// * Approval, dry run, or deposit declined or reverted
  pub async fn deposit(
    &self,
    native_raw: &str,
    token_raw: &str,
  ) -> Result<Receipt, WorkflowError> {
    let native = normalize(native_raw)?.non_zero()?.units();
    let token = normalize(token_raw)?.non_zero()?.units();
    self.context.ensure_ready()?;

    let run = self
      .tracker
      .begin(OperationInputs::Deposit { native, token }, Phase::Approving)?;
    let result = self.submit_deposit(&run, native, token).await;
    self.finish(run, result).await
  }

  /// Redeems the account's entire LP balance. Nothing is sent when the
  /// last known balance is zero.
  ///
  /// # Errors
  /// * No LP balance
  /// * Wallet disconnected or on the wrong network
  /// * Another operation in progress
  /// * Withdrawal declined or reverted
  pub async fn withdraw(&self) -> Result<Receipt, WorkflowError> {
    let lp = self.context.balances().snapshot().lp;
    if lp.is_zero() {
      return Err(WorkflowError::precondition("No liquidity to withdraw."));
    }
    self.context.ensure_ready()?;

    let run = self
      .tracker
      .begin(OperationInputs::Withdraw { lp }, Phase::Submitting)?;
    let result = self.submit_withdraw(&run, lp).await;
    self.finish(run, result).await
  }

  async fn submit_deposit(
    &self,
    run: &Run<'_>,
    native: U256,
    token: U256,
  ) -> Result<Receipt, WorkflowError> {
    let gateway = self.context.gateway();
    if let Some(approval) = ensure_allowance(gateway, token).await? {
      run.record(approval.tx_hash);
    }

    run.advance(Phase::Simulating);
    let minted = gateway
      .pool()
      .simulate_deposit(token, native)
      .await
      .map_err(WorkflowError::at(Stage::Simulation))?;
    debug!("Deposit dry run mints {minted} LP");

    run.advance(Phase::Submitting);
    let tx_hash = gateway
      .pool()
      .deposit(token, native)
      .await
      .map_err(WorkflowError::at(Stage::Submission))?;
    self.confirm(run, tx_hash).await
  }

  async fn submit_withdraw(
    &self,
    run: &Run<'_>,
    lp: U256,
  ) -> Result<Receipt, WorkflowError> {
    let tx_hash = self
      .context
      .gateway()
      .pool()
      .withdraw(lp)
      .await
      .map_err(WorkflowError::at(Stage::Submission))?;
    self.confirm(run, tx_hash).await
  }

  async fn confirm(
    &self,
    run: &Run<'_>,
    tx_hash: TxHash,
  ) -> Result<Receipt, WorkflowError> {
    run.record(tx_hash);
    run.advance(Phase::Confirming);
    self
      .context
      .gateway()
      .confirm(tx_hash)
      .await
      .map_err(WorkflowError::at(Stage::Submission))
  }

  async fn finish(
    &self,
    run: Run<'_>,
    result: Result<Receipt, WorkflowError>,
  ) -> Result<Receipt, WorkflowError> {
    match result {
      Ok(receipt) => {
        run.settle();
        self.context.balances().refresh().await;
        Ok(receipt)
      }
      Err(e) => Err(run.fail(e)),
    }
  }
}
