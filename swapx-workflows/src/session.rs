use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use swapx_clients::config::ClientConfig;
use swapx_clients::gateway::GatewayFactory;
use swapx_clients::wallet::{network_status, NetworkStatus, WalletConnector};

use crate::error::Stage;
use crate::{LiquidityWorkflow, SwapWorkflow, WorkflowContext, WorkflowError};

/// Connected client: configuration, wallet and per-account gateway handles.
///
/// Handles are built once per account. When the wallet reports a different
/// account, the next [`Session::context`] builds fresh handles, checks that
/// they reach the expected chain and re-reads balances before returning.
pub struct Session {
  config: ClientConfig,
  wallet: Arc<dyn WalletConnector>,
  factory: Arc<dyn GatewayFactory>,
  current: Mutex<Option<WorkflowContext>>,
}

impl Session {
  #[must_use]
  pub fn new(
    config: ClientConfig,
    wallet: Arc<dyn WalletConnector>,
    factory: Arc<dyn GatewayFactory>,
  ) -> Session {
    Session {
      config,
      wallet,
      factory,
      current: Mutex::new(None),
    }
  }

  #[must_use]
  pub fn config(&self) -> &ClientConfig {
    &self.config
  }

  #[must_use]
  pub fn status(&self) -> NetworkStatus {
    network_status(self.wallet.as_ref(), self.config.expected_chain_id)
  }

  /// Context for the connected account.
  ///
  /// # Errors
  /// * Wallet disconnected
  /// * Wallet or gateway on the wrong network
  /// * Chain id read fails
  pub async fn context(&self) -> Result<WorkflowContext, WorkflowError> {
    let account = match self.status() {
      NetworkStatus::Ready { account } => account,
      NetworkStatus::WrongNetwork { expected, actual } => {
        return Err(WorkflowError::NetworkMismatch { expected, actual });
      }
      NetworkStatus::Disconnected => return Err(WorkflowError::NotConnected),
    };
    let cached = self
      .lock()
      .clone()
      .filter(|context| context.account() == account);
    if let Some(context) = cached {
      return Ok(context);
    }

    info!(
      "Connecting {account} on {}",
      self.config.expected_chain_name()
    );
    let gateway = self.factory.connect(account);
    let expected = self.config.expected_chain_id;
    let actual = gateway
      .chain()
      .chain_id()
      .await
      .map_err(WorkflowError::at(Stage::Read))?;
    if actual != expected {
      warn!("Gateway for {account} reaches chain {actual}, not {expected}");
      return Err(WorkflowError::NetworkMismatch { expected, actual });
    }
    let context = WorkflowContext::new(gateway, self.wallet.clone(), expected);
    context.balances().refresh().await;
    *self.lock() = Some(context.clone());
    Ok(context)
  }

  /// Swap workflow at the configured default slippage.
  ///
  /// # Errors
  /// * Wallet disconnected or on the wrong network
  pub async fn swap(&self) -> Result<SwapWorkflow, WorkflowError> {
    Ok(SwapWorkflow::new(
      self.context().await?,
      self.config.default_slippage,
    ))
  }

  /// # Errors
  /// * Wallet disconnected or on the wrong network
  pub async fn liquidity(&self) -> Result<LiquidityWorkflow, WorkflowError> {
    Ok(LiquidityWorkflow::new(self.context().await?))
  }

  fn lock(&self) -> MutexGuard<'_, Option<WorkflowContext>> {
    self.current.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
