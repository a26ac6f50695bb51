use std::sync::Arc;

use alloy_primitives::Address;
use swapx_clients::wallet::{network_status, NetworkStatus, WalletConnector};
use swapx_clients::ContractGateway;

use crate::{BalanceView, WorkflowError};

/// Capabilities shared by every workflow of one connected account.
#[derive(Clone)]
pub struct WorkflowContext {
  gateway: ContractGateway,
  balances: BalanceView,
  wallet: Arc<dyn WalletConnector>,
  expected_chain_id: u64,
}

impl WorkflowContext {
  #[must_use]
  pub fn new(
    gateway: ContractGateway,
    wallet: Arc<dyn WalletConnector>,
    expected_chain_id: u64,
  ) -> WorkflowContext {
    WorkflowContext {
      balances: BalanceView::new(gateway.clone()),
      gateway,
      wallet,
      expected_chain_id,
    }
  }

  #[must_use]
  pub fn gateway(&self) -> &ContractGateway {
    &self.gateway
  }

  #[must_use]
  pub fn balances(&self) -> &BalanceView {
    &self.balances
  }

  #[must_use]
  pub fn account(&self) -> Address {
    self.gateway.account()
  }

  #[must_use]
  pub fn expected_chain_id(&self) -> u64 {
    self.expected_chain_id
  }

  #[must_use]
  pub fn network_status(&self) -> NetworkStatus {
    network_status(self.wallet.as_ref(), self.expected_chain_id)
  }

  /// Gate run before quoting and before any remote mutation: the wallet
  /// must be on the expected network and still connected as the account
  /// these handles sign for.
  ///
  /// # Errors
  /// * Wallet disconnected or switched to another account
  /// * Wallet on the wrong network
  pub fn ensure_ready(&self) -> Result<Address, WorkflowError> {
    match self.network_status() {
      NetworkStatus::Ready { account } if account == self.account() => {
        Ok(account)
      }
      NetworkStatus::Ready { .. } | NetworkStatus::Disconnected => {
        Err(WorkflowError::NotConnected)
      }
      NetworkStatus::WrongNetwork { expected, actual } => {
        Err(WorkflowError::NetworkMismatch { expected, actual })
      }
    }
  }
}
