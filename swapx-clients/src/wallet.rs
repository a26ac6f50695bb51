//! Wallet connection state and the network gate.

use std::sync::{Mutex, PoisonError};

use alloy_primitives::Address;

/// Supplies the connected account and active chain. Signing stays with the
/// gateway handles built for that account.
pub trait WalletConnector: Send + Sync {
  fn account(&self) -> Option<Address>;

  fn chain_id(&self) -> Option<u64>;
}

/// Whether the client may talk to the contracts at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
  Disconnected,
  WrongNetwork { expected: u64, actual: u64 },
  Ready { account: Address },
}

impl NetworkStatus {
  #[must_use]
  pub fn is_ready(&self) -> bool {
    matches!(self, NetworkStatus::Ready { .. })
  }
}

/// Gates all functionality on `chain_id == expected_chain_id`.
#[must_use]
pub fn network_status(
  wallet: &dyn WalletConnector,
  expected_chain_id: u64,
) -> NetworkStatus {
  match (wallet.account(), wallet.chain_id()) {
    (Some(account), Some(chain_id)) if chain_id == expected_chain_id => {
      NetworkStatus::Ready { account }
    }
    (Some(_), Some(actual)) => NetworkStatus::WrongNetwork {
      expected: expected_chain_id,
      actual,
    },
    _ => NetworkStatus::Disconnected,
  }
}

#[derive(Debug, Clone, Copy, Default)]
struct Connection {
  account: Option<Address>,
  chain_id: Option<u64>,
}

/// Connector whose state is set directly, for headless use and tests.
#[derive(Debug, Default)]
pub struct ManualWallet {
  connection: Mutex<Connection>,
}

impl ManualWallet {
  #[must_use]
  pub fn connected(account: Address, chain_id: u64) -> ManualWallet {
    ManualWallet {
      connection: Mutex::new(Connection {
        account: Some(account),
        chain_id: Some(chain_id),
      }),
    }
  }

  pub fn switch_account(&self, account: Address) {
    self.update(|c| c.account = Some(account));
  }

  pub fn switch_chain(&self, chain_id: u64) {
    self.update(|c| c.chain_id = Some(chain_id));
  }

  pub fn disconnect(&self) {
    self.update(|c| *c = Connection::default());
  }

  fn update(&self, f: impl FnOnce(&mut Connection)) {
    let mut connection =
      self.connection.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut connection);
  }

  fn snapshot(&self) -> Connection {
    *self.connection.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl WalletConnector for ManualWallet {
  fn account(&self) -> Option<Address> {
    self.snapshot().account
  }

  fn chain_id(&self) -> Option<u64> {
    self.snapshot().chain_id
  }
}
