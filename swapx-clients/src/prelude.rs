pub use alloy_primitives::{Address, TxHash, U256};
pub use swapx_core::amount::Amount;
pub use swapx_core::asset::{Asset, Direction};
pub use swapx_core::reserves::Reserves;
pub use swapx_core::slippage_config::SlippageTolerance;

pub use crate::config::{ClientConfig, SupportedChain, SEPOLIA};
pub use crate::failure::{classify, FailureKind, GatewayError};
pub use crate::gateway::{
  ChainGateway, ContractGateway, GatewayFactory, GatewayResult, PoolGateway,
  Receipt, TokenGateway, TxStatus,
};
pub use crate::sandbox::{Call, Fault, Method, Read, SandboxChain};
pub use crate::wallet::{
  network_status, ManualWallet, NetworkStatus, WalletConnector,
};
