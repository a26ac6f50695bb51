//! # SwapX Workflows
//!
//! State machines driving swaps and liquidity changes against the SwapX
//! pool, plus the balance mirror they refresh when an operation settles.
//!
//! Every workflow checks the wallet's network before it quotes or issues a
//! remote mutation, runs at most one operation at a time, and ends each
//! operation in `Settled` or `Failed` with a classified [`WorkflowError`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use swapx_clients::prelude::*;
//! use swapx_workflows::Session;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let chain = SandboxChain::new(config.expected_chain_id);
//! let wallet = Arc::new(ManualWallet::connected(
//!   Address::repeat_byte(0xaa),
//!   config.expected_chain_id,
//! ));
//! let session = Session::new(config, wallet, Arc::new(chain));
//!
//! let swap = session.swap().await?;
//! swap.set_input("0.01").await?;
//! let receipt = swap.execute().await?;
//! # Ok(())
//! # }
//! ```

mod allowance;
mod balance_view;
mod context;
mod error;
mod liquidity;
mod phase;
mod session;
mod swap;

pub mod prelude;

pub use allowance::ensure_allowance;
pub use balance_view::{BalanceView, Balances, PoolInfo, GAS_RESERVE_UNITS};
pub use context::WorkflowContext;
pub use error::{Stage, WorkflowError};
pub use liquidity::LiquidityWorkflow;
pub use phase::{OperationInputs, PendingOperation, Phase};
pub use session::Session;
pub use swap::SwapWorkflow;
