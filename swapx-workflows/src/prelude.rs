//! Common imports for swapx-workflows.

pub use swapx_clients::prelude::*;
pub use swapx_quotes::{Operation, Quote, QuoteEngine, QuoteResponse};

pub use crate::{
  BalanceView, Balances, LiquidityWorkflow, OperationInputs, PendingOperation,
  Phase, PoolInfo, Session, Stage, SwapWorkflow, WorkflowContext,
  WorkflowError,
};
