//! Allowance-before-spend protocol.

use alloy_primitives::U256;
use log::{debug, info};
use swapx_clients::gateway::Receipt;
use swapx_clients::ContractGateway;

use crate::error::Stage;
use crate::WorkflowError;

/// Makes sure the pool may pull `amount` of the account's tokens.
///
/// When the current allowance is short, approves exactly `amount` and waits
/// for that approval to be mined. Returns the approval receipt, or `None` if
/// no approval was needed. The caller submits its token-consuming call only
/// after this resolves.
///
/// # Errors
/// * Allowance read fails
/// * Approval is declined, reverts, or is mined as failed
pub async fn ensure_allowance(
  gateway: &ContractGateway,
  amount: U256,
) -> Result<Option<Receipt>, WorkflowError> {
  let spender = gateway.pool().address();
  let current = gateway
    .token()
    .allowance(gateway.account(), spender)
    .await
    .map_err(WorkflowError::at(Stage::Read))?;
  if current >= amount {
    debug!("Allowance {current} covers {amount}");
    return Ok(None);
  }
  info!("Approving {amount} for {spender} (current allowance {current})");
  let tx_hash = gateway
    .token()
    .approve(spender, amount)
    .await
    .map_err(WorkflowError::at(Stage::Approval))?;
  let receipt = gateway
    .confirm(tx_hash)
    .await
    .map_err(WorkflowError::at(Stage::Approval))?;
  Ok(Some(receipt))
}
