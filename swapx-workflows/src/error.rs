use swapx_clients::config::chain_name;
use swapx_clients::failure::{classify, FailureKind, GatewayError};
use swapx_core::error::InputError;
use thiserror::Error;

/// Where in a workflow a remote failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Read,
  Approval,
  Simulation,
  Submission,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
  #[error(transparent)]
  Input(#[from] InputError),
  #[error("Connect a wallet to continue.")]
  NotConnected,
  #[error(
    "Wrong network: switch to {} (connected to {}).",
    network_name(.expected),
    network_name(.actual)
  )]
  NetworkMismatch { expected: u64, actual: u64 },
  #[error("{0}")]
  Precondition(String),
  #[error("Could not read chain state: {reason}")]
  Unavailable { reason: String },
  #[error("Approval failed: {reason}")]
  ApprovalRejected { reason: String },
  #[error("Transaction failed: {reason}")]
  SubmissionRejected { reason: String },
  #[error("Price moved beyond the slippage tolerance: {reason}")]
  SlippageExceeded { reason: String },
}

impl WorkflowError {
  pub fn precondition(message: impl Into<String>) -> WorkflowError {
    WorkflowError::Precondition(message.into())
  }

  /// Classifies a remote failure by its payload and the stage it hit.
  #[must_use]
  pub fn from_gateway(stage: Stage, error: &GatewayError) -> WorkflowError {
    let reason = error.reason();
    match (classify(error), stage) {
      (_, Stage::Read) => WorkflowError::Unavailable { reason },
      (FailureKind::SlippageExceeded, _) => {
        WorkflowError::SlippageExceeded { reason }
      }
      (_, Stage::Approval) => WorkflowError::ApprovalRejected { reason },
      (_, Stage::Simulation | Stage::Submission) => {
        WorkflowError::SubmissionRejected { reason }
      }
    }
  }

  /// Error adapter for `map_err`.
  pub fn at(stage: Stage) -> impl Fn(GatewayError) -> WorkflowError {
    move |error| WorkflowError::from_gateway(stage, &error)
  }

  /// The wallet declined to sign.
  #[must_use]
  pub fn is_user_rejection(&self) -> bool {
    match self {
      WorkflowError::ApprovalRejected { reason }
      | WorkflowError::SubmissionRejected { reason } => {
        reason == &GatewayError::UserRejected.reason()
      }
      _ => false,
    }
  }
}

fn network_name(id: &u64) -> String {
  chain_name(*id)
}

#[cfg(test)]
mod tests {
  use swapx_clients::config::SEPOLIA;

  use super::*;

  #[test]
  fn stage_decides_rejection_kind() {
    let rejected = GatewayError::UserRejected;
    let approval = WorkflowError::from_gateway(Stage::Approval, &rejected);
    assert_eq!(
      approval,
      WorkflowError::ApprovalRejected {
        reason: "User rejected the transaction".to_string()
      }
    );
    assert!(approval.is_user_rejection());
    assert!(matches!(
      WorkflowError::from_gateway(Stage::Submission, &rejected),
      WorkflowError::SubmissionRejected { .. }
    ));
  }

  #[test]
  fn slippage_wins_over_stage() {
    let error = GatewayError::revert("SwapX: insufficient output amount");
    assert!(matches!(
      WorkflowError::from_gateway(Stage::Submission, &error),
      WorkflowError::SlippageExceeded { .. }
    ));
    assert!(matches!(
      WorkflowError::from_gateway(Stage::Read, &error),
      WorkflowError::Unavailable { .. }
    ));
  }

  #[test]
  fn network_message_names_chain() {
    let error = WorkflowError::NetworkMismatch {
      expected: SEPOLIA.id,
      actual: 1,
    };
    assert_eq!(
      error.to_string(),
      "Wrong network: switch to Sepolia (connected to Ethereum)."
    );
  }
}
