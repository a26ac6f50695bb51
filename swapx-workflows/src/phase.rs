//! Workflow phases and the tracker that serializes operations.
//!
//! A tracker admits one operation at a time. [`Tracker::begin`] atomically
//! claims it; the returned [`Run`] moves it through its phases and must end
//! in [`Run::settle`] or [`Run::fail`]. Dropping a `Run` early abandons local
//! tracking only: anything already submitted stays submitted.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy_primitives::{TxHash, U256};
use log::{debug, info};
use swapx_core::asset::Direction;
use swapx_quotes::Operation;
use tokio::sync::watch;

use crate::WorkflowError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
  #[default]
  Idle,
  Quoting,
  Ready,
  Simulating,
  Approving,
  Submitting,
  Confirming,
  Settled,
  Failed,
}

impl Phase {
  /// An operation is in flight; a new one must not start.
  #[must_use]
  pub const fn is_busy(&self) -> bool {
    matches!(
      self,
      Phase::Simulating
        | Phase::Approving
        | Phase::Submitting
        | Phase::Confirming
    )
  }

  #[must_use]
  pub const fn can_start(&self) -> bool {
    !self.is_busy()
  }

  #[must_use]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Phase::Idle => "idle",
      Phase::Quoting => "quoting",
      Phase::Ready => "ready",
      Phase::Simulating => "simulating",
      Phase::Approving => "awaiting_approval",
      Phase::Submitting => "submitting",
      Phase::Confirming => "awaiting_confirmation",
      Phase::Settled => "settled",
      Phase::Failed => "failed",
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Amounts an operation was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationInputs {
  Swap {
    direction: Direction,
    amount_in: U256,
    minimum_out: U256,
  },
  Deposit {
    native: U256,
    token: U256,
  },
  Withdraw {
    lp: U256,
  },
}

impl OperationInputs {
  #[must_use]
  pub const fn operation(&self) -> Operation {
    match self {
      OperationInputs::Swap { direction, .. } => Operation::swap(*direction),
      OperationInputs::Deposit { .. } => Operation::AddLiquidity,
      OperationInputs::Withdraw { .. } => Operation::RemoveLiquidity,
    }
  }
}

/// Transient record of the operation a user confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
  pub inputs: OperationInputs,
  pub phase: Phase,
  /// Transactions submitted so far, approval first.
  pub transactions: Vec<TxHash>,
}

impl PendingOperation {
  #[must_use]
  pub fn operation(&self) -> Operation {
    self.inputs.operation()
  }
}

#[derive(Debug)]
pub(crate) struct Tracker {
  phase: watch::Sender<Phase>,
  pending: Mutex<Option<PendingOperation>>,
}

impl Tracker {
  pub(crate) fn new() -> Tracker {
    Tracker {
      phase: watch::Sender::new(Phase::Idle),
      pending: Mutex::new(None),
    }
  }

  pub(crate) fn phase(&self) -> Phase {
    *self.phase.borrow()
  }

  pub(crate) fn subscribe(&self) -> watch::Receiver<Phase> {
    self.phase.subscribe()
  }

  pub(crate) fn pending(&self) -> Option<PendingOperation> {
    self.lock_pending().clone()
  }

  /// Moves between the idle-side phases; ignored while busy.
  pub(crate) fn set_idle_phase(&self, phase: Phase) {
    self.phase.send_if_modified(|current| {
      if current.is_busy() || *current == phase {
        return false;
      }
      *current = phase;
      true
    });
  }

  /// Claims the tracker for a new operation.
  pub(crate) fn begin(
    &self,
    inputs: OperationInputs,
    first: Phase,
  ) -> Result<Run<'_>, WorkflowError> {
    let claimed = self.phase.send_if_modified(|current| {
      if current.is_busy() {
        return false;
      }
      *current = first;
      true
    });
    if !claimed {
      return Err(WorkflowError::precondition(
        "Another operation is still in progress.",
      ));
    }
    info!("{} started: {first}", inputs.operation());
    *self.lock_pending() = Some(PendingOperation {
      inputs,
      phase: first,
      transactions: Vec::new(),
    });
    Ok(Run {
      tracker: self,
      operation: inputs.operation(),
      finished: false,
    })
  }

  fn lock_pending(&self) -> MutexGuard<'_, Option<PendingOperation>> {
    self.pending.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn finish(&self, phase: Phase) {
    *self.lock_pending() = None;
    self.phase.send_replace(phase);
  }
}

/// An operation holding the tracker.
pub(crate) struct Run<'a> {
  tracker: &'a Tracker,
  operation: Operation,
  finished: bool,
}

impl Run<'_> {
  pub(crate) fn advance(&self, phase: Phase) {
    debug!("{} -> {phase}", self.operation);
    if let Some(pending) = self.tracker.lock_pending().as_mut() {
      pending.phase = phase;
    }
    self.tracker.phase.send_replace(phase);
  }

  pub(crate) fn record(&self, tx_hash: TxHash) {
    if let Some(pending) = self.tracker.lock_pending().as_mut() {
      pending.transactions.push(tx_hash);
    }
  }

  pub(crate) fn settle(mut self) {
    info!("{} settled", self.operation);
    self.finished = true;
    self.tracker.finish(Phase::Settled);
  }

  pub(crate) fn fail(mut self, error: WorkflowError) -> WorkflowError {
    info!("{} failed: {error}", self.operation);
    self.finished = true;
    self.tracker.finish(Phase::Failed);
    error
  }
}

impl Drop for Run<'_> {
  fn drop(&mut self) {
    if !self.finished {
      debug!("{} abandoned", self.operation);
      self.tracker.finish(Phase::Idle);
    }
  }
}
