//! Swap between the native coin and the token.
//!
//! `Idle -> Quoting -> Ready -> [Approving] -> Submitting -> Confirming ->
//! Settled | Failed`. The form is re-quoted on every input or direction
//! change, and only the latest quote is kept. Executing spends the quoted
//! input and passes `quote * (1 - slippage)` as the minimum the pool may
//! deliver, so a price move past the tolerance is rejected on chain.

use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy_primitives::U256;
use log::info;
use swapx_clients::gateway::Receipt;
use swapx_core::amount::to_decimal_string;
use swapx_core::asset::Direction;
use swapx_core::slippage_config::SlippageTolerance;
use swapx_quotes::{Quote, QuoteEngine, QuoteResponse};
use tokio::sync::watch;

use crate::allowance::ensure_allowance;
use crate::error::Stage;
use crate::phase::{OperationInputs, Phase, PendingOperation, Run, Tracker};
use crate::{WorkflowContext, WorkflowError};

#[derive(Debug, Default)]
struct SwapForm {
  direction: Direction,
  input: String,
  quote: Option<Quote>,
  slippage: SlippageTolerance,
}

pub struct SwapWorkflow {
  context: WorkflowContext,
  quotes: QuoteEngine,
  form: Mutex<SwapForm>,
  tracker: Tracker,
}

impl SwapWorkflow {
  /// Workflow quoting through the pool's own output estimate.
  #[must_use]
  pub fn new(
    context: WorkflowContext,
    slippage: SlippageTolerance,
  ) -> SwapWorkflow {
    let quotes = QuoteEngine::simulated(context.gateway().clone());
    Self::with_quotes(context, quotes, slippage)
  }

  #[must_use]
  pub fn with_quotes(
    context: WorkflowContext,
    quotes: QuoteEngine,
    slippage: SlippageTolerance,
  ) -> SwapWorkflow {
    SwapWorkflow {
      context,
      quotes,
      form: Mutex::new(SwapForm {
        slippage,
        ..SwapForm::default()
      }),
      tracker: Tracker::new(),
    }
  }

  #[must_use]
  pub fn phase(&self) -> Phase {
    self.tracker.phase()
  }

  /// Phase updates, for busy indicators.
  #[must_use]
  pub fn subscribe(&self) -> watch::Receiver<Phase> {
    self.tracker.subscribe()
  }

  #[must_use]
  pub fn pending(&self) -> Option<PendingOperation> {
    self.tracker.pending()
  }

  #[must_use]
  pub fn direction(&self) -> Direction {
    self.form().direction
  }

  #[must_use]
  pub fn input(&self) -> String {
    self.form().input.clone()
  }

  #[must_use]
  pub fn quote(&self) -> Option<Quote> {
    self.form().quote
  }

  #[must_use]
  pub fn slippage(&self) -> SlippageTolerance {
    self.form().slippage
  }

  pub fn set_slippage(&self, slippage: SlippageTolerance) {
    self.form().slippage = slippage;
  }

  /// Lowest output the current quote allows at the current slippage.
  #[must_use]
  pub fn minimum_out(&self) -> Option<U256> {
    let form = self.form();
    form
      .quote
      .filter(Quote::is_executable)
      .map(|quote| quote.minimum_out(form.slippage))
  }

  /// Replaces the input amount and re-quotes.
  ///
  /// # Errors
  /// * Wallet disconnected or on the wrong network
  /// * Input rejected by the amount codec
  pub async fn set_input(
    &self,
    raw: &str,
  ) -> Result<QuoteResponse, WorkflowError> {
    let direction = {
      let mut form = self.form();
      form.input = raw.trim().to_string();
      form.quote = None;
      form.direction
    };
    self.requote(direction, raw).await
  }

  /// Changes the swap direction and re-quotes the current input.
  ///
  /// # Errors
  /// * Wallet disconnected or on the wrong network
  /// * Current input rejected by the amount codec
  pub async fn set_direction(
    &self,
    direction: Direction,
  ) -> Result<QuoteResponse, WorkflowError> {
    let input = {
      let mut form = self.form();
      form.direction = direction;
      form.quote = None;
      form.input.clone()
    };
    self.requote(direction, &input).await
  }

  /// Swaps input and output: the direction flips and the quoted output
  /// becomes the new input.
  ///
  /// # Errors
  /// * Wallet disconnected or on the wrong network
  /// * Carried-over amount rejected by the amount codec
  pub async fn flip(&self) -> Result<QuoteResponse, WorkflowError> {
    let (direction, input) = {
      let mut form = self.form();
      form.direction = form.direction.flipped();
      form.input = form
        .quote
        .filter(Quote::is_executable)
        .map(|quote| to_decimal_string(quote.amount_out))
        .unwrap_or_default();
      form.quote = None;
      (form.direction, form.input.clone())
    };
    self.requote(direction, &input).await
  }

  /// Fills the input with the largest spendable balance.
  ///
  /// # Errors
  /// * Nothing spendable
  pub async fn use_max(&self) -> Result<QuoteResponse, WorkflowError> {
    let asset = self.direction().input();
    let max = self.context.balances().max_input(asset);
    if max.is_zero() {
      return Err(WorkflowError::precondition(format!(
        "No spendable {asset} balance."
      )));
    }
    self.set_input(&to_decimal_string(max)).await
  }

  /// Clears the form. Refused while an operation is in flight.
  ///
  /// # Errors
  /// * Operation in progress
  pub fn reset(&self) -> Result<(), WorkflowError> {
    if self.phase().is_busy() {
      return Err(WorkflowError::precondition(
        "Another operation is still in progress.",
      ));
    }
    self.quotes.invalidate();
    {
      let mut form = self.form();
      form.input.clear();
      form.quote = None;
    }
    self.tracker.set_idle_phase(Phase::Idle);
    Ok(())
  }

  /// Executes the current quote.
  ///
  /// Token input is approved first when the allowance is short, and the swap
  /// is only submitted once that approval is mined. On settlement the form
  /// is cleared, unless it was edited while the swap was in flight, and
  /// balances are refreshed once.
  ///
  /// # Errors
  /// * No executable quote
  /// * Wallet disconnected or on the wrong network
  /// * Another operation in progress
  /// * Approval or swap declined, reverted, or outside the slippage bound
  pub async fn execute(&self) -> Result<Receipt, WorkflowError> {
    let (quote, slippage, input) = {
      let form = self.form();
      (form.quote, form.slippage, form.input.clone())
    };
    let quote = quote.filter(Quote::is_executable).ok_or_else(|| {
      WorkflowError::precondition("Enter an amount with a non-zero quote.")
    })?;
    self.context.ensure_ready()?;

    let minimum_out = quote.minimum_out(slippage);
    let inputs = OperationInputs::Swap {
      direction: quote.direction,
      amount_in: quote.amount_in,
      minimum_out,
    };
    let first = if quote.direction.spends_token() {
      Phase::Approving
    } else {
      Phase::Submitting
    };
    let run = self.tracker.begin(inputs, first)?;
    // previews issued before this point must not land in the form
    self.quotes.invalidate();
    info!(
      "Swapping {} {} for at least {} {}",
      to_decimal_string(quote.amount_in),
      quote.direction.input(),
      to_decimal_string(minimum_out),
      quote.direction.output()
    );

    match self.submit(&run, &quote, minimum_out).await {
      Ok(receipt) => {
        {
          let mut form = self.form();
          if form.input == input && form.direction == quote.direction {
            form.input.clear();
            form.quote = None;
          }
        }
        run.settle();
        self.context.balances().refresh().await;
        Ok(receipt)
      }
      Err(e) => Err(run.fail(e)),
    }
  }

  async fn submit(
    &self,
    run: &Run<'_>,
    quote: &Quote,
    minimum_out: U256,
  ) -> Result<Receipt, WorkflowError> {
    let gateway = self.context.gateway();
    let submitted = match quote.direction {
      Direction::NativeToToken => {
        gateway
          .pool()
          .swap_native_for_token(minimum_out, quote.amount_in)
          .await
      }
      Direction::TokenToNative => {
        let approval = ensure_allowance(gateway, quote.amount_in).await?;
        if let Some(approval) = approval {
          run.record(approval.tx_hash);
        }
        run.advance(Phase::Submitting);
        gateway
          .pool()
          .swap_token_for_native(quote.amount_in, minimum_out)
          .await
      }
    };
    let tx_hash = submitted.map_err(WorkflowError::at(Stage::Submission))?;
    run.record(tx_hash);
    run.advance(Phase::Confirming);
    gateway
      .confirm(tx_hash)
      .await
      .map_err(WorkflowError::at(Stage::Submission))
  }

  async fn requote(
    &self,
    direction: Direction,
    raw: &str,
  ) -> Result<QuoteResponse, WorkflowError> {
    if let Err(e) = self.context.ensure_ready() {
      self.quotes.invalidate();
      self.tracker.set_idle_phase(Phase::Idle);
      return Err(e);
    }
    self.tracker.set_idle_phase(Phase::Quoting);
    let response = match self.quotes.quote_input(direction, raw).await {
      Ok(response) => response,
      Err(e) => {
        self.tracker.set_idle_phase(Phase::Idle);
        return Err(e.into());
      }
    };
    if let QuoteResponse::Current(quote) = response {
      self.form().quote = Some(quote);
      self.tracker.set_idle_phase(if quote.is_executable() {
        Phase::Ready
      } else {
        Phase::Idle
      });
    }
    Ok(response)
  }

  fn form(&self) -> MutexGuard<'_, SwapForm> {
    self.form.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
