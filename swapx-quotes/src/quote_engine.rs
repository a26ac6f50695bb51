//! Cancel-and-replace quoting.
//!
//! Every request takes the next sequence number. A response is only handed
//! back as [`QuoteResponse::Current`] if no newer request was issued while
//! it was in flight; older responses are dropped as superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::U256;
use log::{debug, warn};
use swapx_clients::ContractGateway;
use swapx_core::amount::normalize;
use swapx_core::asset::Direction;
use swapx_core::error::InputError;

use crate::{Quote, QuoteStrategy, SimulationStrategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteResponse {
  /// Result of the latest request.
  Current(Quote),
  /// A newer request was issued before this one resolved.
  Superseded,
}

impl QuoteResponse {
  #[must_use]
  pub fn current(self) -> Option<Quote> {
    match self {
      QuoteResponse::Current(quote) => Some(quote),
      QuoteResponse::Superseded => None,
    }
  }
}

pub struct QuoteEngine {
  strategy: Arc<dyn QuoteStrategy>,
  sequence: AtomicU64,
}

impl QuoteEngine {
  #[must_use]
  pub fn new(strategy: impl QuoteStrategy + 'static) -> QuoteEngine {
    QuoteEngine {
      strategy: Arc::new(strategy),
      sequence: AtomicU64::new(0),
    }
  }

  /// Engine backed by the pool's own output estimate.
  #[must_use]
  pub fn simulated(gateway: ContractGateway) -> QuoteEngine {
    Self::new(SimulationStrategy::new(gateway))
  }

  /// Sequence number of the most recent request.
  #[must_use]
  pub fn latest_sequence(&self) -> u64 {
    self.sequence.load(Ordering::SeqCst)
  }

  /// Marks every in-flight request as superseded.
  pub fn invalidate(&self) -> u64 {
    self.sequence.fetch_add(1, Ordering::SeqCst) + 1
  }

  /// Quotes `amount_in`. Fetch failures degrade to a zero output; a zero
  /// input resolves to a zero output without any remote call.
  pub async fn quote(
    &self,
    direction: Direction,
    amount_in: U256,
  ) -> QuoteResponse {
    let ticket = self.invalidate();
    let quote = if amount_in.is_zero() {
      Quote::unavailable(direction, amount_in)
    } else {
      match self.strategy.get_quote(direction, amount_in).await {
        Ok(quote) => quote,
        Err(e) => {
          warn!("Quote #{ticket} for {direction} unavailable: {e:#}");
          Quote::unavailable(direction, amount_in)
        }
      }
    };
    if self.latest_sequence() == ticket {
      QuoteResponse::Current(quote)
    } else {
      debug!("Quote #{ticket} superseded by #{}", self.latest_sequence());
      QuoteResponse::Superseded
    }
  }

  /// Normalizes raw user input, then quotes it.
  ///
  /// # Errors
  /// * Input rejected by the amount codec; in-flight quotes are still
  ///   superseded
  pub async fn quote_input(
    &self,
    direction: Direction,
    raw: &str,
  ) -> Result<QuoteResponse, InputError> {
    match normalize(raw) {
      Ok(amount) => Ok(self.quote(direction, amount.units()).await),
      Err(e) => {
        self.invalidate();
        Err(e)
      }
    }
  }
}
