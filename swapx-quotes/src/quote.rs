use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::Serialize;
use swapx_core::amount::to_decimal_string;
use swapx_core::asset::Direction;
use swapx_core::exchange_math::execution_price;
use swapx_core::reserves::Reserves;
use swapx_core::slippage_config::{SlippageConfig, SlippageTolerance};

use crate::{Operation, QuoteMetadata};

/// Output estimate for a swap, with the reserves it was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
  pub direction: Direction,
  pub amount_in: U256,
  pub amount_out: U256,
  pub reserves: Reserves,
}

impl Quote {
  /// Zero-output preview shown when no estimate could be fetched.
  #[must_use]
  pub fn unavailable(direction: Direction, amount_in: U256) -> Quote {
    Quote {
      direction,
      amount_in,
      amount_out: U256::ZERO,
      reserves: Reserves::default(),
    }
  }

  /// Both sides are non-zero, so a swap may be started from this quote.
  #[must_use]
  pub fn is_executable(&self) -> bool {
    !self.amount_in.is_zero() && !self.amount_out.is_zero()
  }

  /// `amount_out * (1 - slippage)`, the bound passed to the pool.
  #[must_use]
  pub fn minimum_out(&self, slippage: SlippageTolerance) -> U256 {
    slippage.minimum_output(self.amount_out)
  }

  #[must_use]
  pub fn slippage_config(&self, slippage: SlippageTolerance) -> SlippageConfig {
    SlippageConfig::new(self.amount_out, slippage)
  }

  /// Output per unit of input, six places. `None` without an estimate.
  #[must_use]
  pub fn execution_price(&self) -> Option<Decimal> {
    if !self.is_executable() {
      return None;
    }
    execution_price(self.amount_in, self.amount_out)
  }

  #[must_use]
  pub fn metadata(&self) -> QuoteMetadata {
    QuoteMetadata::new(
      Operation::swap(self.direction),
      format!(
        "{} {} -> {} {}",
        to_decimal_string(self.amount_in),
        self.direction.input(),
        to_decimal_string(self.amount_out),
        self.direction.output()
      ),
    )
  }
}
