use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError::{self, SlippageExceeded, SlippageOutOfRange};

/// Basis-point denominator for slippage fractions.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Maximum tolerated adverse price movement, in basis points.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(try_from = "u64", into = "u64")]
pub struct SlippageTolerance(u16);

impl SlippageTolerance {
  pub const HALF_PERCENT: SlippageTolerance = SlippageTolerance(50);
  pub const ONE_PERCENT: SlippageTolerance = SlippageTolerance(100);
  pub const TWO_PERCENT: SlippageTolerance = SlippageTolerance(200);
  pub const THREE_PERCENT: SlippageTolerance = SlippageTolerance(300);

  /// Choices offered in the slippage selector.
  pub const PRESETS: [SlippageTolerance; 4] = [
    Self::HALF_PERCENT,
    Self::ONE_PERCENT,
    Self::TWO_PERCENT,
    Self::THREE_PERCENT,
  ];

  pub fn from_bps(bps: u64) -> Result<SlippageTolerance, CoreError> {
    if bps > BPS_DENOMINATOR {
      return Err(SlippageOutOfRange(bps));
    }
    u16::try_from(bps)
      .map(SlippageTolerance)
      .map_err(|_| SlippageOutOfRange(bps))
  }

  #[must_use]
  pub const fn bps(&self) -> u64 {
    self.0 as u64
  }

  /// Tolerance as a percentage, e.g. `0.50` for 50 bps.
  #[must_use]
  pub fn as_percent(&self) -> Decimal {
    Decimal::new(i64::from(self.0), 2)
  }

  /// `quoted * (1 - tolerance)`, rounded down.
  #[must_use]
  pub fn minimum_output(&self, quoted: U256) -> U256 {
    let denominator = U256::from(BPS_DENOMINATOR);
    let factor = U256::from(BPS_DENOMINATOR - self.bps());
    // Split so that `quoted * factor` cannot overflow.
    let whole = quoted / denominator;
    let rest = quoted % denominator;
    whole * factor + rest * factor / denominator
  }
}

impl Default for SlippageTolerance {
  fn default() -> Self {
    Self::ONE_PERCENT
  }
}

impl TryFrom<u64> for SlippageTolerance {
  type Error = CoreError;

  fn try_from(bps: u64) -> Result<Self, Self::Error> {
    SlippageTolerance::from_bps(bps)
  }
}

impl From<SlippageTolerance> for u64 {
  fn from(tolerance: SlippageTolerance) -> Self {
    tolerance.bps()
  }
}

/// Client specified slippage tolerance paired with expected token amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlippageConfig {
  expected_token_out: U256,
  slippage_tolerance: SlippageTolerance,
}

impl SlippageConfig {
  #[must_use]
  pub fn new(
    expected_token_out: U256,
    slippage_tolerance: SlippageTolerance,
  ) -> SlippageConfig {
    SlippageConfig {
      expected_token_out,
      slippage_tolerance,
    }
  }

  #[must_use]
  pub fn expected_token_out(&self) -> U256 {
    self.expected_token_out
  }

  #[must_use]
  pub fn slippage_tolerance(&self) -> SlippageTolerance {
    self.slippage_tolerance
  }

  /// Lowest output the contract is allowed to deliver.
  #[must_use]
  pub fn minimum_token_out(&self) -> U256 {
    self
      .slippage_tolerance
      .minimum_output(self.expected_token_out)
  }

  /// Checks token amount against the configured lowest tolerable amount
  pub fn validate_token_out(&self, token_out: U256) -> Result<(), CoreError> {
    if token_out >= self.minimum_token_out() {
      Ok(())
    } else {
      Err(SlippageExceeded)
    }
  }
}
