use thiserror::Error;

/// Rejections raised while reading a user-entered amount. None of these ever
/// reach a remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
  #[error("`{0}` is not a valid amount.")]
  Unparsable(String),
  #[error("Amount cannot be negative.")]
  Negative,
  #[error("Please enter an amount greater than zero.")]
  Zero,
  #[error("Amount too small. Please use larger amounts (minimum 0.000000001).")]
  TooSmall,
  #[error("Amount is too large to be represented.")]
  OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
  // `slippage_config`
  #[error("Slippage tolerance of {0} bps is outside 0..=10000.")]
  SlippageOutOfRange(u64),
  #[error("Token output amount exceeds provided slippage configuration.")]
  SlippageExceeded,
  // `exchange_math`
  #[error("Overflow while computing {0}.")]
  Arithmetic(&'static str),
}
