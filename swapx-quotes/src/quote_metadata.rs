//! Quote metadata types

use swapx_core::asset::Direction;

/// Operation a quote or workflow step represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  SwapNativeForToken,
  SwapTokenForNative,
  AddLiquidity,
  RemoveLiquidity,
  Approve,
}

impl Operation {
  #[must_use]
  pub const fn as_str(&self) -> &'static str {
    match self {
      Operation::SwapNativeForToken => "eth_to_token_swap",
      Operation::SwapTokenForNative => "token_to_eth_swap",
      Operation::AddLiquidity => "add_liquidity",
      Operation::RemoveLiquidity => "remove_liquidity",
      Operation::Approve => "approve",
    }
  }

  #[must_use]
  pub const fn swap(direction: Direction) -> Operation {
    match direction {
      Direction::NativeToToken => Operation::SwapNativeForToken,
      Direction::TokenToNative => Operation::SwapTokenForNative,
    }
  }
}

impl AsRef<str> for Operation {
  fn as_ref(&self) -> &str {
    self.as_str()
  }
}

impl std::fmt::Display for Operation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Metadata for a quote route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteMetadata {
  /// The operation this quote represents
  pub operation: Operation,

  /// Human-readable route description
  pub description: String,
}

impl QuoteMetadata {
  #[must_use]
  pub fn new(operation: Operation, description: impl Into<String>) -> Self {
    Self {
      operation,
      description: description.into(),
    }
  }
}
