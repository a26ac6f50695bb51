use std::fmt;

use serde::{Deserialize, Serialize};

/// The two sides of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Asset {
  Native,
  Token,
}

impl Asset {
  #[must_use]
  pub const fn symbol(&self) -> &'static str {
    match self {
      Asset::Native => "ETH",
      Asset::Token => "TOKEN",
    }
  }

  #[must_use]
  pub const fn other(&self) -> Asset {
    match self {
      Asset::Native => Asset::Token,
      Asset::Token => Asset::Native,
    }
  }
}

impl fmt::Display for Asset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.symbol())
  }
}

/// Which way a swap moves through the pool.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
  #[default]
  NativeToToken,
  TokenToNative,
}

impl Direction {
  #[must_use]
  pub const fn from_input(asset: Asset) -> Direction {
    match asset {
      Asset::Native => Direction::NativeToToken,
      Asset::Token => Direction::TokenToNative,
    }
  }

  #[must_use]
  pub const fn input(&self) -> Asset {
    match self {
      Direction::NativeToToken => Asset::Native,
      Direction::TokenToNative => Asset::Token,
    }
  }

  #[must_use]
  pub const fn output(&self) -> Asset {
    self.input().other()
  }

  #[must_use]
  pub const fn flipped(&self) -> Direction {
    Direction::from_input(self.output())
  }

  /// Token-input swaps must go through the allowance protocol first.
  #[must_use]
  pub const fn spends_token(&self) -> bool {
    matches!(self, Direction::TokenToNative)
  }
}

impl fmt::Display for Direction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} -> {}", self.input(), self.output())
  }
}
