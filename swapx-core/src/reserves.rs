use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::asset::{Asset, Direction};

/// Pool reserves as read from chain. Fetched fresh for every quote or ratio
/// computation, never cached across interactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reserves {
  pub native: U256,
  pub token: U256,
}

impl Reserves {
  #[must_use]
  pub const fn new(native: U256, token: U256) -> Reserves {
    Reserves { native, token }
  }

  #[must_use]
  pub const fn of(&self, asset: Asset) -> U256 {
    match asset {
      Asset::Native => self.native,
      Asset::Token => self.token,
    }
  }

  /// `(input_reserve, output_reserve)` for a swap direction.
  #[must_use]
  pub const fn oriented(&self, direction: Direction) -> (U256, U256) {
    (self.of(direction.input()), self.of(direction.output()))
  }

  /// A pool missing either side has no price.
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.native.is_zero() || self.token.is_zero()
  }

  /// Token amount matching `native` at the current reserve ratio, rounded
  /// down. `None` for an empty pool, where any ratio is accepted.
  #[must_use]
  pub fn proportional_token(&self, native: U256) -> Option<U256> {
    if self.is_empty() {
      return None;
    }
    native.checked_mul(self.token).map(|n| n / self.native)
  }

  /// Native amount matching `token` at the current reserve ratio.
  #[must_use]
  pub fn proportional_native(&self, token: U256) -> Option<U256> {
    if self.is_empty() {
      return None;
    }
    token.checked_mul(self.native).map(|n| n / self.token)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::amount::one;

  #[test]
  fn orientation() {
    let reserves = Reserves::new(U256::from(10), U256::from(2000));
    assert_eq!(
      reserves.oriented(Direction::NativeToToken),
      (U256::from(10), U256::from(2000))
    );
    assert_eq!(
      reserves.oriented(Direction::TokenToNative),
      (U256::from(2000), U256::from(10))
    );
  }

  #[test]
  fn proportional_amounts() {
    let reserves =
      Reserves::new(one() * U256::from(10), one() * U256::from(2000));
    let native = one() / U256::from(100);
    assert_eq!(
      reserves.proportional_token(native),
      Some(one() * U256::from(2))
    );
    assert_eq!(
      reserves.proportional_native(one() * U256::from(2)),
      Some(native)
    );
  }

  #[test]
  fn empty_pool_has_no_ratio() {
    let reserves = Reserves::new(U256::ZERO, U256::from(5));
    assert!(reserves.is_empty());
    assert_eq!(reserves.proportional_token(U256::from(1)), None);
  }
}
