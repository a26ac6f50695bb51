//! Derived display math for pool positions and prices.
//!
//! Authoritative values always come from the contracts; everything here is a
//! local projection of them.

use alloy_primitives::U256;
use rust_decimal::Decimal;

use crate::error::CoreError::{self, Arithmetic};
use crate::reserves::Reserves;

/// Fee numerator/denominator used by the reference constant-product curve
/// (0.3%).
pub const FEE_NUMERATOR: u64 = 997;
pub const FEE_DENOMINATOR: u64 = 1000;

/// Fractional places shown for pool share percentages.
pub const POOL_SHARE_PLACES: u32 = 4;

/// Fractional places shown for prices.
pub const PRICE_PLACES: u32 = 6;

/// Reference constant-product output with the 0.3% input fee:
/// `in * 997 * R_out / (R_in * 1000 + in * 997)`.
///
/// Never exceeds `output_reserve`.
pub fn constant_product_output(
  amount_in: U256,
  input_reserve: U256,
  output_reserve: U256,
) -> Result<U256, CoreError> {
  if amount_in.is_zero() || input_reserve.is_zero() || output_reserve.is_zero()
  {
    return Ok(U256::ZERO);
  }
  let in_with_fee = amount_in
    .checked_mul(U256::from(FEE_NUMERATOR))
    .ok_or(Arithmetic("fee-adjusted input"))?;
  let numerator = in_with_fee
    .checked_mul(output_reserve)
    .ok_or(Arithmetic("swap numerator"))?;
  let denominator = input_reserve
    .checked_mul(U256::from(FEE_DENOMINATOR))
    .and_then(|r| r.checked_add(in_with_fee))
    .ok_or(Arithmetic("swap denominator"))?;
  Ok(numerator / denominator)
}

/// `lp_balance / total_supply * 100`, rounded half-up to four places.
/// Zero when nothing has been minted.
#[must_use]
pub fn pool_share_percent(lp_balance: U256, total_supply: U256) -> Decimal {
  if total_supply.is_zero() {
    return Decimal::ZERO;
  }
  let lp_balance = lp_balance.min(total_supply);
  // percent * 10^4 == fraction * 10^6
  let scale = U256::from(1_000_000_u64);
  let scaled = match lp_balance.checked_mul(scale) {
    Some(numerator) => {
      (numerator + total_supply / U256::from(2)) / total_supply
    }
    None => lp_balance / (total_supply / scale),
  };
  u64::try_from(scaled)
    .ok()
    .and_then(|bits| i64::try_from(bits).ok())
    .map_or(Decimal::ZERO, |bits| Decimal::new(bits, POOL_SHARE_PLACES))
}

/// The slice of each reserve an LP position redeems for.
#[must_use]
pub fn underlying_claim(
  lp_balance: U256,
  total_supply: U256,
  reserves: &Reserves,
) -> Reserves {
  if total_supply.is_zero() {
    return Reserves::default();
  }
  let lp_balance = lp_balance.min(total_supply);
  let share = |reserve: U256| {
    lp_balance
      .checked_mul(reserve)
      .map_or_else(|| reserve / total_supply * lp_balance, |n| n / total_supply)
  };
  Reserves::new(share(reserves.native), share(reserves.token))
}

/// Units of output received per unit of input, rounded half-up to six
/// places. `None` for a zero input or an unrepresentable ratio.
#[must_use]
pub fn execution_price(amount_in: U256, amount_out: U256) -> Option<Decimal> {
  if amount_in.is_zero() {
    return None;
  }
  let scaled = amount_out
    .checked_mul(U256::from(10_u64.pow(PRICE_PLACES)))?
    .checked_add(amount_in / U256::from(2))?
    / amount_in;
  let bits = i128::try_from(u128::try_from(scaled).ok()?).ok()?;
  Decimal::try_from_i128_with_scale(bits, PRICE_PLACES).ok()
}
