//! Conversion between human decimal input and 18-decimal base units.
//!
//! Every amount entered in the UI passes through [`normalize`] before it is
//! quoted or submitted. Scientific notation (`"1e-7"`) is expanded into a
//! plain decimal first, so that values like `0.0000001` survive the trip to
//! fixed point intact.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use log::warn;
use rust_decimal::Decimal;

use crate::error::InputError;

/// Fractional digits carried by both the native coin and the token.
pub const DECIMALS: usize = 18;

/// Smallest non-zero input accepted, in base units (`1e-9`).
pub const MIN_INPUT_UNITS: u64 = 1_000_000_000;

/// Exponents beyond this magnitude are not expanded.
const MAX_EXPONENT: u64 = 1024;

/// Raw inputs longer than this are refused outright.
const MAX_INPUT_LEN: usize = 256;

/// `10^18`, one whole unit of either asset.
#[must_use]
pub fn one() -> U256 {
  U256::from(1_000_000_000_000_000_000_u64)
}

/// A validated, non-negative quantity held as 18-decimal base units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

impl Amount {
  pub const ZERO: Amount = Amount(U256::ZERO);

  #[must_use]
  pub const fn from_units(units: U256) -> Amount {
    Amount(units)
  }

  /// Fixed-point representation expected by the contracts.
  #[must_use]
  pub const fn units(self) -> U256 {
    self.0
  }

  #[must_use]
  pub fn is_zero(self) -> bool {
    self.0.is_zero()
  }

  /// Fails with [`InputError::Zero`] for an empty amount.
  pub fn non_zero(self) -> Result<Amount, InputError> {
    if self.is_zero() {
      Err(InputError::Zero)
    } else {
      Ok(self)
    }
  }

  /// Decimal view for display math. `None` past 28 significant digits.
  #[must_use]
  pub fn to_decimal(self) -> Option<Decimal> {
    Decimal::from_str(&to_decimal_string(self.0)).ok()
  }
}

impl From<U256> for Amount {
  fn from(units: U256) -> Self {
    Amount(units)
  }
}

impl FromStr for Amount {
  type Err = InputError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    normalize(s)
  }
}

impl fmt::Display for Amount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&to_decimal_string(self.0))
  }
}

/// Parses user input into an [`Amount`].
///
/// Empty input is the zero amount. Values below `1e-9` are refused with
/// [`InputError::TooSmall`] instead of silently rounding to zero. Digits past
/// the 18th fractional place are rounded half-up.
///
/// # Errors
/// * Non-numeric input
/// * Negative sign
/// * Non-zero value below `1e-9`
/// * Value past the 256-bit range
pub fn normalize(raw: &str) -> Result<Amount, InputError> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Ok(Amount::ZERO);
  }
  if trimmed.len() > MAX_INPUT_LEN {
    return Err(InputError::OutOfRange);
  }
  if trimmed.starts_with('-') {
    return Err(InputError::Negative);
  }
  let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
  let plain = if body.contains(['e', 'E']) {
    expand_scientific(body)?
  } else {
    body.to_string()
  };
  parse_plain(&plain).map(Amount)
}

/// Fail-closed conversion of raw input to base units: anything that does not
/// normalize becomes zero.
#[must_use]
pub fn to_fixed_point(raw: &str) -> U256 {
  match normalize(raw) {
    Ok(amount) => amount.units(),
    Err(e) => {
      warn!("Treating amount `{raw}` as zero: {e}");
      U256::ZERO
    }
  }
}

/// Canonical decimal string for base units, without trailing zeros.
#[must_use]
pub fn to_decimal_string(units: U256) -> String {
  let (int_part, frac_part) = split_units(units);
  let frac_part = frac_part.trim_end_matches('0');
  if frac_part.is_empty() {
    int_part
  } else {
    format!("{int_part}.{frac_part}")
  }
}

/// Display string truncated to a fixed number of fractional places.
#[must_use]
pub fn to_display_string(units: U256, places: usize) -> String {
  let (int_part, frac_part) = split_units(units);
  let places = places.min(DECIMALS);
  if places == 0 {
    int_part
  } else {
    format!("{int_part}.{}", &frac_part[..places])
  }
}

fn split_units(units: U256) -> (String, String) {
  let digits = format!("{:0>width$}", units.to_string(), width = DECIMALS + 1);
  let (int_part, frac_part) = digits.split_at(digits.len() - DECIMALS);
  (int_part.to_string(), frac_part.to_string())
}

/// Rewrites `<mantissa>e<exponent>` as a plain decimal string.
///
/// # Errors
/// * Malformed mantissa or exponent
/// * Exponent magnitude above 1024
pub fn expand_scientific(s: &str) -> Result<String, InputError> {
  let unparsable = || InputError::Unparsable(s.to_string());
  let (mantissa, exponent) = s.split_once(['e', 'E']).ok_or_else(unparsable)?;
  let exponent: i64 = exponent.parse().map_err(|_| unparsable())?;
  let (int_part, frac_part) =
    mantissa.split_once('.').unwrap_or((mantissa, ""));
  if (int_part.is_empty() && frac_part.is_empty())
    || !all_digits(int_part)
    || !all_digits(frac_part)
  {
    return Err(unparsable());
  }

  let digits = format!("{int_part}{frac_part}");
  let significant = digits.trim_start_matches('0');
  if significant.is_empty() {
    return Ok("0".to_string());
  }
  if exponent.unsigned_abs() > MAX_EXPONENT {
    return Err(if exponent > 0 {
      InputError::OutOfRange
    } else {
      InputError::TooSmall
    });
  }

  let point =
    i64::try_from(int_part.len()).map_err(|_| unparsable())? + exponent;
  let len = i64::try_from(digits.len()).map_err(|_| unparsable())?;
  let expanded = if point <= 0 {
    format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
  } else if point >= len {
    format!("{digits}{}", "0".repeat((point - len) as usize))
  } else {
    let (whole, fraction) = digits.split_at(point as usize);
    format!("{whole}.{fraction}")
  };
  Ok(expanded)
}

fn all_digits(s: &str) -> bool {
  s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_plain(plain: &str) -> Result<U256, InputError> {
  let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain, ""));
  if (int_part.is_empty() && frac_part.is_empty())
    || !all_digits(int_part)
    || !all_digits(frac_part)
  {
    return Err(InputError::Unparsable(plain.to_string()));
  }

  let whole = if int_part.is_empty() {
    U256::ZERO
  } else {
    U256::from_str(int_part).map_err(|_| InputError::OutOfRange)?
  };
  let kept: String = frac_part.chars().take(DECIMALS).collect();
  let fraction = U256::from_str(&format!("{kept:0<width$}", width = DECIMALS))
    .map_err(|_| InputError::Unparsable(plain.to_string()))?;
  let truncated = whole
    .checked_mul(one())
    .and_then(|units| units.checked_add(fraction))
    .ok_or(InputError::OutOfRange)?;

  let has_value = !all_zero(int_part) || !all_zero(frac_part);
  if !has_value {
    return Ok(U256::ZERO);
  }
  if truncated < U256::from(MIN_INPUT_UNITS) {
    return Err(InputError::TooSmall);
  }

  let round_up = frac_part.as_bytes().get(DECIMALS).is_some_and(|d| *d >= b'5');
  if round_up {
    truncated
      .checked_add(U256::from(1))
      .ok_or(InputError::OutOfRange)
  } else {
    Ok(truncated)
  }
}

fn all_zero(s: &str) -> bool {
  s.bytes().all(|b| b == b'0')
}
