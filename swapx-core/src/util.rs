#[cfg(test)]
pub mod proptest {
  use alloy_primitives::U256;
  use proptest::prelude::*;

  use crate::reserves::Reserves;

  /// Base-unit amounts up to `10^30` (one trillion whole units).
  pub fn units() -> BoxedStrategy<U256> {
    (0u128..1_000_000_000_000_000_000_000_000_000_000u128)
      .prop_map(U256::from)
      .boxed()
  }

  pub fn reserves() -> BoxedStrategy<Reserves> {
    (units(), units())
      .prop_map(|(native, token)| Reserves::new(native, token))
      .boxed()
  }

  pub fn bps() -> BoxedStrategy<u64> {
    (0u64..=10_000u64).boxed()
  }

  /// Canonical decimal strings: no leading or trailing zeros, at most 18
  /// fractional digits, never below `1e-9`.
  pub fn canonical_decimal() -> BoxedStrategy<String> {
    (0u64..1_000_000_000_000u64, 0u32..=18u32, any::<u64>())
      .prop_filter_map("below minimum", |(whole, places, seed)| {
        let fraction = if places == 0 {
          String::new()
        } else {
          let raw = format!("{:0>18}", seed % 1_000_000_000_000_000_000);
          raw[..places as usize].trim_end_matches('0').to_string()
        };
        if whole == 0 && fraction.len() > 9 {
          return None;
        }
        if whole == 0 && fraction.trim_start_matches('0').is_empty() {
          return Some("0".to_string());
        }
        if fraction.is_empty() {
          Some(whole.to_string())
        } else {
          Some(format!("{whole}.{fraction}"))
        }
      })
      .boxed()
  }

  /// Scientific-notation strings whose magnitude is at least `1e-9`.
  pub fn scientific() -> BoxedStrategy<String> {
    (1u64..10_000u64, 0u32..4u32, -5i32..12i32)
      .prop_map(|(mantissa, places, exponent)| {
        let digits = mantissa.to_string();
        let split = digits.len().saturating_sub(places as usize).max(1);
        let (int_part, frac_part) = digits.split_at(split);
        if frac_part.is_empty() {
          format!("{int_part}e{exponent}")
        } else {
          format!("{int_part}.{frac_part}e{exponent}")
        }
      })
      .boxed()
  }
}
