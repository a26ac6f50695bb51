//! Remote failure payloads and their classification.
//!
//! Wallets and RPC nodes report failures as JSON-RPC error objects carrying a
//! message and, for reverts, raw revert data. Those are decoded here into a
//! [`GatewayError`], and [`classify`] maps an error onto the handful of
//! outcomes a workflow distinguishes.

use alloy_primitives::{hex, Bytes};
use alloy_sol_types::{Panic, Revert, SolError};
use serde_json::Value;
use thiserror::Error;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// JSON-RPC code used by nodes for `execution reverted`.
pub const EXECUTION_REVERTED_CODE: i64 = 3;

/// Custom errors raised by the pool contract.
pub const POOL_CUSTOM_ERRORS: &[([u8; 4], &str)] = &[
  ([0xe4, 0x50, 0xd3, 0x8c], "InsufficientTokenAmount"),
  ([0x6d, 0x80, 0x7a, 0x03], "InsufficientLiquidity"),
  ([0x6e, 0xa0, 0x56, 0xa9], "TransferFailed"),
];

const SLIPPAGE_MARKERS: &[&str] = &[
  "slippage",
  "insufficient output",
  "less than minimum",
  "too little received",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
  #[error("User rejected the request.")]
  UserRejected,
  #[error("Execution reverted: {}", revert_description(.reason, .data))]
  Reverted {
    reason: Option<String>,
    data: Option<Bytes>,
  },
  #[error("RPC error {code}: {message}")]
  Rpc { code: i64, message: String },
  #[error("Transport error: {0}")]
  Transport(String),
}

impl GatewayError {
  /// Revert carrying only a reason string.
  #[must_use]
  pub fn revert(reason: impl Into<String>) -> GatewayError {
    GatewayError::Reverted {
      reason: Some(reason.into()),
      data: None,
    }
  }

  /// Revert carrying only raw revert data.
  #[must_use]
  pub fn revert_data(data: impl Into<Bytes>) -> GatewayError {
    GatewayError::Reverted {
      reason: None,
      data: Some(data.into()),
    }
  }

  /// Decodes a JSON-RPC error object (`{code, message, data}`).
  #[must_use]
  pub fn from_rpc_payload(payload: &Value) -> GatewayError {
    let code = payload.get("code").and_then(Value::as_i64);
    let message = payload
      .get("message")
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string();
    let data = payload
      .get("data")
      .and_then(|d| {
        d.as_str()
          .or_else(|| d.get("data").and_then(Value::as_str))
      })
      .and_then(|raw| hex::decode(raw).ok())
      .map(Bytes::from);
    let lowered = message.to_lowercase();

    if code == Some(USER_REJECTED_CODE)
      || lowered.contains("user rejected")
      || lowered.contains("user denied")
    {
      GatewayError::UserRejected
    } else if code == Some(EXECUTION_REVERTED_CODE)
      || lowered.contains("execution reverted")
      || data.is_some()
    {
      let reason = message
        .split_once("execution reverted:")
        .map(|(_, reason)| reason.trim().to_string())
        .filter(|reason| !reason.is_empty());
      GatewayError::Reverted { reason, data }
    } else if let Some(code) = code {
      GatewayError::Rpc { code, message }
    } else {
      GatewayError::Transport(message)
    }
  }

  /// Human-readable reason suitable for display.
  #[must_use]
  pub fn reason(&self) -> String {
    match self {
      GatewayError::UserRejected => "User rejected the transaction".to_string(),
      GatewayError::Reverted { reason, data } => {
        revert_description(reason, data)
      }
      GatewayError::Rpc { message, .. } | GatewayError::Transport(message) => {
        message.clone()
      }
    }
  }
}

/// Coarse outcome of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
  UserRejected,
  SlippageExceeded,
  Reverted,
  Unavailable,
}

/// Best-effort classification of a remote failure.
#[must_use]
pub fn classify(error: &GatewayError) -> FailureKind {
  match error {
    GatewayError::UserRejected => FailureKind::UserRejected,
    GatewayError::Reverted { .. } => {
      let reason = error.reason().to_lowercase();
      if SLIPPAGE_MARKERS.iter().any(|marker| reason.contains(marker)) {
        FailureKind::SlippageExceeded
      } else {
        FailureKind::Reverted
      }
    }
    GatewayError::Rpc { .. } | GatewayError::Transport(_) => {
      FailureKind::Unavailable
    }
  }
}

/// Decodes revert data: `Error(string)` yields its message, `Panic(uint256)`
/// names the failed check, and known pool errors yield their name.
#[must_use]
pub fn decode_revert_data(data: &[u8]) -> Option<String> {
  if let Ok(revert) = Revert::abi_decode(data) {
    return Some(revert.reason);
  }
  if let Ok(panic) = Panic::abi_decode(data) {
    return Some(match panic.kind() {
      Some(kind) => format!("panic: {kind}"),
      None => format!("panic code {}", panic.code),
    });
  }
  let selector = data.get(..4)?;
  POOL_CUSTOM_ERRORS
    .iter()
    .find(|(known, _)| known.as_slice() == selector)
    .map(|(_, name)| (*name).to_string())
}

/// ABI-encodes `Error(string)`; the inverse of [`decode_revert_data`].
#[must_use]
pub fn encode_error_string(message: &str) -> Bytes {
  Revert {
    reason: message.to_string(),
  }
  .abi_encode()
  .into()
}

fn revert_description(reason: &Option<String>, data: &Option<Bytes>) -> String {
  reason
    .clone()
    .or_else(|| data.as_ref().and_then(|d| decode_revert_data(d)))
    .or_else(|| data.as_ref().map(|d| format!("unknown custom error {d}")))
    .unwrap_or_else(|| "execution reverted".to_string())
}

#[cfg(test)]
mod tests {
  use alloy_primitives::U256;
  use alloy_sol_types::PanicKind;
  use serde_json::json;

  use super::*;

  #[test]
  fn user_rejection() {
    let payload = json!({
      "code": 4001,
      "message": "MetaMask Tx Signature: User denied transaction signature.",
    });
    let error = GatewayError::from_rpc_payload(&payload);
    assert_eq!(error, GatewayError::UserRejected);
    assert_eq!(classify(&error), FailureKind::UserRejected);
  }

  #[test]
  fn revert_reason_from_message() {
    let payload = json!({
      "code": 3,
      "message": "execution reverted: SwapX: insufficient output amount",
    });
    let error = GatewayError::from_rpc_payload(&payload);
    assert_eq!(error.reason(), "SwapX: insufficient output amount");
    assert_eq!(classify(&error), FailureKind::SlippageExceeded);
  }

  #[test]
  fn custom_error_from_data() {
    let payload = json!({
      "code": 3,
      "message": "execution reverted",
      "data": "0xe450d38c",
    });
    let error = GatewayError::from_rpc_payload(&payload);
    assert_eq!(error.reason(), "InsufficientTokenAmount");
    assert_eq!(classify(&error), FailureKind::Reverted);
  }

  #[test]
  fn nested_error_string_data() {
    let data = encode_error_string("ERC20: insufficient allowance");
    let payload = json!({
      "code": -32603,
      "message": "Internal JSON-RPC error.",
      "data": {"data": data.to_string()},
    });
    let error = GatewayError::from_rpc_payload(&payload);
    assert_eq!(error.reason(), "ERC20: insufficient allowance");
  }

  #[test]
  fn unknown_selector_is_reported_raw() {
    let error = GatewayError::revert_data(vec![0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(error.reason(), "unknown custom error 0xdeadbeef");
  }

  #[test]
  fn plain_rpc_failure() {
    let payload = json!({"code": -32000, "message": "header not found"});
    let error = GatewayError::from_rpc_payload(&payload);
    assert_eq!(classify(&error), FailureKind::Unavailable);
    let error = GatewayError::from_rpc_payload(&json!({"message": "timeout"}));
    assert_eq!(error, GatewayError::Transport("timeout".to_string()));
  }

  #[test]
  fn solidity_panic_is_named() {
    let data = Panic {
      code: U256::from(0x11),
    }
    .abi_encode();
    let error = GatewayError::revert_data(data);
    assert_eq!(
      error.reason(),
      format!("panic: {}", PanicKind::UnderOverflow)
    );
    assert_eq!(classify(&error), FailureKind::Reverted);

    let data = Panic {
      code: U256::from(0x99),
    }
    .abi_encode();
    assert_eq!(decode_revert_data(&data), Some("panic code 153".to_string()));
  }

  #[test]
  fn truncated_error_string() {
    let data = encode_error_string("boom");
    assert_eq!(decode_revert_data(&data), Some("boom".to_string()));
    assert_eq!(decode_revert_data(&data[..40]), None);
    assert_eq!(decode_revert_data(&[0x08]), None);
  }
}
