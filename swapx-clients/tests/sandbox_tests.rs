//! Gateway behaviour against the in-memory chain.

use more_asserts::{assert_gt, assert_lt};
use swapx_clients::prelude::*;
use swapx_clients::sandbox::{INSUFFICIENT_OUTPUT, POOL_ADDRESS};
use swapx_core::amount::one;
use test_context::{test_context, AsyncTestContext};
use tokio_test::assert_err;

const TRADER: Address = Address::repeat_byte(0xaa);
const PROVIDER: Address = Address::repeat_byte(0xbb);
const RIVAL: Address = Address::repeat_byte(0xcc);

fn units(n: u64) -> U256 {
  one() * U256::from(n)
}

struct SandboxContext {
  chain: SandboxChain,
  gateway: ContractGateway,
}

impl AsyncTestContext for SandboxContext {
  async fn setup() -> Self {
    let _ = env_logger::builder().is_test(true).try_init();
    let chain = SandboxChain::default();
    chain
      .seed_liquidity(PROVIDER, units(10), units(2000))
      .await
      .expect("Failed to seed pool");
    chain.fund(TRADER, units(5), units(500)).await;
    let gateway = chain.gateway(TRADER);
    Self { chain, gateway }
  }
}

#[test_context(SandboxContext)]
#[tokio::test]
async fn reserves_match_pool_balances(ctx: &SandboxContext) {
  let reserves = ctx.gateway.reserves().await.unwrap();
  assert_eq!(reserves, Reserves::new(units(10), units(2000)));
  assert_eq!(ctx.gateway.chain().chain_id().await.unwrap(), SEPOLIA.id);
}

#[test_context(SandboxContext)]
#[tokio::test]
async fn simulated_output_matches_executed_swap(
  ctx: &SandboxContext,
) {
  let reserves = ctx.gateway.reserves().await.unwrap();
  let amount_in = one() / U256::from(100);
  let expected = ctx
    .gateway
    .pool()
    .simulate_output(amount_in, reserves.native, reserves.token)
    .await
    .unwrap();

  let before = ctx.chain.token_balance_of(TRADER).await;
  let tx = ctx
    .gateway
    .pool()
    .swap_native_for_token(expected, amount_in)
    .await
    .unwrap();
  let receipt = ctx.gateway.confirm(tx).await.unwrap();
  assert_eq!(receipt.status, TxStatus::Success);
  assert_eq!(ctx.chain.token_balance_of(TRADER).await - before, expected);
}

#[test_context(SandboxContext)]
#[tokio::test]
async fn front_run_trips_minimum_output(ctx: &SandboxContext) {
  let reserves = ctx.gateway.reserves().await.unwrap();
  let expected = ctx
    .gateway
    .pool()
    .simulate_output(one(), reserves.native, reserves.token)
    .await
    .unwrap();
  ctx.chain.external_swap_native(RIVAL, units(2)).await.unwrap();

  let err = ctx
    .gateway
    .pool()
    .swap_native_for_token(expected, one())
    .await
    .unwrap_err();
  assert_eq!(err, GatewayError::revert(INSUFFICIENT_OUTPUT));
  assert_eq!(classify(&err), FailureKind::SlippageExceeded);
}

#[test_context(SandboxContext)]
#[tokio::test]
async fn deposit_then_withdraw(ctx: &SandboxContext) {
  let token_amount = units(200);
  let approval = ctx
    .gateway
    .token()
    .approve(POOL_ADDRESS, token_amount)
    .await
    .unwrap();
  ctx.gateway.confirm(approval).await.unwrap();

  let minted = ctx
    .gateway
    .pool()
    .simulate_deposit(token_amount, one())
    .await
    .unwrap();
  assert_eq!(minted, one());
  let tx = ctx.gateway.pool().deposit(token_amount, one()).await.unwrap();
  ctx.gateway.confirm(tx).await.unwrap();

  let lp = ctx.gateway.pool().lp_balance_of(TRADER).await.unwrap();
  assert_eq!(lp, minted);
  assert_eq!(ctx.gateway.pool().lp_total_supply().await.unwrap(), units(11));

  let tx = ctx.gateway.pool().withdraw(lp).await.unwrap();
  ctx.gateway.confirm(tx).await.unwrap();
  assert_eq!(ctx.chain.lp_balance_of(TRADER).await, U256::ZERO);
  assert_eq!(ctx.chain.token_balance_of(TRADER).await, units(500));
  assert_eq!(ctx.chain.native_balance_of(TRADER).await, units(5));
}

#[test_context(SandboxContext)]
#[tokio::test]
async fn withdraw_more_than_owned(ctx: &SandboxContext) {
  let err = ctx.gateway.pool().withdraw(one()).await.unwrap_err();
  assert_eq!(err.reason(), "InsufficientLiquidity");
  assert_eq!(classify(&err), FailureKind::Reverted);
}

#[test_context(SandboxContext)]
#[tokio::test]
async fn rejection_leaves_state_untouched(ctx: &SandboxContext) {
  ctx.chain.inject(Fault::Reject(Method::SwapNativeForToken)).await;
  let err = ctx
    .gateway
    .pool()
    .swap_native_for_token(U256::ZERO, one())
    .await
    .unwrap_err();
  assert_eq!(err, GatewayError::UserRejected);
  assert_eq!(ctx.chain.native_balance_of(TRADER).await, units(5));
  assert_eq!(
    ctx.chain.journal().await,
    vec![Call::SwapNativeForToken {
      from: TRADER,
      min_out: U256::ZERO,
      value: one(),
    }]
  );
}

#[test_context(SandboxContext)]
#[tokio::test]
async fn swap_moves_price(ctx: &SandboxContext) {
  let before = ctx.gateway.reserves().await.unwrap();
  let tx = ctx
    .gateway
    .pool()
    .swap_native_for_token(U256::ZERO, one())
    .await
    .unwrap();
  ctx.gateway.confirm(tx).await.unwrap();
  let after = ctx.gateway.reserves().await.unwrap();
  assert_gt!(after.native, before.native);
  assert_lt!(after.token, before.token);
}

#[tokio::test]
async fn empty_pool_has_no_quote() {
  let chain = SandboxChain::default();
  let gateway = chain.gateway(TRADER);
  let err = assert_err!(
    gateway
      .pool()
      .simulate_output(one(), U256::ZERO, U256::ZERO)
      .await
  );
  assert_eq!(classify(&err), FailureKind::Reverted);
}
