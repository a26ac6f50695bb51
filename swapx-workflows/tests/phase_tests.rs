//! Phase observed by the gateway at every remote call a workflow makes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use swapx_core::amount::one;
use swapx_workflows::prelude::*;
use test_context::{test_context, AsyncTestContext};
use tokio::sync::watch;

const TRADER: Address = Address::repeat_byte(0xaa);
const PROVIDER: Address = Address::repeat_byte(0xbb);

fn units(n: u64) -> U256 {
  one() * U256::from(n)
}

/// Delegates to the sandbox and notes the workflow phase at each call that
/// quotes, approves, submits or waits for a receipt.
struct PhaseRecorder {
  inner: ContractGateway,
  phase: Mutex<Option<watch::Receiver<Phase>>>,
  calls: Mutex<Vec<(&'static str, Phase)>>,
}

impl PhaseRecorder {
  fn follow(&self, phase: watch::Receiver<Phase>) {
    *self.phase.lock().unwrap() = Some(phase);
  }

  fn note(&self, call: &'static str) {
    let phase = self
      .phase
      .lock()
      .unwrap()
      .as_ref()
      .map_or(Phase::Idle, |rx| *rx.borrow());
    self.calls.lock().unwrap().push((call, phase));
  }

  fn take(&self) -> Vec<(&'static str, Phase)> {
    std::mem::take(&mut *self.calls.lock().unwrap())
  }
}

#[async_trait]
impl PoolGateway for PhaseRecorder {
  fn address(&self) -> Address {
    self.inner.pool().address()
  }

  async fn token_reserve(&self) -> GatewayResult<U256> {
    self.inner.pool().token_reserve().await
  }

  async fn simulate_output(
    &self,
    amount_in: U256,
    input_reserve: U256,
    output_reserve: U256,
  ) -> GatewayResult<U256> {
    self.note("simulate_output");
    self
      .inner
      .pool()
      .simulate_output(amount_in, input_reserve, output_reserve)
      .await
  }

  async fn lp_balance_of(&self, account: Address) -> GatewayResult<U256> {
    self.inner.pool().lp_balance_of(account).await
  }

  async fn lp_total_supply(&self) -> GatewayResult<U256> {
    self.inner.pool().lp_total_supply().await
  }

  async fn simulate_deposit(
    &self,
    token_amount: U256,
    value: U256,
  ) -> GatewayResult<U256> {
    self.note("simulate_deposit");
    self.inner.pool().simulate_deposit(token_amount, value).await
  }

  async fn deposit(
    &self,
    token_amount: U256,
    value: U256,
  ) -> GatewayResult<TxHash> {
    self.note("deposit");
    self.inner.pool().deposit(token_amount, value).await
  }

  async fn withdraw(&self, lp_amount: U256) -> GatewayResult<TxHash> {
    self.note("withdraw");
    self.inner.pool().withdraw(lp_amount).await
  }

  async fn swap_native_for_token(
    &self,
    min_out: U256,
    value: U256,
  ) -> GatewayResult<TxHash> {
    self.note("swap_native_for_token");
    self.inner.pool().swap_native_for_token(min_out, value).await
  }

  async fn swap_token_for_native(
    &self,
    amount_in: U256,
    min_out: U256,
  ) -> GatewayResult<TxHash> {
    self.note("swap_token_for_native");
    self.inner.pool().swap_token_for_native(amount_in, min_out).await
  }
}

#[async_trait]
impl TokenGateway for PhaseRecorder {
  fn address(&self) -> Address {
    self.inner.token().address()
  }

  async fn balance_of(&self, account: Address) -> GatewayResult<U256> {
    self.inner.token().balance_of(account).await
  }

  async fn allowance(
    &self,
    owner: Address,
    spender: Address,
  ) -> GatewayResult<U256> {
    self.note("allowance");
    self.inner.token().allowance(owner, spender).await
  }

  async fn approve(
    &self,
    spender: Address,
    amount: U256,
  ) -> GatewayResult<TxHash> {
    self.note("approve");
    self.inner.token().approve(spender, amount).await
  }
}

#[async_trait]
impl ChainGateway for PhaseRecorder {
  async fn chain_id(&self) -> GatewayResult<u64> {
    self.inner.chain().chain_id().await
  }

  async fn native_balance(&self, account: Address) -> GatewayResult<U256> {
    self.inner.chain().native_balance(account).await
  }

  async fn wait_for_receipt(&self, tx_hash: TxHash) -> GatewayResult<Receipt> {
    self.note("wait_for_receipt");
    self.inner.chain().wait_for_receipt(tx_hash).await
  }
}

struct PhaseContext {
  chain: SandboxChain,
  recorder: Arc<PhaseRecorder>,
  context: WorkflowContext,
}

impl AsyncTestContext for PhaseContext {
  async fn setup() -> Self {
    let _ = env_logger::builder().is_test(true).try_init();
    let chain = SandboxChain::default();
    chain
      .seed_liquidity(PROVIDER, units(10), units(2000))
      .await
      .expect("Failed to seed pool");
    chain.fund(TRADER, units(5), units(500)).await;
    let recorder = Arc::new(PhaseRecorder {
      inner: chain.gateway(TRADER),
      phase: Mutex::new(None),
      calls: Mutex::new(Vec::new()),
    });
    let gateway = ContractGateway::new(
      TRADER,
      recorder.clone(),
      recorder.clone(),
      recorder.clone(),
    );
    let wallet = Arc::new(ManualWallet::connected(TRADER, SEPOLIA.id));
    let context = WorkflowContext::new(gateway, wallet, SEPOLIA.id);
    Self {
      chain,
      recorder,
      context,
    }
  }
}

impl PhaseContext {
  fn swap(&self) -> SwapWorkflow {
    let swap =
      SwapWorkflow::new(self.context.clone(), SlippageTolerance::ONE_PERCENT);
    self.recorder.follow(swap.subscribe());
    swap
  }

  fn liquidity(&self) -> LiquidityWorkflow {
    let liquidity = LiquidityWorkflow::new(self.context.clone());
    self.recorder.follow(liquidity.subscribe());
    liquidity
  }
}

#[test_context(PhaseContext)]
#[tokio::test]
async fn native_swap_submits_then_confirms(ctx: &PhaseContext) {
  let swap = ctx.swap();
  let mut phases = swap.subscribe();
  swap.set_input("0.01").await.unwrap();
  assert_eq!(ctx.recorder.take(), vec![("simulate_output", Phase::Quoting)]);
  assert_eq!(*phases.borrow_and_update(), Phase::Ready);

  swap.execute().await.unwrap();
  assert_eq!(
    ctx.recorder.take(),
    vec![
      ("swap_native_for_token", Phase::Submitting),
      ("wait_for_receipt", Phase::Confirming),
    ]
  );
  assert!(phases.has_changed().unwrap());
  assert_eq!(*phases.borrow_and_update(), Phase::Settled);
  assert_eq!(swap.pending(), None);
}

#[test_context(PhaseContext)]
#[tokio::test]
async fn token_swap_approves_before_submitting(ctx: &PhaseContext) {
  let swap = ctx.swap();
  swap.set_direction(Direction::TokenToNative).await.unwrap();
  swap.set_input("5").await.unwrap();
  ctx.recorder.take();

  swap.execute().await.unwrap();
  assert_eq!(
    ctx.recorder.take(),
    vec![
      ("allowance", Phase::Approving),
      ("approve", Phase::Approving),
      ("wait_for_receipt", Phase::Approving),
      ("swap_token_for_native", Phase::Submitting),
      ("wait_for_receipt", Phase::Confirming),
    ]
  );
  assert_eq!(*swap.subscribe().borrow(), Phase::Settled);
}

#[test_context(PhaseContext)]
#[tokio::test]
async fn declined_approval_stops_in_approving(ctx: &PhaseContext) {
  ctx.chain.inject(Fault::Reject(Method::Approve)).await;
  let swap = ctx.swap();
  swap.set_direction(Direction::TokenToNative).await.unwrap();
  swap.set_input("5").await.unwrap();
  ctx.recorder.take();

  swap.execute().await.unwrap_err();
  assert_eq!(
    ctx.recorder.take(),
    vec![("allowance", Phase::Approving), ("approve", Phase::Approving)]
  );
  assert_eq!(swap.phase(), Phase::Failed);
}

#[test_context(PhaseContext)]
#[tokio::test]
async fn deposit_walks_every_phase(ctx: &PhaseContext) {
  let liquidity = ctx.liquidity();
  liquidity.deposit("1", "200").await.unwrap();
  assert_eq!(
    ctx.recorder.take(),
    vec![
      ("allowance", Phase::Approving),
      ("approve", Phase::Approving),
      ("wait_for_receipt", Phase::Approving),
      ("simulate_deposit", Phase::Simulating),
      ("deposit", Phase::Submitting),
      ("wait_for_receipt", Phase::Confirming),
    ]
  );
  assert_eq!(liquidity.phase(), Phase::Settled);

  liquidity.withdraw().await.unwrap();
  assert_eq!(
    ctx.recorder.take(),
    vec![
      ("withdraw", Phase::Submitting),
      ("wait_for_receipt", Phase::Confirming),
    ]
  );
  assert_eq!(*liquidity.subscribe().borrow(), Phase::Settled);
}
