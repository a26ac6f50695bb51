//! Swap quotes for the SwapX pool.
//!
//! A quote estimates what a swap would deliver given the pool's current
//! reserves. It is a preview only: the pool enforces the real price at
//! submission, bounded by the minimum output derived from the quote.
//!
//! # Strategies
//!
//! - **`SimulationStrategy`**: Asks the pool contract for its output
//!   estimate. Matches the contract exactly.
//! - **`ReserveMathStrategy`**: Applies the constant-product formula locally
//!   to fetched reserves. One call fewer, but assumes the 0.3% fee.
//!
//! # Examples
//!
//! ```rust,no_run
//! use swapx_clients::prelude::*;
//! use swapx_quotes::{QuoteEngine, QuoteResponse};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let chain = SandboxChain::default();
//! let engine = QuoteEngine::simulated(chain.gateway(Address::repeat_byte(1)));
//!
//! // Only the latest request resolves to `Current`
//! if let QuoteResponse::Current(quote) =
//!   engine.quote_input(Direction::NativeToToken, "0.01").await?
//! {
//!   let min_out = quote.minimum_out(SlippageTolerance::ONE_PERCENT);
//! }
//! # Ok(())
//! # }
//! ```

mod quote;
mod quote_engine;
mod quote_metadata;
mod quote_strategy;
mod reserve_math_strategy;
mod simulation_strategy;

pub mod prelude;

pub use quote::Quote;
pub use quote_engine::{QuoteEngine, QuoteResponse};
pub use quote_metadata::{Operation, QuoteMetadata};
pub use quote_strategy::QuoteStrategy;
pub use reserve_math_strategy::ReserveMathStrategy;
pub use simulation_strategy::SimulationStrategy;
