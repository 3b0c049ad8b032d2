//! Exchange Venues
//!
//! In-process implementations of the two exchange interfaces the engine
//! trades against:
//! - `pair`: constant-product router + pair factory (V2 style)
//! - `concentrated`: swap router + quoter over single-range pools (V3 style)

pub mod concentrated;
pub mod pair;

pub use concentrated::{ConcentratedPool, ExactInputSingleParams, PoolFactory, Quoter, SwapRouter};
pub use pair::{get_amount_out, sort_tokens, Pair, PairFactory, PairRouter};
