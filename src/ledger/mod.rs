//! In-process ledger host
//!
//! Stands in for the chain the wallet is deployed on: native balances, the
//! deployed tokens, gas accounting and block time. It is the concrete
//! [`Dispatcher`](crate::dispatch::Dispatcher) and [`Clock`](crate::core::Clock)
//! the wallet runs against.

pub mod host;

pub use host::{LedgerConfig, LedgerError, LedgerHost, LedgerStats};
