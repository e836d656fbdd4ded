//! Command-line front-end over a persisted wallet

pub mod commands;

pub use commands::*;
