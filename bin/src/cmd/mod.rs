//! CLI subcommand modules.
//!
//! This module contains the implementations for all portfel CLI subcommands.

pub(crate) mod estimate;
pub(crate) mod frontier;
pub(crate) mod optimize;
pub(crate) mod tickers;
