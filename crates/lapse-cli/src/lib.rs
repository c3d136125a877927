//! Lapse CLI library.
//!
//! Client side of document expiry: one-off TTL lookups and a poller that
//! keeps warning while a document is heading towards expiry.

#![warn(missing_docs)]

pub mod cli;
pub mod error;
pub mod poller;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
pub use poller::{next_poll, Notice, PollStep, TtlClient, TtlResponse};
