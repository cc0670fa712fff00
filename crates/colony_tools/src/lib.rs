//! # Colony Tools
//!
//! Host-side plumbing around `colony_core`:
//! - JSON file store for colonies
//! - Wall-clock tick scheduler
//! - Data and config validators
//! - Terminal status reports
//!
//! The `colony` binary wires these into subcommands.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod args;
pub mod error;
pub mod file_store;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod validate;

pub use error::{Result, ToolError};
pub use file_store::JsonFileStore;
pub use session::Session;
