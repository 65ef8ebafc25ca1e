//! Command-line interface.
//!
//! # Commands
//!
//! - `serve` - start the HTTP surface over a demo in-memory partition set
//! - `list` - run one list call against the demo partition set and print the page

mod commands;
mod demo;
mod runner;
mod server;

pub use commands::{Cli, Commands};
pub use runner::Runner;
pub use server::serve;
