//! Library half of the `gatewire` binary: argument parsing, logging setup and
//! signal handling, kept here so they can be tested.

#![deny(unused_crate_dependencies)]

// Used by main.rs binary
use dotenvy as _;

pub mod logging;
pub mod parser;
pub mod shutdown;

pub use parser::Cli;
