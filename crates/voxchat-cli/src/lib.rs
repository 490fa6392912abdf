#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

// dotenvy is used by main.rs at startup
use dotenvy as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::{init_tracing, load_settings};
pub use commands::Commands;
pub use parser::Cli;
