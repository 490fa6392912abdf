#![doc = include_str!(concat!(env!("OUT_DIR"), "/README_GENERATED.md"))]
#![deny(unused_crate_dependencies)]

pub mod forward;
pub mod models;
pub mod server;

pub use server::{app, serve};
