//! Command implementations for kust-cli

pub mod build;

pub use build::{BuildArgs, run_build};
