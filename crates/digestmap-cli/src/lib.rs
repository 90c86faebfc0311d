//! digestmap-cli library
//!
//! This module exposes the command plumbing of the `digestmap` binary for testing.

pub mod logging;
pub mod output;
pub mod profiler;
pub mod run;

pub use run::run;
