//! Expose hexdoc's pipeline for integration tests and benchmarks. The
//! command line is the supported interface.
pub mod build;
pub mod cli;
#[cfg(feature = "serve")]
pub mod serve;
