//! `rk-cli` - Demonstration and timing harness for reference-kernels.
//!
//! Allocates operand buffers, runs one kernel under a median-of-N timer and
//! reports the result, or runs the conformance suite against the CPU
//! reference backend.

pub mod cli;
pub mod config;
pub mod harness;
pub mod host;
pub mod timing;

pub use cli::build_cli;
pub use config::{Fill, Operation, RunConfig};
pub use harness::{run, RunRecord};
pub use host::HostProfile;
