//! Interactive front-ends that drive a wizard session directly.

pub mod cli;

pub use cli::{CliChannel, run_stdio};
