//! CLI command implementations for pkgen.

pub mod generate;
