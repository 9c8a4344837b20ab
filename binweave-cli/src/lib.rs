//! Library entry for binweave-cli used by integration tests and embedding.

pub mod commands;
pub mod manifest;

// Re-export commands for convenience
pub use commands::*;
