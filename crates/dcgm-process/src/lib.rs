//! # DCGM Process
//!
//! Low-level process operations used to supervise a host engine child.
//!
//! This crate provides unix primitives for:
//! - Executable discovery on the search path
//! - Spawning a child in its own process group
//! - Running a command to completion
//! - Force termination and existence checks

pub mod check;
pub mod execute;
pub mod terminate;
pub mod validation;

// Re-export main types
pub use check::*;
pub use execute::*;
pub use terminate::*;
pub use validation::*;
