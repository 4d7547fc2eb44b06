//! Shared utilities.
//!
//! File copying and hashing used across pipeline stages, plus test helpers.

pub mod fs;
pub mod hash;

#[cfg(test)]
pub mod testutil;
