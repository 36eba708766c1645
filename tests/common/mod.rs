//! Common test infrastructure
//!
//! Fixture files are written to a temporary directory and wired into a
//! [`music_dashboard::Dashboard`] the same way the binary does it.
//! Tests should only import from this module, not from internal submodules.

#[allow(dead_code)]
mod constants;
#[allow(dead_code)]
mod fixtures;

pub use constants::*;
pub use fixtures::TestData;
