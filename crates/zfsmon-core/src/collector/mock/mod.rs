//! Mock implementations for testing.
//!
//! This module provides `MockFs`, `MockCommandRunner` and pre-built
//! scenarios for testing collectors without ZFS installed.

mod command;
mod filesystem;
mod scenarios;

pub use command::MockCommandRunner;
pub use filesystem::MockFs;
pub use scenarios::TYPICAL_LIST_COMMAND;
