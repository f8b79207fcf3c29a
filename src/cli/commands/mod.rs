//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod delete;
pub mod init;
pub mod status;
pub mod sync;
pub mod test_connection;
pub mod validate;
