//! Pipeline tests for the processor module
//!
//! Exercise the complete transform on in-memory tables and small exports
//! written to temporary files.

pub mod error_handling;
pub mod movers_shakers;
