//! CLI command handlers module
//!
//! Organized by functional domain:
//! - ask: one-shot question answering
//! - data: loading farmer profiles and remembered answers
//! - serve: API server
//! - info: statistics and configuration display

pub mod ask;
pub mod data;
pub mod info;
pub mod serve;

pub use ask::*;
pub use data::*;
pub use info::*;
pub use serve::*;
