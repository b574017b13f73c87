//! # RedTrack Domain
//!
//! Business domain types and models for RedTrack.
//!
//! This crate contains:
//! - Domain data types (TimeEntry, Ticket, UserStats, etc.)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants (canonical status names, default exclusion lists)
//!
//! ## Architecture
//! - No dependencies on other RedTrack crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
