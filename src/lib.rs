//! Places fully mutual friendship pairs into classes while keeping class
//! population, language proficiency and gender balanced across classes.
//!
//! The core is [`placement::solve`]: pair discovery, prior-phase group
//! reconstruction, per-category quotas and a bounded depth-first search that
//! returns ranked scenarios.

pub mod config;
pub mod error;
pub mod grouping;
pub mod placement;
pub mod roster;
pub mod scenario;

pub use error::{CfResult, ClassForgeError};
