//! # Adventure Rules
//!
//! The "rules bible" crate - scene and dialogue definitions, the mutable world
//! state, and the condition language that gates interactions.
//! This crate owns the data; `adventure_core` owns the runtime that drives it.

pub mod catalog;
pub mod config;
pub mod entities;
pub mod error;
pub mod mechanics;
pub mod world_state;

pub use catalog::*;
pub use config::*;
pub use entities::*;
pub use error::*;
pub use mechanics::*;
pub use world_state::*;
