//! # Adventure Core
//!
//! The runtime of the adventure engine. This crate takes the definitions and
//! state types from `adventure_rules` and turns input events into narration
//! and state changes, one step at a time.
//!
//! ## Core Components
//!
//! - **locator**: Maps clicks to verbs and hotspots
//! - **resolver**: Resolves a verb on a hotspot into effects
//! - **dialogue**: Walks dialogue trees and applies choice actions
//! - **narration**: Bounded log of recent narration lines
//! - **session**: Owns the world and runs one step per input event
//! - **events**: Input events and the script line format
//!
//! ## Design Philosophy
//!
//! - **Single-Threaded**: Every step runs to completion before the next event
//! - **Data-Driven**: Scenes, hints, and dialogue come from definition files
//! - **Clock-Injected**: Timing reads come from a [`Clock`], so tests control time

pub mod clock;
pub mod dialogue;
pub mod effect;
pub mod events;
pub mod locator;
pub mod narration;
pub mod resolver;
pub mod session;

pub use clock::*;
pub use dialogue::*;
pub use effect::*;
pub use events::*;
pub use locator::*;
pub use narration::*;
pub use resolver::*;
pub use session::*;
