//! Character attribution
//!
//! This module provides:
//! - **Classifier**: decides which character names belong to other accounts
//! - **Builder**: infers which owned character was active at every point of the log
//! - **Sequence**: the timestamp-ordered list of attributed events
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                sorted LogEvent batch (input)                 │
//! └──────────────────────────────────────────────────────────────┘
//!          │                                   │
//!          ▼                                   │
//!   ForeignClassifier ──── ForeignSet ────────►│
//!                                              ▼
//!                                     AttributionBuilder
//!                                              │
//!             ┌────────────────────────────────┼───────────────────┐
//!             ▼                                ▼                   ▼
//!    AttributionSequence                  LevelIndex     campaign completion
//! ```

mod builder;
mod classifier;
mod sequence;


pub use builder::{Attribution, AttributionBuilder, LevelIndex};
pub use classifier::{ForeignClassifier, ForeignSet};
pub use sequence::AttributionSequence;
