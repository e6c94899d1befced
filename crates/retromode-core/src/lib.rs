//! # retromode-core
//!
//! Core types and primitives for the Retromode engine.
//! This crate contains foundational types shared across all Retromode crates:
//! frame buffers and blending, colors, affine matrices, the priority-ordered
//! list, configuration, content hashing, and error types.

pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod math;
pub mod ordered;
pub mod tick;

pub use config::{DisplayConfig, EngineConfig, SchedulerConfig};

pub use color::{Color, Rgba};
pub use error::{EngineError, EngineResult};
pub use frame::{blend_over, FrameBuffer};
pub use math::{AffineMatrix, Point2D};
pub use ordered::{compare_priority, Prioritized, PriorityOrderedList};
pub use tick::Tick;
