//! # retromode-engine
//!
//! Drives Retromode one frame at a time. A [`TaskScheduler`] runs
//! priority-ordered game logic against the scene, and a [`FrameDriver`]
//! pairs each scheduler tick with a compositor pass.

pub mod driver;
pub mod input;
pub mod scheduler;
pub mod tasks;

pub use driver::FrameDriver;
pub use input::{ControlState, InputState, KeyCode};
pub use scheduler::{from_fn, Task, TaskContext, TaskId, TaskInfo, TaskRef, TaskScheduler};
pub use tasks::{AnimateTask, Animation, WaitTask};
