//! Reusable tasks: delayed repetition and scripted sprite animation.

use retromode_core::error::ensure_finite;
use retromode_core::{EngineResult, FrameBuffer};
use retromode_render::{Drawable, PaintId};

use crate::scheduler::{Task, TaskContext};

/// Runs the wrapped task once every `wait + 1` ticks: `wait` ticks are
/// skipped, the next one runs the task, and the count starts over.
#[derive(Debug, Clone)]
pub struct WaitTask<T> {
    task: T,
    wait: u64,
    skipped: u64,
}

impl<T: Task> WaitTask<T> {
    pub fn new(task: T, wait: u64) -> Self {
        Self {
            task,
            wait,
            skipped: 0,
        }
    }

    pub fn wait(&self) -> u64 {
        self.wait
    }
}

impl<T: Task> Task for WaitTask<T> {
    fn on_tick(&mut self, ctx: &mut TaskContext<'_>) -> EngineResult<bool> {
        if self.skipped < self.wait {
            self.skipped += 1;
            return Ok(false);
        }
        self.skipped = 0;
        self.task.on_tick(ctx)
    }
}

/// One step of an animation script.
#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    /// Select a frame. Drawables without frames ignore it.
    SetFrame(usize),
    SetPosition { x: i32, y: i32 },
    ShiftPosition { dx: i32, dy: i32 },
    SetImage(FrameBuffer),
    /// Leave the drawable alone for this step.
    Hold,
}

impl Animation {
    pub fn apply(&self, drawable: &mut dyn Drawable) -> EngineResult<()> {
        match self {
            Animation::SetFrame(frame) => drawable.set_frame(*frame)?,
            Animation::SetPosition { x, y } => {
                drawable.set_x(*x);
                drawable.set_y(*y);
            }
            Animation::ShiftPosition { dx, dy } => {
                drawable.set_x(drawable.x().wrapping_add(*dx));
                drawable.set_y(drawable.y().wrapping_add(*dy));
            }
            Animation::SetImage(image) => drawable.set_image(image.clone()),
            Animation::Hold => {}
        }
        Ok(())
    }
}

/// Plays an [`Animation`] script on one paint entry.
///
/// Each tick applies the step under the cursor and then moves the cursor by
/// `speed`, which may be fractional (a step spans several ticks) or
/// negative (the script plays backwards). A looping script wraps around in
/// either direction; any other script finishes the task as soon as the
/// cursor leaves it. A target that is no longer in the scene also finishes
/// the task.
#[derive(Debug, Clone)]
pub struct AnimateTask {
    target: PaintId,
    script: Vec<Animation>,
    cursor: f64,
    speed: f64,
    looping: bool,
}

impl AnimateTask {
    pub fn new(target: PaintId, script: Vec<Animation>, looping: bool) -> Self {
        Self {
            target,
            script,
            cursor: 0.0,
            speed: 1.0,
            looping,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> EngineResult<Self> {
        self.set_speed(speed)?;
        Ok(self)
    }

    pub fn set_speed(&mut self, speed: f64) -> EngineResult<()> {
        ensure_finite("animation speed", &[speed])?;
        self.speed = speed;
        Ok(())
    }

    /// Swap in a new script and rewind to its start.
    pub fn set_script(&mut self, script: Vec<Animation>) {
        self.script = script;
        self.cursor = 0.0;
    }

    pub fn target(&self) -> PaintId {
        self.target
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }
}

impl Task for AnimateTask {
    fn on_tick(&mut self, ctx: &mut TaskContext<'_>) -> EngineResult<bool> {
        if self.script.is_empty() {
            tracing::warn!(paint = %self.target, "animation script is empty");
            return Ok(true);
        }
        let Some(drawable) = ctx.scene.drawable_mut(self.target) else {
            tracing::warn!(paint = %self.target, "animation target is no longer in the scene");
            return Ok(true);
        };

        let len = self.script.len();
        // rem_euclid can round up to exactly `len` for tiny negative cursors.
        let index = (self.cursor as usize).min(len - 1);
        self.script[index].apply(drawable)?;

        self.cursor += self.speed;
        if self.looping {
            self.cursor = self.cursor.rem_euclid(len as f64);
            return Ok(false);
        }
        Ok(!(0.0..len as f64).contains(&self.cursor))
    }
}
