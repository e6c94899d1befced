//! The per-frame loop: one scheduler tick, then one compositor pass.

use retromode_core::{EngineConfig, EngineResult, FrameBuffer, Tick};
use retromode_render::Compositor;

use crate::input::InputState;
use crate::scheduler::TaskScheduler;

/// Owns everything a frame is made from and produces frames on demand.
#[derive(Debug)]
pub struct FrameDriver {
    scheduler: TaskScheduler,
    scene: Compositor,
    input: InputState,
    tick: Tick,
}

impl FrameDriver {
    /// A driver with a transparent background and no priority bound.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            scheduler: TaskScheduler::new(),
            scene: Compositor::new(width, height),
            input: InputState::new(),
            tick: Tick::default(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        let background = config.background_color()?;
        tracing::info!(
            width = config.display.width,
            height = config.display.height,
            %background,
            priority_bound = config.scheduler.priority_bound,
            "frame driver configured"
        );
        Ok(Self {
            scheduler: TaskScheduler::with_priority_bound(config.scheduler.priority_bound),
            scene: Compositor::new(config.display.width, config.display.height)
                .with_background(&background),
            input: InputState::new(),
            tick: Tick::default(),
        })
    }

    /// Run one scheduler tick against the scene, then composite it.
    ///
    /// If a task fails the error is returned, no frame is rendered and the
    /// tick counter does not advance.
    pub fn produce_frame(&mut self) -> EngineResult<&FrameBuffer> {
        let tick = self.tick;
        let ran = self.scheduler.tick(&mut self.scene, &self.input, tick)?;
        self.tick = tick.next();
        tracing::trace!(%tick, tasks = ran, "frame produced");
        Ok(self.scene.render())
    }

    /// The most recently produced frame.
    pub fn frame(&self) -> &FrameBuffer {
        self.scene.frame()
    }

    /// The tick the next `produce_frame` call will run.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut TaskScheduler {
        &mut self.scheduler
    }

    pub fn scene(&self) -> &Compositor {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Compositor {
        &mut self.scene
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::from_fn;
    use retromode_core::{Color, EngineError};
    use retromode_render::{Drawable, Sprite};

    #[test]
    fn test_from_config_uses_display_settings() {
        let config = EngineConfig::from_toml_str(
            "[display]\nwidth = 8\nheight = 4\nbackground = \"#ff0000\"\n\n[scheduler]\npriority_bound = -inf\n",
        )
        .unwrap();
        let mut driver = FrameDriver::from_config(&config).unwrap();
        assert_eq!(driver.scheduler().priority_bound(), f64::NEG_INFINITY);

        let frame = driver.produce_frame().unwrap();
        assert_eq!((frame.width, frame.height), (8, 4));
        assert_eq!(frame.get_pixel(7, 3), Some(Color::RED.to_rgba8()));
    }

    #[test]
    fn test_from_config_rejects_bad_background() {
        let mut config = EngineConfig::default();
        config.display.background = "#nothex".into();
        assert!(matches!(
            FrameDriver::from_config(&config),
            Err(EngineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_tasks_run_before_compositing() {
        let mut driver = FrameDriver::new(4, 1);
        let mut block = FrameBuffer::new(1, 1);
        block.set_pixel(0, 0, [1, 2, 3, 255]);
        let id = driver.scene_mut().add(Sprite::new(0, 0, block), 0.0).unwrap();
        driver.scene_mut().set_transparent_key(id, Some([0, 0, 0, 0]));
        driver.scheduler_mut().add(
            from_fn(move |ctx| {
                if let Some(sprite) = ctx.scene.drawable_mut(id) {
                    sprite.set_x(sprite.x() + 1);
                }
                Ok(false)
            }),
            0.0,
        );

        // The move lands before the first frame is drawn.
        let frame = driver.produce_frame().unwrap();
        assert_eq!(frame.get_pixel(1, 0), Some([1, 2, 3, 255]));
        assert_eq!(frame.get_pixel(0, 0), Some([0, 0, 0, 0]));
        driver.produce_frame().unwrap();
        assert_eq!(driver.frame().get_pixel(2, 0), Some([1, 2, 3, 255]));
        assert_eq!(driver.tick(), Tick::new(2));
    }

    #[test]
    fn test_failed_tick_does_not_advance() {
        let mut driver = FrameDriver::new(1, 1);
        driver
            .scheduler_mut()
            .add(from_fn(|_ctx| Err(EngineError::not_found("asset"))), 0.0);
        assert!(driver.produce_frame().is_err());
        assert_eq!(driver.tick(), Tick::default());
    }

    #[test]
    fn test_input_reaches_tasks() {
        let mut driver = FrameDriver::new(1, 1);
        driver.input_mut().bind("jump", 32);
        driver.scheduler_mut().add_named(
            "jumper",
            from_fn(|ctx| Ok(ctx.input.is_pressed("jump"))),
            0.0,
        );
        driver.produce_frame().unwrap();
        assert!(driver.scheduler().contains("jumper"));

        driver.input_mut().press(32);
        driver.produce_frame().unwrap();
        assert!(!driver.scheduler().contains("jumper"));
        assert!(driver.input().is_pressed("jump"));
    }
}
