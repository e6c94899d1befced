//! The built-in demo scene.
//!
//! Everything is generated procedurally so the demo needs no asset files:
//! a spinning checkerboard backdrop, a perspective floor drawn one scanline
//! at a time, a wrapped cloud layer, a running framed sprite and a small
//! emblem rotated without clipping.

use retromode_core::{AffineMatrix, EngineConfig, EngineResult, FrameBuffer, Rgba};
use retromode_engine::{from_fn, AnimateTask, Animation, FrameDriver, WaitTask};
use retromode_render::{Drawable, FramedSprite, PaintId, Resampler, Sprite};

const CLEAR: Rgba = [0, 0, 0, 0];

/// Key code that pauses the emblem while held.
pub const PAUSE_KEY: u32 = 80;

const FLOOR_TILE: u32 = 8;
const EMBLEM_SIZE: u32 = 24;

/// Build a driver for `config` with the demo scene and its tasks loaded.
pub fn build(config: &EngineConfig) -> EngineResult<FrameDriver> {
    let mut driver = FrameDriver::from_config(config)?;
    let (width, height) = (config.display.width, config.display.height);
    driver.input_mut().bind("pause", PAUSE_KEY);

    add_backdrop(&mut driver, width, height)?;
    add_floor(&mut driver, width, height)?;
    add_clouds(&mut driver)?;
    add_runner(&mut driver, width, height)?;
    add_emblem(&mut driver, width)?;

    tracing::info!(
        entries = driver.scene().len(),
        tasks = driver.scheduler().len(),
        "demo scene ready"
    );
    Ok(driver)
}

fn checkerboard(width: u32, height: u32, tile: u32, a: Rgba, b: Rgba) -> FrameBuffer {
    let mut fb = FrameBuffer::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let px = if (x / tile + y / tile) % 2 == 0 { a } else { b };
            fb.set_pixel(x, y, px);
        }
    }
    fb
}

/// Register a drawable whose only transparent pixels are fully clear ones.
fn add_layer(
    driver: &mut FrameDriver,
    drawable: impl Drawable + 'static,
    priority: f64,
) -> EngineResult<PaintId> {
    let id = driver.scene_mut().add(drawable, priority)?;
    driver.scene_mut().set_transparent_key(id, Some(CLEAR));
    Ok(id)
}

fn add_backdrop(driver: &mut FrameDriver, width: u32, height: u32) -> EngineResult<()> {
    let source = checkerboard(width, height, 16, [48, 24, 72, 255], [24, 32, 88, 255]);
    let id = add_layer(driver, Sprite::new(0, 0, source.clone()), 0.0)?;
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);

    driver.scheduler_mut().add_named(
        "backdrop",
        from_fn(move |ctx| {
            let image = Resampler::new(&source)
                .rotate_degrees_about(cx, cy, ctx.tick.index as f64)?
                .apply();
            if let Some(backdrop) = ctx.scene.drawable_mut(id) {
                backdrop.set_image(image);
            }
            Ok(false)
        }),
        0.0,
    );
    Ok(())
}

/// Squeeze a floor row horizontally about `cx`; rows near the top are
/// squeezed hardest so they read as further away.
fn perspective_row(row: u32, rows: f64, cx: f64) -> EngineResult<AffineMatrix> {
    let depth = 0.25 + 0.75 * (row as f64 / rows);
    Ok(AffineMatrix::translation(cx, 0.0)?
        * AffineMatrix::scaling(depth, 1.0)?
        * AffineMatrix::translation(-cx, 0.0)?)
}

fn add_floor(driver: &mut FrameDriver, width: u32, height: u32) -> EngineResult<()> {
    let rows = height / 2;
    let period = FLOOR_TILE * 2;
    // One extra period below the visible rows so scrolling never opens a gap.
    let source = checkerboard(
        width,
        rows + period,
        FLOOR_TILE,
        [40, 140, 60, 255],
        [30, 100, 45, 255],
    );
    let id = add_layer(driver, Sprite::new(0, (height - rows) as i32, source.clone()), 1.0)?;
    let cx = width as f64 / 2.0;

    driver.scheduler_mut().add_named(
        "floor",
        from_fn(move |ctx| {
            let scroll = (ctx.tick.index % period as u64) as f64;
            let image = Resampler::new(&source)
                .translate(0.0, scroll - period as f64)?
                .apply_scanlines(|row: u32| perspective_row(row, rows.max(1) as f64, cx))?;
            if let Some(floor) = ctx.scene.drawable_mut(id) {
                floor.set_image(image);
            }
            Ok(false)
        }),
        1.0,
    );
    Ok(())
}

fn cloud() -> FrameBuffer {
    let (w, h) = (48u32, 12u32);
    let mut fb = FrameBuffer::new(w, h);
    let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
    for y in 0..h {
        for x in 0..w {
            let (dx, dy) = ((x as f64 + 0.5 - cx) / cx, (y as f64 + 0.5 - cy) / cy);
            if dx * dx + dy * dy <= 1.0 {
                fb.set_pixel(x, y, [235, 240, 255, 200]);
            }
        }
    }
    fb
}

fn add_clouds(driver: &mut FrameDriver) -> EngineResult<()> {
    let id = add_layer(driver, Sprite::new(0, 6, cloud()), 2.0)?;
    driver.scene_mut().set_wrapped(id, true);

    let drift = AnimateTask::new(id, vec![Animation::ShiftPosition { dx: -1, dy: 0 }], true);
    driver
        .scheduler_mut()
        .add_named("clouds", WaitTask::new(drift, 1), 2.0);
    Ok(())
}

/// Four 16x16 frames stacked vertically; the body bobs and the legs swap.
fn runner_strip() -> FrameBuffer {
    let mut strip = FrameBuffer::new(16, 64);
    for frame in 0..4u32 {
        let top = frame * 16;
        let bob = frame % 2;
        for y in 2 + bob..11 + bob {
            for x in 4..12 {
                strip.set_pixel(x, top + y, [220, 90, 40, 255]);
            }
        }
        let (front, back) = if frame < 2 { (5, 10) } else { (10, 5) };
        for y in 11 + bob..16 {
            strip.set_pixel(front, top + y, [60, 40, 30, 255]);
            strip.set_pixel(back, top + y.min(14), [60, 40, 30, 255]);
        }
    }
    strip
}

fn add_runner(driver: &mut FrameDriver, width: u32, height: u32) -> EngineResult<()> {
    let x = width as i32 / 2 - 8;
    let y = height as i32 - 24;
    let id = add_layer(driver, FramedSprite::new(x, y, runner_strip(), 4), 3.0)?;

    let script = (0..4).map(Animation::SetFrame).collect();
    let run = AnimateTask::new(id, script, true).with_speed(0.25)?;
    driver.scheduler_mut().add_named("runner", run, 3.0);
    Ok(())
}

fn emblem() -> FrameBuffer {
    let mut fb = FrameBuffer::new(EMBLEM_SIZE, EMBLEM_SIZE);
    let c = EMBLEM_SIZE as i32 / 2;
    for y in 0..EMBLEM_SIZE as i32 {
        for x in 0..EMBLEM_SIZE as i32 {
            let d = (x - c).abs() + (y - c).abs();
            if d < c - 2 {
                fb.set_pixel(x as u32, y as u32, [250, 210, 60, 255]);
            } else if d < c {
                fb.set_pixel(x as u32, y as u32, [120, 80, 20, 255]);
            }
        }
    }
    fb
}

fn add_emblem(driver: &mut FrameDriver, width: u32) -> EngineResult<()> {
    let source = emblem();
    let anchor = (width as i32 - EMBLEM_SIZE as i32 - 4, 4);
    let id = add_layer(driver, Sprite::new(anchor.0, anchor.1, source.clone()), 4.0)?;
    let center = EMBLEM_SIZE as f64 / 2.0;
    let mut angle = 0.0;

    driver.scheduler_mut().add_named(
        "emblem",
        from_fn(move |ctx| {
            if ctx.input.is_pressed("pause") {
                return Ok(false);
            }
            angle = (angle + 6.0) % 360.0;
            let spun = Resampler::new(&source)
                .rotate_degrees_about(center, center, angle)?
                .apply_unclipped()?;
            if let Some(sprite) = ctx.scene.drawable_mut(id) {
                sprite.set_x(anchor.0 + spun.origin_x);
                sprite.set_y(anchor.1 + spun.origin_y);
                sprite.set_image(spun.image);
            }
            Ok(false)
        }),
        4.0,
    );
    Ok(())
}
