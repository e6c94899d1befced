use std::cell::RefCell;
use std::rc::Rc;

use retromode_core::hash::{hash_frame, hash_frames};
use retromode_core::{Color, EngineConfig, FrameBuffer};
use retromode_engine::{from_fn, AnimateTask, Animation, FrameDriver, WaitTask};
use retromode_render::{FramedSprite, PaintId, Sprite};

fn strip() -> FrameBuffer {
    // Three 2x2 frames; the corner pixel of each is the transparent key.
    let mut fb = FrameBuffer::new(2, 6);
    for y in 0..6 {
        for x in 0..2 {
            fb.set_pixel(x, y, [40 * (y / 2 + 1) as u8, 10, 10, 255]);
        }
        if y % 2 == 0 {
            fb.set_pixel(0, y, [0, 0, 0, 0]);
        }
    }
    fb
}

fn build_driver() -> (FrameDriver, PaintId) {
    let config = EngineConfig::from_toml_str(
        "[display]\nwidth = 16\nheight = 8\nbackground = \"#102030\"\n",
    )
    .unwrap();
    let mut driver = FrameDriver::from_config(&config).unwrap();

    let sprite = driver
        .scene_mut()
        .add(FramedSprite::new(14, 2, strip(), 3), 1.0)
        .unwrap();
    driver.scene_mut().set_wrapped(sprite, true);

    let script = vec![
        Animation::SetFrame(0),
        Animation::SetFrame(1),
        Animation::SetFrame(2),
    ];
    driver
        .scheduler_mut()
        .add_named("animate", AnimateTask::new(sprite, script, true), 1.0);
    driver.scheduler_mut().add_named(
        "scroll",
        WaitTask::new(
            AnimateTask::new(sprite, vec![Animation::ShiftPosition { dx: 1, dy: 0 }], true),
            1,
        ),
        2.0,
    );
    (driver, sprite)
}

#[test]
fn test_driver_runs_are_deterministic() {
    let render = || {
        let (mut driver, _) = build_driver();
        (0..6)
            .map(|_| driver.produce_frame().map(FrameBuffer::clone))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    };
    let a = render();
    let b = render();
    assert_eq!(hash_frames(&a), hash_frames(&b));
    assert_ne!(hash_frame(&a[0]), hash_frame(&a[1]));
}

#[test]
fn test_animation_and_wrapped_scroll() {
    let (mut driver, sprite) = build_driver();
    let background = Color::from_hex("#102030").unwrap().to_rgba8();

    // Tick 0: frame 0, no scroll yet (the wait skips one tick).
    let frame = driver.produce_frame().unwrap();
    assert_eq!(frame.get_pixel(15, 2), Some([40, 10, 10, 255]));
    assert_eq!(frame.get_pixel(14, 2), Some(background));

    // Tick 1: frame 1, scrolled to x = 15, so the right column wraps to 0.
    let frame = driver.produce_frame().unwrap();
    assert_eq!(frame.get_pixel(0, 2), Some([80, 10, 10, 255]));
    assert_eq!(driver.scene().drawable(sprite).unwrap().x(), 15);
}

#[test]
fn test_priority_bound_freezes_higher_tasks() {
    let (mut driver, sprite) = build_driver();
    driver.scheduler_mut().set_priority_bound(1.5);
    for _ in 0..4 {
        driver.produce_frame().unwrap();
    }
    // The scroll task sits above the bound and never ran.
    assert_eq!(driver.scene().drawable(sprite).unwrap().x(), 14);

    driver.scheduler_mut().set_priority_bound(f64::NAN);
    driver.produce_frame().unwrap();
    driver.produce_frame().unwrap();
    assert_eq!(driver.scene().drawable(sprite).unwrap().x(), 15);
}

#[test]
fn test_active_set_after_tick() {
    let (mut driver, _) = build_driver();
    let spawned = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&spawned);
    driver.scheduler_mut().add_named(
        "spawner",
        from_fn(move |ctx| {
            let child = ctx.scheduler.add(from_fn(|_ctx| Ok(true)), 0.5);
            sink.borrow_mut().push(child);
            Ok(true)
        }),
        0.0,
    );
    let before = driver.scheduler().active_ids();
    driver.produce_frame().unwrap();

    // The spawner finished and its child joined; nothing else changed.
    let child = spawned.borrow()[0];
    let after = driver.scheduler().active_ids();
    assert_eq!(after.len(), before.len());
    assert_eq!(after[0], child);
    assert!(!driver.scheduler().contains("spawner"));
    assert_eq!(&after[1..], &before[1..]);

    // The child runs once and is gone.
    driver.produce_frame().unwrap();
    assert!(!driver.scheduler().contains(child));
}

#[test]
fn test_disable_by_name_pauses_animation() {
    let (mut driver, sprite) = build_driver();
    assert!(driver.scheduler_mut().set_enabled("animate", false));
    driver.produce_frame().unwrap();
    driver.produce_frame().unwrap();
    let frame = driver.scene().drawable(sprite).unwrap().image().clone();
    assert_eq!(frame.get_pixel(1, 0), Some([40, 10, 10, 255]));
    let info = driver.scheduler().get_by_name("animate").unwrap();
    assert!(!info.enabled);
}

#[test]
fn test_scene_accepts_plain_sprites_alongside_framed_ones() {
    let (mut driver, _) = build_driver();
    let mut dot = FrameBuffer::new(2, 1);
    dot.set_pixel(1, 0, [255, 255, 255, 255]);
    driver
        .scene_mut()
        .add(Sprite::new(3, 7, dot), 10.0)
        .unwrap();
    let frame = driver.produce_frame().unwrap();
    assert_eq!(frame.get_pixel(4, 7), Some([255, 255, 255, 255]));
}
