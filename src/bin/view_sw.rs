//! First-person software view of one map.
//!
//! ```bash
//! cargo run --release --bin view_sw -- doom1.wad --map E1M1
//! ```
//!
//! Arrows/WASD move, Alt+arrows strafe, Shift runs, Esc quits.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, bail};
use clap::Parser;
use glam::Vec3;
use log::{info, warn};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use simplelog::TermLogger;

use wadscope::{
    input::{
        CameraController, EventQueue, InputEvent, KEY_ALT, KEY_CTRL, KEY_DOWN, KEY_ENTER,
        KEY_ESCAPE, KEY_LEFT, KEY_RIGHT, KEY_SHIFT, KEY_UP, KeyCode,
    },
    renderer::{RenderConfig, RenderError, RendererExt, Software, collect_draw_calls},
    wad::{load_textures, parse_file},
    world::{BspError, Camera, Level, TextureBank, ThingKind},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// IWAD or PWAD to load
    #[arg(value_name = "FILE")]
    wad: PathBuf,

    /// Map marker name (E1M1, MAP01, ...)
    #[arg(long, default_value = "E1M1")]
    map: String,

    #[arg(long, default_value_t = 640)]
    width: usize,

    #[arg(long, default_value_t = 480)]
    height: usize,

    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();

    TermLogger::init(
        opts.log_level,
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let wad = parse_file(&opts.wad).with_context(|| format!("loading {}", opts.wad.display()))?;
    let Some(level) = wad.map(&opts.map) else {
        let names: Vec<_> = wad.maps.keys().cloned().collect();
        bail!("no map {} in {} (have: {})", opts.map, opts.wad.display(), names.join(" "));
    };

    let mut bank = TextureBank::default_with_checker();
    let warnings = load_textures(&wad, &mut bank);
    if !warnings.is_empty() {
        warn!("{} texture warnings while loading", warnings.len());
    }
    info!("{}: {} textures in bank", level.name, bank.len());

    let cfg = RenderConfig {
        width: opts.width,
        height: opts.height,
        ..RenderConfig::default()
    };
    let mut camera = spawn_camera(level);
    let mut controller = CameraController::new();
    let events = EventQueue::new();
    let mut renderer = Software::default();

    let mut win = Window::new("wadscope", cfg.width, cfg.height, WindowOptions::default())?;
    win.set_target_fps(35);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();
    let mut last_frame = Instant::now();

    while win.is_open() && !controller.quit_requested() {
        /* --------------- producer side: window → queue ------------------ */
        for k in win.get_keys_pressed(KeyRepeat::No) {
            if let Some(code) = doom_key(k) {
                events.push(InputEvent::down(code));
            }
        }
        for k in win.get_keys_released() {
            if let Some(code) = doom_key(k) {
                events.push(InputEvent::up(code));
            }
        }

        /* --------------- frame boundary: drain once --------------------- */
        let dt = last_frame.elapsed().as_secs_f32();
        last_frame = Instant::now();
        controller.apply(events.drain());
        controller.update(&mut camera, dt);
        stand_on_floor(level, &mut camera);

        let t0 = Instant::now();
        let calls = match collect_draw_calls(level, &camera, &bank, &cfg) {
            Ok(calls) => calls,
            Err(RenderError::Bsp(BspError::DegenerateBspSide { node, .. })) => {
                // on a partition line: nudge off it and try next frame
                warn!("camera on partition of node {node}, nudging");
                camera.step(0.0, 0.01);
                win.update();
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let mut shown = Ok(());
        renderer.draw_frame(cfg.width, cfg.height, &calls, &bank, |fb, w, h| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            shown = win.update_with_buffer(fb, w, h);
        })?;
        shown?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            info!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

/// Camera on player 1's start, or the middle of the map.
fn spawn_camera(level: &Level) -> Camera {
    let start = level
        .things
        .iter()
        .find(|t| t.kind == ThingKind::Player1Start);
    let mut cam = match (start, level.bounds()) {
        (Some(t), _) => Camera::new(t.pos().extend(0.0), t.angle as f32),
        (None, Some(b)) => {
            let mid = Vec3::new(
                (b.left as f32 + b.right as f32) * 0.5,
                (b.bottom as f32 + b.top as f32) * 0.5,
                0.0,
            );
            Camera::new(mid, 90.0)
        }
        (None, None) => Camera::new(Vec3::ZERO, 90.0),
    };
    stand_on_floor(level, &mut cam);
    cam
}

fn stand_on_floor(level: &Level, cam: &mut Camera) {
    if let Some(sector) = level
        .sector_at(cam.pos2())
        .and_then(|s| level.sectors.get(s as usize))
    {
        let mut p = cam.pos();
        p.z = sector.floor_height as f32;
        cam.set_pos(p);
    }
}

fn doom_key(k: Key) -> Option<KeyCode> {
    Some(match k {
        Key::Left => KEY_LEFT,
        Key::Right => KEY_RIGHT,
        Key::Up => KEY_UP,
        Key::Down => KEY_DOWN,
        Key::Enter => KEY_ENTER,
        Key::Escape => KEY_ESCAPE,
        Key::LeftShift | Key::RightShift => KEY_SHIFT,
        Key::LeftCtrl | Key::RightCtrl | Key::Z => KEY_CTRL,
        Key::LeftAlt | Key::RightAlt => KEY_ALT,
        Key::W => b'W' as KeyCode,
        Key::A => b'A' as KeyCode,
        Key::S => b'S' as KeyCode,
        Key::D => b'D' as KeyCode,
        _ => return None,
    })
}
