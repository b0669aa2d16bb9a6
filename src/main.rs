//! Overhead map viewer: filled sector floors, walls and things.
//!
//! ```bash
//! cargo run --release --bin view_map -- doom1.wad --map E1M1 --scale 0.25
//! ```
//!
//! `B` toggles the BSP overlay, `T` toggles things, Esc quits.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use log::{info, warn};
use minifb::{Key, KeyRepeat, ScaleMode, Window, WindowOptions};
use simplelog::TermLogger;

use wadscope::{
    renderer::{OverheadOptions, render_overhead_map},
    wad::{load_textures, parse_file},
    world::TextureBank,
};

const MAX_W: usize = 1280;
const MAX_H: usize = 800;

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// IWAD or PWAD to load
    #[arg(value_name = "FILE")]
    wad: PathBuf,

    /// Map marker name; the first map in the WAD when omitted
    #[arg(long)]
    map: Option<String>,

    /// Pixels per map unit
    #[arg(long, default_value_t = 2.0)]
    scale: f32,

    /// Border around the map, in pixels
    #[arg(long, default_value_t = 32)]
    padding: usize,

    /// Start with the BSP overlay on
    #[arg(long)]
    bsp: bool,

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
    let level = match &opts.map {
        Some(name) => wad.map(name),
        None => wad.maps.values().next(),
    };
    let Some(level) = level else {
        bail!("map {:?} not found in {}", opts.map, opts.wad.display());
    };

    let mut bank = TextureBank::default_with_checker();
    let warnings = load_textures(&wad, &mut bank);
    if !warnings.is_empty() {
        warn!("{} texture warnings while loading", warnings.len());
    }

    let mut map_opts = OverheadOptions {
        scale: opts.scale,
        padding: opts.padding,
        draw_bsp: opts.bsp,
        ..OverheadOptions::default()
    };
    let mut frame = render_overhead_map(level, &bank, &map_opts)?;
    info!("{}: {}x{} pixels", level.name, frame.width, frame.height);

    let mut win = Window::new(
        &format!("wadscope - {}", level.name),
        frame.width.min(MAX_W),
        frame.height.min(MAX_H),
        WindowOptions {
            resize: true,
            scale_mode: ScaleMode::AspectRatioStretch,
            ..WindowOptions::default()
        },
    )?;
    win.set_target_fps(30);

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let mut dirty = false;
        if win.is_key_pressed(Key::B, KeyRepeat::No) {
            map_opts.draw_bsp = !map_opts.draw_bsp;
            dirty = true;
        }
        if win.is_key_pressed(Key::T, KeyRepeat::No) {
            map_opts.draw_things = !map_opts.draw_things;
            dirty = true;
        }
        if dirty {
            frame = render_overhead_map(level, &bank, &map_opts)?;
        }
        win.update_with_buffer(&frame.pixels, frame.width, frame.height)?;
    }
    Ok(())
}
