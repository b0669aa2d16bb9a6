//! Rendering abstraction layer.
//!
//! *The level walk never touches a pixel buffer directly.*
//! It produces a list of [`DrawCall`]s (BSP order, nearest subtree first)
//! and hands them to a type that implements [`Renderer`].
//!
//! * [`software`] is the CPU column renderer behind [`render_frame`].
//! * [`overhead`] draws the same level as a flat, filled 2-D map.
//! * A helper blanket-impl [`RendererExt`] adds `draw_frame` so call-sites
//!   stay short.
//!
//! **Current limitation**: walls only. Floors, ceilings and sprites are not
//! projected, and nothing is occluded: a farther strip drawn later paints
//! over a nearer one.

use thiserror::Error;

use crate::world::{BspError, EYE_HEIGHT, TextureBank, TextureId};

pub mod overhead;
pub mod software;

pub use overhead::{OverheadOptions, Polygon, render_overhead_map, sector_polygons};
pub use software::{Software, collect_draw_calls, render_frame};

/// Pixel format of the frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// Background of a fresh frame.
pub const CLEAR_COLOUR: Rgba = 0xFF_20_20_20;

/// Output resolution and eye height for the first-person view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    pub width: usize,
    pub height: usize,
    /// Eye height above the camera's z, in map units.
    pub eye_height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            eye_height: EYE_HEIGHT,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum RenderError {
    #[error("no palette set before rendering")]
    MissingPalette,

    #[error(transparent)]
    Bsp(#[from] BspError),

    #[error("{what} index {index} out of range")]
    BadIndex { what: &'static str, index: usize },
}

/// Which part of a seg a [`WallStrip`] covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StripKind {
    /// front floor → back floor
    Lower,
    /// front floor → front ceiling
    Middle,
    /// back ceiling → front ceiling
    Upper,
}

/// One projected, textured wall quad, ordered left to right on screen.
///
/// `*_1` values belong to the left edge at `x1`, `*_2` to the right edge.
#[derive(Clone, Debug, PartialEq)]
pub struct WallStrip {
    pub kind: StripKind,
    pub tex_id: TextureId,

    /* screen extents */
    pub x1: f32,
    pub x2: f32,
    pub top1: f32,
    pub bot1: f32,
    pub top2: f32,
    pub bot2: f32,

    /* texture space, in map units (1 texel = 1 unit) */
    pub u1: f32,
    pub u2: f32,
    /// Texture row at the top edge.
    pub v_top: f32,
    /// Top z − bottom z.
    pub wall_height: f32,
}

pub enum DrawCall {
    Wall(WallStrip),
}

/// Owned pixel grid, row-major, `(0, 0)` in the top-left corner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Rgba>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![CLEAR_COLOUR; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[y * self.width + x])
    }

    /// Write one pixel; out-of-bounds coordinates are ignored.
    #[inline]
    pub fn put(&mut self, x: i32, y: i32, col: Rgba) {
        if (0..self.width as i32).contains(&x) && (0..self.height as i32).contains(&y) {
            self.pixels[y as usize * self.width + x as usize] = col;
        }
    }

    /// Reallocate if the resolution changed, then clear.
    pub fn reset(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels.resize(width * height, 0);
        }
        self.pixels.fill(CLEAR_COLOUR);
    }

    /// Integer Bresenham line, clipped per pixel.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, col: Rgba) {
        let (mut x, mut y) = (x0, y0);
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x, y, col);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Filled disc of radius `r` centred on `(cx, cy)`.
    pub fn draw_dot(&mut self, cx: i32, cy: i32, r: i32, col: Rgba) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.put(cx + dx, cy + dy, col);
                }
            }
        }
    }
}

/// A back-end that owns its scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure,
/// typically `|fb, w, h| window.update_with_buffer(fb, w, h)`.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Rasterise one textured wall strip into the internal buffer.
    fn draw_wall(&mut self, strip: &WallStrip, bank: &TextureBank) -> Result<(), RenderError>;

    /// Finish the frame and **loan** the finished buffer to `submit`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

/// Convenience blanket-impl with a one-liner `draw_frame` adaptor.
pub trait RendererExt: Renderer {
    fn draw_frame<F>(
        &mut self,
        width: usize,
        height: usize,
        calls: &[DrawCall],
        bank: &TextureBank,
        submit: F,
    ) -> Result<(), RenderError>
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        if bank.palette().is_none() {
            return Err(RenderError::MissingPalette);
        }
        self.begin_frame(width, height);
        for c in calls {
            match c {
                DrawCall::Wall(w) => self.draw_wall(w, bank)?,
            }
        }
        self.end_frame(submit);
        Ok(())
    }
}
impl<T: Renderer + ?Sized> RendererExt for T {}
