//! ---------------------------------------------------------------------------
//! Software (CPU) column renderer
//!
//! * Fills a [`Frame`] in **0xAARRGGBB** format.
//! * Walls arrive as [`DrawCall`]s in BSP order, nearest subtree first.
//!   There is no depth buffer and no span clipping: every strip is painted
//!   in full, so a later (farther) strip can cover an earlier one.
//! ---------------------------------------------------------------------------

use log::trace;

use crate::{
    renderer::{
        DrawCall, Frame, RenderConfig, RenderError, Renderer, RendererExt, Rgba, WallStrip,
    },
    world::{Camera, Level, TextureBank},
};

pub mod projection;
pub mod walls;

pub use projection::Projector;
pub use walls::seg_strips;

/// Strips narrower than this (in pixels) take their values from the left edge.
const MIN_SPAN: f32 = 1e-3;

/*───────────────────────────────────────────────────────────────────────*/
/*                         Draw-call collection                         */
/*───────────────────────────────────────────────────────────────────────*/

/// Walk the BSP from `camera` and build the wall strips of every visible
/// subsector, in drawing order.
pub fn collect_draw_calls(
    level: &Level,
    camera: &Camera,
    bank: &TextureBank,
    cfg: &RenderConfig,
) -> Result<Vec<DrawCall>, RenderError> {
    let proj = Projector::new(camera, cfg);
    let eye = camera.pos2();

    let mut calls = Vec::new();
    for ss_id in level.visible_subsectors(camera)? {
        let ss = &level.subsectors[ss_id as usize];
        for seg_id in ss.segs() {
            let strips = seg_strips(level, seg_id as u16, &proj, eye, bank)?;
            calls.extend(strips.into_iter().map(DrawCall::Wall));
        }
    }
    trace!("{} wall strips", calls.len());
    Ok(calls)
}

/// Render one first-person frame of `level`.
///
/// Pure function of its inputs; fails with [`RenderError::MissingPalette`]
/// before any work if the bank has no palette.
pub fn render_frame(
    level: &Level,
    camera: &Camera,
    bank: &TextureBank,
    cfg: &RenderConfig,
) -> Result<Frame, RenderError> {
    if bank.palette().is_none() {
        return Err(RenderError::MissingPalette);
    }
    let calls = collect_draw_calls(level, camera, bank, cfg)?;
    let mut sw = Software::default();
    sw.draw_frame(cfg.width, cfg.height, &calls, bank, |_, _, _| {})?;
    Ok(sw.into_frame())
}

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                 */
/*───────────────────────────────────────────────────────────────────────*/

/// Column renderer with a reusable scratch frame.
pub struct Software {
    scratch: Frame,
}

impl Default for Software {
    fn default() -> Self {
        Self {
            scratch: Frame::new(0, 0),
        }
    }
}

impl Software {
    pub fn into_frame(self) -> Frame {
        self.scratch
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        self.scratch.reset(w, h);
    }

    fn draw_wall(&mut self, strip: &WallStrip, bank: &TextureBank) -> Result<(), RenderError> {
        let palette = bank.palette().ok_or(RenderError::MissingPalette)?;
        let tex = bank.texture(strip.tex_id).unwrap_or_else(|_| {
            // MISSING_TEXTURE always exists
            bank.texture_or_missing("")
        });

        let span = strip.x2 - strip.x1;
        let (x_start, x_end) = pixel_range(strip.x1, strip.x2, self.scratch.width);

        for x in x_start..x_end {
            let t = if span > MIN_SPAN {
                (x as f32 + 0.5 - strip.x1) / span
            } else {
                0.0
            };
            let col = Column {
                top: lerp(strip.top1, strip.top2, t),
                bot: lerp(strip.bot1, strip.bot2, t),
                u: lerp(strip.u1, strip.u2, t),
            };
            self.draw_column(x, col, strip, |v, u| {
                tex.sample_wrapped(u, v).map(|idx| palette[idx as usize])
            });
        }
        Ok(())
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch.pixels, self.scratch.width, self.scratch.height);
    }
}

/*──────────────────────── column rendering ───────────────────────────*/

/// Interpolated values for one screen column.
#[derive(Clone, Copy, Debug)]
struct Column {
    top: f32,
    bot: f32,
    u: f32,
}

impl Software {
    /// Draw one vertical slice; `texel(v, u)` returns `None` for holes.
    fn draw_column<F>(&mut self, x: i32, col: Column, strip: &WallStrip, texel: F)
    where
        F: Fn(i32, i32) -> Option<Rgba>,
    {
        let height = col.bot - col.top;
        if height <= 0.0 {
            return;
        }
        let (y_start, y_end) = pixel_range(col.top, col.bot, self.scratch.height);
        let u = col.u.floor() as i32;

        for y in y_start..y_end {
            // row 0 of the texture is the top of the wall
            let frac = (y as f32 + 0.5 - col.top) / height;
            let v = (strip.v_top + frac * strip.wall_height).floor() as i32;
            if let Some(c) = texel(v, u) {
                self.scratch.put(x, y, c);
            }
        }
    }
}

/// Pixels whose centres fall in `[a, b)`, clamped to `0..len`.
#[inline]
fn pixel_range(a: f32, b: f32, len: usize) -> (i32, i32) {
    let first = ((a - 0.5).ceil() as i32).max(0);
    let end = ((b - 0.5).ceil() as i32).min(len as i32);
    (first, end)
}

#[inline(always)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
