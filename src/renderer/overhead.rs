// ──────────────────────────────────────────────────────────────────────────
// renderer/overhead.rs
//
//   sector boundary lines ──> greedy edge walk ──> polygons ──> even-odd
//   scanline fill with the floor flat, then lines, things, BSP overlay
// ──────────────────────────────────────────────────────────────────────────

use std::collections::BTreeMap;

use glam::Vec2;
use log::debug;

use crate::{
    renderer::{Frame, RenderError, Rgba},
    world::{BBox, Level, Palette, SectorId, Texture, TextureBank, ThingKind, VertexId},
};

const ONE_SIDED_COLOUR: Rgba = 0xFF_E0_E0_E0;
const TWO_SIDED_COLOUR: Rgba = 0xFF_70_70_70;
const PLAYER_COLOUR: Rgba = 0xFF_20_E0_20;
const THING_COLOUR: Rgba = 0xFF_E0_C0_20;
const RIGHT_BOX_COLOUR: Rgba = 0xFF_20_A0_20;
const LEFT_BOX_COLOUR: Rgba = 0xFF_A0_20_20;
const PARTITION_COLOUR: Rgba = 0xFF_40_60_FF;

/// Layout and overlay switches for [`render_overhead_map`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverheadOptions {
    /// Pixels per map unit.
    pub scale: f32,
    /// Border around the map, in pixels.
    pub padding: usize,
    pub draw_things: bool,
    /// Node bounding boxes and partition lines.
    pub draw_bsp: bool,
    pub thing_radius: i32,
}

impl Default for OverheadOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            padding: 32,
            draw_things: true,
            draw_bsp: false,
            thing_radius: 3,
        }
    }
}

/// Vertex loop found by the edge walk. Open paths ran out of connecting
/// edges before returning to their first vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Polygon {
    pub vertices: Vec<VertexId>,
    pub closed: bool,
}

/*───────────────────────────────────────────────────────────────────────*/
/*                           Polygon building                           */
/*───────────────────────────────────────────────────────────────────────*/

/// Boundary polygons of every sector, keyed by sector index.
///
/// Edges are undirected: a walk continues through any remaining edge that
/// touches the current end vertex, in linedef order.
pub fn sector_polygons(level: &Level) -> Result<BTreeMap<SectorId, Vec<Polygon>>, RenderError> {
    let mut edges: BTreeMap<SectorId, Vec<(VertexId, VertexId)>> = BTreeMap::new();
    for ld in &level.line_defs {
        let mut sectors: Vec<SectorId> = Vec::with_capacity(2);
        for side in [ld.side(true), ld.side(false)].into_iter().flatten() {
            let sd = level.side_defs.get(side as usize).ok_or(RenderError::BadIndex {
                what: "sidedef",
                index: side as usize,
            })?;
            if !sectors.contains(&sd.facing_sector) {
                sectors.push(sd.facing_sector);
            }
        }
        for s in sectors {
            edges
                .entry(s)
                .or_default()
                .push((ld.start_vertex, ld.end_vertex));
        }
    }

    Ok(edges
        .into_iter()
        .map(|(sector, edges)| (sector, walk_edges(edges)))
        .collect())
}

fn walk_edges(mut remaining: Vec<(VertexId, VertexId)>) -> Vec<Polygon> {
    let mut out = Vec::new();
    while !remaining.is_empty() {
        let (first, second) = remaining.remove(0);
        let mut path = vec![first, second];
        let mut closed = first == second;

        while !closed {
            let end = path[path.len() - 1];
            let Some(i) = remaining.iter().position(|&(a, b)| a == end || b == end) else {
                break;
            };
            let (a, b) = remaining.remove(i);
            let next = if a == end { b } else { a };
            if next == first {
                closed = true;
            } else {
                path.push(next);
            }
        }
        if closed && path.len() > 1 && path[0] == path[1] {
            path.pop();
        }
        out.push(Polygon {
            vertices: path,
            closed,
        });
    }
    out
}

/*───────────────────────────────────────────────────────────────────────*/
/*                               Drawing                                */
/*───────────────────────────────────────────────────────────────────────*/

/// Map-space → screen-space transform (north up).
#[derive(Clone, Copy, Debug)]
struct View {
    left: f32,
    top: f32,
    scale: f32,
    pad: f32,
}

impl View {
    fn new(b: &BBox, opts: &OverheadOptions) -> Self {
        Self {
            left: b.left as f32,
            top: b.top as f32,
            scale: opts.scale,
            pad: opts.padding as f32,
        }
    }

    fn to_screen(&self, p: Vec2) -> (i32, i32) {
        let v = self.to_screen_f(p);
        (v.x.round() as i32, v.y.round() as i32)
    }

    fn to_screen_f(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.pad + (p.x - self.left) * self.scale,
            self.pad + (self.top - p.y) * self.scale,
        )
    }

    /// Map point under the centre of pixel `(x, y)`.
    fn to_map(&self, x: usize, y: usize) -> Vec2 {
        Vec2::new(
            self.left + (x as f32 + 0.5 - self.pad) / self.scale,
            self.top - (y as f32 + 0.5 - self.pad) / self.scale,
        )
    }
}

/// Draw `level` from above: sector floors, walls, and the enabled overlays.
pub fn render_overhead_map(
    level: &Level,
    bank: &TextureBank,
    opts: &OverheadOptions,
) -> Result<Frame, RenderError> {
    let palette = bank.palette().ok_or(RenderError::MissingPalette)?;
    let Some(bounds) = level.bounds() else {
        let side = opts.padding * 2;
        return Ok(Frame::new(side, side));
    };

    let view = View::new(&bounds, opts);
    let w = (bounds.width() as f32 * opts.scale).ceil() as usize + opts.padding * 2;
    let h = (bounds.height() as f32 * opts.scale).ceil() as usize + opts.padding * 2;
    let mut frame = Frame::new(w, h);

    /*----- 1. Floors ------------------------------------------------------*/
    for (sector_id, polys) in sector_polygons(level)? {
        let sector = level
            .sectors
            .get(sector_id as usize)
            .ok_or(RenderError::BadIndex {
                what: "sector",
                index: sector_id as usize,
            })?;
        let flat = bank
            .flat(&sector.floor_texture)
            .unwrap_or_else(|| bank.texture_or_missing(&sector.floor_texture));

        let mut outline = Vec::with_capacity(polys.len());
        for poly in &polys {
            if !poly.closed {
                debug!("sector {sector_id}: open boundary of {} vertexes", poly.vertices.len());
            }
            outline.push(points(level, &poly.vertices, &view)?);
        }
        fill_even_odd(&mut frame, &outline, &view, flat, palette);
    }

    /*----- 2. Walls -------------------------------------------------------*/
    for ld in &level.line_defs {
        let a = vertex(level, ld.start_vertex)?;
        let b = vertex(level, ld.end_vertex)?;
        let col = if ld.side(false).is_some() {
            TWO_SIDED_COLOUR
        } else {
            ONE_SIDED_COLOUR
        };
        line(&mut frame, &view, a, b, col);
    }

    /*----- 3. Overlays ----------------------------------------------------*/
    if opts.draw_bsp {
        for node in &level.nodes {
            draw_box(&mut frame, &view, &node.right_bbox, RIGHT_BOX_COLOUR);
            draw_box(&mut frame, &view, &node.left_bbox, LEFT_BOX_COLOUR);
            let p = Vec2::new(node.x as f32, node.y as f32);
            let d = Vec2::new(node.dx as f32, node.dy as f32);
            line(&mut frame, &view, p, p + d, PARTITION_COLOUR);
        }
    }
    if opts.draw_things {
        for t in &level.things {
            let col = match t.kind {
                ThingKind::Player1Start
                | ThingKind::Player2Start
                | ThingKind::Player3Start
                | ThingKind::Player4Start => PLAYER_COLOUR,
                _ => THING_COLOUR,
            };
            let (x, y) = view.to_screen(t.pos());
            frame.draw_dot(x, y, opts.thing_radius, col);
        }
    }

    Ok(frame)
}

fn vertex(level: &Level, id: VertexId) -> Result<Vec2, RenderError> {
    level
        .vertexes
        .get(id as usize)
        .map(|v| v.pos())
        .ok_or(RenderError::BadIndex {
            what: "vertex",
            index: id as usize,
        })
}

fn points(level: &Level, ids: &[VertexId], view: &View) -> Result<Vec<Vec2>, RenderError> {
    ids.iter()
        .map(|&id| vertex(level, id).map(|p| view.to_screen_f(p)))
        .collect()
}

fn line(frame: &mut Frame, view: &View, a: Vec2, b: Vec2, col: Rgba) {
    let (x0, y0) = view.to_screen(a);
    let (x1, y1) = view.to_screen(b);
    frame.draw_line(x0, y0, x1, y1, col);
}

fn draw_box(frame: &mut Frame, view: &View, b: &BBox, col: Rgba) {
    for (a, c) in b.edges() {
        line(frame, view, a, c, col);
    }
}

/// Even-odd scanline fill over all `polys` (in screen space, each implicitly
/// closed), painting the flat tiled by map coordinates.
fn fill_even_odd(frame: &mut Frame, polys: &[Vec<Vec2>], view: &View, flat: &Texture, pal: &Palette) {
    let mut crossings: Vec<f32> = Vec::new();
    for y in 0..frame.height {
        let sy = y as f32 + 0.5;
        crossings.clear();
        for poly in polys {
            if poly.len() < 3 {
                continue;
            }
            for (i, &a) in poly.iter().enumerate() {
                let b = poly[(i + 1) % poly.len()];
                if (a.y <= sy) != (b.y <= sy) {
                    crossings.push(a.x + (sy - a.y) / (b.y - a.y) * (b.x - a.x));
                }
            }
        }
        crossings.sort_by(f32::total_cmp);

        for pair in crossings.chunks_exact(2) {
            let first = ((pair[0] - 0.5).ceil().max(0.0)) as usize;
            let end = ((pair[1] - 0.5).ceil().max(0.0) as usize).min(frame.width);
            for x in first..end {
                let m = view.to_map(x, y);
                // flats are laid out north-up on a 64-unit grid
                if let Some(idx) = flat.sample_wrapped(m.x.floor() as i32, (-m.y).floor() as i32) {
                    frame.put(x as i32, y as i32, pal[idx as usize]);
                }
            }
        }
    }
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
