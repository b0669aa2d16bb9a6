// ──────────────────────────────────────────────────────────────────────────
// renderer/software/walls.rs
//
//   Seg ──> facing side ──> lower / middle / upper heights ──> WallStrip
// ──────────────────────────────────────────────────────────────────────────

use glam::Vec2;
use smallvec::SmallVec;

use crate::{
    renderer::{RenderError, StripKind, WallStrip, software::projection::Projector},
    world::{Level, Sector, SegDirection, SegId, SideDef, TextureBank},
};

pub type Strips = SmallVec<[WallStrip; 3]>;

/// Front and (optional) back view of a seg as seen from `eye`.
struct Faces<'a> {
    /// Right sidedef faces the eye.
    right: bool,
    /// Length of the whole linedef.
    line_len: f32,
    side: &'a SideDef,
    front: &'a Sector,
    back: Option<&'a Sector>,
}

/// Up to three textured strips for one seg.
///
/// The facing side is the sign of the cross product of (eye − line start)
/// against (line end − line start): positive picks the right sidedef.
/// Texture `u` runs along the facing side, so a seg and its twin on the
/// other side of a two-sided line produce the same strip.
pub fn seg_strips(
    level: &Level,
    seg_id: SegId,
    proj: &Projector,
    eye: Vec2,
    bank: &TextureBank,
) -> Result<Strips, RenderError> {
    let mut out = Strips::new();
    let seg = get(&level.segs, seg_id as usize, "seg")?;
    let Some(faces) = faces(level, seg.line_def as usize, eye)? else {
        return Ok(out);
    };

    let a = get(&level.vertexes, seg.start_vertex as usize, "vertex")?.pos();
    let b = get(&level.vertexes, seg.end_vertex as usize, "vertex")?.pos();
    let (va, vb) = (proj.view(a), proj.view(b));
    if va.y <= 0.0 || vb.y <= 0.0 {
        return Ok(out);
    }

    let sd = faces.side;
    let (u_start, u_end) = seg_u_range(
        seg.offset as f32,
        (b - a).length(),
        faces.line_len,
        (seg.direction == SegDirection::Same) == faces.right,
    );
    let (u_start, u_end) = (u_start + sd.x_offset as f32, u_end + sd.x_offset as f32);
    let ff = faces.front.floor_height as f32;
    let fc = faces.front.ceiling_height as f32;

    let mut wanted: SmallVec<[(StripKind, &str, f32, f32); 3]> = SmallVec::new();
    if let (Some(back), Some(tex)) = (faces.back, sd.lower()) {
        wanted.push((StripKind::Lower, tex, ff, back.floor_height as f32));
    }
    if let Some(tex) = sd.middle() {
        wanted.push((StripKind::Middle, tex, ff, fc));
    }
    if let (Some(back), Some(tex)) = (faces.back, sd.upper()) {
        wanted.push((StripKind::Upper, tex, back.ceiling_height as f32, fc));
    }

    for (kind, tex, bottom, top) in wanted {
        // a step that faces away (e.g. lower side of a drop) has no area
        if top <= bottom {
            continue;
        }
        let corners = (
            proj.project_view(va, top),
            proj.project_view(va, bottom),
            proj.project_view(vb, top),
            proj.project_view(vb, bottom),
        );
        let (Some(ta), Some(ba), Some(tb), Some(bb)) = corners else {
            continue;
        };

        let mut strip = WallStrip {
            kind,
            tex_id: bank.id_or_missing(tex),
            x1: ta.x,
            x2: tb.x,
            top1: ta.y,
            bot1: ba.y,
            top2: tb.y,
            bot2: bb.y,
            u1: u_start,
            u2: u_end,
            v_top: sd.y_offset as f32,
            wall_height: top - bottom,
        };
        if strip.x1 > strip.x2 {
            flip(&mut strip);
        }
        out.push(strip);
    }
    Ok(out)
}

fn faces(level: &Level, line: usize, eye: Vec2) -> Result<Option<Faces<'_>>, RenderError> {
    let ld = get(&level.line_defs, line, "linedef")?;
    let s = get(&level.vertexes, ld.start_vertex as usize, "vertex")?.pos();
    let e = get(&level.vertexes, ld.end_vertex as usize, "vertex")?.pos();
    let right = (eye.x - s.x) * (e.y - s.y) - (eye.y - s.y) * (e.x - s.x) > 0.0;

    let Some(front_id) = ld.side(right) else {
        return Ok(None);
    };
    let side = get(&level.side_defs, front_id as usize, "sidedef")?;
    let front = get(&level.sectors, side.facing_sector as usize, "sector")?;
    let back = match ld.side(!right) {
        Some(id) => {
            let sd = get(&level.side_defs, id as usize, "sidedef")?;
            Some(get(&level.sectors, sd.facing_sector as usize, "sector")?)
        }
        None => None,
    };
    Ok(Some(Faces {
        right,
        line_len: (e - s).length(),
        side,
        front,
        back,
    }))
}

/// Texture `u` at the seg's start and end vertex.
///
/// `offset` is measured from the origin of the seg's own side. When that is
/// not the facing side, the seg runs backwards along the facing side's
/// texture, starting `line_len - offset` from its origin.
fn seg_u_range(offset: f32, seg_len: f32, line_len: f32, same_side: bool) -> (f32, f32) {
    if same_side {
        (offset, offset + seg_len)
    } else {
        let start = line_len - offset;
        (start, start - seg_len)
    }
}

fn flip(s: &mut WallStrip) {
    std::mem::swap(&mut s.x1, &mut s.x2);
    std::mem::swap(&mut s.top1, &mut s.top2);
    std::mem::swap(&mut s.bot1, &mut s.bot2);
    std::mem::swap(&mut s.u1, &mut s.u2);
}

#[inline]
fn get<'a, T>(items: &'a [T], index: usize, what: &'static str) -> Result<&'a T, RenderError> {
    items
        .get(index)
        .ok_or(RenderError::BadIndex { what, index })
}
