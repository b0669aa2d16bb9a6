//! Byte-level builders and a tiny two-room map shared by the unit tests.

use crate::world::{
    BBox, Level, LineDef, LineDefFlags, NO_SIDE_DEF, Node, Sector, Seg, SegDirection, SideDef,
    Subsector, Thing, ThingKind, Vertex,
};

/*──────────────────────────── little-endian bytes ───────────────────────*/

#[derive(Default)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// NUL-padded 8-byte lump/texture name.
    pub fn name(mut self, name: &str) -> Self {
        let mut raw = [0u8; 8];
        for (dst, src) in raw.iter_mut().zip(name.bytes()) {
            *dst = src;
        }
        self.0.extend_from_slice(&raw);
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.0.extend_from_slice(bytes);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.0
    }
}

/*──────────────────────────── WAD image builder ─────────────────────────*/

/// Lays out header, lump bodies, then the directory.
pub struct WadBuilder {
    magic: &'static [u8; 4],
    entries: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    pub fn iwad() -> Self {
        Self {
            magic: b"IWAD",
            entries: Vec::new(),
        }
    }

    pub fn pwad() -> Self {
        Self {
            magic: b"PWAD",
            entries: Vec::new(),
        }
    }

    pub fn marker(self, name: &str) -> Self {
        self.lump(name, Vec::new())
    }

    pub fn lump(mut self, name: &str, body: Vec<u8>) -> Self {
        self.entries.push((name.into(), body));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let bodies: usize = self.entries.iter().map(|(_, b)| b.len()).sum();
        let dir_offset = 12 + bodies;

        let mut out = Bytes::new()
            .raw(self.magic)
            .i32(self.entries.len() as i32)
            .i32(dir_offset as i32);
        let mut positions = Vec::with_capacity(self.entries.len());
        for (_, body) in &self.entries {
            positions.push(out.0.len());
            out = out.raw(body);
        }
        for ((name, body), pos) in self.entries.iter().zip(positions) {
            out = out.i32(pos as i32).i32(body.len() as i32).name(name);
        }
        out.finish()
    }
}

/*──────────────────────────── lump encoders ─────────────────────────────*/

/// Column-post picture; `columns[x]` lists `(row, pixels)` posts.
pub fn picture_lump(w: u16, h: u16, offset: (i16, i16), columns: &[Vec<(u8, Vec<u8>)>]) -> Vec<u8> {
    assert_eq!(columns.len(), w as usize);
    let header_len = 8 + 4 * w as usize;

    let mut posts = Vec::new();
    let mut offsets = Vec::with_capacity(columns.len());
    for column in columns {
        offsets.push((header_len + posts.len()) as u32);
        for (row, pixels) in column {
            posts.push(*row);
            posts.push(pixels.len() as u8);
            posts.push(0);
            posts.extend_from_slice(pixels);
            posts.push(0);
        }
        posts.push(0xFF);
    }

    let mut b = Bytes::new().u16(w).u16(h).i16(offset.0).i16(offset.1);
    for o in offsets {
        b = b.u32(o);
    }
    b.raw(&posts).finish()
}

pub fn pnames_lump(names: &[&str]) -> Vec<u8> {
    names
        .iter()
        .fold(Bytes::new().u32(names.len() as u32), |b, n| b.name(n))
        .finish()
}

/// TEXTURE1 body; each patch is `(x_offset, y_offset, pnames index)`.
pub fn texture_lump(defs: &[(&str, u16, u16, Vec<(i16, i16, u16)>)]) -> Vec<u8> {
    let records: Vec<Vec<u8>> = defs
        .iter()
        .map(|(name, w, h, patches)| {
            let mut b = Bytes::new()
                .name(name)
                .i32(0)
                .u16(*w)
                .u16(*h)
                .i32(0)
                .u16(patches.len() as u16);
            for &(x, y, idx) in patches {
                b = b.i16(x).i16(y).u16(idx).i16(1).i16(0);
            }
            b.finish()
        })
        .collect();

    let mut offset = 4 + 4 * records.len();
    let mut b = Bytes::new().u32(records.len() as u32);
    for r in &records {
        b = b.u32(offset as u32);
        offset += r.len();
    }
    for r in &records {
        b = b.raw(r);
    }
    b.finish()
}

/*──────────────────────────── deterministic rng ─────────────────────────*/

/// xorshift64; good enough for randomized geometry checks.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform in `lo..hi`.
    pub fn range(&mut self, lo: i32, hi: i32) -> i32 {
        let span = (hi - lo).max(1) as u64;
        lo + (self.next_u64() % span) as i32
    }
}

/*──────────────────────────── two-room fixture ──────────────────────────*/
//
//   (0,256) v1 ──────── v2 (256,256) ──────── v4 (512,256)
//      │      room A     ┆ ld2      room B       │
//      │  floor 0/128    ┆ two-sided  32/96      │
//   (0,0)   v0 ──────── v3 (256,0) ────────── v5 (512,0)
//
// One node splits the map along x = 256; A is subsector 0, B is 1.

fn side(upper: &str, lower: &str, middle: &str, sector: u16) -> SideDef {
    SideDef {
        x_offset: 0,
        y_offset: 0,
        upper_texture: upper.into(),
        lower_texture: lower.into(),
        middle_texture: middle.into(),
        facing_sector: sector,
    }
}

fn line(start: u16, end: u16, right: u16, left: u16) -> LineDef {
    LineDef {
        start_vertex: start,
        end_vertex: end,
        flags: if left == NO_SIDE_DEF {
            LineDefFlags::IMPASSABLE
        } else {
            LineDefFlags::TWO_SIDED
        },
        special_type: 0,
        sector_tag: 0,
        right_side_def: right,
        left_side_def: left,
    }
}

fn seg(start: u16, end: u16, line_def: u16, direction: SegDirection) -> Seg {
    Seg {
        start_vertex: start,
        end_vertex: end,
        angle: 0,
        line_def,
        direction,
        offset: 0,
    }
}

fn sector(floor: i16, ceiling: i16) -> Sector {
    Sector {
        floor_height: floor,
        ceiling_height: ceiling,
        floor_texture: "FLOOR".into(),
        ceiling_texture: "FLOOR".into(),
        light_level: 160,
        kind: 0,
        tag: 0,
    }
}

pub fn two_rooms() -> Level {
    use SegDirection::*;
    let mut lvl = Level::new("E1M1");
    lvl.vertexes = [(0, 0), (0, 256), (256, 256), (256, 0), (512, 256), (512, 0)]
        .into_iter()
        .map(|(x, y)| Vertex { x, y })
        .collect();
    lvl.line_defs = vec![
        line(0, 1, 0, NO_SIDE_DEF),
        line(1, 2, 1, NO_SIDE_DEF),
        line(3, 2, 2, 3),
        line(3, 0, 4, NO_SIDE_DEF),
        line(2, 4, 5, NO_SIDE_DEF),
        line(4, 5, 6, NO_SIDE_DEF),
        line(5, 3, 7, NO_SIDE_DEF),
    ];
    lvl.side_defs = vec![
        side("-", "-", "WALL", 0),
        side("-", "-", "WALL", 0),
        side("STEP", "-", "-", 1),
        side("STEP", "STEP", "-", 0),
        side("-", "-", "WALL", 0),
        side("-", "-", "WALL", 1),
        side("-", "-", "WALL", 1),
        side("-", "-", "WALL", 1),
    ];
    lvl.sectors = vec![sector(0, 128), sector(32, 96)];
    lvl.segs = vec![
        seg(0, 1, 0, Same),
        seg(1, 2, 1, Same),
        seg(2, 3, 2, Opposite),
        seg(3, 0, 3, Same),
        seg(3, 2, 2, Same),
        seg(2, 4, 4, Same),
        seg(4, 5, 5, Same),
        seg(5, 3, 6, Same),
    ];
    lvl.subsectors = vec![
        Subsector {
            seg_count: 4,
            first_seg: 0,
        },
        Subsector {
            seg_count: 4,
            first_seg: 4,
        },
    ];
    lvl.nodes = vec![Node {
        x: 256,
        y: 0,
        dx: 0,
        dy: 256,
        right_bbox: BBox {
            top: 256,
            bottom: 0,
            left: 256,
            right: 512,
        },
        left_bbox: BBox {
            top: 256,
            bottom: 0,
            left: 0,
            right: 256,
        },
        right_child: 0x8001,
        left_child: 0x8000,
    }];
    lvl.things = vec![Thing {
        x: 128,
        y: 128,
        angle: 0,
        kind: ThingKind::Player1Start,
        flags: 7,
    }];
    lvl
}

/// Palette index `i` maps to RGB `(i, 255 - i, i / 2)`.
pub fn test_palette_lump() -> Vec<u8> {
    (0..=255u8).flat_map(|i| [i, 255 - i, i / 2]).collect()
}

/// Full WAD image: palette, two patches composed into WALL and STEP,
/// a FLOOR flat and the [`two_rooms`] map.
pub fn two_rooms_wad() -> Vec<u8> {
    let lvl = two_rooms();

    let solid: Vec<_> = (0..8u8).map(|x| vec![(0, vec![100 + x; 8])]).collect();
    // first column left transparent
    let holed: Vec<_> = (0..8u8)
        .map(|x| if x == 0 { vec![] } else { vec![(2, vec![40 + x; 6])] })
        .collect();

    let things = lvl
        .things
        .iter()
        .fold(Bytes::new(), |b, t| {
            b.i16(t.x).i16(t.y).u16(t.angle).u16(1).u16(t.flags)
        })
        .finish();
    let line_defs = lvl
        .line_defs
        .iter()
        .fold(Bytes::new(), |b, l| {
            b.u16(l.start_vertex)
                .u16(l.end_vertex)
                .u16(l.flags.bits())
                .u16(l.special_type)
                .u16(l.sector_tag)
                .u16(l.right_side_def)
                .u16(l.left_side_def)
        })
        .finish();
    let side_defs = lvl
        .side_defs
        .iter()
        .fold(Bytes::new(), |b, s| {
            b.i16(s.x_offset)
                .i16(s.y_offset)
                .name(&s.upper_texture)
                .name(&s.lower_texture)
                .name(&s.middle_texture)
                .u16(s.facing_sector)
        })
        .finish();
    let vertexes = lvl
        .vertexes
        .iter()
        .fold(Bytes::new(), |b, v| b.i16(v.x).i16(v.y))
        .finish();
    let segs = lvl
        .segs
        .iter()
        .fold(Bytes::new(), |b, s| {
            b.u16(s.start_vertex)
                .u16(s.end_vertex)
                .u16(s.angle)
                .u16(s.line_def)
                .u16((s.direction == SegDirection::Opposite) as u16)
                .u16(s.offset)
        })
        .finish();
    let subsectors = lvl
        .subsectors
        .iter()
        .fold(Bytes::new(), |b, s| b.u16(s.seg_count).u16(s.first_seg))
        .finish();
    let bbox = |b: Bytes, r: &BBox| b.i16(r.top).i16(r.bottom).i16(r.left).i16(r.right);
    let nodes = lvl
        .nodes
        .iter()
        .fold(Bytes::new(), |b, n| {
            let b = b.i16(n.x).i16(n.y).i16(n.dx).i16(n.dy);
            let b = bbox(bbox(b, &n.right_bbox), &n.left_bbox);
            b.u16(n.right_child).u16(n.left_child)
        })
        .finish();
    let sectors = lvl
        .sectors
        .iter()
        .fold(Bytes::new(), |b, s| {
            b.i16(s.floor_height)
                .i16(s.ceiling_height)
                .name(&s.floor_texture)
                .name(&s.ceiling_texture)
                .u16(s.light_level)
                .u16(s.kind)
                .u16(s.tag)
        })
        .finish();

    WadBuilder::iwad()
        .lump("PLAYPAL", test_palette_lump())
        .lump("PNAMES", pnames_lump(&["WALLPAT", "STEPPAT"]))
        .lump(
            "TEXTURE1",
            texture_lump(&[
                ("WALL", 8, 8, vec![(0, 0, 0)]),
                ("STEP", 8, 8, vec![(0, 0, 1)]),
            ]),
        )
        .marker("P_START")
        .lump("WALLPAT", picture_lump(8, 8, (0, 0), &solid))
        .lump("STEPPAT", picture_lump(8, 8, (0, 0), &holed))
        .marker("P_END")
        .marker("F_START")
        .lump("FLOOR", (0..4096u32).map(|i| (i % 64) as u8).collect())
        .marker("F_END")
        .marker("E1M1")
        .lump("THINGS", things)
        .lump("LINEDEFS", line_defs)
        .lump("SIDEDEFS", side_defs)
        .lump("VERTEXES", vertexes)
        .lump("SEGS", segs)
        .lump("SSECTORS", subsectors)
        .lump("NODES", nodes)
        .lump("SECTORS", sectors)
        .build()
}
