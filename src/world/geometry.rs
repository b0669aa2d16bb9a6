use std::ops::Range;

use bitflags::bitflags;
use glam::Vec2;

pub type VertexId = u16;
pub type LineDefId = u16;
pub type SideDefId = u16;
pub type SectorId = u16;
pub type SegId = u16;
pub type SubsectorId = u16;
pub type NodeId = u16;

/// Side index meaning "no wall on this side".
pub const NO_SIDE_DEF: SideDefId = 0xFFFF;

/// Texture name meaning "nothing drawn here".
pub const NO_TEXTURE: &str = "-";

/// One map, exactly as stored in the WAD (immutable after load).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Level {
    pub name: String,
    pub things: Vec<Thing>,
    pub line_defs: Vec<LineDef>,
    pub side_defs: Vec<SideDef>,
    pub vertexes: Vec<Vertex>,
    pub segs: Vec<Seg>,
    pub subsectors: Vec<Subsector>,
    pub nodes: Vec<Node>,
    pub sectors: Vec<Sector>,
    pub reject: Vec<u8>,
    pub blockmap: Option<Blockmap>,
}

impl Level {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Axis-aligned extent of all vertexes, `None` for an empty map.
    pub fn bounds(&self) -> Option<BBox> {
        let first = self.vertexes.first()?;
        let mut b = BBox {
            top: first.y,
            bottom: first.y,
            left: first.x,
            right: first.x,
        };
        for v in &self.vertexes[1..] {
            b.top = b.top.max(v.y);
            b.bottom = b.bottom.min(v.y);
            b.left = b.left.min(v.x);
            b.right = b.right.max(v.x);
        }
        Some(b)
    }
}

/*------------------------- game objects -----------------------------*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thing {
    pub x: i16,
    pub y: i16,
    /// Degrees, 0 = east, counter-clockwise.
    pub angle: u16,
    pub kind: ThingKind,
    pub flags: u16,
}

impl Thing {
    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Spawn kind of a [`Thing`], by editor number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThingKind {
    Player1Start,
    Player2Start,
    Player3Start,
    Player4Start,
    DeathmatchStart,
    TeleportDestination,
    Zombieman,
    ShotgunGuy,
    Imp,
    Demon,
    Spectre,
    LostSoul,
    Cacodemon,
    BaronOfHell,
    Cyberdemon,
    SpiderMastermind,
    Shotgun,
    Chaingun,
    RocketLauncher,
    Stimpack,
    Medikit,
    HealthBonus,
    ArmorBonus,
    GreenArmor,
    BlueArmor,
    BlueKeycard,
    YellowKeycard,
    RedKeycard,
    Barrel,
    Other(u16),
}

impl From<u16> for ThingKind {
    fn from(num: u16) -> Self {
        use ThingKind::*;
        match num {
            1 => Player1Start,
            2 => Player2Start,
            3 => Player3Start,
            4 => Player4Start,
            11 => DeathmatchStart,
            14 => TeleportDestination,
            3004 => Zombieman,
            9 => ShotgunGuy,
            3001 => Imp,
            3002 => Demon,
            58 => Spectre,
            3006 => LostSoul,
            3005 => Cacodemon,
            3003 => BaronOfHell,
            16 => Cyberdemon,
            7 => SpiderMastermind,
            2001 => Shotgun,
            2002 => Chaingun,
            2003 => RocketLauncher,
            2011 => Stimpack,
            2012 => Medikit,
            2014 => HealthBonus,
            2015 => ArmorBonus,
            2018 => GreenArmor,
            2019 => BlueArmor,
            5 => BlueKeycard,
            6 => YellowKeycard,
            13 => RedKeycard,
            2035 => Barrel,
            n => Other(n),
        }
    }
}

/*--------------------------- linedefs -------------------------------*/

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LineDefFlags: u16 {
        const IMPASSABLE      = 0x0001;
        const BLOCK_MONSTERS  = 0x0002;
        const TWO_SIDED       = 0x0004;
        const UPPER_UNPEGGED  = 0x0008;
        const LOWER_UNPEGGED  = 0x0010;
        const SECRET          = 0x0020;
        const BLOCK_SOUND     = 0x0040;
        const NOT_ON_MAP      = 0x0080;
        const ALREADY_ON_MAP  = 0x0100;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineDef {
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
    pub flags: LineDefFlags,
    pub special_type: u16,
    pub sector_tag: u16,
    pub right_side_def: SideDefId,
    pub left_side_def: SideDefId,
}

impl LineDef {
    /// Side index for the right (`front == true`) or left side, `None` when
    /// that side carries [`NO_SIDE_DEF`].
    #[inline]
    pub fn side(&self, front: bool) -> Option<SideDefId> {
        let raw = if front {
            self.right_side_def
        } else {
            self.left_side_def
        };
        (raw != NO_SIDE_DEF).then_some(raw)
    }
}

/*--------------------------- sidedefs -------------------------------*/

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideDef {
    pub x_offset: i16,
    pub y_offset: i16,
    pub upper_texture: String,
    pub lower_texture: String,
    pub middle_texture: String,
    pub facing_sector: SectorId,
}

impl SideDef {
    pub fn upper(&self) -> Option<&str> {
        texture_ref(&self.upper_texture)
    }

    pub fn lower(&self) -> Option<&str> {
        texture_ref(&self.lower_texture)
    }

    pub fn middle(&self) -> Option<&str> {
        texture_ref(&self.middle_texture)
    }
}

#[inline]
fn texture_ref(name: &str) -> Option<&str> {
    (!name.is_empty() && name != NO_TEXTURE).then_some(name)
}

/*--------------------------- sectors --------------------------------*/

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sector {
    pub floor_height: i16,
    pub ceiling_height: i16,
    pub floor_texture: String,
    pub ceiling_texture: String,
    pub light_level: u16,
    pub kind: u16,
    pub tag: u16,
}

/*----------------------- simple primitives --------------------------*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vertex {
    pub x: i16,
    pub y: i16,
}

impl Vertex {
    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Orientation of a seg relative to its linedef's vertex order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegDirection {
    Same,
    Opposite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Seg {
    pub start_vertex: VertexId,
    pub end_vertex: VertexId,
    pub angle: u16,
    pub line_def: LineDefId,
    pub direction: SegDirection,
    /// Distance along the linedef to the start of this seg.
    pub offset: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subsector {
    pub seg_count: u16,
    pub first_seg: SegId,
}

impl Subsector {
    /// Index range into [`Level::segs`].
    #[inline]
    pub fn segs(&self) -> Range<usize> {
        let first = self.first_seg as usize;
        first..first + self.seg_count as usize
    }
}

/// Axis-aligned box in map units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BBox {
    pub top: i16,
    pub bottom: i16,
    pub left: i16,
    pub right: i16,
}

impl BBox {
    /// Horizontal extent; wider than `i16` so a full-range box cannot overflow.
    pub fn width(&self) -> i32 {
        self.right as i32 - self.left as i32
    }

    pub fn height(&self) -> i32 {
        self.top as i32 - self.bottom as i32
    }

    /// top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Vec2; 4] {
        let (l, r) = (self.left as f32, self.right as f32);
        let (t, b) = (self.top as f32, self.bottom as f32);
        [
            Vec2::new(l, t),
            Vec2::new(r, t),
            Vec2::new(l, b),
            Vec2::new(r, b),
        ]
    }

    /// top, right, bottom, left
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let [tl, tr, bl, br] = self.corners();
        [(tl, tr), (tr, br), (bl, br), (tl, bl)]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    pub x: i16,
    pub y: i16,
    pub dx: i16,
    pub dy: i16,
    pub right_bbox: BBox,
    pub left_bbox: BBox,
    pub right_child: u16,
    pub left_child: u16,
}

/// Decoded BLOCKMAP: a grid of 128x128 cells, each listing the linedefs
/// that touch it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Blockmap {
    pub origin_x: i16,
    pub origin_y: i16,
    pub columns: u16,
    pub rows: u16,
    /// `columns * rows` cells, row-major from the origin.
    pub cells: Vec<Vec<LineDefId>>,
}

impl Blockmap {
    pub fn cell(&self, column: u16, row: u16) -> Option<&[LineDefId]> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells
            .get(row as usize * self.columns as usize + column as usize)
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_side_is_none() {
        let ld = LineDef {
            start_vertex: 0,
            end_vertex: 1,
            flags: LineDefFlags::IMPASSABLE,
            special_type: 0,
            sector_tag: 0,
            right_side_def: 3,
            left_side_def: NO_SIDE_DEF,
        };
        assert_eq!(ld.side(true), Some(3));
        assert_eq!(ld.side(false), None);
    }

    #[test]
    fn dash_means_no_texture() {
        let sd = SideDef {
            x_offset: 0,
            y_offset: 0,
            upper_texture: "-".into(),
            lower_texture: String::new(),
            middle_texture: "STARTAN3".into(),
            facing_sector: 0,
        };
        assert_eq!(sd.upper(), None);
        assert_eq!(sd.lower(), None);
        assert_eq!(sd.middle(), Some("STARTAN3"));
    }

    #[test]
    fn thing_kinds_by_editor_number() {
        assert_eq!(ThingKind::from(1), ThingKind::Player1Start);
        assert_eq!(ThingKind::from(3001), ThingKind::Imp);
        assert_eq!(ThingKind::from(9999), ThingKind::Other(9999));
    }

    #[test]
    fn bounds_cover_all_vertexes() {
        let mut lvl = Level::new("E1M1");
        assert!(lvl.bounds().is_none());
        lvl.vertexes = vec![
            Vertex { x: -10, y: 5 },
            Vertex { x: 30, y: -20 },
            Vertex { x: 0, y: 40 },
        ];
        assert_eq!(
            lvl.bounds(),
            Some(BBox {
                top: 40,
                bottom: -20,
                left: -10,
                right: 30
            })
        );
    }

    #[test]
    fn extents_span_the_whole_coordinate_range() {
        let b = BBox {
            top: i16::MAX,
            bottom: i16::MIN,
            left: -20000,
            right: 20000,
        };
        assert_eq!(b.width(), 40000);
        assert_eq!(b.height(), 65535);
    }
}
