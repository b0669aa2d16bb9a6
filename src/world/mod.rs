mod bsp;
mod camera;
mod directory;
mod geometry;
mod texture;

pub use geometry::{
    BBox, Blockmap, Level, LineDef, LineDefFlags, LineDefId, NO_SIDE_DEF, NO_TEXTURE, Node,
    NodeId, Sector, SectorId, Seg, SegDirection, SegId, SideDef, SideDefId, Subsector,
    SubsectorId, Thing, ThingKind, Vertex, VertexId,
};

pub use bsp::{BspError, CHILD_MASK, SUBSECTOR_BIT, bbox_in_frustum, is_leaf, subsector_index};

pub use camera::{Camera, EYE_HEIGHT, FOV_DEGREES, normalize_degrees};

pub use directory::WadDirectory;

pub use texture::{
    Colormap, MISSING_TEXTURE, Palette, Texture, TextureBank, TextureError, TextureId,
};
