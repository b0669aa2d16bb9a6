//! Decoders for the map-scoped lumps that follow an `ExMy`/`MAPxx` marker.
//!
//! | Lump     | Record | Layout                                              |
//! |----------|--------|-----------------------------------------------------|
//! | THINGS   | 10     | x i16, y i16, angle u16, type u16, flags u16        |
//! | LINEDEFS | 14     | v1, v2, flags, special, tag, right, left (all u16)  |
//! | SIDEDEFS | 30     | xoff i16, yoff i16, upper/lower/middle [8], sector  |
//! | VERTEXES | 4      | x i16, y i16                                        |
//! | SEGS     | 12     | v1, v2, angle, linedef, direction, offset (all u16) |
//! | SSECTORS | 4      | count u16, first u16                                |
//! | NODES    | 28     | x, y, dx, dy, right bbox, left bbox, children       |
//! | SECTORS  | 26     | floor i16, ceil i16, floor/ceil [8], light, type, tag |

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    wad::{raw::WadError, reader::ByteReader},
    world::{
        BBox, Blockmap, Level, LineDef, LineDefFlags, Node, Sector, Seg, SegDirection, SideDef,
        Subsector, Thing, ThingKind, Vertex,
    },
};

/// Lumps that only make sense inside a map context.
pub const MAP_LUMPS: [&str; 10] = [
    "THINGS", "LINEDEFS", "SIDEDEFS", "VERTEXES", "SEGS", "SSECTORS", "NODES", "SECTORS",
    "REJECT", "BLOCKMAP",
];

/// `true` for `E<digit>M<digit>` and `MAP..` marker names.
pub fn is_map_marker(name: &str) -> bool {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(E[0-9]M[0-9]|MAP.*)$").unwrap());
    RE.is_match(name)
}

/// Decode one map lump body into `level`.
pub fn decode_map_lump(level: &mut Level, name: &str, body: &[u8]) -> Result<(), WadError> {
    match name {
        "THINGS" => level.things = records(name, body, 10, read_thing)?,
        "LINEDEFS" => level.line_defs = records(name, body, 14, read_line_def)?,
        "SIDEDEFS" => level.side_defs = records(name, body, 30, read_side_def)?,
        "VERTEXES" => level.vertexes = records(name, body, 4, read_vertex)?,
        "SEGS" => level.segs = records(name, body, 12, read_seg)?,
        "SSECTORS" => level.subsectors = records(name, body, 4, read_subsector)?,
        "NODES" => level.nodes = records(name, body, 28, read_node)?,
        "SECTORS" => level.sectors = records(name, body, 26, read_sector)?,
        "REJECT" => level.reject = body.to_vec(),
        "BLOCKMAP" => level.blockmap = Some(read_blockmap(body)?),
        _ => {
            return Err(WadError::UnknownLump {
                name: name.into(),
                size: body.len(),
                context: "not a map lump",
            });
        }
    }
    info!("{}: read {name} ({} bytes)", level.name, body.len());
    Ok(())
}

/// Split `body` into fixed-size records and decode each with `read`.
fn records<T>(
    name: &str,
    body: &[u8],
    record: usize,
    read: fn(&mut ByteReader<'_>) -> Result<T, WadError>,
) -> Result<Vec<T>, WadError> {
    if body.len() % record != 0 {
        return Err(WadError::DimensionMismatch {
            what: format!("{name} (multiple of {record})"),
            expected: body.len() / record * record,
            actual: body.len(),
        });
    }
    let mut r = ByteReader::new(body);
    let mut out = Vec::with_capacity(body.len() / record);
    while r.remaining() > 0 {
        out.push(read(&mut r)?);
    }
    Ok(out)
}

fn read_thing(r: &mut ByteReader<'_>) -> Result<Thing, WadError> {
    Ok(Thing {
        x: r.read_i16()?,
        y: r.read_i16()?,
        angle: r.read_u16()?,
        kind: ThingKind::from(r.read_u16()?),
        flags: r.read_u16()?,
    })
}

fn read_line_def(r: &mut ByteReader<'_>) -> Result<LineDef, WadError> {
    Ok(LineDef {
        start_vertex: r.read_u16()?,
        end_vertex: r.read_u16()?,
        flags: LineDefFlags::from_bits_retain(r.read_u16()?),
        special_type: r.read_u16()?,
        sector_tag: r.read_u16()?,
        right_side_def: r.read_u16()?,
        left_side_def: r.read_u16()?,
    })
}

fn read_side_def(r: &mut ByteReader<'_>) -> Result<SideDef, WadError> {
    Ok(SideDef {
        x_offset: r.read_i16()?,
        y_offset: r.read_i16()?,
        upper_texture: r.read_name(8)?,
        lower_texture: r.read_name(8)?,
        middle_texture: r.read_name(8)?,
        facing_sector: r.read_u16()?,
    })
}

fn read_vertex(r: &mut ByteReader<'_>) -> Result<Vertex, WadError> {
    Ok(Vertex {
        x: r.read_i16()?,
        y: r.read_i16()?,
    })
}

fn read_seg(r: &mut ByteReader<'_>) -> Result<Seg, WadError> {
    Ok(Seg {
        start_vertex: r.read_u16()?,
        end_vertex: r.read_u16()?,
        angle: r.read_u16()?,
        line_def: r.read_u16()?,
        direction: match r.read_u16()? {
            0 => SegDirection::Same,
            _ => SegDirection::Opposite,
        },
        offset: r.read_u16()?,
    })
}

fn read_subsector(r: &mut ByteReader<'_>) -> Result<Subsector, WadError> {
    Ok(Subsector {
        seg_count: r.read_u16()?,
        first_seg: r.read_u16()?,
    })
}

fn read_bbox(r: &mut ByteReader<'_>) -> Result<BBox, WadError> {
    Ok(BBox {
        top: r.read_i16()?,
        bottom: r.read_i16()?,
        left: r.read_i16()?,
        right: r.read_i16()?,
    })
}

fn read_node(r: &mut ByteReader<'_>) -> Result<Node, WadError> {
    Ok(Node {
        x: r.read_i16()?,
        y: r.read_i16()?,
        dx: r.read_i16()?,
        dy: r.read_i16()?,
        right_bbox: read_bbox(r)?,
        left_bbox: read_bbox(r)?,
        right_child: r.read_u16()?,
        left_child: r.read_u16()?,
    })
}

fn read_sector(r: &mut ByteReader<'_>) -> Result<Sector, WadError> {
    Ok(Sector {
        floor_height: r.read_i16()?,
        ceiling_height: r.read_i16()?,
        floor_texture: r.read_name(8)?,
        ceiling_texture: r.read_name(8)?,
        light_level: r.read_u16()?,
        kind: r.read_u16()?,
        tag: r.read_u16()?,
    })
}

/// BLOCKMAP: header (origin x/y, columns, rows), one u16 offset (in
/// 16-bit words) per cell, then `0x0000, line.., 0xFFFF` lists.
fn read_blockmap(body: &[u8]) -> Result<Blockmap, WadError> {
    let mut r = ByteReader::new(body);
    let origin_x = r.read_i16()?;
    let origin_y = r.read_i16()?;
    let columns = r.read_u16()?;
    let rows = r.read_u16()?;

    let count = columns as usize * rows as usize;
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(r.read_u16()? as usize * 2);
    }

    let mut cells = Vec::with_capacity(count);
    for offset in offsets {
        r.set_offset(offset)?;
        // leading zero word is part of the list format
        let mut lines = Vec::new();
        if r.read_u16()? != 0 {
            r.set_offset(offset)?;
        }
        loop {
            let line = r.read_u16()?;
            if line == 0xFFFF {
                break;
            }
            lines.push(line);
        }
        cells.push(lines);
    }

    Ok(Blockmap {
        origin_x,
        origin_y,
        columns,
        rows,
        cells,
    })
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
