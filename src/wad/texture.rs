//! PNAMES and TEXTURE1/TEXTURE2: the recipe side of composite wall
//! textures. Pixels are put together later by [`crate::wad::loader`].

use crate::wad::{raw::WadError, reader::ByteReader};

/// One patch placement inside a composite texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TexturePatch {
    pub x_offset: i16,
    pub y_offset: i16,
    /// Index into the PNAMES table.
    pub patch_number: u16,
}

/// Composite texture record from TEXTURE1/TEXTURE2.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureDef {
    pub name: String,
    pub masked: bool,
    pub width: u16,
    pub height: u16,
    pub patches: Vec<TexturePatch>,
}

/// PNAMES: u32 count, then `count` NUL-padded 8-byte names.
pub fn decode_pnames(body: &[u8]) -> Result<Vec<String>, WadError> {
    let mut r = ByteReader::new(body);
    let count = r.read_u32()? as usize;
    let mut names = Vec::with_capacity(count.min(body.len() / 8));
    for _ in 0..count {
        names.push(r.read_name(8)?);
    }
    Ok(names)
}

/// TEXTURE1/TEXTURE2: u32 count, `count` u32 offsets, then one record per
/// offset (name, masked, width, height, obsolete column directory, patch
/// count, 10-byte patch entries).
pub fn decode_texture_table(body: &[u8]) -> Result<Vec<TextureDef>, WadError> {
    let mut r = ByteReader::new(body);
    let count = r.read_u32()? as usize;
    let mut offsets = Vec::with_capacity(count.min(body.len() / 4));
    for _ in 0..count {
        offsets.push(r.read_u32()? as usize);
    }

    let mut out = Vec::with_capacity(offsets.len());
    for offset in offsets {
        r.set_offset(offset)?;
        let name = r.read_name(8)?;
        let masked = r.read_i32()? != 0;
        let width = r.read_u16()?;
        let height = r.read_u16()?;
        r.read_i32()?; // column directory, unused
        let patch_count = r.read_u16()? as usize;

        let mut patches = Vec::with_capacity(patch_count);
        for _ in 0..patch_count {
            let x_offset = r.read_i16()?;
            let y_offset = r.read_i16()?;
            let patch_number = r.read_u16()?;
            r.read_i16()?; // step dir
            r.read_i16()?; // colormap
            patches.push(TexturePatch {
                x_offset,
                y_offset,
                patch_number,
            });
        }
        out.push(TextureDef {
            name,
            masked,
            width,
            height,
            patches,
        });
    }
    Ok(out)
}
