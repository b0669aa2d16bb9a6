//! Image-like lumps: masked pictures (patches, sprites, menu graphics),
//! 64x64 flats, PLAYPAL, COLORMAP and ENDOOM.

use crate::{
    wad::{raw::WadError, reader::ByteReader},
    world::{Colormap, Palette},
};

pub const FLAT_SIZE: usize = 64;
pub const ENDOOM_SIZE: usize = 80 * 25 * 2;
const PALETTE_BYTES: usize = 256 * 3;
const COLORMAP_BYTES: usize = 256;
/// Last row a post can touch: start row 0xFE plus a 0xFF-long run.
pub const MAX_PICTURE_HEIGHT: usize = 0xFE + 0xFF;

/// Masked picture; `None` pixels are transparent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graphic {
    pub width: u16,
    pub height: u16,
    pub x_offset: i16,
    pub y_offset: i16,
    /// Row-major, `width * height`.
    pub pixels: Vec<Option<u8>>,
}

impl Graphic {
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width as usize || y >= self.height as usize {
            return None;
        }
        self.pixels[y * self.width as usize + x]
    }
}

/// Raw 64x64 floor/ceiling texture, no transparency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flat {
    /// Row-major, `FLAT_SIZE * FLAT_SIZE`.
    pub pixels: Vec<u8>,
}

impl Flat {
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[(y % FLAT_SIZE) * FLAT_SIZE + x % FLAT_SIZE]
    }
}

/// ENDOOM: 80x25 text-mode cells (character, attribute).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndText {
    pub data: Vec<u8>,
}

impl EndText {
    /// The character bytes only, attributes dropped.
    pub fn as_text(&self) -> String {
        self.data.chunks_exact(2).map(|cell| cell[0] as char).collect()
    }
}

/// Decode a column-post picture.
///
/// Header: width, height, x offset, y offset, then one u32 column offset
/// per column (relative to the lump start). Each column is a run of posts
/// `(row, len, pad, len bytes, pad)` ended by row `0xFF`.
pub fn decode_picture(body: &[u8]) -> Result<Graphic, WadError> {
    let mut r = ByteReader::new(body);
    let width = r.read_u16()?;
    let height = r.read_u16()?;
    let x_offset = r.read_i16()?;
    let y_offset = r.read_i16()?;

    let (w, h) = (width as usize, height as usize);
    let mut column_offsets = Vec::with_capacity(w);
    for _ in 0..w {
        column_offsets.push(r.read_u32()? as usize);
    }
    let header_end = r.offset();

    // everything is checked before the pixel buffer is sized
    if h > MAX_PICTURE_HEIGHT {
        return Err(WadError::PictureTooTall {
            height: h,
            max: MAX_PICTURE_HEIGHT,
        });
    }
    for (x, &offset) in column_offsets.iter().enumerate() {
        if offset < header_end || offset >= body.len() {
            return Err(WadError::InvalidPictureColumn {
                column: x,
                offset,
                start: header_end,
                end: body.len(),
            });
        }
    }

    let mut pixels = vec![None; w * h];
    let mut consumed = 0usize;
    for (x, &offset) in column_offsets.iter().enumerate() {
        r.set_offset(offset)?;
        loop {
            let row_start = r.read_u8()?;
            if row_start == 0xFF {
                consumed += 1;
                break;
            }
            let len = r.read_u8()? as usize;
            r.read_u8()?;
            let run = r.read_bytes(len)?;
            r.read_u8()?;
            consumed += len + 4;
            for (i, &idx) in run.iter().enumerate() {
                let y = row_start as usize + i;
                if y < h {
                    pixels[y * w + x] = Some(idx);
                }
            }
        }
        if consumed > body.len() {
            return Err(WadError::PictureOverrun {
                consumed,
                size: body.len(),
            });
        }
    }

    Ok(Graphic {
        width,
        height,
        x_offset,
        y_offset,
        pixels,
    })
}

pub fn decode_flat(body: &[u8]) -> Result<Flat, WadError> {
    if body.len() != FLAT_SIZE * FLAT_SIZE {
        return Err(WadError::DimensionMismatch {
            what: "flat".into(),
            expected: FLAT_SIZE * FLAT_SIZE,
            actual: body.len(),
        });
    }
    Ok(Flat {
        pixels: body.to_vec(),
    })
}

/// PLAYPAL: one or more 256-colour RGB palettes.
pub fn decode_palettes(body: &[u8]) -> Result<Vec<Palette>, WadError> {
    if body.is_empty() || body.len() % PALETTE_BYTES != 0 {
        return Err(WadError::DimensionMismatch {
            what: "PLAYPAL (multiple of 768)".into(),
            expected: (body.len() / PALETTE_BYTES).max(1) * PALETTE_BYTES,
            actual: body.len(),
        });
    }
    Ok(body
        .chunks_exact(PALETTE_BYTES)
        .map(|chunk| {
            let mut pal = Palette::default();
            for (i, rgb) in chunk.chunks_exact(3).enumerate() {
                pal[i] = Palette::pack(rgb[0], rgb[1], rgb[2]);
            }
            pal
        })
        .collect())
}

/// COLORMAP: N light-level remap tables of 256 entries.
pub fn decode_colormaps(body: &[u8]) -> Result<Vec<Colormap>, WadError> {
    if body.len() % COLORMAP_BYTES != 0 {
        return Err(WadError::DimensionMismatch {
            what: "COLORMAP (multiple of 256)".into(),
            expected: body.len() / COLORMAP_BYTES * COLORMAP_BYTES,
            actual: body.len(),
        });
    }
    Ok(body
        .chunks_exact(COLORMAP_BYTES)
        .map(|chunk| {
            let mut table = [0u8; COLORMAP_BYTES];
            table.copy_from_slice(chunk);
            table
        })
        .collect())
}

pub fn decode_end_text(body: &[u8]) -> Result<EndText, WadError> {
    if body.len() != ENDOOM_SIZE {
        return Err(WadError::DimensionMismatch {
            what: "ENDOOM".into(),
            expected: ENDOOM_SIZE,
            actual: body.len(),
        });
    }
    Ok(EndText {
        data: body.to_vec(),
    })
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::picture_lump;

    #[test]
    fn picture_posts_fill_rows() {
        // 2x4: column 0 has rows 1..=2, column 1 has row 0 and row 3
        let body = picture_lump(
            2,
            4,
            (1, -2),
            &[vec![(1, vec![10, 11])], vec![(0, vec![20]), (3, vec![23])]],
        );
        let g = decode_picture(&body).unwrap();
        assert_eq!((g.width, g.height, g.x_offset, g.y_offset), (2, 4, 1, -2));
        assert_eq!(g.pixel(0, 0), None);
        assert_eq!(g.pixel(0, 1), Some(10));
        assert_eq!(g.pixel(0, 2), Some(11));
        assert_eq!(g.pixel(0, 3), None);
        assert_eq!(g.pixel(1, 0), Some(20));
        assert_eq!(g.pixel(1, 1), None);
        assert_eq!(g.pixel(1, 3), Some(23));
    }

    #[test]
    fn column_offset_inside_header_is_invalid() {
        let mut body = picture_lump(1, 1, (0, 0), &[vec![(0, vec![1])]]);
        // point column 0 back into the header
        body[8..12].copy_from_slice(&2u32.to_le_bytes());
        let err = decode_picture(&body).unwrap_err();
        assert!(matches!(
            err,
            WadError::InvalidPictureColumn {
                column: 0,
                offset: 2,
                ..
            }
        ));
    }

    #[test]
    fn column_offset_past_end_is_invalid() {
        let mut body = picture_lump(1, 1, (0, 0), &[vec![(0, vec![1])]]);
        let len = body.len() as u32;
        body[8..12].copy_from_slice(&len.to_le_bytes());
        assert!(matches!(
            decode_picture(&body).unwrap_err(),
            WadError::InvalidPictureColumn { .. }
        ));
    }

    #[test]
    fn huge_header_over_garbage_fails_before_allocating() {
        // 0xFFFF x 0xFFFF header whose offset table fits the lump
        let mut body = vec![0u8; 8 + 4 * 0xFFFF + 16];
        body[0..4].copy_from_slice(&[0xFF; 4]);
        assert!(matches!(
            decode_picture(&body).unwrap_err(),
            WadError::PictureTooTall {
                height: 0xFFFF,
                ..
            }
        ));

        // same width, a plausible height: the zero offsets are caught first
        body[2..4].copy_from_slice(&64u16.to_le_bytes());
        assert!(matches!(
            decode_picture(&body).unwrap_err(),
            WadError::InvalidPictureColumn {
                column: 0,
                offset: 0,
                ..
            }
        ));
    }

    #[test]
    fn tallest_reachable_picture_decodes() {
        let g = decode_picture(&picture_lump(
            1,
            MAX_PICTURE_HEIGHT as u16,
            (0, 0),
            &[vec![(0xFE, vec![9; 0xFF])]],
        ))
        .unwrap();
        assert_eq!(g.pixel(0, MAX_PICTURE_HEIGHT - 1), Some(9));
        assert_eq!(g.pixel(0, 0xFD), None);
    }

    #[test]
    fn shared_columns_count_against_lump_size() {
        // 3 columns all pointing at the same post data
        let mut body = picture_lump(3, 8, (0, 0), &[vec![(0, vec![1; 8])], vec![], vec![]]);
        let first = u32::from_le_bytes(body[8..12].try_into().unwrap());
        body[12..16].copy_from_slice(&first.to_le_bytes());
        body[16..20].copy_from_slice(&first.to_le_bytes());
        assert!(matches!(
            decode_picture(&body).unwrap_err(),
            WadError::PictureOverrun { .. }
        ));
    }

    #[test]
    fn flat_must_be_4096_bytes() {
        let flat = decode_flat(&[7u8; 4096]).unwrap();
        assert_eq!(flat.pixel(63, 63), 7);
        assert_eq!(flat.pixel(64, 0), 7);
        let err = decode_flat(&[0u8; 4000]).unwrap_err();
        assert!(matches!(
            err,
            WadError::DimensionMismatch {
                expected: 4096,
                actual: 4000,
                ..
            }
        ));
    }

    #[test]
    fn playpal_yields_whole_palettes() {
        let mut body = vec![0u8; 768 * 3];
        body[768] = 0x12;
        body[769] = 0x34;
        body[770] = 0x56;
        let pals = decode_palettes(&body).unwrap();
        assert_eq!(pals.len(), 3);
        assert_eq!(pals[1][0], 0xFF_12_34_56);

        assert!(matches!(
            decode_palettes(&body[..767]).unwrap_err(),
            WadError::DimensionMismatch { actual: 767, .. }
        ));
    }

    #[test]
    fn colormaps_split_into_tables() {
        let body: Vec<u8> = (0..512).map(|i| (i % 256) as u8).collect();
        let maps = decode_colormaps(&body).unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[1][255], 255);
    }

    #[test]
    fn endoom_size_checked() {
        let mut body = vec![0u8; ENDOOM_SIZE];
        body[0] = b'H';
        body[2] = b'i';
        let text = decode_end_text(&body).unwrap().as_text();
        assert!(text.starts_with("Hi"));
        assert_eq!(text.len(), 2000);

        assert!(matches!(
            decode_end_text(&body[..3999]).unwrap_err(),
            WadError::DimensionMismatch {
                expected: 4000,
                actual: 3999,
                ..
            }
        ));
    }
}
