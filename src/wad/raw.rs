//! # WAD container
//!
//! * 12-byte header: magic (`IWAD`/`PWAD`), lump count, directory offset.
//! * Directory of 16-byte entries: position, size, NUL-padded name.
//! * Zero-size entries are markers, not data.
//!
//! Only the fixed-size records live here; the directory walk and typed
//! decoding live in [`crate::wad::parser`].

use std::io;

use thiserror::Error;

use crate::wad::reader::ByteReader;

/// Size (in bytes) of one directory entry.
pub const DIR_ENTRY_SIZE: usize = 16;

/// Size (in bytes) of the file header.
pub const HEADER_SIZE: usize = 12;

/// Loader / decoding errors. Any of these aborts the whole load.
#[derive(Error, Debug)]
pub enum WadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("truncated data: wanted {wanted} bytes at offset {offset}, buffer is {len} bytes")]
    TruncatedData {
        offset: usize,
        wanted: usize,
        len: usize,
    },

    #[error("unknown marker `{0}`")]
    UnknownMarker(String),

    #[error("unknown lump `{name}` ({size} bytes): {context}")]
    UnknownLump {
        name: String,
        size: usize,
        context: &'static str,
    },

    #[error("picture column {column} points at offset {offset}, outside {start}..{end}")]
    InvalidPictureColumn {
        column: usize,
        offset: usize,
        start: usize,
        end: usize,
    },

    #[error("picture height {height} is beyond the {max} rows a post can reach")]
    PictureTooTall { height: usize, max: usize },

    #[error("picture posts consume {consumed} bytes, lump is only {size}")]
    PictureOverrun { consumed: usize, size: usize },

    #[error("`{name}` appears twice in namespace `{namespace}` with different data")]
    DuplicateResourceConflict { namespace: String, name: String },

    #[error("{what}: expected {expected} bytes, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("lump `{name}` is not a sprite: {source}")]
    NotAPicture {
        name: String,
        #[source]
        source: Box<WadError>,
    },
}

/// Which kind of WAD the header announced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WadKind {
    /// Full game data.
    Iwad,
    /// Add-on whose lumps take priority over the IWAD's.
    Pwad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub kind: WadKind,
    pub lump_count: usize,
    pub directory_offset: usize,
}

/// One entry in the lump directory (16 bytes on disk).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LumpInfo {
    pub name: String,
    pub position: usize,
    pub size: usize,
}

impl LumpInfo {
    #[inline]
    pub fn is_marker(&self) -> bool {
        self.size == 0
    }
}

/// Read and validate the 12-byte header at the reader's current offset.
pub fn read_header(reader: &mut ByteReader<'_>) -> Result<Header, WadError> {
    let magic = reader.read_ascii(4)?;
    let kind = match magic.as_str() {
        "IWAD" => WadKind::Iwad,
        "PWAD" => WadKind::Pwad,
        _ => return Err(WadError::MalformedHeader(format!("bad magic {magic:?}"))),
    };

    let lump_count = reader.read_i32()?;
    let directory_offset = reader.read_i32()?;
    if lump_count < 0 || directory_offset < 0 {
        return Err(WadError::MalformedHeader(format!(
            "negative lump count ({lump_count}) or directory offset ({directory_offset})"
        )));
    }

    Ok(Header {
        kind,
        lump_count: lump_count as usize,
        directory_offset: directory_offset as usize,
    })
}

/// Read one directory entry at the reader's current offset.
pub fn read_dir_entry(reader: &mut ByteReader<'_>) -> Result<LumpInfo, WadError> {
    let position = reader.read_i32()?;
    let size = reader.read_i32()?;
    let name = reader.read_name(8)?;
    if position < 0 || size < 0 {
        return Err(WadError::MalformedHeader(format!(
            "lump `{name}` has negative position ({position}) or size ({size})"
        )));
    }
    Ok(LumpInfo {
        name,
        position: position as usize,
        size: size as usize,
    })
}

// ==========================================================================
// Tests
// ==========================================================================
