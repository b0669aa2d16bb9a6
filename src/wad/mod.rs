//! # Doom WAD decoding
//!
//! * [`parse`] walks the directory once and returns an immutable
//!   [`WadFile`] (maps, namespaces, palettes, texture recipes).
//! * [`load_textures`] turns that into a [`crate::world::TextureBank`].

pub mod level;
pub mod loader;
pub mod parser;
pub mod picture;
pub mod raw;
pub mod reader;
pub mod texture;

pub use loader::{compose_texture, load_textures};
pub use parser::{WadFile, parse};
pub use picture::{EndText, Flat, Graphic};
pub use raw::{LumpInfo, WadError, WadKind};
pub use reader::ByteReader;
pub use texture::{TextureDef, TexturePatch};

use std::{fs, path::Path};

/// Read `path` and [`parse`] it.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<WadFile, WadError> {
    parse(&fs::read(path)?)
}
