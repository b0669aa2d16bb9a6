// ──────────────────────────────────────────────────────────────────────────
// wad/parser.rs
//
//  raw bytes ──> header ──> directory walk (one pass) ──> WadFile
//                               │
//                               ├─ markers: map context / namespace push/pop
//                               └─ lumps:   jump to body, decode, jump back
// ──────────────────────────────────────────────────────────────────────────

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::{
    wad::{
        level::{MAP_LUMPS, decode_map_lump, is_map_marker},
        picture::{
            EndText, decode_colormaps, decode_end_text, decode_flat, decode_palettes,
            decode_picture,
        },
        raw::{LumpInfo, WadError, WadKind, read_dir_entry, read_header},
        reader::ByteReader,
        texture::{TextureDef, decode_pnames, decode_texture_table},
    },
    world::{Colormap, Level, Palette, WadDirectory},
};

/// Everything decoded from one WAD. Built once by [`parse`], read-only after.
#[derive(Clone, Debug, PartialEq)]
pub struct WadFile {
    pub kind: WadKind,
    pub lump_count: usize,
    pub directory_offset: usize,
    pub palettes: Vec<Palette>,
    pub colormaps: Vec<Colormap>,
    /// Patch-name table (PNAMES), indexed by `TexturePatch::patch_number`.
    pub pnames: Vec<String>,
    pub end_text: Option<EndText>,
    pub directory: WadDirectory,
    pub maps: BTreeMap<String, Level>,
    /// TEXTURE1 + TEXTURE2 records by upper-case name.
    pub textures: BTreeMap<String, TextureDef>,
    /// GENMIDI and DMXGUS* kept verbatim.
    pub instrument_lumps: BTreeMap<String, Vec<u8>>,
}

impl WadFile {
    pub fn map(&self, name: &str) -> Option<&Level> {
        self.maps.get(name)
    }
}

/// Decode a complete WAD image. Any error aborts the whole load.
pub fn parse(bytes: &[u8]) -> Result<WadFile, WadError> {
    let mut reader = ByteReader::new(bytes);
    let header = read_header(&mut reader)?;

    let mut parser = Parser {
        file: WadFile {
            kind: header.kind,
            lump_count: header.lump_count,
            directory_offset: header.directory_offset,
            palettes: Vec::new(),
            colormaps: Vec::new(),
            pnames: Vec::new(),
            end_text: None,
            directory: WadDirectory::default(),
            maps: BTreeMap::new(),
            textures: BTreeMap::new(),
            instrument_lumps: BTreeMap::new(),
        },
        namespaces: vec![WadDirectory::new("")],
        current_map: None,
    };

    reader.set_offset(header.directory_offset)?;
    for _ in 0..header.lump_count {
        let lump = read_dir_entry(&mut reader)?;
        if lump.is_marker() {
            parser.marker(&lump.name)?;
        } else {
            let back = reader.set_offset(lump.position)?;
            let body = reader.read_bytes(lump.size)?;
            reader.set_offset(back)?;
            parser.lump(&lump, body)?;
        }
    }

    Ok(parser.finish())
}

/// Mutable state of the single directory pass.
struct Parser {
    file: WadFile,
    /// Open namespaces, root first. Never empty.
    namespaces: Vec<WadDirectory>,
    /// Last map marker seen; namespace markers do not close it.
    current_map: Option<String>,
}

impl Parser {
    fn marker(&mut self, name: &str) -> Result<(), WadError> {
        if is_map_marker(name) {
            debug!("map {name}");
            self.file.maps.insert(name.into(), Level::new(name));
            self.current_map = Some(name.into());
        } else if let Some(prefix) = name.strip_suffix("_START") {
            debug!("namespace {prefix} opened");
            self.namespaces.push(WadDirectory::new(prefix));
        } else if name.ends_with("_END") {
            if self.namespaces.len() < 2 {
                return Err(WadError::UnknownMarker(name.into()));
            }
            self.close_namespace();
        } else {
            return Err(WadError::UnknownMarker(name.into()));
        }
        Ok(())
    }

    fn close_namespace(&mut self) {
        if let Some(done) = self.namespaces.pop() {
            debug!("namespace {} closed", done.name);
            if let Some(parent) = self.namespaces.last_mut() {
                parent.directories.push(done);
            }
        }
    }

    fn namespace(&mut self) -> &mut WadDirectory {
        let last = self.namespaces.len() - 1;
        &mut self.namespaces[last]
    }

    fn lump(&mut self, lump: &LumpInfo, body: &[u8]) -> Result<(), WadError> {
        let name = lump.name.as_str();

        if MAP_LUMPS.contains(&name) {
            let level = self
                .current_map
                .as_ref()
                .and_then(|m| self.file.maps.get_mut(m))
                .ok_or_else(|| WadError::UnknownLump {
                    name: name.into(),
                    size: body.len(),
                    context: "map lump with no open map",
                })?;
            return decode_map_lump(level, name, body);
        }

        match name {
            "PLAYPAL" => self.file.palettes = decode_palettes(body)?,
            "COLORMAP" => self.file.colormaps = decode_colormaps(body)?,
            "ENDOOM" => self.file.end_text = Some(decode_end_text(body)?),
            "PNAMES" => self.file.pnames = decode_pnames(body)?,
            "TEXTURE1" | "TEXTURE2" => {
                for def in decode_texture_table(body)? {
                    self.file
                        .textures
                        .insert(def.name.to_ascii_uppercase(), def);
                }
            }
            _ if is_demo(name) => info!("skipping demo {name} of size {}", body.len()),
            _ if name == "GENMIDI" || name.starts_with("DMXGUS") => {
                self.file
                    .instrument_lumps
                    .insert(name.into(), body.to_vec());
            }
            _ if name.starts_with("DS") => self.namespace().insert_sound(name, body.to_vec())?,
            _ if name.starts_with("D_") || name.starts_with("DP") => {
                debug!("skipping music/synth lump {name}");
            }
            _ => self.picture(name, body)?,
        }
        Ok(())
    }

    /// Flats in `F*` namespaces, pictures everywhere else. A flat-namespace
    /// lump of the wrong size gets a second chance as a picture.
    fn picture(&mut self, name: &str, body: &[u8]) -> Result<(), WadError> {
        let ns = self.namespace();
        if ns.is_flat_namespace() {
            if let Ok(flat) = decode_flat(body) {
                return ns.insert_flat(name, flat);
            }
        }
        let graphic = decode_picture(body).map_err(|e| WadError::NotAPicture {
            name: name.into(),
            source: Box::new(e),
        })?;
        ns.insert_graphic(name, graphic)
    }

    fn finish(mut self) -> WadFile {
        while self.namespaces.len() > 1 {
            warn!(
                "namespace {} still open at end of directory",
                self.namespace().name
            );
            self.close_namespace();
        }
        self.file.directory = self.namespaces.pop().unwrap_or_default();
        self.file
    }
}

fn is_demo(name: &str) -> bool {
    name.strip_prefix("DEMO")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/*=======================================================================*/
/*                                Tests                                  */
/*=======================================================================*/
