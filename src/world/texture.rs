// Format-agnostic repository of textures decoded by the asset loader.
// The renderers interact through `TextureId` and palette indices only.

use std::collections::HashMap;

use std::ops::{Index, IndexMut};

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const MISSING_TEXTURE: TextureId = 0;

/// Palette-indexed image in row-major order; `None` is transparent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Option<u8>>,
}

impl Texture {
    /// Sample with wrap-around addressing on both axes.
    #[inline]
    pub fn sample_wrapped(&self, u: i32, v: i32) -> Option<u8> {
        if self.w == 0 || self.h == 0 {
            return None;
        }
        let x = u.rem_euclid(self.w as i32) as usize;
        let y = v.rem_euclid(self.h as i32) as usize;
        self.pixels[y * self.w + x]
    }
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT_IDX: u8 = 8;
        const DARK_IDX: u8 = 16;
        let mut pix = vec![None; 8 * 8];
        for y in 0..8 {
            for x in 0..8 {
                pix[y * 8 + x] = Some(if (x ^ y) & 1 == 0 {
                    LIGHT_IDX
                } else {
                    DARK_IDX
                });
            }
        }
        Texture {
            name: "CHECKER".to_string(),
            w: 8,
            h: 8,
            pixels: pix,
        }
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    /// Every `TextureId` is taken.
    #[error("texture bank full ({0} entries)")]
    Full(usize),

    /// Composite texture refers to a patch nobody decoded.
    #[error("texture `{texture}` references missing patch `{patch}`")]
    MissingPatch { texture: String, patch: String },
}

/// 256 colours packed as 0xAARRGGBB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette(pub [u32; 256]);

impl Palette {
    #[inline]
    pub fn pack(r: u8, g: u8, b: u8) -> u32 {
        0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    /// Expand a palette-indexed texture to ARGB; transparent pixels become 0.
    pub fn rgba(&self, tex: &Texture) -> Vec<u32> {
        tex.pixels
            .iter()
            .map(|p| p.map_or(0, |idx| self[idx as usize]))
            .collect()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette([0xFF00_0000; 256])
    }
}
impl Index<usize> for Palette {
    type Output = u32;
    fn index(&self, idx: usize) -> &u32 {
        &self.0[idx]
    }
}
impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, idx: usize) -> &mut u32 {
        &mut self.0[idx]
    }
}

/// One light-level remap table.
pub type Colormap = [u8; 256];

/// A palette-agnostic, format-agnostic cache of textures.
///
/// * Does **not** know about WADs — that’s the loader’s job.
/// * Wall textures/pictures and flats live in separate name spaces.
/// * ID **0** is always the “missing” checkerboard.
///
/// **Thread-safety:** fill the bank before rendering; renderers only read it.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    flat_by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
    palette: Option<Palette>,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**.
    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), MISSING_TEXTURE);
        Self {
            by_name,
            flat_by_name: HashMap::new(),
            data: vec![missing_tex],
            palette: None,
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = Some(palette);
    }

    /// `None` until [`TextureBank::set_palette`] was called.
    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* wall texture or picture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(MISSING_TEXTURE)
    }

    pub fn flat_id(&self, name: &str) -> Option<TextureId> {
        self.flat_by_name.get(name).copied()
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Borrow a wall texture by name, falling back to the checkerboard.
    pub fn texture_or_missing(&self, name: &str) -> &Texture {
        &self.data[self.id_or_missing(name) as usize]
    }

    pub fn flat(&self, name: &str) -> Option<&Texture> {
        self.flat_id(name).map(|id| &self.data[id as usize])
    }

    /// ARGB pixels of texture `id` using the current palette.
    pub fn to_rgba(&self, id: TextureId) -> Option<Vec<u32>> {
        let pal = self.palette.as_ref()?;
        self.data.get(id as usize).map(|t| pal.rgba(t))
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a wall texture or picture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`) or no id is left (`Full`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.push(tex)?;
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Insert a flat under `name`; same rules as [`TextureBank::insert`].
    pub fn insert_flat<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.flat_by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.push(tex)?;
        self.flat_by_name.insert(name, id);
        Ok(id)
    }

    fn push(&mut self, tex: Texture) -> Result<TextureId, TextureError> {
        let id = TextureId::try_from(self.data.len())
            .map_err(|_| TextureError::Full(self.data.len()))?;
        self.data.push(tex);
        Ok(id)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
