// ──────────────────────────────────────────────────────────────────────────
// wad/loader.rs
//
//  *   WadFile (parsed, immutable)   ──╮
//  *   PNAMES + TEXTURE1/2 recipes     │   --->  populated TextureBank
//  *   graphics / flats namespaces     ╯          + composition warnings
// ──────────────────────────────────────────────────────────────────────────

use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    wad::{Flat, Graphic, WadFile, picture::FLAT_SIZE, texture::TextureDef},
    world::{Texture, TextureBank, TextureError},
};

/// Populate `bank` with every composite texture, picture and flat in `wad`
/// and select palette 0. Composites take their names first, so a texture
/// and a patch sharing a name resolve to the composite.
///
/// Missing patches and a full bank are not fatal: each is logged, skipped
/// and returned.
pub fn load_textures(wad: &WadFile, bank: &mut TextureBank) -> Vec<TextureError> {
    if let Some(pal) = wad.palettes.first() {
        bank.set_palette(pal.clone());
    }

    /*----- 1. Patch lookup (upper-case name → picture) -------------------*/
    let mut patches: HashMap<String, &Graphic> = HashMap::new();
    for dir in wad.directory.walk() {
        for (name, g) in &dir.graphics {
            patches.entry(name.to_ascii_uppercase()).or_insert(g);
        }
    }

    /*----- 2. Composite wall textures ------------------------------------*/
    let mut warnings = Vec::new();
    for (name, def) in &wad.textures {
        let (tex, missing) = compose_texture(def, &wad.pnames, &patches);
        warnings.extend(missing);
        keep_first(bank.insert(name.clone(), tex), &mut warnings);
    }

    /*----- 3. Plain pictures and flats -----------------------------------*/
    for dir in wad.directory.walk() {
        for (name, g) in &dir.graphics {
            keep_first(bank.insert(name.clone(), graphic_texture(name, g)), &mut warnings);
        }
        for (name, f) in &dir.flats {
            keep_first(bank.insert_flat(name.clone(), flat_texture(name, f)), &mut warnings);
        }
    }

    warnings
}

/// Duplicates keep the first entry quietly; anything else is reported.
fn keep_first(res: Result<u16, TextureError>, warnings: &mut Vec<TextureError>) {
    match res {
        Ok(_) => {}
        Err(e @ TextureError::Duplicate(_)) => debug!("{e}, keeping the first one"),
        Err(e) => {
            warn!("{e}");
            warnings.push(e);
        }
    }
}

/// Paint every patch of `def` onto a transparent canvas.
pub fn compose_texture(
    def: &TextureDef,
    pnames: &[String],
    patches: &HashMap<String, &Graphic>,
) -> (Texture, Vec<TextureError>) {
    let (w, h) = (def.width as usize, def.height as usize);
    let mut canvas = vec![None; w * h];
    let mut missing = Vec::new();

    for p in &def.patches {
        let patch_name = pnames
            .get(p.patch_number as usize)
            .map(|n| n.to_ascii_uppercase())
            .unwrap_or_else(|| format!("#{}", p.patch_number));
        let Some(graphic) = patches.get(&patch_name) else {
            warn!("texture {}: missing patch {patch_name}", def.name);
            missing.push(TextureError::MissingPatch {
                texture: def.name.clone(),
                patch: patch_name,
            });
            continue;
        };
        blit_patch(&mut canvas, w, h, graphic, p.x_offset as i32, p.y_offset as i32);
    }

    (
        Texture {
            name: def.name.clone(),
            w,
            h,
            pixels: canvas,
        },
        missing,
    )
}

fn blit_patch(dest: &mut [Option<u8>], dw: usize, dh: usize, p: &Graphic, ox: i32, oy: i32) {
    for py in 0..p.height as usize {
        let dy = oy + py as i32;
        if !(0..dh as i32).contains(&dy) {
            continue;
        }
        for px in 0..p.width as usize {
            let dx = ox + px as i32;
            if !(0..dw as i32).contains(&dx) {
                continue;
            }
            if let Some(src) = p.pixel(px, py) {
                dest[dy as usize * dw + dx as usize] = Some(src);
            }
        }
    }
}

pub fn graphic_texture(name: &str, g: &Graphic) -> Texture {
    Texture {
        name: name.into(),
        w: g.width as usize,
        h: g.height as usize,
        pixels: g.pixels.clone(),
    }
}

pub fn flat_texture(name: &str, f: &Flat) -> Texture {
    Texture {
        name: name.into(),
        w: FLAT_SIZE,
        h: FLAT_SIZE,
        pixels: f.pixels.iter().copied().map(Some).collect(),
    }
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
