//! Namespace tree built from `*_START` / `*_END` marker pairs.

use std::collections::BTreeMap;

use crate::wad::{Flat, Graphic, WadError};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WadDirectory {
    /// Marker prefix (`"S"` for `S_START`); empty for the root.
    pub name: String,
    pub directories: Vec<WadDirectory>,
    pub graphics: BTreeMap<String, Graphic>,
    pub flats: BTreeMap<String, Flat>,
    pub sounds: BTreeMap<String, Vec<u8>>,
}

impl WadDirectory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Flat namespaces are `F_START`, `FF_START`, `F1_START`, ...
    pub fn is_flat_namespace(&self) -> bool {
        self.name.starts_with('F')
    }

    /// Sprite namespaces are `S_START`, `SS_START`.
    pub fn is_sprite_namespace(&self) -> bool {
        self.name.starts_with('S')
    }

    pub fn insert_graphic(&mut self, name: &str, graphic: Graphic) -> Result<(), WadError> {
        insert_unique(&self.name, &mut self.graphics, name, graphic)
    }

    pub fn insert_flat(&mut self, name: &str, flat: Flat) -> Result<(), WadError> {
        insert_unique(&self.name, &mut self.flats, name, flat)
    }

    pub fn insert_sound(&mut self, name: &str, data: Vec<u8>) -> Result<(), WadError> {
        insert_unique(&self.name, &mut self.sounds, name, data)
    }

    /// Depth-first walk over this directory and every nested one.
    pub fn walk(&self) -> Vec<&WadDirectory> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(dir) = stack.pop() {
            out.push(dir);
            stack.extend(dir.directories.iter().rev());
        }
        out
    }

    /// First graphic called `name` anywhere in the tree.
    pub fn find_graphic(&self, name: &str) -> Option<&Graphic> {
        self.walk().into_iter().find_map(|d| d.graphics.get(name))
    }

    /// First flat called `name` anywhere in the tree.
    pub fn find_flat(&self, name: &str) -> Option<&Flat> {
        self.walk().into_iter().find_map(|d| d.flats.get(name))
    }
}

/// Same name twice is fine only when the payload is identical.
fn insert_unique<T: PartialEq>(
    namespace: &str,
    map: &mut BTreeMap<String, T>,
    name: &str,
    value: T,
) -> Result<(), WadError> {
    match map.get(name) {
        Some(existing) if *existing != value => Err(WadError::DuplicateResourceConflict {
            namespace: namespace.into(),
            name: name.into(),
        }),
        Some(_) => Ok(()),
        None => {
            map.insert(name.into(), value);
            Ok(())
        }
    }
}
