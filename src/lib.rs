//! # wadscope
//!
//! * [`wad`] parses a WAD image into an immutable [`wad::WadFile`].
//! * [`world`] holds the level model, camera and decoded texture bank.
//! * [`renderer`] draws a first-person frame by walking the BSP, or a flat
//!   overhead map of the same level.
//! * [`input`] is the per-frame key-event handoff for interactive front ends.

pub mod input;
pub mod renderer;
pub mod wad;
pub mod world;

#[cfg(test)]
pub(crate) mod test_support;
