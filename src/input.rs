//! Key events from a window thread to the render loop.
//!
//! The producer pushes into an [`EventQueue`] under its lock; the render
//! thread calls [`EventQueue::drain`] once per frame, which takes every
//! pending event and leaves the queue empty in one step. The drained batch
//! goes to [`CameraController::apply`], then [`CameraController::update`]
//! moves the camera for that frame.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use crate::world::Camera;

/// Doom key code (arrows and modifiers use the classic values).
pub type KeyCode = u16;

pub const KEY_LEFT: KeyCode = 0xAC;
pub const KEY_UP: KeyCode = 0xAD;
pub const KEY_RIGHT: KeyCode = 0xAE;
pub const KEY_DOWN: KeyCode = 0xAF;
pub const KEY_ENTER: KeyCode = 13;
pub const KEY_ESCAPE: KeyCode = 27;
pub const KEY_SHIFT: KeyCode = 0x80 + 0x36;
pub const KEY_CTRL: KeyCode = 0x80 + 0x1D;
pub const KEY_ALT: KeyCode = 0x80 + 0x38;

/// Map units per second.
pub const MOVE_SPEED: f32 = 250.0;
/// Degrees per second.
pub const TURN_RATE: f32 = 180.0;
const RUN_FACTOR: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputKind {
    KeyDown,
    KeyUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InputEvent {
    pub kind: InputKind,
    pub code: KeyCode,
}

impl InputEvent {
    pub fn down(code: KeyCode) -> Self {
        Self {
            kind: InputKind::KeyDown,
            code,
        }
    }

    pub fn up(code: KeyCode) -> Self {
        Self {
            kind: InputKind::KeyUp,
            code,
        }
    }
}

/// Shared, lock-protected event buffer. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    inner: Arc<Mutex<Vec<InputEvent>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, ev: InputEvent) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ev);
    }

    /// Every event pushed since the previous drain, oldest first.
    pub fn drain(&self) -> Vec<InputEvent> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/*──────────────────────────── camera update ─────────────────────────────*/

/// Held-key state driving a [`Camera`].
///
/// * Up/Down or W/S walk, Left/Right turn.
/// * Alt + Left/Right, or A/D, strafe.
/// * Shift runs.
#[derive(Clone, Debug)]
pub struct CameraController {
    held: HashSet<KeyCode>,
    pub move_speed: f32,
    pub turn_rate: f32,
}

impl Default for CameraController {
    fn default() -> Self {
        Self {
            held: HashSet::new(),
            move_speed: MOVE_SPEED,
            turn_rate: TURN_RATE,
        }
    }
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one frame's drained events into the held-key set.
    pub fn apply<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = InputEvent>,
    {
        for ev in events {
            match ev.kind {
                InputKind::KeyDown => {
                    self.held.insert(ev.code);
                }
                InputKind::KeyUp => {
                    self.held.remove(&ev.code);
                }
            }
        }
    }

    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    pub fn quit_requested(&self) -> bool {
        self.is_held(KEY_ESCAPE)
    }

    /// Move/turn `camera` for a frame lasting `dt` seconds.
    pub fn update(&self, camera: &mut Camera, dt: f32) {
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        let held = |c: u8| self.is_held(c as KeyCode);

        let alt = self.is_held(KEY_ALT);
        let left = self.is_held(KEY_LEFT);
        let right = self.is_held(KEY_RIGHT);

        let forward = axis(self.is_held(KEY_UP) || held(b'W'), self.is_held(KEY_DOWN) || held(b'S'));
        let mut strafe = axis(held(b'D'), held(b'A'));
        let mut turn = 0.0;
        if alt {
            strafe += axis(right, left);
        } else {
            turn = axis(left, right);
        }

        let speed = if self.is_held(KEY_SHIFT) {
            self.move_speed * RUN_FACTOR
        } else {
            self.move_speed
        };

        if turn != 0.0 {
            camera.turn(turn * self.turn_rate * dt);
        }
        if forward != 0.0 || strafe != 0.0 {
            camera.step(forward * speed * dt, strafe.clamp(-1.0, 1.0) * speed * dt);
        }
    }
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
