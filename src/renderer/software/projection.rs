use glam::{Vec2, Vec3, vec2};

use crate::{renderer::RenderConfig, world::Camera};

/// World → screen pinhole projection for one frame.
///
/// Screen y grows downwards; the horizon sits on the middle row.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    camera: Camera,
    half_w: f32,
    half_h: f32,
    focal: f32,
    eye_z: f32,
}

impl Projector {
    pub fn new(camera: &Camera, cfg: &RenderConfig) -> Self {
        Self {
            camera: *camera,
            half_w: cfg.width as f32 * 0.5,
            half_h: cfg.height as f32 * 0.5,
            focal: camera.screen_scale(cfg.width),
            eye_z: camera.pos().z + cfg.eye_height,
        }
    }

    /// Camera-space `(lateral, depth)` of a map point.
    #[inline]
    pub fn view(&self, p: Vec2) -> Vec2 {
        self.camera.to_cam(p)
    }

    /// Screen position of `p`, `None` when it is not in front of the eye.
    pub fn project(&self, p: Vec3) -> Option<Vec2> {
        let v = self.view(p.truncate());
        self.project_view(v, p.z)
    }

    /// Like [`Projector::project`] for an already rotated point.
    #[inline]
    pub fn project_view(&self, v: Vec2, z: f32) -> Option<Vec2> {
        if v.y <= 0.0 {
            return None;
        }
        let inv = self.focal / v.y;
        Some(vec2(
            self.half_w + v.x * inv,
            self.half_h - (z - self.eye_z) * inv,
        ))
    }
}
