use glam::{Vec2, Vec3, vec2};

/// Horizontal field of view, fixed.
pub const FOV_DEGREES: f32 = 90.0;

/// Eye height above the camera's z, in map units.
pub const EYE_HEIGHT: f32 = 56.0;

/// Player view-point in world space.
///
/// * Only **heading** is simulated – Doom never tilts up/down.
/// * `z` is the height the player stands on; renderers add the eye height
///   (default [`EYE_HEIGHT`]).
/// * Heading is kept in degrees and always normalised into `[0, 360)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pos: Vec3,
    heading: f32,
}

impl Camera {
    /// Create a new camera at `pos`, facing `heading` degrees
    /// (0 = east, counter-clockwise).
    pub fn new(pos: Vec3, heading: f32) -> Self {
        Self {
            pos,
            heading: normalize_degrees(heading),
        }
    }

    #[inline]
    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    #[inline]
    pub fn pos2(&self) -> Vec2 {
        self.pos.truncate()
    }

    pub fn set_pos(&mut self, pos: Vec3) {
        self.pos = pos;
    }

    /// Degrees in `[0, 360)`.
    #[inline]
    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn set_heading(&mut self, heading: f32) {
        self.heading = normalize_degrees(heading);
    }

    /// Transform an X–Y point `p` into camera‐local coords:
    ///  .x = lateral offset (+ right)
    ///  .y = depth along forward axis
    #[inline]
    pub fn to_cam(&self, p: Vec2) -> Vec2 {
        let d = p - self.pos2();
        let f = self.forward();
        vec2(d.dot(self.right()), d.dot(f))
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the camera looks on the X-Y plane.
    #[inline(always)]
    pub fn forward(&self) -> Vec2 {
        let (s, c) = self.heading.to_radians().sin_cos();
        Vec2::new(c, s) // 0° = +X (east), CCW positive
    }

    /// Unit vector pointing to the camera's right on the X-Y plane.
    #[inline(always)]
    pub fn right(&self) -> Vec2 {
        -self.forward().perp()
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` units and `side` (strafe, + right), keeping z.
    pub fn step(&mut self, forward: f32, side: f32) {
        let f = self.forward();
        let r = self.right();
        self.pos.x += f.x * forward + r.x * side;
        self.pos.y += f.y * forward + r.y * side;
    }

    /// Rotate around Z-axis (positive = turn left).
    pub fn turn(&mut self, delta: f32) {
        self.heading = normalize_degrees(self.heading + delta);
    }

    /*───────────────── projection helpers ─────────────────*/

    /// Pixel-per-map-unit scale for viewport width `w`.
    ///
    /// ```text
    /// focal = w / (2 * tan(fov/2))
    /// ```
    #[inline]
    pub fn screen_scale(&self, w: usize) -> f32 {
        w as f32 / (2.0 * (FOV_DEGREES.to_radians() * 0.5).tan())
    }
}

/// Wrap any angle in degrees into `[0, 360)`.
pub fn normalize_degrees(deg: f32) -> f32 {
    let a = deg.rem_euclid(360.0);
    if a >= 360.0 { 0.0 } else { a }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
