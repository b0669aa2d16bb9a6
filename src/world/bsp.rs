use glam::Vec2;
use thiserror::Error;

use crate::world::camera::{Camera, FOV_DEGREES, normalize_degrees};
use crate::world::geometry::{BBox, Level, Node, NodeId, SectorId, SegDirection, SubsectorId};

pub const CHILD_MASK: u16 = 0x7FFF;

pub const SUBSECTOR_BIT: u16 = 0x8000;

/// Length of the frustum boundary rays used by the edge test.
const FRUSTUM_FAR: f32 = 10_000.0;

#[derive(Error, Debug, PartialEq)]
pub enum BspError {
    /// Camera sits exactly on a partition line; front/back is undefined.
    #[error("camera at ({x}, {y}) lies on the partition line of node {node}")]
    DegenerateBspSide { node: NodeId, x: f32, y: f32 },

    #[error("{what} index {index} out of range")]
    BadIndex { what: &'static str, index: usize },

    #[error("BSP tree revisits nodes (more than {0} internal nodes walked)")]
    Cycle(usize),
}

/// `true` if a node child value refers to a subsector.
#[inline(always)]
pub fn is_leaf(child: u16) -> bool {
    child & SUBSECTOR_BIT != 0
}

/// Subsector index of a leaf child value.
#[inline(always)]
pub fn subsector_index(child: u16) -> SubsectorId {
    child & CHILD_MASK
}

// ──────────────────────────────────────────────────────────────────────────
//                       Level – public helpers
// ──────────────────────────────────────────────────────────────────────────
impl Level {
    /// Index of the BSP root (`nodes.len()-1` in Doom), `None` for a map
    /// made of a single subsector.
    #[inline(always)]
    pub fn bsp_root(&self) -> Option<NodeId> {
        self.nodes.len().checked_sub(1).map(|i| i as NodeId)
    }

    /// Subsectors in BSP visiting order (camera side first), skipping every
    /// subtree whose bounding box fails [`bbox_in_frustum`].
    ///
    /// No occlusion is tracked: a later (farther) subsector can paint over
    /// an earlier (nearer) one.
    pub fn visible_subsectors(&self, camera: &Camera) -> Result<Vec<SubsectorId>, BspError> {
        let mut out = Vec::new();
        let Some(root) = self.bsp_root() else {
            if !self.subsectors.is_empty() {
                out.push(0);
            }
            return Ok(out);
        };

        // explicit stack: pushed back-to-front so the near side pops first
        let mut stack = vec![root];
        let mut walked = 0usize;
        while let Some(child) = stack.pop() {
            if is_leaf(child) {
                let ss = subsector_index(child);
                if ss as usize >= self.subsectors.len() {
                    return Err(BspError::BadIndex {
                        what: "subsector",
                        index: ss as usize,
                    });
                }
                out.push(ss);
                continue;
            }

            walked += 1;
            if walked > self.nodes.len() {
                return Err(BspError::Cycle(self.nodes.len()));
            }
            let node = self.nodes.get(child as usize).ok_or(BspError::BadIndex {
                what: "node",
                index: child as usize,
            })?;

            let [(near, near_box), (far, far_box)] = node.children_by_side(child, camera)?;
            if bbox_in_frustum(&far_box, camera) {
                stack.push(far);
            }
            if bbox_in_frustum(&near_box, camera) {
                stack.push(near);
            }
        }
        Ok(out)
    }

    /// Walk the BSP and return the subsector containing `p`.
    pub fn locate_subsector(&self, p: Vec2) -> Option<SubsectorId> {
        let Some(mut idx) = self.bsp_root() else {
            return (!self.subsectors.is_empty()).then_some(0);
        };
        for _ in 0..=self.nodes.len() {
            let node = self.nodes.get(idx as usize)?;
            let child = if node.side_of(p) >= 0.0 {
                node.right_child
            } else {
                node.left_child
            };
            if is_leaf(child) {
                return Some(subsector_index(child));
            }
            idx = child;
        }
        None
    }

    /// Sector of the subsector containing `p`.
    pub fn sector_at(&self, p: Vec2) -> Option<SectorId> {
        let ss = self.subsectors.get(self.locate_subsector(p)? as usize)?;
        let seg = self.segs.get(ss.first_seg as usize)?;
        let ld = self.line_defs.get(seg.line_def as usize)?;
        let side = ld.side(seg.direction == SegDirection::Same)?;
        self.side_defs.get(side as usize).map(|sd| sd.facing_sector)
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Node geometry helpers
// ──────────────────────────────────────────────────────────────────────────
impl Node {
    /// Cross product of (p − line start) and the partition direction;
    /// positive on the right side.
    #[inline(always)]
    pub fn side_of(&self, p: Vec2) -> f32 {
        (p.x - self.x as f32) * self.dy as f32 - (p.y - self.y as f32) * self.dx as f32
    }

    /// `[(near child, box), (far child, box)]` as seen from the camera.
    fn children_by_side(
        &self,
        id: NodeId,
        camera: &Camera,
    ) -> Result<[(u16, BBox); 2], BspError> {
        let p = camera.pos2();
        let side = self.side_of(p);
        let right = (self.right_child, self.right_bbox);
        let left = (self.left_child, self.left_bbox);
        if side > 0.0 {
            Ok([right, left])
        } else if side < 0.0 {
            Ok([left, right])
        } else {
            Err(BspError::DegenerateBspSide {
                node: id,
                x: p.x,
                y: p.y,
            })
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────
//                       Frustum test
// ──────────────────────────────────────────────────────────────────────────

/// A box is potentially visible if any corner's bearing lies within
/// ±FOV/2 of the heading, or any edge crosses one of the two boundary rays.
pub fn bbox_in_frustum(bbox: &BBox, cam: &Camera) -> bool {
    let eye = cam.pos2();
    let half = FOV_DEGREES * 0.5;

    if bbox
        .corners()
        .iter()
        .any(|&c| bearing_within(eye, c, cam.heading(), half))
    {
        return true;
    }

    let rays = [cam.heading() - half, cam.heading() + half].map(|deg| {
        let (s, c) = deg.to_radians().sin_cos();
        eye + Vec2::new(c, s) * FRUSTUM_FAR
    });

    bbox.edges().iter().any(|&(a, b)| {
        rays.iter()
            .any(|&ray_end| segments_intersect(eye, ray_end, a, b))
    })
}

/// Is the bearing from `eye` to `p` within `half` degrees of `heading`?
fn bearing_within(eye: Vec2, p: Vec2, heading: f32, half: f32) -> bool {
    let d = p - eye;
    let bearing = normalize_degrees(d.y.atan2(d.x).to_degrees());
    let diff = normalize_degrees(bearing - heading + 180.0) - 180.0;
    diff.abs() <= half
}

/// Closed segment intersection; parallel segments never intersect.
fn segments_intersect(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    let d = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if d == 0.0 {
        return false;
    }
    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / d;
    let u = ((p1.x - p3.x) * (p1.y - p2.y) - (p1.y - p3.y) * (p1.x - p2.x)) / d;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

// ──────────────────────────────────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{XorShift, two_rooms};
    use glam::Vec3;

    fn cam(x: f32, y: f32, heading: f32) -> Camera {
        Camera::new(Vec3::new(x, y, 0.0), heading)
    }

    fn bbox(left: i16, bottom: i16, right: i16, top: i16) -> BBox {
        BBox {
            top,
            bottom,
            left,
            right,
        }
    }

    #[test]
    fn leaf_flag_convention() {
        for v in [0u16, 1, 0x7FFF, 0x8000, 0x8001, 0xFFFF, 0x1234, 0x9234] {
            assert_eq!(is_leaf(v), v & 0x8000 != 0);
            if is_leaf(v) {
                assert_eq!(subsector_index(v), v & 0x7FFF);
            }
        }
    }

    #[test]
    fn near_side_is_visited_first() {
        let lvl = two_rooms();
        // in room A (left of the partition) looking east: A then B
        assert_eq!(lvl.visible_subsectors(&cam(128.0, 128.0, 0.0)).unwrap(), vec![0, 1]);
        // in room B looking west: B then A
        assert_eq!(lvl.visible_subsectors(&cam(384.0, 128.0, 180.0)).unwrap(), vec![1, 0]);
    }

    #[test]
    fn box_behind_camera_is_culled() {
        let lvl = two_rooms();
        // in room A looking west: room B is entirely behind
        assert_eq!(lvl.visible_subsectors(&cam(128.0, 128.0, 180.0)).unwrap(), vec![0]);
    }

    #[test]
    fn camera_on_partition_is_an_error() {
        let lvl = two_rooms();
        let err = lvl.visible_subsectors(&cam(256.0, 100.0, 0.0)).unwrap_err();
        assert!(matches!(err, BspError::DegenerateBspSide { node: 0, .. }));
    }

    #[test]
    fn single_subsector_map_has_no_nodes() {
        let mut lvl = two_rooms();
        lvl.nodes.clear();
        assert_eq!(lvl.visible_subsectors(&cam(1.0, 1.0, 0.0)).unwrap(), vec![0]);
    }

    #[test]
    fn bad_child_index_is_reported() {
        let mut lvl = two_rooms();
        lvl.nodes[0].right_child = SUBSECTOR_BIT | 9;
        let err = lvl.visible_subsectors(&cam(400.0, 128.0, 0.0)).unwrap_err();
        assert_eq!(
            err,
            BspError::BadIndex {
                what: "subsector",
                index: 9
            }
        );
    }

    #[test]
    fn self_referencing_tree_is_a_cycle() {
        let mut lvl = two_rooms();
        lvl.nodes[0].right_child = 0;
        let err = lvl.visible_subsectors(&cam(400.0, 128.0, 0.0)).unwrap_err();
        assert_eq!(err, BspError::Cycle(1));
    }

    #[test]
    fn frustum_wraps_around_zero_degrees() {
        // heading 350°: a box at bearing ~20° is inside, ~60° is not
        let c = cam(0.0, 0.0, 350.0);
        let near_20 = bbox(99, 35, 101, 37);
        let near_60 = bbox(49, 85, 51, 87);
        assert!(bbox_in_frustum(&near_20, &c));
        assert!(!bbox_in_frustum(&near_60, &c));
    }

    #[test]
    fn wide_box_straddling_the_view_is_visible_through_its_edges() {
        // every corner is outside the wedge but the near edge crosses both rays
        let c = cam(0.0, 0.0, 90.0);
        let wall = bbox(-1000, 10, 1000, 20);
        assert!(
            wall.corners()
                .iter()
                .all(|&p| !bearing_within(Vec2::ZERO, p, 90.0, 45.0))
        );
        assert!(bbox_in_frustum(&wall, &c));
    }

    #[test]
    fn culled_subtrees_are_never_visited() {
        let mut rng = XorShift::new(0x5EED);
        let mut lvl = two_rooms();
        for _ in 0..2_000 {
            let l = rng.range(-2000, 2000) as i16;
            let b = rng.range(-2000, 2000) as i16;
            let w = rng.range(1, 600) as i16;
            let h = rng.range(1, 600) as i16;
            lvl.nodes[0].right_bbox = bbox(l, b, l + w, b + h);

            // anywhere strictly left of the x = 256 partition
            let x = rng.range(-3000, 255) as f32 + 0.5;
            let y = rng.range(-3000, 3000) as f32 + 0.5;
            let c = cam(x, y, rng.range(0, 3600) as f32 / 10.0);

            let visited = lvl.visible_subsectors(&c).unwrap();
            let passes = bbox_in_frustum(&lvl.nodes[0].right_bbox, &c);
            assert_eq!(visited.contains(&1), passes);

            if !passes {
                // independent corner check with dot products
                let f = c.forward();
                let cos_half = (FOV_DEGREES.to_radians() * 0.5).cos();
                for corner in lvl.nodes[0].right_bbox.corners() {
                    let d = (corner - c.pos2()).normalize_or_zero();
                    assert!(d.dot(f) < cos_half + 1e-4);
                }
            }
        }
    }

    #[test]
    fn locate_and_sector_lookup() {
        let lvl = two_rooms();
        assert_eq!(lvl.locate_subsector(Vec2::new(100.0, 50.0)), Some(0));
        assert_eq!(lvl.locate_subsector(Vec2::new(300.0, 50.0)), Some(1));
        assert_eq!(lvl.sector_at(Vec2::new(100.0, 50.0)), Some(0));
        assert_eq!(lvl.sector_at(Vec2::new(300.0, 50.0)), Some(1));
    }
}
