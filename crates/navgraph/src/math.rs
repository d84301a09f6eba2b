use glam::{UVec3, Vec3};

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb3d {
    /// The minimum corner.
    pub min: Vec3,
    /// The maximum corner.
    pub max: Vec3,
}

impl Aabb3d {
    /// Creates a box from its center and half extents.
    #[inline]
    pub fn new(center: impl Into<Vec3>, half_size: impl Into<Vec3>) -> Self {
        let center = center.into();
        let half_size = half_size.into().abs();
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Creates a box from two opposite corners, in any order.
    #[inline]
    pub fn from_corners(a: impl Into<Vec3>, b: impl Into<Vec3>) -> Self {
        let (a, b) = (a.into(), b.into());
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Computes the box enclosing all `verts`.
    /// Returns `None` if `verts` is empty.
    pub fn from_verts(verts: &[Vec3]) -> Option<Self> {
        let mut iter = verts.iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((*first, *first), |(prev_min, prev_max), point| {
            (point.min(prev_min), point.max(prev_max))
        });
        Some(Self { min, max })
    }

    /// Slab test. Returns the distance along `direction` (in units of its length) at which the
    /// ray enters the box.
    ///
    /// A ray starting inside the box or on its surface does not report that box,
    /// the same way physics engines ignore the collider a ray starts in.
    pub fn ray_entry(&self, origin: Vec3, direction: Vec3) -> Option<f32> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (min, max) = (self.min[axis], self.max[axis]);
            if d == 0.0 {
                if o < min || o > max {
                    return None;
                }
                continue;
            }
            let inv = d.recip();
            let t0 = (min - o) * inv;
            let t1 = (max - o) * inv;
            let (near, far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
            t_enter = t_enter.max(near);
            t_exit = t_exit.min(far);
            if t_enter > t_exit {
                return None;
            }
        }
        (t_enter > 0.0).then_some(t_enter)
    }
}

pub(crate) trait TriangleIndices {
    fn median_point(&self, vertices: &[Vec3]) -> Vec3;
}

impl TriangleIndices for UVec3 {
    /// Arithmetic mean of the three vertices.
    #[inline]
    fn median_point(&self, vertices: &[Vec3]) -> Vec3 {
        let a = vertices[self[0] as usize];
        let b = vertices[self[1] as usize];
        let c = vertices[self[2] as usize];
        (a + b + c) / 3.0
    }
}

/// Bit pattern of a position, usable as a hash key that agrees with float `==`.
///
/// `-0.0` and `0.0` map to the same key. Positions containing NaN never compare equal,
/// so they get no key.
#[inline]
pub(crate) fn position_key(position: Vec3) -> Option<[u32; 3]> {
    if position.is_nan() {
        return None;
    }
    // Adding positive zero turns negative zero into positive zero and leaves the rest untouched.
    let position = position + Vec3::ZERO;
    Some([
        position.x.to_bits(),
        position.y.to_bits(),
        position.z.to_bits(),
    ])
}

/// X component of the horizontal unit direction `direction`, in the order -X, +X, +Z, -Z.
pub(crate) fn dir_offset_x(direction: u8) -> f32 {
    const OFFSET: [f32; 4] = [-1.0, 1.0, 0.0, 0.0];
    OFFSET[direction as usize & 0x03]
}

/// Z component of the horizontal unit direction `direction`. See [`dir_offset_x`].
pub(crate) fn dir_offset_z(direction: u8) -> f32 {
    const OFFSET: [f32; 4] = [0.0, 0.0, 1.0, -1.0];
    OFFSET[direction as usize & 0x03]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb3d {
        Aabb3d::new(Vec3::ZERO, [1.0, 1.0, 1.0])
    }

    #[test]
    fn ray_from_outside_enters_box() {
        let t = unit_box().ray_entry(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
        assert_eq!(t, Some(4.0));
    }

    #[test]
    fn ray_pointing_away_misses_box() {
        let t = unit_box().ray_entry(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert_eq!(t, None);
    }

    #[test]
    fn ray_starting_inside_does_not_report_box() {
        let t = unit_box().ray_entry(Vec3::ZERO, Vec3::NEG_Y);
        assert_eq!(t, None);
    }

    #[test]
    fn ray_starting_on_surface_does_not_report_box() {
        let aabb = unit_box();
        assert_eq!(aabb.ray_entry(Vec3::new(0.0, 1.0, 0.0), Vec3::Y), None);
        assert_eq!(aabb.ray_entry(Vec3::new(0.0, 1.0, 0.0), Vec3::X), None);
    }

    #[test]
    fn parallel_ray_outside_slab_misses() {
        let t = unit_box().ray_entry(Vec3::new(-5.0, 2.0, 0.0), Vec3::X);
        assert_eq!(t, None);
    }

    #[test]
    fn aabb_from_verts_encloses_all() {
        let aabb = Aabb3d::from_verts(&[
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.0),
            Vec3::new(0.5, 0.0, -3.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 3.0));
        assert!(Aabb3d::from_verts(&[]).is_none());
    }

    #[test]
    fn position_key_agrees_with_float_equality() {
        assert_eq!(
            position_key(Vec3::new(-0.0, 1.0, 2.0)),
            position_key(Vec3::new(0.0, 1.0, 2.0))
        );
        assert_ne!(
            position_key(Vec3::new(0.0, 1.0, 2.0)),
            position_key(Vec3::new(0.0, 1.0, 2.5))
        );
        assert_eq!(position_key(Vec3::new(f32::NAN, 0.0, 0.0)), None);
    }

    #[test]
    fn median_point_is_vertex_mean() {
        let vertices = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 6.0),
        ];
        let median = UVec3::new(0, 1, 2).median_point(&vertices);
        assert_eq!(median, Vec3::new(1.0, 1.0, 2.0));
    }
}
