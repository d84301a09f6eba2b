//! The ray-casting seam used by the [`GridGraphBuilder`](crate::GridGraphBuilder).
//!
//! Physics engines implement [`SpatialQuery`] against their own colliders. [`AabbScene`] is a
//! small implementation over axis-aligned boxes for tools and tests that have no physics world.

use glam::Vec3;

use crate::math::Aabb3d;

bitflags::bitflags! {
    /// Collision layers a ray is tested against.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serialize", serde(transparent))]
    #[repr(transparent)]
    pub struct LayerMask: u32 {
        /// The layer geometry lands on unless told otherwise.
        const DEFAULT = 1;
        /// Every layer.
        const ALL = u32::MAX;
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A half-line starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Where the ray starts.
    pub origin: Vec3,
    /// Unit-length direction of the ray.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray. `direction` is normalized; a zero direction stays zero and hits nothing.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// The point `distance` units along the ray.
    #[inline]
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

/// The closest surface a ray crossed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World position of the hit.
    pub point: Vec3,
    /// Distance from the ray origin to [`Self::point`].
    pub distance: f32,
}

/// Casts rays against the collision geometry of a scene.
pub trait SpatialQuery {
    /// Returns the closest hit along `ray` within `max_distance` on any of `layers`, or `None`.
    ///
    /// Implementations should not report geometry the ray starts inside of.
    fn cast(&self, ray: Ray, max_distance: f32, layers: LayerMask) -> Option<RayHit>;
}

impl<F> SpatialQuery for F
where
    F: Fn(Ray, f32, LayerMask) -> Option<RayHit>,
{
    fn cast(&self, ray: Ray, max_distance: f32, layers: LayerMask) -> Option<RayHit> {
        self(ray, max_distance, layers)
    }
}

/// A scene made of solid axis-aligned boxes.
#[derive(Debug, Clone, Default)]
pub struct AabbScene {
    boxes: Vec<(Aabb3d, LayerMask)>,
}

impl AabbScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a solid box on the given layer.
    pub fn add(&mut self, aabb: Aabb3d, layer: LayerMask) -> &mut Self {
        self.boxes.push((aabb, layer));
        self
    }

    /// Builder-style variant of [`Self::add`].
    pub fn with(mut self, aabb: Aabb3d, layer: LayerMask) -> Self {
        self.add(aabb, layer);
        self
    }

    /// Number of boxes in the scene.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Returns `true` if the scene has no boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl SpatialQuery for AabbScene {
    fn cast(&self, ray: Ray, max_distance: f32, layers: LayerMask) -> Option<RayHit> {
        self.boxes
            .iter()
            .filter(|(_, layer)| layer.intersects(layers))
            .filter_map(|(aabb, _)| aabb.ray_entry(ray.origin, ray.direction))
            .filter(|distance| *distance <= max_distance)
            .min_by(f32::total_cmp)
            .map(|distance| RayHit {
                point: ray.at(distance),
                distance,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> AabbScene {
        AabbScene::new()
            .with(
                Aabb3d::from_corners([-1.0, -1.0, -1.0], [1.0, 0.0, 1.0]),
                LayerMask::DEFAULT,
            )
            .with(
                Aabb3d::from_corners([-1.0, 3.0, -1.0], [1.0, 4.0, 1.0]),
                LayerMask::from_bits_retain(0b10),
            )
    }

    #[test]
    fn cast_reports_closest_hit() {
        let hit = scene()
            .cast(
                Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y),
                f32::INFINITY,
                LayerMask::ALL,
            )
            .unwrap();
        assert_eq!(hit.point, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(hit.distance, 6.0);
    }

    #[test]
    fn cast_ignores_other_layers() {
        let hit = scene()
            .cast(
                Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y),
                f32::INFINITY,
                LayerMask::DEFAULT,
            )
            .unwrap();
        assert_eq!(hit.point, Vec3::ZERO);
    }

    #[test]
    fn cast_respects_max_distance() {
        let hit = scene().cast(
            Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y),
            5.0,
            LayerMask::ALL,
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn closures_are_spatial_queries() {
        let query = |ray: Ray, _: f32, _: LayerMask| {
            Some(RayHit {
                point: ray.origin,
                distance: 0.0,
            })
        };
        let hit = query.cast(Ray::new(Vec3::ONE, Vec3::Y), 1.0, LayerMask::DEFAULT);
        assert_eq!(hit.map(|hit| hit.point), Some(Vec3::ONE));
    }
}
