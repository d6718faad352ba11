//! Object picking.
//!
//! Resolves a pointer position to the nearest wall or floor under the cursor:
//! 1. Normalize the screen position to device coordinates in `[-1, 1]`
//! 2. Unproject the near and far plane points to build a world-space ray
//! 3. Intersect the ray with every mesh below the scene root (bounds first, then triangles)
//! 4. Keep the nearest hit on a classified surface
//!
//! Unclassified geometry never blocks a pick: a ray passing a sofa on its way
//! to the wall still selects the wall. Picking has no side effects, so it is
//! safe to run every frame.

use cgmath::{EuclideanSpace, InnerSpace, SquareMatrix};

use crate::{
    camera::{Camera, Projection, Viewport},
    data_structures::{
        scene_graph::{SceneNode, walk},
        surface::Surface,
    },
};

/// Pointer position in physical pixels, origin at the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: cgmath::Point3<f32>,
    /// Unit length.
    pub direction: cgmath::Vector3<f32>,
}

impl Ray {
    pub fn new(origin: cgmath::Point3<f32>, direction: cgmath::Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Cast a ray from the camera through a point in normalized device coordinates.
    pub fn from_camera(
        ndc: cgmath::Vector2<f32>,
        camera: &Camera,
        projection: &Projection,
    ) -> Option<Self> {
        let view_proj = projection.calc_matrix() * camera.calc_matrix();
        let inverse = view_proj.invert()?;
        let unproject = |z: f32| {
            let p = inverse * cgmath::Vector4::new(ndc.x, ndc.y, z, 1.0);
            (p.w.abs() > f32::EPSILON).then(|| cgmath::Point3::new(p.x / p.w, p.y / p.w, p.z / p.w))
        };
        let near = unproject(-1.0)?;
        let far = unproject(1.0)?;
        let direction = far - near;
        if direction.magnitude2() <= f32::EPSILON {
            return None;
        }
        Some(Self::new(near, direction))
    }
}

/// Distance and location of a ray hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: cgmath::Point3<f32>,
}

/// Outcome of one pick. Transient: produced per pointer event and not retained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickResult {
    pub surface: Option<Surface>,
    pub distance: f32,
    pub hit_point: cgmath::Point3<f32>,
}

impl PickResult {
    pub fn miss() -> Self {
        Self {
            surface: None,
            distance: f32::INFINITY,
            hit_point: cgmath::Point3::origin(),
        }
    }

    pub fn is_hit(&self) -> bool {
        self.surface.is_some()
    }
}

/// Convert a screen position to normalized device coordinates (y up).
pub fn to_ndc(pos: ScreenPos, viewport: Viewport) -> Option<cgmath::Vector2<f32>> {
    if viewport.is_empty() {
        return None;
    }
    Some(cgmath::Vector2::new(
        (pos.x / viewport.width as f32) * 2.0 - 1.0,
        -(pos.y / viewport.height as f32) * 2.0 + 1.0,
    ))
}

/// Pick the nearest wall or floor below `root` under the pointer.
pub fn pick(
    pos: ScreenPos,
    viewport: Viewport,
    camera: &Camera,
    projection: &Projection,
    root: &dyn SceneNode,
) -> PickResult {
    let Some(ray) = to_ndc(pos, viewport).and_then(|ndc| Ray::from_camera(ndc, camera, projection))
    else {
        return PickResult::miss();
    };
    pick_ray(&ray, root)
}

/// Nearest classified hit along an already constructed ray.
pub fn pick_ray(ray: &Ray, root: &dyn SceneNode) -> PickResult {
    let mut result = PickResult::miss();
    walk(root, &mut |node| {
        let Some(surface) = node.surface().filter(|s| s.kind.is_classified()) else {
            return;
        };
        if let Some(hit) = node.intersect(ray) {
            if hit.distance < result.distance {
                result = PickResult {
                    surface: Some(surface),
                    distance: hit.distance,
                    hit_point: hit.point,
                };
            }
        }
    });
    if let Some(surface) = result.surface {
        log::debug!(
            "Picked {:?} {:?} at distance {:.3}",
            surface.kind,
            surface.id,
            result.distance
        );
    }
    result
}

/// Möller–Trumbore ray-triangle intersection. Returns the distance along the ray.
pub fn ray_triangle_intersection(
    ray: &Ray,
    v0: cgmath::Point3<f32>,
    v1: cgmath::Point3<f32>,
    v2: cgmath::Point3<f32>,
) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);
    // Parallel to the triangle plane
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > EPSILON).then_some(t)
}
