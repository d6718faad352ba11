//! Scene graph and hierarchical scene organization.
//!
//! The room is a tree of [`SceneNode`]s: [`ContainerNode`]s group children
//! and [`MeshNode`]s carry triangle geometry plus the [`Surface`] tag assigned
//! by the classifier. Mesh nodes keep a world-space copy of their vertices and
//! bounds so that picking can test rays without walking the hierarchy again.

use cgmath::{EuclideanSpace, SquareMatrix, Transform as _};

use crate::{
    data_structures::{
        surface::{Surface, SurfaceKind},
        transform::Transform,
    },
    pick::{Ray, RayHit, ray_triangle_intersection},
};

/// Triangle geometry in node-local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn new(positions: Vec<[f32; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: cgmath::Point3<f32>,
    pub max: cgmath::Point3<f32>,
}

impl Aabb {
    pub fn from_points(points: &[cgmath::Point3<f32>]) -> Option<Self> {
        let first = *points.first()?;
        let bounds = points.iter().fold(
            Aabb {
                min: first,
                max: first,
            },
            |acc, p| Aabb {
                min: cgmath::Point3::new(acc.min.x.min(p.x), acc.min.y.min(p.y), acc.min.z.min(p.z)),
                max: cgmath::Point3::new(acc.max.x.max(p.x), acc.max.y.max(p.y), acc.max.z.max(p.z)),
            },
        );
        Some(bounds)
    }

    /// Slab test. Returns the entry distance along the ray, clamped to zero when
    /// the origin is inside the box.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if dir.abs() < f32::EPSILON {
                // Parallel to the slab: either always inside or never
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let t1 = (lo - origin) * inv;
            let t2 = (hi - origin) * inv;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

pub trait SceneNode {
    fn name(&self) -> &str;

    /// The classification tag of this node, `None` for pure containers.
    fn surface(&self) -> Option<Surface>;

    fn get_local_transform(&self) -> &Transform;

    fn set_local_transform(&mut self, transform: Transform);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);

    /// Recompute the world matrix of this node and all descendants.
    fn update_world_transforms(&mut self, parents_world: &cgmath::Matrix4<f32>);

    fn update_world_transform_all(&mut self) {
        self.update_world_transforms(&cgmath::Matrix4::identity());
    }

    /// Intersect the ray with this node's own geometry (children excluded).
    fn intersect(&self, ray: &Ray) -> Option<RayHit>;

    /// Drop this node's own geometry. Returns whether anything was released.
    fn release_geometry(&mut self) -> bool;
}

pub struct ContainerNode {
    name: String,
    local: Transform,
    pub children: Vec<Box<dyn SceneNode>>,
}

impl ContainerNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            local: Transform::default(),
            children: Vec::new(),
        }
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn surface(&self) -> Option<Surface> {
        None
    }

    fn get_local_transform(&self) -> &Transform {
        &self.local
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn update_world_transforms(&mut self, parents_world: &cgmath::Matrix4<f32>) {
        let world = parents_world * self.local.to_matrix();
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn intersect(&self, _: &Ray) -> Option<RayHit> {
        None
    }

    fn release_geometry(&mut self) -> bool {
        false
    }
}

pub struct MeshNode {
    name: String,
    surface: Surface,
    local: Transform,
    geometry: Option<Geometry>,
    world_positions: Vec<cgmath::Point3<f32>>,
    bounds: Option<Aabb>,
    children: Vec<Box<dyn SceneNode>>,
}

impl MeshNode {
    /// A mesh at the origin of its parent. Call
    /// [`SceneNode::update_world_transform_all`] on the root once the tree is built.
    pub fn new(name: &str, surface: Surface, geometry: Geometry) -> Self {
        let mut node = Self {
            name: name.to_string(),
            surface,
            local: Transform::default(),
            geometry: Some(geometry),
            world_positions: Vec::new(),
            bounds: None,
            children: Vec::new(),
        };
        node.update_world_transforms(&cgmath::Matrix4::identity());
        node
    }

    pub fn kind(&self) -> SurfaceKind {
        self.surface.kind
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }
}

impl SceneNode for MeshNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn surface(&self) -> Option<Surface> {
        Some(self.surface)
    }

    fn get_local_transform(&self) -> &Transform {
        &self.local
    }

    fn set_local_transform(&mut self, transform: Transform) {
        self.local = transform;
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }

    fn update_world_transforms(&mut self, parents_world: &cgmath::Matrix4<f32>) {
        let world = parents_world * self.local.to_matrix();
        self.world_positions = self
            .geometry
            .iter()
            .flat_map(|geometry| geometry.positions.iter())
            .map(|&p| world.transform_point(cgmath::Point3::from(p)))
            .collect();
        self.bounds = Aabb::from_points(&self.world_positions);
        for child in self.children.iter_mut() {
            child.update_world_transforms(&world);
        }
    }

    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let geometry = self.geometry.as_ref()?;
        self.bounds?.intersect(ray)?;

        let mut nearest: Option<f32> = None;
        for triangle in geometry.indices.chunks_exact(3) {
            let corner = |i: u32| self.world_positions.get(i as usize).copied();
            let (Some(v0), Some(v1), Some(v2)) =
                (corner(triangle[0]), corner(triangle[1]), corner(triangle[2]))
            else {
                log::warn!("Mesh {} references a vertex out of bounds", self.name);
                continue;
            };
            if let Some(t) = ray_triangle_intersection(ray, v0, v1, v2) {
                if nearest.is_none_or(|best| t < best) {
                    nearest = Some(t);
                }
            }
        }

        nearest.map(|distance| RayHit {
            distance,
            point: cgmath::Point3::from_vec(ray.origin.to_vec() + ray.direction * distance),
        })
    }

    fn release_geometry(&mut self) -> bool {
        self.world_positions.clear();
        self.bounds = None;
        self.geometry.take().is_some()
    }
}

/// Depth-first, pre-order traversal of `node` and all of its descendants.
pub fn walk(node: &dyn SceneNode, visit: &mut dyn FnMut(&dyn SceneNode)) {
    visit(node);
    for child in node.get_children() {
        walk(child.as_ref(), visit);
    }
}

/// Mutable counterpart of [`walk`].
pub fn walk_mut(node: &mut dyn SceneNode, visit: &mut dyn FnMut(&mut dyn SceneNode)) {
    visit(node);
    for child in node.get_children_mut().iter_mut() {
        walk_mut(child.as_mut(), visit);
    }
}
