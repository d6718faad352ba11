//! The scene collaborator.
//!
//! The interaction core never owns the scene: it talks to it through
//! [`SceneBackend`], which exposes the camera, the node tree to pick against,
//! and the handful of material mutations the core performs (emissive
//! highlight and map/tiling swap). [`Scene`] is the in-crate implementation
//! backed by the loaded node tree and one [`SurfaceMaterial`] per mesh.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::{
    camera::{Camera, Projection, Viewport},
    data_structures::{
        material::SurfaceMaterial,
        scene_graph::{ContainerNode, SceneNode, walk, walk_mut},
        surface::{Surface, SurfaceId, SurfaceKind},
        texture::{Color, TextureHandle},
    },
    errors::{Result, ShowroomError},
    tiling::MaterialDescriptor,
};

pub trait SceneBackend {
    /// Root of everything that can be hit by a pick.
    fn root(&self) -> &dyn SceneNode;

    fn camera(&self) -> &Camera;

    fn projection(&self) -> &Projection;

    /// Apply a new canvas size to the projection.
    fn resize(&mut self, viewport: Viewport);

    fn emissive(&self, id: SurfaceId) -> Option<Color>;

    fn set_emissive(&mut self, id: SurfaceId, emissive: Color) -> Result<()>;

    /// The unframed texture currently bound to the surface, if one was applied.
    fn texture_source(&self, id: SurfaceId) -> Option<TextureHandle>;

    /// Swap the surface's map and tiling and mark it for re-render.
    fn apply_material(&mut self, id: SurfaceId, descriptor: MaterialDescriptor) -> Result<()>;
}

/// What [`Scene::teardown`] released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeardownReport {
    pub geometries: usize,
    pub materials: usize,
    /// Distinct pixel buffers, whether bound to a material or only cached.
    pub textures: usize,
    /// Cached framed variants handed in by the material engine.
    pub framed: usize,
}

pub struct Scene {
    root: Box<dyn SceneNode>,
    camera: Camera,
    projection: Projection,
    materials: BTreeMap<SurfaceId, SurfaceMaterial>,
    environment: Option<TextureHandle>,
    dirty: BTreeSet<SurfaceId>,
}

impl Scene {
    /// Take ownership of a loaded node tree and give every mesh its own material slot.
    pub fn new(mut root: Box<dyn SceneNode>) -> Self {
        root.update_world_transform_all();
        let mut materials = BTreeMap::new();
        walk(root.as_ref(), &mut |node| {
            let Some(surface) = node.surface() else {
                return;
            };
            match surface.kind {
                SurfaceKind::Wall => log::info!("Tagged wall: {}", node.name()),
                SurfaceKind::Floor => log::info!("Tagged floor: {}", node.name()),
                SurfaceKind::Unclassified => {}
            }
            if materials.insert(surface.id, SurfaceMaterial::new()).is_some() {
                log::warn!("Surface id {:?} is used by more than one mesh", surface.id);
            }
        });
        Self {
            root,
            camera: Camera::default(),
            projection: Projection::default(),
            materials,
            environment: None,
            dirty: BTreeSet::new(),
        }
    }

    /// A scene without geometry, used when the room failed to load.
    pub fn empty() -> Self {
        Self::new(Box::new(ContainerNode::new("empty")))
    }

    pub fn with_camera(mut self, camera: Camera, projection: Projection) -> Self {
        self.camera = camera;
        self.projection = projection;
        self
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Every mesh with its tag, in traversal order.
    pub fn surfaces(&self) -> Vec<(Surface, String)> {
        let mut surfaces = Vec::new();
        walk(self.root.as_ref(), &mut |node| {
            if let Some(surface) = node.surface() {
                surfaces.push((surface, node.name().to_string()));
            }
        });
        surfaces
    }

    /// First mesh whose name equals `name`.
    pub fn find_surface(&self, name: &str) -> Option<Surface> {
        self.surfaces()
            .into_iter()
            .find(|(_, mesh_name)| mesh_name == name)
            .map(|(surface, _)| surface)
    }

    pub fn material(&self, id: SurfaceId) -> Option<&SurfaceMaterial> {
        self.materials.get(&id)
    }

    pub fn environment(&self) -> Option<&TextureHandle> {
        self.environment.as_ref()
    }

    /// Background and reflection map. `None` leaves the scene unlit by an environment.
    pub fn set_environment(&mut self, environment: Option<TextureHandle>) {
        self.environment = environment;
    }

    /// Surfaces whose material changed since the last call, for the renderer to re-upload.
    pub fn take_dirty(&mut self) -> Vec<SurfaceId> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    /// Release every mesh's geometry, material and bound texture exactly once.
    pub fn teardown(self) -> TeardownReport {
        self.teardown_with(Vec::new())
    }

    /// Like [`Scene::teardown`], also releasing textures cached outside the scene.
    ///
    /// A cached texture that is also bound is only counted once.
    pub fn teardown_with(mut self, cached: Vec<TextureHandle>) -> TeardownReport {
        let mut geometries = 0;
        walk_mut(self.root.as_mut(), &mut |node| {
            if node.release_geometry() {
                geometries += 1;
            }
        });

        let mut textures = HashSet::new();
        let bound = self
            .materials
            .values()
            .flat_map(|material| material.map.iter().chain(material.source.iter()))
            .chain(self.environment.iter())
            .chain(cached.iter());
        for texture in bound {
            textures.insert(std::sync::Arc::as_ptr(&texture.image));
        }

        let report = TeardownReport {
            geometries,
            materials: self.materials.len(),
            textures: textures.len(),
            framed: cached.len(),
        };
        self.materials.clear();
        self.environment = None;
        log::info!(
            "Scene released {} geometries, {} materials, {} textures ({} cached framed)",
            report.geometries,
            report.materials,
            report.textures,
            report.framed
        );
        report
    }

    fn material_mut(&mut self, id: SurfaceId) -> Result<&mut SurfaceMaterial> {
        self.materials
            .get_mut(&id)
            .ok_or(ShowroomError::UnknownSurface(id))
    }
}

impl SceneBackend for Scene {
    fn root(&self) -> &dyn SceneNode {
        self.root.as_ref()
    }

    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn projection(&self) -> &Projection {
        &self.projection
    }

    fn resize(&mut self, viewport: Viewport) {
        if !viewport.is_empty() {
            self.projection.resize(viewport.width, viewport.height);
        }
    }

    fn emissive(&self, id: SurfaceId) -> Option<Color> {
        self.materials.get(&id).map(|material| material.emissive)
    }

    fn set_emissive(&mut self, id: SurfaceId, emissive: Color) -> Result<()> {
        self.material_mut(id)?.emissive = emissive;
        self.dirty.insert(id);
        Ok(())
    }

    fn texture_source(&self, id: SurfaceId) -> Option<TextureHandle> {
        self.materials
            .get(&id)
            .and_then(|material| material.source.clone())
    }

    fn apply_material(&mut self, id: SurfaceId, descriptor: MaterialDescriptor) -> Result<()> {
        self.material_mut(id)?.apply(descriptor);
        self.dirty.insert(id);
        Ok(())
    }
}
