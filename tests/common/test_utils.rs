#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    io::Cursor,
    rc::Rc,
};

use showroom_ngin::{
    camera::Viewport,
    config::{AssetManifest, ShowroomConfig, Swatch},
    controller::InteractionController,
    data_structures::{
        scene_graph::{ContainerNode, Geometry, MeshNode, SceneNode},
        surface::{Surface, SurfaceId, SurfaceKind},
    },
    errors::ShowroomError,
    pick::ScreenPos,
    resources::AssetSource,
    scene::Scene,
    timing::VirtualClock,
    ui::UiSink,
};

pub const VIEWPORT: Viewport = Viewport {
    width: 1280,
    height: 720,
};
/// Left half of the canvas: the wall.
pub const WALL_PX: ScreenPos = ScreenPos { x: 320.0, y: 360.0 };
/// Right half of the canvas: the floor.
pub const FLOOR_PX: ScreenPos = ScreenPos { x: 960.0, y: 360.0 };
/// Above both quads.
pub const EMPTY_PX: ScreenPos = ScreenPos { x: 640.0, y: 20.0 };

pub const WALL: Surface = Surface {
    id: SurfaceId(0),
    kind: SurfaceKind::Wall,
};
pub const FLOOR: Surface = Surface {
    id: SurfaceId(1),
    kind: SurfaceKind::Floor,
};

/// Axis aligned quad facing +Z at depth `z`.
pub fn quad(name: &str, surface: Surface, min: [f32; 2], max: [f32; 2], z: f32) -> MeshNode {
    let positions = vec![
        [min[0], min[1], z],
        [max[0], min[1], z],
        [max[0], max[1], z],
        [min[0], max[1], z],
    ];
    MeshNode::new(name, surface, Geometry::new(positions, vec![0, 1, 2, 0, 2, 3]))
}

/// A wall filling the left and a floor filling the right half of the view, 3 units in front of the camera.
pub fn room_root() -> ContainerNode {
    let mut root = ContainerNode::new("room");
    root.add_child(Box::new(quad("Plane001_Wall", WALL, [-5.0, -1.0], [0.0, 1.0], -2.0)));
    root.add_child(Box::new(quad("Floor", FLOOR, [0.0, -1.0], [5.0, 1.0], -2.0)));
    root
}

pub fn room() -> Scene {
    Scene::new(Box::new(room_root()))
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Selection(Option<SurfaceKind>),
    Hover(Option<SurfaceKind>, Option<ScreenPos>),
    Notice(ShowroomError),
    Toggle,
}

/// Records every call; clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingUi {
    calls: Rc<RefCell<Vec<UiCall>>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn selections(&self) -> Vec<Option<SurfaceKind>> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                UiCall::Selection(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn hovers(&self) -> Vec<Option<SurfaceKind>> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                UiCall::Hover(kind, _) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<ShowroomError> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                UiCall::Notice(err) => Some(err.clone()),
                _ => None,
            })
            .collect()
    }
}

impl UiSink for RecordingUi {
    fn selection_changed(&mut self, kind: Option<SurfaceKind>) {
        self.calls.borrow_mut().push(UiCall::Selection(kind));
    }

    fn hover_changed(&mut self, kind: Option<SurfaceKind>, position: Option<ScreenPos>) {
        self.calls.borrow_mut().push(UiCall::Hover(kind, position));
    }

    fn notice(&mut self, error: &ShowroomError) {
        self.calls.borrow_mut().push(UiCall::Notice(error.clone()));
    }

    fn toggle_sidebar(&mut self) {
        self.calls.borrow_mut().push(UiCall::Toggle);
    }
}

/// In-memory assets keyed by path.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
    fetches: Cell<usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(path.to_string(), bytes);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.get()
    }
}

impl AssetSource for MemorySource {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.fetches.set(self.fetches.get() + 1);
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("{} not found", path))
    }
}

pub type TestController = InteractionController<Scene, RecordingUi, VirtualClock>;

/// Controller over [`room`], plus handles to its UI log and clock.
pub fn controller(config: &ShowroomConfig) -> (TestController, RecordingUi, VirtualClock) {
    let ui = RecordingUi::new();
    let clock = VirtualClock::new();
    let controller = InteractionController::new(config, room(), ui.clone(), clock.clone(), VIEWPORT);
    (controller, ui, clock)
}

/// Solid colour PNG.
pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("png encoding");
    bytes.into_inner()
}

/// 2x1 Radiance HDR image with flat (uncompressed) scanlines.
pub fn hdr() -> Vec<u8> {
    let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 1 +X 2\n".to_vec();
    bytes.extend_from_slice(&[128, 128, 128, 129, 64, 64, 64, 130]);
    bytes
}

pub const OBJ_ROOM: &str = "\
o Plane001_Wall
v -5 -1 -2
v 0 -1 -2
v 0 1 -2
v -5 1 -2
f 1 2 3 4
o Sofa
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
f 5 6 7 8
o Floor
v 0 -1 -2
v 5 -1 -2
v 5 1 -2
v 0 1 -2
f 9 10 11 12
";

/// Binary buffer shared by the glTF fixtures: wall and floor quad positions, then their indices.
pub fn gltf_buffer() -> Vec<u8> {
    let wall: [[f32; 3]; 4] = [[-5.0, -1.0, -2.0], [0.0, -1.0, -2.0], [0.0, 1.0, -2.0], [-5.0, 1.0, -2.0]];
    let floor: [[f32; 3]; 4] = [[0.0, -1.0, -2.0], [5.0, -1.0, -2.0], [5.0, 1.0, -2.0], [0.0, 1.0, -2.0]];
    let indices: [u16; 6] = [0, 1, 2, 0, 2, 3];
    let mut bytes = Vec::new();
    for p in wall.iter().chain(floor.iter()).flatten() {
        bytes.extend_from_slice(&p.to_le_bytes());
    }
    for _ in 0..2 {
        for i in indices {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
    }
    bytes
}

/// glTF document with a wall, a floor and a sofa (reusing the wall mesh 1.5 units closer) below a "Room" group.
pub fn gltf_json(buffer_uri: Option<&str>) -> String {
    let uri = buffer_uri
        .map(|uri| format!(r#","uri":"{}""#, uri))
        .unwrap_or_default();
    format!(
        r#"{{
  "asset": {{"version": "2.0"}},
  "scene": 0,
  "scenes": [{{"nodes": [3]}}],
  "nodes": [
    {{"name": "Plane001_Wall", "mesh": 0}},
    {{"name": "Floor", "mesh": 1}},
    {{"name": "Sofa", "mesh": 0, "translation": [0.0, 0.0, 1.5]}},
    {{"name": "Room", "children": [0, 1, 2]}}
  ],
  "meshes": [
    {{"primitives": [{{"attributes": {{"POSITION": 0}}, "indices": 2}}]}},
    {{"primitives": [{{"attributes": {{"POSITION": 1}}, "indices": 3}}]}}
  ],
  "accessors": [
    {{"bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3", "min": [-5.0, -1.0, -2.0], "max": [0.0, 1.0, -2.0]}},
    {{"bufferView": 1, "componentType": 5126, "count": 4, "type": "VEC3", "min": [0.0, -1.0, -2.0], "max": [5.0, 1.0, -2.0]}},
    {{"bufferView": 2, "componentType": 5123, "count": 6, "type": "SCALAR"}},
    {{"bufferView": 3, "componentType": 5123, "count": 6, "type": "SCALAR"}}
  ],
  "bufferViews": [
    {{"buffer": 0, "byteOffset": 0, "byteLength": 48, "target": 34962}},
    {{"buffer": 0, "byteOffset": 48, "byteLength": 48, "target": 34962}},
    {{"buffer": 0, "byteOffset": 96, "byteLength": 12, "target": 34963}},
    {{"buffer": 0, "byteOffset": 108, "byteLength": 12, "target": 34963}}
  ],
  "buffers": [{{"byteLength": 120{}}}]
}}"#,
        uri
    )
}

/// The glTF fixture packed as a binary `.glb`.
pub fn glb() -> Vec<u8> {
    let mut json = gltf_json(None).into_bytes();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let bin = gltf_buffer();
    let total = 12 + 8 + json.len() + 8 + bin.len();

    let mut bytes = Vec::with_capacity(total);
    bytes.extend_from_slice(b"glTF");
    bytes.extend_from_slice(&2u32.to_le_bytes());
    bytes.extend_from_slice(&(total as u32).to_le_bytes());
    bytes.extend_from_slice(&(json.len() as u32).to_le_bytes());
    bytes.extend_from_slice(b"JSON");
    bytes.extend_from_slice(&json);
    bytes.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    bytes.extend_from_slice(b"BIN\0");
    bytes.extend_from_slice(&bin);
    bytes
}

/// Three swatches: two wall textures and one floor texture.
pub fn catalog() -> AssetManifest {
    AssetManifest::new("room.glb")
        .with_environment("env.hdr")
        .with_swatch(Swatch::new("plaster", "textures/plaster.png", SurfaceKind::Wall))
        .with_swatch(Swatch::new("brick", "textures/brick.png", SurfaceKind::Wall))
        .with_swatch(Swatch::new("oak", "textures/oak.png", SurfaceKind::Floor))
}

/// Every file [`catalog`] references.
pub fn catalog_source() -> MemorySource {
    MemorySource::new()
        .with_file("room.glb", glb())
        .with_file("env.hdr", hdr())
        .with_file("textures/plaster.png", png(4, 4, [240, 235, 220, 255]))
        .with_file("textures/brick.png", png(8, 4, [150, 60, 40, 255]))
        .with_file("textures/oak.png", png(4, 8, [160, 120, 70, 255]))
}
