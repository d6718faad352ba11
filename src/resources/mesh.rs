//! Room model ingestion.
//!
//! Reads glTF (`.gltf`, `.glb`) and Wavefront OBJ files into a scene graph of
//! [`ContainerNode`]s and [`MeshNode`]s. Only positions and indices are kept:
//! they are all picking needs. Every mesh gets a sequential [`SurfaceId`] and
//! is classified by name exactly once, here.

use std::io::{BufReader, Cursor};

use anyhow::Context;

use crate::{
    data_structures::{
        scene_graph::{ContainerNode, Geometry, MeshNode, SceneNode},
        surface::{ClassifierRules, Surface, SurfaceId},
        transform::Transform,
    },
    resources::{AssetSource, extension, parent_dir},
};

/// Hands out surface ids in traversal order.
struct Tagger<'a> {
    classifier: &'a ClassifierRules,
    next: u32,
}

impl Tagger<'_> {
    fn tag(&mut self, name: &str) -> Surface {
        let surface = Surface {
            id: SurfaceId(self.next),
            kind: self.classifier.classify(name),
        };
        self.next += 1;
        surface
    }
}

/// Load a room model, picking the format from the file extension.
pub async fn load_model<A: AssetSource>(
    source: &A,
    path: &str,
    classifier: &ClassifierRules,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let bytes = source.fetch(path).await?;
    let mut tagger = Tagger {
        classifier,
        next: 0,
    };
    let root = match extension(path).as_deref() {
        Some("gltf") | Some("glb") => load_gltf(source, path, &bytes, &mut tagger).await?,
        Some("obj") => load_obj(path, bytes, &mut tagger).await?,
        other => anyhow::bail!("unsupported model format {:?}", other),
    };
    log::info!("Loaded {} with {} meshes", path, tagger.next);
    Ok(root)
}

async fn load_gltf<A: AssetSource>(
    source: &A,
    path: &str,
    bytes: &[u8],
    tagger: &mut Tagger<'_>,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let gltf = gltf::Gltf::from_slice(bytes)?;

    let external = gltf.buffers().any(|buffer| {
        matches!(buffer.source(), gltf::buffer::Source::Uri(uri) if !uri.starts_with("data:"))
    });
    // Embedded and data-URI buffers are decoded by gltf itself
    let buffers: Vec<Vec<u8>> = if external {
        let mut buffers = Vec::new();
        for buffer in gltf.buffers() {
            match buffer.source() {
                gltf::buffer::Source::Bin => {
                    buffers.push(gltf.blob.clone().context("binary chunk missing")?);
                }
                gltf::buffer::Source::Uri(uri) if uri.starts_with("data:") => {
                    anyhow::bail!("buffer {} mixes a data URI with external files", buffer.index());
                }
                gltf::buffer::Source::Uri(uri) => {
                    let uri = format!("{}{}", parent_dir(path), uri);
                    buffers.push(source.fetch(&uri).await?);
                }
            }
        }
        buffers
    } else {
        gltf::import_buffers(&gltf.document, None, gltf.blob.clone())?
            .into_iter()
            .map(|data| data.0)
            .collect()
    };

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .context("file contains no scene")?;

    let mut root = ContainerNode::new(path);
    for node in scene.nodes() {
        root.add_child(to_scene_node(node, &buffers, tagger));
    }
    Ok(Box::new(root))
}

fn to_scene_node(
    node: gltf::scene::Node,
    buffers: &[Vec<u8>],
    tagger: &mut Tagger<'_>,
) -> Box<dyn SceneNode> {
    let name = node
        .name()
        .or_else(|| node.mesh().and_then(|mesh| mesh.name()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    let mut scene_node: Box<dyn SceneNode> = match node.mesh() {
        Some(mesh) => {
            let geometry = read_geometry(&mesh, buffers);
            Box::new(MeshNode::new(&name, tagger.tag(&name), geometry))
        }
        None => Box::new(ContainerNode::new(&name)),
    };

    let (translation, rotation, scale) = node.transform().decomposed();
    scene_node.set_local_transform(Transform::from_decomposed(translation, rotation, scale));

    for child in node.children() {
        scene_node.add_child(to_scene_node(child, buffers, tagger));
    }
    scene_node
}

/// Merge all triangle primitives of a mesh into one geometry.
fn read_geometry(mesh: &gltf::Mesh, buffers: &[Vec<u8>]) -> Geometry {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut indices = Vec::new();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::warn!(
                "Skipping {:?} primitive of mesh {}",
                primitive.mode(),
                mesh.name().unwrap_or_default()
            );
            continue;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let Some(read_positions) = reader.read_positions() else {
            continue;
        };
        let base = positions.len() as u32;
        positions.extend(read_positions);
        let count = positions.len() as u32 - base;
        match reader.read_indices() {
            Some(read_indices) => indices.extend(read_indices.into_u32().map(|i| base + i)),
            None => indices.extend(base..base + count),
        }
    }
    Geometry::new(positions, indices)
}

async fn load_obj(
    path: &str,
    bytes: Vec<u8>,
    tagger: &mut Tagger<'_>,
) -> anyhow::Result<Box<dyn SceneNode>> {
    let mut obj_reader = BufReader::new(Cursor::new(bytes));
    // Materials are replaced per surface anyway, so mtl files are not read
    let (models, _) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| async { Ok((Vec::new(), Default::default())) },
    )
    .await?;

    let mut root = ContainerNode::new(path);
    for model in models {
        let positions = model
            .mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let geometry = Geometry::new(positions, model.mesh.indices);
        root.add_child(Box::new(MeshNode::new(
            &model.name,
            tagger.tag(&model.name),
            geometry,
        )));
    }
    Ok(Box::new(root))
}
