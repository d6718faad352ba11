//! Asset loading.
//!
//! Everything the showroom reads from outside goes through an [`AssetSource`]:
//! the room model, the environment map and the swatch textures. Natively the
//! files live below an `assets/` directory and are read with tokio; in the
//! browser they are fetched relative to the page origin with reqwest.
//!
//! - `mesh` turns glTF and OBJ files into a classified scene graph
//! - `texture` decodes swatch images and HDR environment maps
//! - `loading` is the startup barrier that waits for a fixed set of loads

use std::future::Future;

pub mod loading;
pub mod mesh;
pub mod texture;

pub trait AssetSource {
    /// Read the raw bytes of an asset.
    fn fetch(&self, path: &str) -> impl Future<Output = anyhow::Result<Vec<u8>>>;
}

/// Reads assets from the local `assets/` directory or the page origin.
#[derive(Debug, Clone)]
pub struct FileSource {
    #[cfg(not(target_arch = "wasm32"))]
    root: std::path::PathBuf,
}

impl FileSource {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new<P: Into<std::path::PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self {}
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for FileSource {
    fn default() -> Self {
        Self::new(std::path::Path::new("./").join("assets"))
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for FileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetSource for FileSource {
    async fn fetch(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        load_binary(self, path).await
    }
}

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    use anyhow::Context;

    let window = web_sys::window().context("no window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin unavailable"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

#[cfg(target_arch = "wasm32")]
async fn load_binary(_: &FileSource, file_name: &str) -> anyhow::Result<Vec<u8>> {
    let url = format_url(file_name)?;
    let response = reqwest::get(url).await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

#[cfg(not(target_arch = "wasm32"))]
async fn load_binary(source: &FileSource, file_name: &str) -> anyhow::Result<Vec<u8>> {
    use anyhow::Context;

    let path = source.root.join(file_name);
    tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

/// Directory part of an asset path, including the trailing slash.
pub(crate) fn parent_dir(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

/// File extension, lowercased.
pub(crate) fn extension(path: &str) -> Option<String> {
    let name = &path[parent_dir(path).len()..];
    name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_ignores_dots_in_directories() {
        assert_eq!(extension("rooms.v2/living"), None);
        assert_eq!(extension("rooms.v2/living.GLB").as_deref(), Some("glb"));
        assert_eq!(parent_dir("rooms/living.gltf"), "rooms/");
        assert_eq!(parent_dir("living.gltf"), "");
    }
}
