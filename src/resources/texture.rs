use crate::{
    data_structures::texture::{TextureHandle, TextureRef},
    resources::{AssetSource, extension},
};

/// Decode image bytes, trusting the file extension when it names a known format.
pub fn decode_image(path: &str, bytes: &[u8]) -> anyhow::Result<image::DynamicImage> {
    let format = extension(path).and_then(image::ImageFormat::from_extension);
    let image = match format {
        Some(format) => image::load_from_memory_with_format(bytes, format)?,
        None => image::load_from_memory(bytes)?,
    };
    Ok(image)
}

/// Load a swatch texture.
pub async fn load_texture<A: AssetSource>(
    source: &A,
    texture: &TextureRef,
) -> anyhow::Result<TextureHandle> {
    let bytes = source.fetch(texture.path()).await?;
    let image = decode_image(texture.path(), &bytes)?;
    log::info!(
        "Loaded texture {} ({}x{})",
        texture.path(),
        image.width(),
        image.height()
    );
    Ok(TextureHandle::new(texture.clone(), image))
}

/// Load an equirectangular HDR environment map. Pixels stay in linear float.
pub async fn load_environment<A: AssetSource>(
    source: &A,
    path: &str,
) -> anyhow::Result<TextureHandle> {
    let bytes = source.fetch(path).await?;
    let image = image::load_from_memory_with_format(&bytes, image::ImageFormat::Hdr)?;
    log::info!("Loaded environment {} ({}x{})", path, image.width(), image.height());
    Ok(TextureHandle::new(TextureRef::new(path), image))
}
