//! Textures and texture references.
//!
//! A [`TextureRef`] names a texture by asset path; a [`TextureHandle`] is the
//! decoded image behind it. Bordered variants are always derived from the
//! original decoded source, never from an already bordered handle, so that
//! re-applying a border yields the same image instead of a double frame.

use std::sync::Arc;

use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use crate::errors::{Result, ShowroomError};

/// 24-bit RGB colour, as used for emissive highlights and tile borders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::from_hex(0x000000);
    pub const WHITE: Color = Color::from_hex(0xFFFFFF);

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    pub fn to_hex(self) -> u32 {
        u32::from(self.r) << 16 | u32::from(self.g) << 8 | u32::from(self.b)
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

/// Asset path of a texture, relative to the asset root.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureRef(pub String);

impl TextureRef {
    pub fn new(path: &str) -> Self {
        Self(path.to_string())
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

/// Solid frame drawn around a tile image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BorderSpec {
    pub color: Color,
    pub width_px: u32,
}

/// A decoded texture.
///
/// Cloning is cheap: the pixels are shared. `border` records which frame, if
/// any, was composited onto `source` to produce `image`.
#[derive(Clone, Debug)]
pub struct TextureHandle {
    pub source: TextureRef,
    pub border: Option<BorderSpec>,
    pub image: Arc<DynamicImage>,
}

impl TextureHandle {
    pub fn new(source: TextureRef, image: DynamicImage) -> Self {
        Self {
            source,
            border: None,
            image: Arc::new(image),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Whether both handles share the same pixel buffer.
    pub fn same_pixels(&self, other: &TextureHandle) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
    }
}

impl PartialEq for TextureHandle {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.border == other.border && self.same_pixels(other)
    }
}

/// Wrap `image` in a solid frame of `border.width_px` pixels on every side.
///
/// The result is `2 * width_px` larger in both dimensions. The frame may be at
/// most as wide as the longer side of `image`; wider frames are rejected with
/// [`ShowroomError::InvalidBorder`] before anything is allocated.
pub fn compose_border(image: &DynamicImage, border: BorderSpec) -> Result<DynamicImage> {
    let (width, height) = image.dimensions();
    let frame = border.width_px;
    let max_px = width.max(height);
    let invalid = || ShowroomError::InvalidBorder {
        width_px: frame,
        max_px,
    };
    if frame > max_px {
        return Err(invalid());
    }
    let grow = |side: u32| frame.checked_mul(2).and_then(|both| side.checked_add(both));
    let (Some(canvas_width), Some(canvas_height)) = (grow(width), grow(height)) else {
        return Err(invalid());
    };
    let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, border.color.to_rgba());
    image::imageops::overlay(&mut canvas, &image.to_rgba8(), i64::from(frame), i64::from(frame));
    Ok(DynamicImage::ImageRgba8(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_frames_the_source() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255])));
        let border = BorderSpec {
            color: Color::from_hex(0xFF0000),
            width_px: 1,
        };
        let framed = compose_border(&source, border).unwrap().to_rgba8();
        assert_eq!(framed.dimensions(), (6, 4));
        assert_eq!(framed.get_pixel(0, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(framed.get_pixel(5, 3), &Rgba([255, 0, 0, 255]));
        assert_eq!(framed.get_pixel(1, 1), &Rgba([10, 20, 30, 255]));
        assert_eq!(framed.get_pixel(4, 2), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn oversized_border_is_rejected_before_allocating() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255])));
        for width_px in [5, 100_000, u32::MAX / 2 + 1, u32::MAX] {
            let border = BorderSpec {
                color: Color::WHITE,
                width_px,
            };
            assert_eq!(
                compose_border(&source, border).unwrap_err(),
                ShowroomError::InvalidBorder { width_px, max_px: 4 }
            );
        }
        let widest = BorderSpec {
            color: Color::WHITE,
            width_px: 4,
        };
        assert_eq!(compose_border(&source, widest).unwrap().dimensions(), (12, 10));
    }

    #[test]
    fn hex_round_trip_of_highlight() {
        let highlight = Color::from_hex(0xE56262);
        assert_eq!((highlight.r, highlight.g, highlight.b), (0xE5, 0x62, 0x62));
        assert_eq!(highlight.to_hex(), 0xE56262);
    }
}
