//! Material parameter engine.
//!
//! Turns a user-requested physical tile size into UV repeat/offset factors
//! for a wall or floor. Each kind is normalized against its own reference
//! tile (walls are portrait, floors landscape), and the relationship is
//! inverse: a larger physical tile means fewer repeats across the surface.
//!
//! ```text
//! repeat_x = reference.width  / tile.width
//! repeat_y = reference.height / tile.height
//! ```
//!
//! When the tile carries a border the engine also produces a framed variant of
//! the texture through an [`ImageCompositor`]. Framed variants are always
//! derived from the unframed source image, and only the most recent one per
//! source texture is cached.

use std::collections::HashMap;

use image::DynamicImage;

use crate::{
    config::ShowroomConfig,
    data_structures::{
        surface::SurfaceKind,
        texture::{BorderSpec, Color, TextureHandle, TextureRef, compose_border},
    },
    errors::{Result, ShowroomError},
};

/// Smallest repeat ever emitted. Keeps huge tiles from collapsing the UV transform.
pub const MIN_REPEAT: f32 = 1.0e-3;
/// Largest repeat ever emitted. Keeps microscopic tiles from producing infinities.
pub const MAX_REPEAT: f32 = 4096.0;

/// Requested physical tile size, in the same unit as the reference tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileSpec {
    pub width: f32,
    pub height: f32,
    pub border: Option<BorderSpec>,
}

impl TileSpec {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            border: None,
        }
    }

    pub fn with_border(mut self, color: Color, width_px: u32) -> Self {
        self.border = Some(BorderSpec { color, width_px });
        self
    }

    /// Rejects zero, negative and NaN dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.width > 0.0 && self.height > 0.0 {
            Ok(())
        } else {
            Err(ShowroomError::InvalidTileSpec {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// The border to composite, if it would be visible at all.
    pub fn visible_border(&self) -> Option<BorderSpec> {
        self.border.filter(|border| border.width_px > 0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceTile {
    pub width: f32,
    pub height: f32,
}

/// Baseline tile per kind that maps to a repeat of exactly one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReferenceTiles {
    pub wall: ReferenceTile,
    pub floor: ReferenceTile,
}

impl ReferenceTiles {
    pub fn get(&self, kind: SurfaceKind) -> Result<ReferenceTile> {
        match kind {
            SurfaceKind::Wall => Ok(self.wall),
            SurfaceKind::Floor => Ok(self.floor),
            SurfaceKind::Unclassified => Err(ShowroomError::UnsupportedSurface(kind)),
        }
    }
}

impl Default for ReferenceTiles {
    fn default() -> Self {
        Self {
            wall: ReferenceTile {
                width: 200.0,
                height: 350.0,
            },
            floor: ReferenceTile {
                width: 350.0,
                height: 200.0,
            },
        }
    }
}

/// Where the tile grid is pinned on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TileAnchor {
    /// Grid starts at UV (0, 0); a partial tile ends up on the far edges.
    #[default]
    Origin,
    /// A tile is centred on the surface; partial tiles are split evenly on both edges.
    Center,
}

impl TileAnchor {
    fn offset(self, repeat: f32) -> f32 {
        match self {
            TileAnchor::Origin => 0.0,
            TileAnchor::Center => (0.5 - 0.5 * repeat).rem_euclid(1.0),
        }
    }
}

/// UV transform of a tiled surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    pub repeat_x: f32,
    pub repeat_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub filter: wgpu::FilterMode,
}

impl MaterialParams {
    /// Untiled: the texture is stretched once across the surface.
    pub fn identity() -> Self {
        Self {
            repeat_x: 1.0,
            repeat_y: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            filter: wgpu::FilterMode::Linear,
        }
    }

    pub fn to_raw(&self) -> TileRaw {
        TileRaw {
            repeat: [self.repeat_x, self.repeat_y],
            offset: [self.offset_x, self.offset_y],
        }
    }

    /// Repeat-wrapping sampler matching these parameters.
    pub fn sampler_descriptor(&self) -> wgpu::SamplerDescriptor<'static> {
        wgpu::SamplerDescriptor {
            label: Some("Tiled surface sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: self.filter,
            min_filter: self.filter,
            ..Default::default()
        }
    }
}

/// The UV transform as the surface shader's uniform expects it.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TileRaw {
    pub repeat: [f32; 2],
    pub offset: [f32; 2],
}

/// Derive the UV transform for `kind` tiled with `tile`.
///
/// Pure: identical inputs always produce bit-identical outputs.
pub fn compute_params(
    kind: SurfaceKind,
    tile: &TileSpec,
    references: &ReferenceTiles,
    anchor: TileAnchor,
    filter: wgpu::FilterMode,
) -> Result<MaterialParams> {
    tile.validate()?;
    let reference = references.get(kind)?;
    let repeat_x = (reference.width / tile.width).clamp(MIN_REPEAT, MAX_REPEAT);
    let repeat_y = (reference.height / tile.height).clamp(MIN_REPEAT, MAX_REPEAT);
    Ok(MaterialParams {
        repeat_x,
        repeat_y,
        offset_x: anchor.offset(repeat_x),
        offset_y: anchor.offset(repeat_y),
        filter,
    })
}

/// Produces framed texture variants. Implemented by whatever owns image processing.
pub trait ImageCompositor {
    /// Fails with [`ShowroomError::InvalidBorder`] when the frame cannot be built.
    fn with_border(&self, source: &DynamicImage, border: BorderSpec) -> Result<DynamicImage>;
}

/// CPU compositor backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameCompositor;

impl ImageCompositor for FrameCompositor {
    fn with_border(&self, source: &DynamicImage, border: BorderSpec) -> Result<DynamicImage> {
        compose_border(source, border)
    }
}

/// Everything a renderer needs to swap a surface's material.
///
/// `map` is `None` when only the tiling changes and the current map stays bound.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDescriptor {
    pub map: Option<TextureHandle>,
    pub source: Option<TextureHandle>,
    pub params: MaterialParams,
}

pub struct MaterialEngine<C: ImageCompositor = FrameCompositor> {
    references: ReferenceTiles,
    anchor: TileAnchor,
    filter: wgpu::FilterMode,
    compositor: C,
    framed: HashMap<TextureRef, TextureHandle>,
}

impl MaterialEngine<FrameCompositor> {
    pub fn new(config: &ShowroomConfig) -> Self {
        Self::with_compositor(config, FrameCompositor)
    }
}

impl<C: ImageCompositor> MaterialEngine<C> {
    pub fn with_compositor(config: &ShowroomConfig, compositor: C) -> Self {
        Self {
            references: config.reference_tiles,
            anchor: config.anchor,
            filter: config.filter,
            compositor,
            framed: HashMap::new(),
        }
    }

    pub fn references(&self) -> &ReferenceTiles {
        &self.references
    }

    pub fn compute_params(&self, kind: SurfaceKind, tile: &TileSpec) -> Result<MaterialParams> {
        compute_params(kind, tile, &self.references, self.anchor, self.filter)
    }

    /// Build the material for `kind` tiled with `tile`, using the unframed `source` texture.
    ///
    /// Fails without side effects when the tile spec or its border is invalid.
    pub fn prepare(
        &mut self,
        kind: SurfaceKind,
        tile: &TileSpec,
        source: Option<&TextureHandle>,
    ) -> Result<MaterialDescriptor> {
        let params = self.compute_params(kind, tile)?;
        let map = match (source, tile.visible_border()) {
            (Some(source), Some(border)) => Some(self.framed_variant(source, border)?),
            (Some(source), None) => Some(source.clone()),
            (None, Some(_)) => {
                log::warn!("Border requested but the surface has no texture to frame");
                None
            }
            (None, None) => None,
        };
        log::debug!(
            "Tiling {:?} with {}x{}: repeat ({:.3}, {:.3}) offset ({:.3}, {:.3})",
            kind,
            tile.width,
            tile.height,
            params.repeat_x,
            params.repeat_y,
            params.offset_x,
            params.offset_y
        );
        Ok(MaterialDescriptor {
            map,
            source: source.cloned(),
            params,
        })
    }

    fn framed_variant(&mut self, source: &TextureHandle, border: BorderSpec) -> Result<TextureHandle> {
        debug_assert!(source.border.is_none(), "framing must start from the source image");
        if let Some(framed) = self
            .framed
            .get(&source.source)
            .filter(|framed| framed.border == Some(border))
        {
            return Ok(framed.clone());
        }
        let image = self.compositor.with_border(&source.image, border)?;
        let mut framed = TextureHandle::new(source.source.clone(), image);
        framed.border = Some(border);
        if let Some(stale) = self.framed.insert(source.source.clone(), framed.clone()) {
            log::debug!(
                "Replaced framed variant of {} ({:?} -> {:?})",
                source.source.path(),
                stale.border,
                framed.border
            );
        }
        Ok(framed)
    }

    /// Number of framed variants currently kept; at most one per source texture.
    pub fn cached_variants(&self) -> usize {
        self.framed.len()
    }

    /// Hand over every cached framed variant, leaving the cache empty.
    pub fn drain_cache(&mut self) -> Vec<TextureHandle> {
        self.framed.drain().map(|(_, framed)| framed).collect()
    }

    /// Forget cached framed variants, e.g. when the source textures are released.
    pub fn clear_cache(&mut self) -> usize {
        self.drain_cache().len()
    }
}
