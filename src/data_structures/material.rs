//! Per-mesh material slots.
//!
//! Every mesh owns exactly one [`SurfaceMaterial`], so highlighting or
//! retexturing one wall never bleeds into another mesh that happened to share
//! a material in the source file.

use crate::{
    data_structures::texture::{Color, TextureHandle},
    tiling::{MaterialDescriptor, MaterialParams},
};

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMaterial {
    /// Texture currently bound, possibly a framed variant.
    pub map: Option<TextureHandle>,
    /// Unframed texture `map` was derived from.
    pub source: Option<TextureHandle>,
    pub params: MaterialParams,
    pub emissive: Color,
    version: u64,
}

impl SurfaceMaterial {
    pub fn new() -> Self {
        Self {
            map: None,
            source: None,
            params: MaterialParams::identity(),
            emissive: Color::BLACK,
            version: 0,
        }
    }

    /// Swap map and tiling. Emissive is left alone so an active highlight survives.
    pub fn apply(&mut self, descriptor: MaterialDescriptor) {
        if let Some(map) = descriptor.map {
            self.map = Some(map);
            self.source = descriptor.source;
        }
        self.params = descriptor.params;
        self.version += 1;
    }

    /// Bumped on every material swap; renderers re-upload when it changes.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self::new()
    }
}
