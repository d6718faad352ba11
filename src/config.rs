//! Showroom configuration.
//!
//! All startup parameters are compile-time constants: the defaults below
//! describe the living room variant, and the `with_*` methods adjust them for
//! other rooms before the showroom is loaded.

use instant::Duration;

use crate::{
    data_structures::{
        surface::{ClassifierRules, SurfaceKind},
        texture::{Color, TextureRef},
    },
    tiling::{ReferenceTiles, TileAnchor},
};

#[derive(Clone, Debug, PartialEq)]
pub struct ShowroomConfig {
    /// Emissive colour applied to the selected surface.
    pub highlight: Color,
    /// Minimum spacing of hover picks driven by pointer movement.
    pub hover_interval: Duration,
    /// Quiet period after the last resize before the viewport snapshot is updated.
    pub resize_quiet_period: Duration,
    pub reference_tiles: ReferenceTiles,
    /// Repeat used for a kind until the user picks a tile size for it.
    pub initial_repeat: f32,
    pub anchor: TileAnchor,
    pub filter: wgpu::FilterMode,
    pub classifier: ClassifierRules,
    /// Tooltip distance from the cursor in pixels.
    pub tooltip_offset: (f32, f32),
    /// Drop the highlight (but keep the selection) after a texture was applied.
    pub release_highlight_on_apply: bool,
    /// Load every catalog texture as part of the startup join.
    pub preload_textures: bool,
}

impl ShowroomConfig {
    pub fn with_highlight(mut self, highlight: Color) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_hover_interval(mut self, interval: Duration) -> Self {
        self.hover_interval = interval;
        self
    }

    pub fn with_resize_quiet_period(mut self, period: Duration) -> Self {
        self.resize_quiet_period = period;
        self
    }

    pub fn with_reference_tiles(mut self, reference_tiles: ReferenceTiles) -> Self {
        self.reference_tiles = reference_tiles;
        self
    }

    pub fn with_initial_repeat(mut self, repeat: f32) -> Self {
        self.initial_repeat = repeat;
        self
    }

    pub fn with_anchor(mut self, anchor: TileAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_filter(mut self, filter: wgpu::FilterMode) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_classifier(mut self, classifier: ClassifierRules) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_tooltip_offset(mut self, x: f32, y: f32) -> Self {
        self.tooltip_offset = (x, y);
        self
    }

    pub fn with_release_highlight_on_apply(mut self, release: bool) -> Self {
        self.release_highlight_on_apply = release;
        self
    }

    pub fn with_preload_textures(mut self, preload: bool) -> Self {
        self.preload_textures = preload;
        self
    }
}

impl Default for ShowroomConfig {
    fn default() -> Self {
        Self {
            highlight: Color::from_hex(0xE56262),
            hover_interval: Duration::from_millis(100),
            resize_quiet_period: Duration::from_millis(200),
            reference_tiles: ReferenceTiles::default(),
            initial_repeat: 3.0,
            anchor: TileAnchor::Origin,
            filter: wgpu::FilterMode::Linear,
            classifier: ClassifierRules::default(),
            tooltip_offset: (10.0, 10.0),
            release_highlight_on_apply: false,
            preload_textures: true,
        }
    }
}

/// A texture the sidebar offers for one kind of surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Swatch {
    pub id: String,
    pub texture: TextureRef,
    pub kind: SurfaceKind,
}

impl Swatch {
    pub fn new(id: &str, path: &str, kind: SurfaceKind) -> Self {
        Self {
            id: id.to_string(),
            texture: TextureRef::new(path),
            kind,
        }
    }
}

/// Which files make up a showroom variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetManifest {
    pub model: String,
    pub environment: Option<String>,
    pub swatches: Vec<Swatch>,
}

impl AssetManifest {
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            environment: None,
            swatches: Vec::new(),
        }
    }

    pub fn with_environment(mut self, path: &str) -> Self {
        self.environment = Some(path.to_string());
        self
    }

    pub fn with_swatch(mut self, swatch: Swatch) -> Self {
        self.swatches.push(swatch);
        self
    }

    pub fn swatch(&self, id: &str) -> Option<&Swatch> {
        self.swatches.iter().find(|swatch| swatch.id == id)
    }

    /// Swatches offered for one kind, in catalog order.
    pub fn swatches_for(&self, kind: SurfaceKind) -> impl Iterator<Item = &Swatch> {
        self.swatches.iter().filter(move |swatch| swatch.kind == kind)
    }

    /// The living room variant: glTF room lit by an HDR environment.
    pub fn living_room() -> Self {
        Self::new("livingroom-good-sample.gltf").with_environment("montorfano_4k.hdr")
    }
}
