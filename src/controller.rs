//! Interaction controller.
//!
//! Wires the picker, the selection tracker and the material engine together
//! and drives them from pointer, resize and sidebar events:
//!
//! - pointer down: pick, then select on a hit or deselect on a miss (never throttled)
//! - pointer move: pick, then hover (throttled, trailing edge delivered by [`InteractionController::tick`])
//! - resize: debounced, the viewport snapshot used for picking is updated once the window settles
//! - texture / tile size chosen: retile and retexture the current selection, if any
//!
//! The controller owns the selection state. The scene and the UI are
//! collaborators it talks to through [`SceneBackend`] and [`UiSink`].

use std::collections::HashMap;

use crate::{
    camera::Viewport,
    config::{ShowroomConfig, Swatch},
    data_structures::{
        surface::{Surface, SurfaceKind},
        texture::TextureHandle,
    },
    errors::{Result, ShowroomError},
    pick::{PickResult, ScreenPos, pick},
    scene::SceneBackend,
    selection::{SelectionState, SelectionTracker},
    tiling::{MaterialEngine, MaterialParams, TileSpec},
    timing::{Clock, Debounce, Throttle},
    ui::{self, UiIntent, UiSink},
};

/// Why a sidebar action did not change any material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoSelection,
    /// The swatch is meant for another kind of surface than the selected one.
    KindMismatch {
        selected: SurfaceKind,
        requested: SurfaceKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ApplyOutcome {
    Applied {
        surface: Surface,
        params: MaterialParams,
    },
    Ignored(IgnoreReason),
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied { .. })
    }
}

pub struct InteractionController<S: SceneBackend, U: UiSink, C: Clock> {
    scene: S,
    ui: U,
    clock: C,
    state: SelectionState,
    tracker: SelectionTracker,
    engine: MaterialEngine,
    hover: Throttle<ScreenPos>,
    resize: Debounce<Viewport>,
    viewport: Viewport,
    tiles: HashMap<SurfaceKind, TileSpec>,
    release_highlight_on_apply: bool,
}

impl<S: SceneBackend, U: UiSink, C: Clock> InteractionController<S, U, C> {
    pub fn new(config: &ShowroomConfig, scene: S, ui: U, clock: C, viewport: Viewport) -> Self {
        let repeat = config.initial_repeat.max(f32::MIN_POSITIVE);
        let tiles = [SurfaceKind::Wall, SurfaceKind::Floor]
            .into_iter()
            .filter_map(|kind| {
                let reference = config.reference_tiles.get(kind).ok()?;
                Some((
                    kind,
                    TileSpec::new(reference.width / repeat, reference.height / repeat),
                ))
            })
            .collect();

        let mut scene = scene;
        scene.resize(viewport);
        Self {
            scene,
            ui,
            clock,
            state: SelectionState::new(),
            tracker: SelectionTracker::new(config.highlight),
            engine: MaterialEngine::new(config),
            hover: Throttle::new(config.hover_interval),
            resize: Debounce::new(config.resize_quiet_period),
            viewport,
            tiles,
            release_highlight_on_apply: config.release_highlight_on_apply,
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }

    pub fn engine(&self) -> &MaterialEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MaterialEngine {
        &mut self.engine
    }

    /// Viewport snapshot the picker currently works with.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Tile spec the next texture of `kind` will be applied with.
    pub fn tile_spec(&self, kind: SurfaceKind) -> Option<&TileSpec> {
        self.tiles.get(&kind)
    }

    pub fn into_parts(self) -> (S, U) {
        (self.scene, self.ui)
    }

    fn pick_at(&self, pos: ScreenPos) -> PickResult {
        pick(
            pos,
            self.viewport,
            self.scene.camera(),
            self.scene.projection(),
            self.scene.root(),
        )
    }

    /// Select whatever is under the pointer, or deselect on empty space.
    pub fn pointer_down(&mut self, pos: ScreenPos) -> PickResult {
        let hit = self.pick_at(pos);
        let event = match hit.surface {
            Some(surface) => self
                .tracker
                .on_select(&mut self.state, &mut self.scene, surface),
            None => self.tracker.on_deselect(&mut self.state, &mut self.scene),
        };
        match event {
            Ok(event) => ui::dispatch(&mut self.ui, event),
            Err(err) => self.report(err),
        }
        hit
    }

    /// Returns the pick when the throttle let this move through.
    pub fn pointer_move(&mut self, pos: ScreenPos) -> Option<PickResult> {
        let pos = self.hover.submit(self.clock.now(), pos)?;
        Some(self.hover_at(pos))
    }

    /// The pointer left the canvas: hide the tooltip right away.
    pub fn pointer_left(&mut self) {
        self.hover.cancel();
        if let Some(event) = self.tracker.on_hover(&mut self.state, None, None) {
            ui::dispatch(&mut self.ui, event);
        }
    }

    fn hover_at(&mut self, pos: ScreenPos) -> PickResult {
        let hit = self.pick_at(pos);
        if let Some(event) = self.tracker.on_hover(&mut self.state, hit.surface, Some(pos)) {
            ui::dispatch(&mut self.ui, event);
        }
        hit
    }

    /// Queue a canvas resize. Applied by [`tick`](Self::tick) once resizing stops.
    pub fn resize(&mut self, viewport: Viewport) {
        self.resize.submit(self.clock.now(), viewport);
    }

    /// Deliver deferred work whose timer has expired. Call once per frame.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        if let Some(viewport) = self.resize.poll(now) {
            log::debug!("Viewport settled at {}x{}", viewport.width, viewport.height);
            self.viewport = viewport;
            self.scene.resize(viewport);
        }
        if let Some(pos) = self.hover.poll(now) {
            self.hover_at(pos);
        }
    }

    /// The surface a swatch would be applied to, or why it would be ignored.
    pub fn target_for(&self, swatch: &Swatch) -> std::result::Result<Surface, IgnoreReason> {
        let selected = self.state.selected().ok_or(IgnoreReason::NoSelection)?;
        if selected.kind != swatch.kind {
            return Err(IgnoreReason::KindMismatch {
                selected: selected.kind,
                requested: swatch.kind,
            });
        }
        Ok(selected)
    }

    /// Apply an already loaded swatch texture to the selection.
    pub fn texture_chosen(&mut self, swatch: &Swatch, texture: TextureHandle) -> Result<ApplyOutcome> {
        let surface = match self.target_for(swatch) {
            Ok(surface) => surface,
            Err(reason) => return Ok(self.ignore(reason)),
        };
        let result = self
            .current_tile(surface.kind)
            .and_then(|tile| self.apply(surface, &tile, Some(&texture)));
        self.reported(result)
    }

    /// New physical tile size for the selection; the border stays as it was.
    pub fn tile_size_chosen(&mut self, width: f32, height: f32) -> Result<ApplyOutcome> {
        let border = self
            .state
            .selected()
            .and_then(|surface| self.tiles.get(&surface.kind))
            .and_then(|tile| tile.border);
        self.tile_spec_chosen(TileSpec {
            width,
            height,
            border,
        })
    }

    /// New tile spec for the selection. Invalid specs leave everything untouched.
    pub fn tile_spec_chosen(&mut self, tile: TileSpec) -> Result<ApplyOutcome> {
        let Some(surface) = self.state.selected() else {
            return Ok(self.ignore(IgnoreReason::NoSelection));
        };
        let source = self.scene.texture_source(surface.id);
        let result = tile
            .validate()
            .and_then(|_| self.apply(surface, &tile, source.as_ref()));
        let outcome = self.reported(result)?;
        self.tiles.insert(surface.kind, tile);
        Ok(outcome)
    }

    pub fn deselect_requested(&mut self) {
        match self.tracker.on_deselect(&mut self.state, &mut self.scene) {
            Ok(event) => ui::dispatch(&mut self.ui, event),
            Err(err) => self.report(err),
        }
    }

    /// Handle every sidebar intent that does not need a texture load.
    ///
    /// `TextureChosen` needs the asset loader and is answered with
    /// [`ShowroomError::UnknownSwatch`]; route it through `Showroom` instead.
    pub fn handle_intent(&mut self, intent: UiIntent) -> Result<Option<ApplyOutcome>> {
        match intent {
            UiIntent::TileSizeChosen { width, height } => {
                self.tile_size_chosen(width, height).map(Some)
            }
            UiIntent::TileSpecChosen(tile) => self.tile_spec_chosen(tile).map(Some),
            UiIntent::DeselectRequested => {
                self.deselect_requested();
                Ok(None)
            }
            UiIntent::ToggleSidebar => {
                self.ui.toggle_sidebar();
                Ok(None)
            }
            UiIntent::TextureChosen(id) => Err(ShowroomError::UnknownSwatch(id)),
        }
    }

    /// Log a failure and show it to the user.
    pub fn report(&mut self, err: ShowroomError) {
        log::error!("{}", err);
        self.ui.notice(&err);
    }

    fn reported<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.report(err.clone());
        }
        result
    }

    fn current_tile(&self, kind: SurfaceKind) -> Result<TileSpec> {
        match self.tiles.get(&kind) {
            Some(tile) => Ok(*tile),
            None => Err(ShowroomError::UnsupportedSurface(kind)),
        }
    }

    fn apply(
        &mut self,
        surface: Surface,
        tile: &TileSpec,
        source: Option<&TextureHandle>,
    ) -> Result<ApplyOutcome> {
        let descriptor = self.engine.prepare(surface.kind, tile, source)?;
        let params = descriptor.params;
        self.scene.apply_material(surface.id, descriptor)?;
        if self.release_highlight_on_apply {
            self.tracker.release_highlight(&mut self.scene)?;
        }
        log::info!(
            "Applied {}x{} tiling to {:?} {:?}",
            tile.width,
            tile.height,
            surface.kind,
            surface.id
        );
        Ok(ApplyOutcome::Applied { surface, params })
    }

    /// Log why a sidebar action is dropped.
    pub fn ignore(&self, reason: IgnoreReason) -> ApplyOutcome {
        match reason {
            IgnoreReason::NoSelection => log::debug!("Nothing selected, ignoring material change"),
            IgnoreReason::KindMismatch {
                selected,
                requested,
            } => log::warn!(
                "Texture type mismatch: selected {:?} but texture is for {:?}",
                selected,
                requested
            ),
        }
        ApplyOutcome::Ignored(reason)
    }
}
