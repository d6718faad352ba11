//! Selection tracking.
//!
//! [`SelectionState`] holds the selected and hovered surface; there is one
//! per session and only [`SelectionTracker`] mutates it. The tracker also
//! owns the highlight: it remembers the emissive colour a surface had before it
//! was highlighted and restores exactly that colour on revert. At most one
//! surface is highlighted at any time, and the previous highlight is always
//! reverted before the next one is applied.

use crate::{
    data_structures::{
        surface::{Surface, SurfaceId, SurfaceKind},
        texture::Color,
    },
    errors::{Result, ShowroomError},
    pick::ScreenPos,
    scene::SceneBackend,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectionState {
    selected: Option<Surface>,
    hovered: Option<Surface>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<Surface> {
        self.selected
    }

    pub fn hovered(&self) -> Option<Surface> {
        self.hovered
    }
}

/// Changes the UI has to reflect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionEvent {
    /// Show the texture panel for this kind, or hide the sidebar on `None`.
    SelectionChanged(Option<SurfaceKind>),
    /// Move or hide the tooltip.
    HoverChanged {
        kind: Option<SurfaceKind>,
        position: Option<ScreenPos>,
    },
}

#[derive(Debug, Clone)]
pub struct SelectionTracker {
    highlight: Color,
    /// Highlighted surface and the emissive colour it had before.
    highlighted: Option<(SurfaceId, Color)>,
    hover_position: Option<ScreenPos>,
}

impl SelectionTracker {
    pub fn new(highlight: Color) -> Self {
        Self {
            highlight,
            highlighted: None,
            hover_position: None,
        }
    }

    pub fn highlighted(&self) -> Option<SurfaceId> {
        self.highlighted.map(|(id, _)| id)
    }

    pub fn on_select<B: SceneBackend + ?Sized>(
        &mut self,
        state: &mut SelectionState,
        scene: &mut B,
        surface: Surface,
    ) -> Result<SelectionEvent> {
        let original = scene
            .emissive(surface.id)
            .ok_or(ShowroomError::UnknownSurface(surface.id))?;

        if self.highlighted() != Some(surface.id) {
            self.release_highlight(scene)?;
            scene.set_emissive(surface.id, self.highlight)?;
            self.highlighted = Some((surface.id, original));
        }
        state.selected = Some(surface);
        log::info!("Selected {:?} {:?}", surface.kind, surface.id);
        Ok(SelectionEvent::SelectionChanged(Some(surface.kind)))
    }

    pub fn on_deselect<B: SceneBackend + ?Sized>(
        &mut self,
        state: &mut SelectionState,
        scene: &mut B,
    ) -> Result<SelectionEvent> {
        self.release_highlight(scene)?;
        if let Some(previous) = state.selected.take() {
            log::info!("Deselected {:?} {:?}", previous.kind, previous.id);
        }
        Ok(SelectionEvent::SelectionChanged(None))
    }

    /// Revert the highlight but keep the selection.
    pub fn release_highlight<B: SceneBackend + ?Sized>(&mut self, scene: &mut B) -> Result<()> {
        match self.highlighted.take() {
            Some((id, original)) => scene.set_emissive(id, original),
            None => Ok(()),
        }
    }

    /// Update the hovered surface. Never touches the highlight.
    ///
    /// Returns `None` when nothing observable changed: repeated hovers over
    /// empty space, or the same surface at the same position.
    pub fn on_hover(
        &mut self,
        state: &mut SelectionState,
        surface: Option<Surface>,
        position: Option<ScreenPos>,
    ) -> Option<SelectionEvent> {
        let position = surface.and(position);
        if state.hovered == surface && self.hover_position == position {
            return None;
        }
        state.hovered = surface;
        self.hover_position = position;
        Some(SelectionEvent::HoverChanged {
            kind: surface.map(|surface| surface.kind),
            position,
        })
    }
}
