//! UI collaborator seam.
//!
//! The sidebar and tooltip are rendered outside this crate. The core pushes
//! state changes into a [`UiSink`] and receives user intents as [`UiIntent`]s.
//! [`Sidebar`] is a ready-made sink that keeps the view model a DOM (or an
//! immediate-mode GUI) renders from.

use crate::{
    config::ShowroomConfig,
    data_structures::surface::SurfaceKind,
    errors::ShowroomError,
    pick::ScreenPos,
    selection::SelectionEvent,
    tiling::TileSpec,
};

pub trait UiSink {
    /// Show the texture panel matching `kind`, or hide the sidebar on `None`.
    fn selection_changed(&mut self, kind: Option<SurfaceKind>);

    /// Position the tooltip over a surface, or hide it on `None`.
    fn hover_changed(&mut self, kind: Option<SurfaceKind>, position: Option<ScreenPos>);

    /// Tell the user something failed. Never fatal.
    fn notice(&mut self, error: &ShowroomError);

    /// The hide/show button was pressed.
    fn toggle_sidebar(&mut self) {}
}

/// Forward a tracker event to the matching sink method.
pub fn dispatch<U: UiSink + ?Sized>(ui: &mut U, event: SelectionEvent) {
    match event {
        SelectionEvent::SelectionChanged(kind) => ui.selection_changed(kind),
        SelectionEvent::HoverChanged { kind, position } => ui.hover_changed(kind, position),
    }
}

/// What the user asked for through the sidebar.
#[derive(Debug, Clone, PartialEq)]
pub enum UiIntent {
    /// A swatch of the catalog was clicked.
    TextureChosen(String),
    /// New physical tile size; keeps the current border.
    TileSizeChosen { width: f32, height: f32 },
    /// New tile size and border in one go.
    TileSpecChosen(TileSpec),
    DeselectRequested,
    /// The hide/show button of the sidebar.
    ToggleSidebar,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub text: &'static str,
    pub left: f32,
    pub top: f32,
}

/// Sidebar and tooltip view model.
#[derive(Debug, Clone, PartialEq)]
pub struct Sidebar {
    visible: bool,
    panel: Option<SurfaceKind>,
    tooltip: Option<Tooltip>,
    notices: Vec<String>,
    tooltip_offset: (f32, f32),
}

impl Sidebar {
    pub fn new(config: &ShowroomConfig) -> Self {
        Self {
            visible: false,
            panel: None,
            tooltip: None,
            notices: Vec::new(),
            tooltip_offset: config.tooltip_offset,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Texture panel shown inside the sidebar: walls or floors.
    pub fn panel(&self) -> Option<SurfaceKind> {
        self.panel
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }
}

impl UiSink for Sidebar {
    fn selection_changed(&mut self, kind: Option<SurfaceKind>) {
        self.visible = kind.is_some();
        if kind.is_some() {
            self.panel = kind;
        }
    }

    fn hover_changed(&mut self, kind: Option<SurfaceKind>, position: Option<ScreenPos>) {
        self.tooltip = match (kind, position) {
            (Some(kind), Some(position)) if kind.is_classified() => Some(Tooltip {
                text: kind.label(),
                left: position.x + self.tooltip_offset.0,
                top: position.y + self.tooltip_offset.1,
            }),
            _ => None,
        };
    }

    fn notice(&mut self, error: &ShowroomError) {
        self.notices.push(error.to_string());
    }

    fn toggle_sidebar(&mut self) {
        self.toggle();
    }
}
