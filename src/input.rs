//! Translation of winit window events into showroom actions.

use winit::{
    dpi::PhysicalPosition,
    event::{MouseButton, WindowEvent},
};

use crate::{
    camera::Viewport,
    controller::InteractionController,
    pick::ScreenPos,
    scene::SceneBackend,
    timing::Clock,
    ui::UiSink,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButtonState {
    Left,
    Right,
    #[default]
    None,
}

/// Last known cursor position and pressed button.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub coords: PhysicalPosition<f64>,
    pub pressed: MouseButtonState,
}

impl MouseState {
    pub fn position(&self) -> ScreenPos {
        ScreenPos::new(self.coords.x as f32, self.coords.y as f32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    Down(ScreenPos),
    Move(ScreenPos),
    Leave,
    Resize(Viewport),
}

#[derive(Debug, Default)]
pub struct PointerInput {
    mouse: MouseState,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mouse(&self) -> &MouseState {
        &self.mouse
    }

    /// Map a window event to the action it triggers, if any.
    pub fn translate(&mut self, event: &WindowEvent) -> Option<PointerAction> {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse.coords = *position;
                Some(PointerAction::Move(self.mouse.position()))
            }
            WindowEvent::CursorLeft { .. } => Some(PointerAction::Leave),
            WindowEvent::Resized(size) => {
                Some(PointerAction::Resize(Viewport::new(size.width, size.height)))
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => match (button, button_state.is_pressed()) {
                (MouseButton::Left, true) => {
                    self.mouse.pressed = MouseButtonState::Left;
                    Some(PointerAction::Down(self.mouse.position()))
                }
                (MouseButton::Right, true) => {
                    self.mouse.pressed = MouseButtonState::Right;
                    None
                }
                (_, false) => {
                    self.mouse.pressed = MouseButtonState::None;
                    None
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Translate and forward to the controller in one go.
    pub fn handle<S: SceneBackend, U: UiSink, C: Clock>(
        &mut self,
        controller: &mut InteractionController<S, U, C>,
        event: &WindowEvent,
    ) -> Option<PointerAction> {
        let action = self.translate(event)?;
        match action {
            PointerAction::Down(pos) => {
                controller.pointer_down(pos);
            }
            PointerAction::Move(pos) => {
                controller.pointer_move(pos);
            }
            PointerAction::Leave => controller.pointer_left(),
            PointerAction::Resize(viewport) => controller.resize(viewport),
        }
        Some(action)
    }
}
