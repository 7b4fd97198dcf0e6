use glam::Vec2;
use winit::event::{ElementState, MouseButton, Touch, TouchPhase, WindowEvent};

/// Pointer state accumulated between ticks. Clicks are edges consumed with
/// take-style accessors; anything the user does with the pointer also counts
/// as an interaction for the idle timers.
pub struct Input {
    cursor_pos: Option<(f32, f32)>,
    left_pressed: bool,
    left_clicked: bool,
    interacted: bool,
    resized: Option<(u32, u32)>,
    close_requested: bool,
}

impl Input {
    pub fn new() -> Self {
        Self {
            cursor_pos: None,
            left_pressed: false,
            left_clicked: false,
            interacted: false,
            resized: None,
            close_requested: false,
        }
    }

    pub fn push(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::CursorPos { x, y } => {
                self.cursor_pos = Some((x, y));
                self.interacted = true;
            }
            InputEvent::MouseButton { button: MouseButton::Left, pressed } => {
                if pressed {
                    self.left_clicked = true;
                    self.left_pressed = true;
                } else {
                    self.left_pressed = false;
                }
                self.interacted = true;
            }
            InputEvent::MouseButton { .. } => {}
            InputEvent::Touch { x, y } => {
                self.cursor_pos = Some((x, y));
                self.left_clicked = true;
                self.interacted = true;
            }
            InputEvent::Resized { width, height } => {
                self.resized = Some((width, height));
            }
            InputEvent::CloseRequested => {
                self.close_requested = true;
            }
            InputEvent::Other => {}
        }
    }

    pub fn clear_frame(&mut self) {
        self.left_clicked = false;
        self.interacted = false;
        self.resized = None;
    }

    pub fn take_left_click(&mut self) -> bool {
        let was = self.left_clicked;
        self.left_clicked = false;
        was
    }

    pub fn take_interaction(&mut self) -> bool {
        let was = self.interacted;
        self.interacted = false;
        was
    }

    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.resized.take()
    }

    pub fn take_close_requested(&mut self) -> bool {
        let was = self.close_requested;
        self.close_requested = false;
        was
    }

    pub fn left_held(&self) -> bool {
        self.left_pressed
    }

    pub fn cursor_position(&self) -> Option<(f32, f32)> {
        self.cursor_pos
    }

    /// Cursor position mapped to normalized device coordinates, y up.
    pub fn cursor_ndc(&self, viewport: (u32, u32)) -> Option<Vec2> {
        let (x, y) = self.cursor_pos?;
        let (width, height) = viewport;
        if width == 0 || height == 0 {
            return None;
        }
        Some(Vec2::new(
            (x / width as f32) * 2.0 - 1.0,
            -((y / height as f32) * 2.0 - 1.0),
        ))
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    CursorPos { x: f32, y: f32 },
    MouseButton { button: MouseButton, pressed: bool },
    Touch { x: f32, y: f32 },
    Resized { width: u32, height: u32 },
    CloseRequested,
    Other,
}

impl InputEvent {
    pub fn from_window_event(ev: &WindowEvent) -> Self {
        match ev {
            WindowEvent::CursorMoved { position, .. } => {
                InputEvent::CursorPos { x: position.x as f32, y: position.y as f32 }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                InputEvent::MouseButton { button: *button, pressed: *state == ElementState::Pressed }
            }
            WindowEvent::Touch(Touch { phase: TouchPhase::Started, location, .. }) => {
                InputEvent::Touch { x: location.x as f32, y: location.y as f32 }
            }
            WindowEvent::Resized(size) => {
                InputEvent::Resized { width: size.width, height: size.height }
            }
            WindowEvent::CloseRequested => InputEvent::CloseRequested,
            _ => InputEvent::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_edge_is_consumed_once() {
        let mut input = Input::new();
        input.push(InputEvent::MouseButton { button: MouseButton::Left, pressed: true });
        assert!(input.take_left_click());
        assert!(!input.take_left_click());
        assert!(input.left_held());
    }

    #[test]
    fn touch_maps_to_cursor_and_click() {
        let mut input = Input::new();
        input.push(InputEvent::Touch { x: 10.0, y: 20.0 });
        assert_eq!(input.cursor_position(), Some((10.0, 20.0)));
        assert!(input.take_left_click());
        assert!(input.take_interaction());
    }

    #[test]
    fn ndc_conversion_centers_and_flips_y() {
        let mut input = Input::new();
        input.push(InputEvent::CursorPos { x: 640.0, y: 360.0 });
        let ndc = input.cursor_ndc((1280, 720)).expect("ndc");
        assert!(ndc.length() < 1e-5);
        input.push(InputEvent::CursorPos { x: 0.0, y: 0.0 });
        let ndc = input.cursor_ndc((1280, 720)).expect("ndc");
        assert_eq!(ndc, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn resize_is_taken_once() {
        let mut input = Input::new();
        input.push(InputEvent::Resized { width: 800, height: 600 });
        assert_eq!(input.take_resize(), Some((800, 600)));
        assert_eq!(input.take_resize(), None);
    }
}
