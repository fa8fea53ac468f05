//! Input records queued for the current scene.
//!
//! The window shell translates winit events into these plain records and
//! queues them; the current scene drains the queue once per frame before
//! any fixed steps run.

use cgmath::Vector3;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Press,
    Release,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    Key {
        code: KeyCode,
        action: InputAction,
    },
    /// Text produced by a key press, one record per character.
    Character(char),
    Pointer {
        button: MouseButton,
        action: InputAction,
        /// Window position of the cursor at click time, z unused.
        position: Vector3<f32>,
    },
    WindowResize {
        width: u32,
        height: u32,
    },
}
