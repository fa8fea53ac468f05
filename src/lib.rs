//! A small scene-driven rendering engine on wgpu and winit.
//!
//! Scenes implement [`movie::Scene`] and a [`scene_state::ScenePhysicsState`]
//! for their simulation data. A [`movie::Director`] runs them on a fixed
//! timestep with interpolated rendering, switching scenes through named
//! transitions. [`movie::run`] wires a director into a winit window with a
//! wgpu [`context::Context`].
//!
//! The simulation side (director, scene graph, geometry, batch planning,
//! text layout) is deliberately free of GPU types so it can run headless.

pub mod batch;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod geometry;
pub mod input;
pub mod movement;
pub mod movie;
pub mod particles;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene_state;
pub mod settings;
pub mod text;

pub use error::EngineError;
pub use movie::{Director, Movie, Scene, SceneConstructor, Transition, run};
pub use scene_state::{ScenePhysicsState, StatePair, copy_concrete};
pub use settings::Settings;

// winit types scene code commonly matches on
pub use winit::event::{ElementState, MouseButton};
pub use winit::keyboard::KeyCode;
