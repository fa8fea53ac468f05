//! Core data carriers shared by scenes and renderers.

pub mod instance;
pub mod instanced;
pub mod mesh_data;
pub mod model;
pub mod scene_graph;
pub mod texture;
