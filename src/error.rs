//! Engine error taxonomy.
//!
//! Logic errors are invariant violations (programmer or configuration
//! mistakes) and are not recoverable at runtime: they propagate up and end
//! the run. Resource errors (missing files, device creation) are surfaced
//! through `anyhow` at the application boundary. Warnings (a failed glyph,
//! a zero-instance draw) are logged and the unit of work is skipped.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("mesh submission has no data")]
    MeshHasNoData,

    #[error("mesh submission has both vec3 and vec4 data")]
    MeshHasBothKinds,

    #[error("mesh data not set")]
    MeshDataUnset,

    #[error("batch cannot hold both vec3 and vec4 submissions")]
    MixedVertexKinds,

    #[error("batch is already prepared and immutable")]
    BatchSealed,

    #[error("scene graph node `{0}` already has a parent")]
    NodeAlreadyParented(String),

    #[error("scene graph node `{0}` is not ready for render")]
    NodeNotReady(String),

    #[error("scene state type mismatch: expected `{expected}`, found `{found}`")]
    StateTypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("unknown scene `{0}`")]
    UnknownScene(String),

    #[error("scene `{0}` is already registered")]
    DuplicateScene(String),

    #[error("`{0}` is a reserved transition target, not a scene name")]
    ReservedSceneName(String),

    #[error("no current scene")]
    NoCurrentScene,

    #[error("no triangles generated for text `{0}`")]
    EmptyText(String),

    #[error("font atlas has no glyphs")]
    EmptyAtlas,

    #[error("particle colours need positions set to calculate the divisor")]
    ColoursBeforePositions,
}
