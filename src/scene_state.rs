//! Double-buffered scene physics state.
//!
//! Each scene owns a [`StatePair`]: the state being advanced by fixed time
//! steps and a copy of the state one step behind. Rendering interpolates
//! between the two so motion stays smooth at any display rate.

use std::any::Any;
use std::time::Duration;

use crate::camera::Camera;
use crate::error::EngineError;
use crate::input::UserInput;
use crate::movie::Transition;

/// Mutable simulation state of a scene, advanced on the fixed timestep.
///
/// Implementations are concrete per scene; the trait moves them around as
/// trait objects. Cloning and copying go through the trait so a pair of
/// states can be kept in sync without the caller knowing the concrete type.
pub trait ScenePhysicsState: Any {
    fn setup(&mut self) {}

    /// React to one queued input record. May request a transition. Returns
    /// whether the input was consumed; unconsumed records are dropped.
    fn process_user_commands(
        &mut self,
        _input: &UserInput,
        _transition: &mut Transition,
        _camera: &mut Camera,
    ) -> bool {
        false
    }

    /// Advance by one fixed step. May request a transition.
    fn fixed_time_step(&mut self, _transition: &mut Transition, _dt: Duration) {}

    /// Per-frame update with the real elapsed time. Runs after any fixed
    /// steps and after activation, on the current state only.
    fn variable_time_step(&mut self, _dt: Duration) {}

    /// Blend `previous` and `current` into `self` with the given weights.
    /// `self` starts out as a clone of `current`.
    fn interpolate_ratio(
        &mut self,
        _previous: &dyn ScenePhysicsState,
        _mult_prev: f64,
        _current: &dyn ScenePhysicsState,
        _mult_curr: f64,
    ) -> Result<(), EngineError> {
        Ok(())
    }

    fn clone_state(&self) -> Box<dyn ScenePhysicsState>;

    /// Overwrite `self` with `other`, which must be the same concrete type.
    fn copy_from(&mut self, other: &dyn ScenePhysicsState) -> Result<(), EngineError>;

    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;
}

/// Downcast-and-clone helper implementations of
/// [`ScenePhysicsState::copy_from`] delegate to. Produces the typed
/// mismatch error when `src` is a different state.
pub fn copy_concrete<T: ScenePhysicsState + Clone>(
    dst: &mut T,
    src: &dyn ScenePhysicsState,
) -> Result<(), EngineError> {
    match src.as_any().downcast_ref::<T>() {
        Some(concrete) => {
            dst.clone_from(concrete);
            Ok(())
        }
        None => Err(EngineError::StateTypeMismatch {
            expected: std::any::type_name::<T>(),
            found: src.type_name(),
        }),
    }
}

/// The current and previous state of one scene.
pub struct StatePair {
    current: Box<dyn ScenePhysicsState>,
    previous: Box<dyn ScenePhysicsState>,
}

impl StatePair {
    /// Both halves start equal so the first interpolation is well defined.
    pub fn new(state: Box<dyn ScenePhysicsState>) -> Self {
        let previous = state.clone_state();
        Self {
            current: state,
            previous,
        }
    }

    pub fn current(&self) -> &dyn ScenePhysicsState {
        &*self.current
    }

    pub fn current_mut(&mut self) -> &mut dyn ScenePhysicsState {
        &mut *self.current
    }

    /// Snapshot current into previous. Runs at the top of every fixed step.
    pub fn commit(&mut self) -> Result<(), EngineError> {
        self.previous.copy_from(&*self.current)
    }

    /// A fresh state blended `alpha` of the way from previous to current.
    pub fn interpolated(&self, alpha: f32) -> Result<Box<dyn ScenePhysicsState>, EngineError> {
        let mut blended = self.current.clone_state();
        blended.interpolate_ratio(
            &*self.previous,
            f64::from(1.0 - alpha),
            &*self.current,
            f64::from(alpha),
        )?;
        Ok(blended)
    }
}
