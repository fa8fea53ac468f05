//! The scene loop.
//!
//! A [`Director`] owns every registered scene, tracks which one is current
//! and drives the fixed/variable timestep schedule. It is plain state
//! machinery with no GPU or window dependencies, so the whole loop can be
//! exercised in tests.
//!
//! [`run`] wraps a director in a winit application: it brings up the
//! [`Context`](crate::context::Context), builds the scenes and pumps frames
//! until a scene requests the quit transition or the window closes.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use cgmath::SquareMatrix;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::camera::{Camera, CameraController};
use crate::context::Context;
use crate::error::EngineError;
use crate::input::{InputAction, UserInput};
use crate::render::FrameContext;
use crate::scene_state::{ScenePhysicsState, StatePair};

/// A transition request raised by scene state during input handling or a
/// fixed step. At most one target; later requests overwrite earlier ones.
#[derive(Debug, Default, Clone)]
pub struct Transition {
    next: Option<String>,
}

impl Transition {
    pub fn request(&mut self, name: impl Into<String>) {
        self.next = Some(name.into());
    }

    pub fn is_requested(&self) -> bool {
        self.next.is_some()
    }

    pub fn take(&mut self) -> Option<String> {
        self.next.take()
    }
}

/// A playable scene. Lifecycle methods default to no-ops so simple scenes
/// implement only what they need.
///
/// `setup` runs exactly once, before the scene's state first receives
/// input or a fixed step and before the first `activate`.
/// `activate` runs every frame the scene is current with `call_count`
/// counting consecutive frames since the last transition into the scene.
pub trait Scene {
    fn setup(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn activate(
        &mut self,
        _previous: &str,
        _state: &mut dyn ScenePhysicsState,
        _camera: &mut Camera,
        _call_count: u32,
    ) {
    }

    fn deactivate(&mut self) {}

    /// Record draws for the interpolated state. The pass arrives with the
    /// surface attachment bound and nothing else set.
    fn render(
        &mut self,
        _state: &dyn ScenePhysicsState,
        _ctx: &Context,
        _frame: &FrameContext,
        _pass: &mut wgpu::RenderPass<'_>,
    ) {
    }
}

struct LoopControl {
    scene: Box<dyn Scene>,
    states: StatePair,
    setup_called: bool,
    activate_count: u32,
}

/// Owns the scenes and runs the timestep schedule.
pub struct Director {
    scenes: HashMap<String, LoopControl>,
    current: Option<String>,
    previous: Option<String>,
    input: VecDeque<UserInput>,
    accumulator: Duration,
    fixed_step: Duration,
    running: bool,
}

impl Director {
    /// Reserved transition target that ends the loop.
    pub const QUIT: &'static str = "quit";
    /// Reserved transition target that returns to the scene that was
    /// current before the last transition. Single level, not a stack.
    pub const PREVIOUS: &'static str = "previous";

    pub fn new(fixed_step: Duration) -> Self {
        Self {
            scenes: HashMap::new(),
            current: None,
            previous: None,
            input: VecDeque::new(),
            accumulator: Duration::ZERO,
            fixed_step,
            running: true,
        }
    }

    /// Register a scene under a unique name together with its initial
    /// physics state. The reserved transition targets cannot be used as
    /// names; a scene registered under them would be unreachable.
    pub fn add_scene(
        &mut self,
        name: impl Into<String>,
        scene: Box<dyn Scene>,
        state: Box<dyn ScenePhysicsState>,
        make_current: bool,
    ) -> Result<(), EngineError> {
        let name = name.into();
        if name == Self::QUIT || name == Self::PREVIOUS {
            return Err(EngineError::ReservedSceneName(name));
        }
        if self.scenes.contains_key(&name) {
            return Err(EngineError::DuplicateScene(name));
        }
        self.scenes.insert(
            name.clone(),
            LoopControl {
                scene,
                states: StatePair::new(state),
                setup_called: false,
                activate_count: 0,
            },
        );
        if make_current || self.current.is_none() {
            self.current = Some(name);
        }
        Ok(())
    }

    pub fn push_input(&mut self, input: UserInput) {
        self.input.push_back(input);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_scene_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Consecutive frames the named scene has been current, zero if it is
    /// not the current scene or has not had a frame yet.
    pub fn activate_count(&self, name: &str) -> Option<u32> {
        self.scenes.get(name).map(|lc| lc.activate_count)
    }

    fn control_mut(&mut self, name: &str) -> Result<&mut LoopControl, EngineError> {
        self.scenes
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownScene(name.to_string()))
    }

    /// Run the one-time setup of a scene and its state. A scene never sees
    /// input or a fixed step before this has run.
    fn setup_if_needed(&mut self, name: &str) -> anyhow::Result<()> {
        let lc = self.control_mut(name)?;
        if !lc.setup_called {
            lc.scene.setup()?;
            lc.states.current_mut().setup();
            lc.setup_called = true;
        }
        Ok(())
    }

    /// One frame of the loop: set the scene up if this is its first frame,
    /// drain input, run due fixed steps, apply at most one transition,
    /// activate the current scene, run its variable step. Returns the
    /// interpolation fraction left in the accumulator.
    pub fn frame(&mut self, camera: &mut Camera, dt: Duration) -> anyhow::Result<f32> {
        if !self.running {
            return Ok(0.0);
        }
        let current = self.current.clone().ok_or(EngineError::NoCurrentScene)?;
        self.setup_if_needed(&current)?;

        // Input first. An input driven transition wins over one raised by a
        // fixed step in the same frame.
        let mut input_transition = Transition::default();
        let queued: Vec<UserInput> = self.input.drain(..).collect();
        {
            let lc = self.control_mut(&current)?;
            for input in &queued {
                let consumed = lc.states.current_mut().process_user_commands(
                    input,
                    &mut input_transition,
                    camera,
                );
                if !consumed {
                    log::trace!("input not consumed by `{current}`: {input:?}");
                }
            }
        }

        self.accumulator += dt;
        let mut fixed_transition = Transition::default();
        while self.accumulator >= self.fixed_step {
            self.accumulator -= self.fixed_step;
            let fixed_step = self.fixed_step;
            let lc = self.control_mut(&current)?;
            lc.states.commit()?;
            let mut step_transition = Transition::default();
            lc.states
                .current_mut()
                .fixed_time_step(&mut step_transition, fixed_step);
            if !fixed_transition.is_requested() {
                if let Some(next) = step_transition.take() {
                    fixed_transition.request(next);
                }
            }
        }

        if let Some(next) = input_transition.take().or_else(|| fixed_transition.take()) {
            self.apply_transition(&next)?;
        }
        if !self.running {
            return Ok(0.0);
        }

        let current = self.current.clone().ok_or(EngineError::NoCurrentScene)?;
        self.setup_if_needed(&current)?;
        let previous = self.previous.clone().unwrap_or_default();
        let lc = self.control_mut(&current)?;
        lc.scene
            .activate(&previous, lc.states.current_mut(), camera, lc.activate_count);
        lc.activate_count += 1;
        lc.states.current_mut().variable_time_step(dt);

        Ok(self.accumulator.as_secs_f32() / self.fixed_step.as_secs_f32())
    }

    fn apply_transition(&mut self, next: &str) -> Result<(), EngineError> {
        let current = self.current.clone().ok_or(EngineError::NoCurrentScene)?;

        if next == Self::QUIT {
            log::info!("scene `{current}` requested quit");
            self.control_mut(&current)?.scene.deactivate();
            self.running = false;
            return Ok(());
        }

        let target = if next == Self::PREVIOUS {
            match &self.previous {
                Some(name) => name.clone(),
                None => {
                    log::warn!("`{current}` asked for the previous scene but there is none");
                    return Ok(());
                }
            }
        } else {
            next.to_string()
        };

        // transition to the scene already current is a no-op
        if target == current {
            return Ok(());
        }
        if !self.scenes.contains_key(&target) {
            return Err(EngineError::UnknownScene(target));
        }

        log::info!("transition `{current}` -> `{target}`");
        self.control_mut(&current)?.scene.deactivate();
        self.control_mut(&target)?.activate_count = 0;
        self.previous = Some(current);
        self.current = Some(target);
        Ok(())
    }

    /// The current scene's state blended `alpha` of the way from its
    /// previous fixed step to its latest one.
    pub fn render_state(&self, alpha: f32) -> Result<Box<dyn ScenePhysicsState>, EngineError> {
        let current = self.current.as_ref().ok_or(EngineError::NoCurrentScene)?;
        let lc = self
            .scenes
            .get(current)
            .ok_or_else(|| EngineError::UnknownScene(current.clone()))?;
        lc.states.interpolated(alpha)
    }

    /// Hand the pass to the current scene.
    pub fn render_current(
        &mut self,
        state: &dyn ScenePhysicsState,
        ctx: &Context,
        frame: &FrameContext,
        pass: &mut wgpu::RenderPass<'_>,
    ) -> Result<(), EngineError> {
        let current = self.current.clone().ok_or(EngineError::NoCurrentScene)?;
        let lc = self.control_mut(&current)?;
        lc.scene.render(state, ctx, frame, pass);
        Ok(())
    }
}

/// Builds one scene once the GPU context exists. The returned tuple is the
/// scene's registration name, the scene and its initial physics state. The
/// first constructor's scene starts current.
pub type SceneConstructor = Box<
    dyn FnOnce(&mut Context) -> anyhow::Result<(String, Box<dyn Scene>, Box<dyn ScenePhysicsState>)>,
>;

/// Run the engine until quit. Installs `env_logger` unless the host already
/// set a logger.
pub fn run(settings: crate::settings::Settings, scenes: Vec<SceneConstructor>) -> anyhow::Result<()> {
    let _ = env_logger::try_init();
    let event_loop = EventLoop::new()?;
    let mut movie = Movie {
        settings: Some(settings),
        constructors: Some(scenes),
        state: None,
    };
    event_loop.run_app(&mut movie)?;
    Ok(())
}

pub struct Movie {
    settings: Option<crate::settings::Settings>,
    constructors: Option<Vec<SceneConstructor>>,
    state: Option<MovieState>,
}

struct MovieState {
    window: Arc<Window>,
    ctx: Context,
    director: Director,
    controller: CameraController,
    last_frame: Instant,
    mouse_pressed: bool,
}

impl MovieState {
    fn resize(&mut self, width: u32, height: u32) {
        self.ctx.resize(width, height);
        self.director
            .push_input(UserInput::WindowResize { width, height });
    }

    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;

        let alpha = match self
            .director
            .frame(&mut self.ctx.camera.camera, dt)
        {
            Ok(alpha) => alpha,
            Err(e) => {
                log::error!("scene loop failed: {e:#}");
                event_loop.exit();
                return;
            }
        };
        if !self.director.is_running() {
            event_loop.exit();
            return;
        }

        self.controller
            .update_camera(&mut self.ctx.camera.camera, dt);
        if self.ctx.settings.minimised() {
            return;
        }

        let render_state = match self.director.render_state(alpha) {
            Ok(state) => state,
            Err(e) => {
                log::error!("state interpolation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        self.ctx.write_camera_uniform();
        let frame = FrameContext {
            projection: self.ctx.camera.projection.calc_matrix(),
            view: self.ctx.camera.camera.calc_matrix(),
            model: cgmath::Matrix4::identity(),
            alpha,
            seconds_since_load: self.ctx.settings.seconds_since_load(),
        };

        let output = match self.ctx.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.settings.physical_window_size();
                self.ctx.resize(size.x, size.y);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
                return;
            }
            Err(e) => {
                log::warn!("dropped frame: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("frame encoder"),
                });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.03,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if let Err(e) =
                self.director
                    .render_current(&*render_state, &self.ctx, &frame, &mut pass)
            {
                log::error!("render failed: {e}");
                event_loop.exit();
                return;
            }
        }
        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        self.window.request_redraw();
    }
}

impl ApplicationHandler for Movie {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let Some(settings) = self.settings.take() else {
            return;
        };
        let size = settings.physical_window_size();
        let attributes = Window::default_attributes()
            .with_title(settings.window_title())
            .with_inner_size(winit::dpi::PhysicalSize::new(size.x, size.y));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut ctx = match pollster::block_on(Context::new(window.clone(), settings)) {
            Ok(ctx) => ctx,
            Err(e) => {
                log::error!("graphics context creation failed: {e:#}");
                event_loop.exit();
                return;
            }
        };

        let mut director = Director::new(ctx.settings.fixed_step());
        if let Some(constructors) = self.constructors.take() {
            for (index, constructor) in constructors.into_iter().enumerate() {
                let built = constructor(&mut ctx).and_then(|(name, scene, state)| {
                    director
                        .add_scene(name, scene, state, index == 0)
                        .map_err(Into::into)
                });
                if let Err(e) = built {
                    log::error!("scene construction failed: {e:#}");
                    event_loop.exit();
                    return;
                }
            }
        }

        window.request_redraw();
        self.state = Some(MovieState {
            window,
            ctx,
            director,
            controller: CameraController::new(6.0, 0.6),
            last_frame: Instant::now(),
            mouse_pressed: false,
        });
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if let DeviceEvent::MouseMotion { delta } = event {
            if state.mouse_pressed {
                state.controller.handle_mouse(delta.0, delta.1);
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state: key_state,
                        text,
                        ..
                    },
                ..
            } => {
                if let PhysicalKey::Code(code) = physical_key {
                    state.controller.process_keyboard(code, key_state);
                    state.director.push_input(UserInput::Key {
                        code,
                        action: match key_state {
                            ElementState::Pressed => InputAction::Press,
                            ElementState::Released => InputAction::Release,
                        },
                    });
                }
                if key_state == ElementState::Pressed {
                    if let Some(text) = text {
                        for ch in text.chars() {
                            state.director.push_input(UserInput::Character(ch));
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                state
                    .ctx
                    .settings
                    .set_pointer_position(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                if button == MouseButton::Right {
                    state.mouse_pressed = button_state == ElementState::Pressed;
                }
                let pointer = state.ctx.settings.pointer_position();
                state.director.push_input(UserInput::Pointer {
                    button,
                    action: match button_state {
                        ElementState::Pressed => InputAction::Press,
                        ElementState::Released => InputAction::Release,
                    },
                    position: cgmath::Vector3::new(pointer.x, pointer.y, 0.0),
                });
            }
            WindowEvent::RedrawRequested => state.render_frame(event_loop),
            _ => {}
        }
    }
}
