use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cgmath::Deg;
use reel_ngin::EngineError;
use reel_ngin::camera::Camera;
use reel_ngin::input::{InputAction, UserInput};
use reel_ngin::movie::{Director, Scene, Transition};
use reel_ngin::scene_state::{ScenePhysicsState, copy_concrete};

type Log = Rc<RefCell<Vec<String>>>;

struct RecordingScene {
    name: &'static str,
    log: Log,
}

impl Scene for RecordingScene {
    fn setup(&mut self) -> anyhow::Result<()> {
        self.log.borrow_mut().push(format!("{}:setup", self.name));
        Ok(())
    }

    fn activate(
        &mut self,
        previous: &str,
        _state: &mut dyn ScenePhysicsState,
        _camera: &mut Camera,
        call_count: u32,
    ) {
        self.log
            .borrow_mut()
            .push(format!("{}:activate:{}:{}", self.name, previous, call_count));
    }

    fn deactivate(&mut self) {
        self.log
            .borrow_mut()
            .push(format!("{}:deactivate", self.name));
    }
}

#[derive(Clone, Default)]
struct CounterState {
    ticks: u32,
    value: f64,
    transition_on_tick: Option<(u32, String)>,
    transition_on_key: Option<String>,
    log: Option<Log>,
}

impl CounterState {
    fn record(&self, entry: &str) {
        if let Some(log) = &self.log {
            log.borrow_mut().push(entry.to_string());
        }
    }
}

impl ScenePhysicsState for CounterState {
    fn setup(&mut self) {
        self.record("state:setup");
    }

    fn process_user_commands(
        &mut self,
        input: &UserInput,
        transition: &mut Transition,
        _camera: &mut Camera,
    ) -> bool {
        if let (Some(next), UserInput::Key { .. }) = (&self.transition_on_key, input) {
            transition.request(next.clone());
            return true;
        }
        false
    }

    fn fixed_time_step(&mut self, transition: &mut Transition, _dt: Duration) {
        self.record("state:fixed");
        self.ticks += 1;
        self.value += 1.0;
        if let Some((at, next)) = &self.transition_on_tick {
            if self.ticks >= *at {
                transition.request(next.clone());
            }
        }
    }

    fn interpolate_ratio(
        &mut self,
        previous: &dyn ScenePhysicsState,
        mult_prev: f64,
        current: &dyn ScenePhysicsState,
        mult_curr: f64,
    ) -> Result<(), EngineError> {
        let previous = previous
            .as_any()
            .downcast_ref::<CounterState>()
            .expect("previous state type");
        let current = current
            .as_any()
            .downcast_ref::<CounterState>()
            .expect("current state type");
        self.value = previous.value * mult_prev + current.value * mult_curr;
        Ok(())
    }

    fn clone_state(&self) -> Box<dyn ScenePhysicsState> {
        Box::new(self.clone())
    }

    fn copy_from(&mut self, other: &dyn ScenePhysicsState) -> Result<(), EngineError> {
        copy_concrete(self, other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[derive(Clone, Default)]
struct OtherState;

impl ScenePhysicsState for OtherState {
    fn clone_state(&self) -> Box<dyn ScenePhysicsState> {
        Box::new(self.clone())
    }

    fn copy_from(&mut self, other: &dyn ScenePhysicsState) -> Result<(), EngineError> {
        copy_concrete(self, other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

fn camera() -> Camera {
    Camera::new((0.0, 0.0, 0.0), Deg(-90.0), Deg(0.0))
}

fn step() -> Duration {
    Duration::from_millis(10)
}

fn add_scene(director: &mut Director, name: &str, log: &Log, state: CounterState, current: bool) {
    director
        .add_scene(
            name,
            Box::new(RecordingScene {
                name: Box::leak(name.to_string().into_boxed_str()),
                log: log.clone(),
            }),
            Box::new(state),
            current,
        )
        .expect("register scene");
}

#[test]
fn should_setup_once_and_count_consecutive_activations() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    let mut camera = camera();
    add_scene(&mut director, "a", &log, CounterState::default(), true);

    for _ in 0..3 {
        director.frame(&mut camera, step()).expect("frame");
    }

    let entries = log.borrow();
    assert_eq!(
        entries
            .iter()
            .filter(|e| e.as_str() == "a:setup")
            .count(),
        1
    );
    assert_eq!(
        entries
            .iter()
            .filter(|e| e.starts_with("a:activate"))
            .cloned()
            .collect::<Vec<_>>(),
        vec!["a:activate::0", "a:activate::1", "a:activate::2"]
    );
}

#[test]
fn should_transition_when_a_fixed_step_requests_it() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    let mut camera = camera();
    add_scene(
        &mut director,
        "a",
        &log,
        CounterState {
            transition_on_tick: Some((2, "b".to_string())),
            ..Default::default()
        },
        true,
    );
    add_scene(&mut director, "b", &log, CounterState::default(), false);

    for _ in 0..3 {
        director.frame(&mut camera, step()).expect("frame");
    }

    assert_eq!(director.current_scene_name(), Some("b"));
    let entries = log.borrow();
    assert!(entries.contains(&"a:deactivate".to_string()));
    assert_eq!(
        entries
            .iter()
            .filter(|e| e.starts_with("b:"))
            .cloned()
            .collect::<Vec<_>>(),
        vec!["b:setup", "b:activate:a:0", "b:activate:a:1"]
    );
}

#[test]
fn should_ignore_a_transition_to_the_current_scene() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    let mut camera = camera();
    add_scene(
        &mut director,
        "a",
        &log,
        CounterState {
            transition_on_tick: Some((1, "a".to_string())),
            ..Default::default()
        },
        true,
    );

    for _ in 0..3 {
        director.frame(&mut camera, step()).expect("frame");
    }

    let entries = log.borrow();
    assert!(!entries.contains(&"a:deactivate".to_string()));
    // the counter keeps climbing, proving no reset happened
    assert!(entries.contains(&"a:activate::2".to_string()));
}

#[test]
fn should_stop_running_on_the_quit_transition() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    let mut camera = camera();
    add_scene(
        &mut director,
        "a",
        &log,
        CounterState {
            transition_on_tick: Some((1, Director::QUIT.to_string())),
            ..Default::default()
        },
        true,
    );

    director.frame(&mut camera, step()).expect("frame");

    assert!(!director.is_running());
    assert!(log.borrow().contains(&"a:deactivate".to_string()));
}

#[test]
fn should_keep_a_single_level_of_previous_scene_history() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    let mut camera = camera();
    add_scene(
        &mut director,
        "a",
        &log,
        CounterState {
            transition_on_tick: Some((1, "b".to_string())),
            ..Default::default()
        },
        true,
    );
    add_scene(
        &mut director,
        "b",
        &log,
        CounterState {
            transition_on_tick: Some((1, "c".to_string())),
            ..Default::default()
        },
        false,
    );
    add_scene(
        &mut director,
        "c",
        &log,
        CounterState {
            transition_on_tick: Some((1, Director::PREVIOUS.to_string())),
            ..Default::default()
        },
        false,
    );

    // a -> b -> c -> previous(b) -> c again: one level, not a stack
    director.frame(&mut camera, step()).expect("frame");
    assert_eq!(director.current_scene_name(), Some("b"));
    director.frame(&mut camera, step()).expect("frame");
    assert_eq!(director.current_scene_name(), Some("c"));
    director.frame(&mut camera, step()).expect("frame");
    assert_eq!(director.current_scene_name(), Some("b"));
    director.frame(&mut camera, step()).expect("frame");
    assert_eq!(director.current_scene_name(), Some("c"));
}

#[test]
fn should_fail_on_a_transition_to_an_unknown_scene() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    let mut camera = camera();
    add_scene(
        &mut director,
        "a",
        &log,
        CounterState {
            transition_on_tick: Some((1, "missing".to_string())),
            ..Default::default()
        },
        true,
    );

    let err = director.frame(&mut camera, step()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<EngineError>(),
        Some(&EngineError::UnknownScene("missing".to_string()))
    );
}

#[test]
fn should_prefer_an_input_transition_over_a_fixed_step_one() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    let mut camera = camera();
    add_scene(
        &mut director,
        "a",
        &log,
        CounterState {
            transition_on_tick: Some((1, "c".to_string())),
            transition_on_key: Some("b".to_string()),
            ..Default::default()
        },
        true,
    );
    add_scene(&mut director, "b", &log, CounterState::default(), false);
    add_scene(&mut director, "c", &log, CounterState::default(), false);

    director.push_input(UserInput::Key {
        code: reel_ngin::KeyCode::Space,
        action: InputAction::Press,
    });
    director.frame(&mut camera, step()).expect("frame");

    assert_eq!(director.current_scene_name(), Some("b"));
}

#[test]
fn should_interpolate_the_render_state_between_fixed_steps() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    let mut camera = camera();
    add_scene(&mut director, "a", &log, CounterState::default(), true);

    // one full step plus half a step left in the accumulator
    let alpha = director
        .frame(&mut camera, Duration::from_millis(15))
        .expect("frame");
    assert!((alpha - 0.5).abs() < 1e-6);

    let state = director.render_state(alpha).expect("render state");
    let state = state
        .as_any()
        .downcast_ref::<CounterState>()
        .expect("state type");
    // previous holds 0.0, current holds 1.0
    assert!((state.value - 0.5).abs() < 1e-9);
}

#[test]
fn should_reject_copies_between_different_state_types() {
    let mut state = CounterState::default();
    let err = state.copy_from(&OtherState).unwrap_err();
    match err {
        EngineError::StateTypeMismatch { expected, found } => {
            assert!(expected.contains("CounterState"));
            assert!(found.contains("OtherState"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn should_run_setup_before_the_first_fixed_step() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    let mut camera = camera();
    add_scene(
        &mut director,
        "a",
        &log,
        CounterState {
            log: Some(log.clone()),
            ..Default::default()
        },
        true,
    );

    director.frame(&mut camera, step()).expect("frame");

    let entries = log.borrow();
    let scene_setup = entries
        .iter()
        .position(|e| e == "a:setup")
        .expect("scene setup ran");
    let state_setup = entries
        .iter()
        .position(|e| e == "state:setup")
        .expect("state setup ran");
    let first_fixed = entries
        .iter()
        .position(|e| e == "state:fixed")
        .expect("fixed step ran");
    assert!(scene_setup < first_fixed);
    assert!(state_setup < first_fixed);
}

#[test]
fn should_report_whether_an_input_was_consumed() {
    let mut state = CounterState {
        transition_on_key: Some("b".to_string()),
        ..Default::default()
    };
    let mut transition = Transition::default();
    let mut camera = camera();

    let key = UserInput::Key {
        code: reel_ngin::KeyCode::Space,
        action: InputAction::Press,
    };
    assert!(state.process_user_commands(&key, &mut transition, &mut camera));
    assert!(!state.process_user_commands(&UserInput::Character('x'), &mut transition, &mut camera));
}

#[test]
fn should_reject_reserved_scene_names() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());

    for reserved in [Director::QUIT, Director::PREVIOUS] {
        let err = director
            .add_scene(
                reserved,
                Box::new(RecordingScene {
                    name: reserved,
                    log: log.clone(),
                }),
                Box::new(CounterState::default()),
                false,
            )
            .unwrap_err();
        assert_eq!(err, EngineError::ReservedSceneName(reserved.to_string()));
    }
}

#[test]
fn should_reject_duplicate_scene_names() {
    let log: Log = Rc::new(RefCell::new(Vec::new()));
    let mut director = Director::new(step());
    add_scene(&mut director, "a", &log, CounterState::default(), true);

    let err = director
        .add_scene(
            "a",
            Box::new(RecordingScene {
                name: "a",
                log: log.clone(),
            }),
            Box::new(CounterState::default()),
            false,
        )
        .unwrap_err();
    assert_eq!(err, EngineError::DuplicateScene("a".to_string()));
}
