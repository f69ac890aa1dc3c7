//! The uniform component interface and the component catalog.
//!
//! Each submodule holds one component type together with the factory that
//! places it. The engine only ever talks to [`Component`] and
//! [`ComponentFactory`](crate::factory::ComponentFactory).

pub mod colored_keypad;
pub mod colored_knob;
pub mod die;
pub mod digit_display;
pub mod dummy;
pub mod key;
pub mod keypad;
pub mod knob;
pub mod led;
pub mod letter_display;
pub mod maze;
pub mod slider;
pub mod switch;
pub mod timer;
pub mod wire;

use crate::error::{InputError, SubscriptionError};
use crate::factory::FactoryKind;
use crate::flavor::Flavor;
use crate::grid::Footprint;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current value of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum State {
    /// No definite value (key unturned, keypad unfinished, LED cycling...)
    #[default]
    Unset,
    Value(u32),
}

impl State {
    pub fn value(self) -> Option<u32> {
        match self {
            State::Unset => None,
            State::Value(v) => Some(v),
        }
    }

    pub fn is_set(self) -> bool {
        matches!(self, State::Value(_))
    }

    pub fn matches(self, expected: u32) -> bool {
        self == State::Value(expected)
    }
}

impl From<Option<u32>> for State {
    fn from(value: Option<u32>) -> Self {
        value.map_or(State::Unset, State::Value)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Unset => write!(f, "unset"),
            State::Value(v) => write!(f, "{}", v),
        }
    }
}

/// A state change that actually happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: State,
    pub to: State,
}

/// Store `to` in `slot`, reporting a transition only when the value changed
pub(crate) fn set_state(slot: &mut State, to: State) -> Option<Transition> {
    let from = *slot;
    if from == to {
        return None;
    }
    *slot = to;
    Some(Transition { from, to })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Direction {
        Direction::ALL[(self.index() + 2) % 4]
    }

    /// Column and row offset of one step
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

/// A player gesture aimed at one component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Cut a wire
    Cut,
    /// Turn the key; the host supplies the last digit of its timer
    TurnKey { timer_digit: u8 },
    /// Primary press: twist a knob, push a slider, toggle a switch, press the LED, stop or start a timer
    Press,
    /// Press one key of a keypad
    PressKey(usize),
    /// Press the button under one slot of a letter display
    PressSlot(usize),
    /// Move the dot of a maze or roll a die
    Move(Direction),
    Increment,
    Decrement,
}

/// Identifier of a component within one puzzle, assigned at placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u32);

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behavior shared by every component type.
///
/// State is owned by the component and changes only through [`Component::apply`]
/// and [`Component::receive_stage_change`]; each returns the resulting
/// [`Transition`] when the value actually changed. [`Component::tick`] only moves
/// what is shown (LED colors, timer digits), never the state.
pub trait Component: fmt::Debug {
    fn kind(&self) -> FactoryKind;

    fn flavor(&self) -> Flavor;

    /// Number of distinct target states; 0 for decorative components
    fn num_states(&self) -> u32;

    fn can_provide_stage(&self) -> bool {
        true
    }

    fn state(&self) -> State;

    /// Terminal exemption from correctness checks
    fn is_stuck(&self) -> bool {
        false
    }

    /// Called after this component caused a strike
    fn checked(&mut self) {}

    /// Decide the state space given the number of stage providers earlier in the
    /// solve order. Returning `false` rejects the whole encoding trial.
    fn decide_states(&mut self, _prior_stage_providers: usize, _rng: &mut StdRng) -> bool {
        true
    }

    /// An earlier stage provider changed; `stage` is its rank among stage providers
    fn receive_stage_change(&mut self, _stage: usize) -> Option<Transition> {
        None
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError>;

    /// Advance time-driven display by one host tick; returns whether anything shown changed
    fn tick(&mut self) -> bool {
        false
    }

    /// What the component is ("knob with 7 positions")
    fn describe(&self) -> String;

    /// Short live status for a host display
    fn readout(&self) -> String {
        self.state().to_string()
    }

    /// Instruction that reaches `state`
    fn describe_solution(&self, state: u32) -> String;

    /// What the player just did to this component
    fn describe_action(&self) -> String;

    /// Why this component is wrong when `state` was expected
    fn describe_expected(&self, state: u32) -> String;
}

/// Slot filled once when the arbiter wires a component to its solve position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    position: usize,
}

impl Subscription {
    pub fn position(&self) -> usize {
        self.position
    }
}

/// A placed component: footprint, identity and behavior
#[derive(Debug)]
pub struct ComponentInstance {
    id: ComponentId,
    footprint: Footprint,
    component: Box<dyn Component>,
    subscription: Option<Subscription>,
}

impl ComponentInstance {
    pub fn new(id: ComponentId, footprint: Footprint, component: Box<dyn Component>) -> Self {
        Self {
            id,
            footprint,
            component,
            subscription: None,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn footprint(&self) -> &Footprint {
        &self.footprint
    }

    pub fn component(&self) -> &dyn Component {
        self.component.as_ref()
    }

    pub fn component_mut(&mut self) -> &mut dyn Component {
        self.component.as_mut()
    }

    pub fn kind(&self) -> FactoryKind {
        self.component.kind()
    }

    pub fn flavor(&self) -> Flavor {
        self.component.flavor()
    }

    pub fn num_states(&self) -> u32 {
        self.component.num_states()
    }

    pub fn state(&self) -> State {
        self.component.state()
    }

    pub fn is_stuck(&self) -> bool {
        self.component.is_stuck()
    }

    pub fn can_provide_stage(&self) -> bool {
        self.component.can_provide_stage()
    }

    pub fn is_decorative(&self) -> bool {
        self.kind().is_decorative()
    }

    pub fn describe(&self) -> String {
        self.component.describe()
    }

    /// Establish the one-time state-change subscription
    pub fn subscribe(&mut self, position: usize) -> Result<Subscription, SubscriptionError> {
        if let Some(existing) = self.subscription {
            return Err(SubscriptionError::AlreadySubscribed {
                id: self.id,
                position: existing.position,
            });
        }
        let subscription = Subscription { position };
        self.subscription = Some(subscription);
        Ok(subscription)
    }

    pub fn subscription(&self) -> Option<Subscription> {
        self.subscription
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted component used by engine tests

    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug)]
    pub struct Scripted {
        pub flavor: Flavor,
        pub num_states: u32,
        pub state: State,
        pub stage_provider: bool,
        pub stuck: bool,
        pub checked_calls: usize,
        pub latch_on_check: bool,
        pub min_prior_providers: usize,
        /// Shared so a test can read it after the component is boxed
        pub received_stages: Rc<RefCell<Vec<usize>>>,
        pub reset_on_stage: bool,
    }

    impl Scripted {
        pub fn new(flavor: Flavor, num_states: u32) -> Self {
            Self {
                flavor,
                num_states,
                state: State::Unset,
                stage_provider: true,
                stuck: false,
                checked_calls: 0,
                latch_on_check: false,
                min_prior_providers: 0,
                received_stages: Rc::default(),
                reset_on_stage: false,
            }
        }
    }

    impl Component for Scripted {
        fn kind(&self) -> FactoryKind {
            FactoryKind::Knob
        }

        fn flavor(&self) -> Flavor {
            self.flavor
        }

        fn num_states(&self) -> u32 {
            self.num_states
        }

        fn can_provide_stage(&self) -> bool {
            self.stage_provider
        }

        fn state(&self) -> State {
            self.state
        }

        fn is_stuck(&self) -> bool {
            self.stuck
        }

        fn checked(&mut self) {
            self.checked_calls += 1;
            if self.latch_on_check {
                self.stuck = true;
            }
        }

        fn decide_states(&mut self, prior_stage_providers: usize, _rng: &mut StdRng) -> bool {
            prior_stage_providers >= self.min_prior_providers
        }

        fn receive_stage_change(&mut self, stage: usize) -> Option<Transition> {
            self.received_stages.borrow_mut().push(stage);
            if self.reset_on_stage {
                set_state(&mut self.state, State::Unset)
            } else {
                None
            }
        }

        fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
            match action {
                Action::PressKey(value) => Ok(set_state(&mut self.state, State::Value(*value as u32))),
                other => Err(InputError::Unsupported {
                    component: "scripted component".to_string(),
                    action: other.clone(),
                }),
            }
        }

        fn describe(&self) -> String {
            format!("scripted {}", self.flavor)
        }

        fn describe_solution(&self, state: u32) -> String {
            format!("set the {} to {}", self.flavor, state)
        }

        fn describe_action(&self) -> String {
            format!("you changed the {}", self.flavor)
        }

        fn describe_expected(&self, state: u32) -> String {
            format!("you should have set the {} to {} (instead of {})", self.flavor, state, self.state)
        }
    }

    pub fn instance(id: u32, component: Scripted) -> ComponentInstance {
        ComponentInstance::new(
            ComponentId(id),
            Footprint::from_cells(vec![id as usize]),
            Box::new(component),
        )
    }
}
