use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{pick_rect, ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::Occupancy;
use rand::rngs::StdRng;

/// Key-in-lock. Turning it records the last digit of the host's timer.
#[derive(Debug, Clone, Default)]
pub struct Key {
    turned: bool,
    state: State,
}

impl Key {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_turned(&self) -> bool {
        self.turned
    }
}

impl Component for Key {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Key
    }

    fn flavor(&self) -> Flavor {
        Flavor::Key
    }

    fn num_states(&self) -> u32 {
        10
    }

    fn state(&self) -> State {
        self.state
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        match action {
            Action::TurnKey { timer_digit } => {
                self.turned = !self.turned;
                let to = if self.turned {
                    State::Value(u32::from(timer_digit % 10))
                } else {
                    State::Unset
                };
                Ok(set_state(&mut self.state, to))
            }
            other => Err(InputError::Unsupported {
                component: self.describe(),
                action: other.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        "key-in-lock".to_string()
    }

    fn readout(&self) -> String {
        match self.state {
            State::Value(digit) => format!("turned at {}", digit),
            State::Unset => "unturned".to_string(),
        }
    }

    fn describe_solution(&self, state: u32) -> String {
        format!("turn the key when the last digit of the timer is {}", state)
    }

    fn describe_action(&self) -> String {
        "you turned the key".to_string()
    }

    fn describe_expected(&self, state: u32) -> String {
        let actual = match self.state {
            State::Unset => "you left it unturned".to_string(),
            State::Value(v) => format!("instead of {}", v),
        };
        format!(
            "you should have turned the key when the last digit on the timer was {} ({})",
            state, actual
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyFactory;

impl ComponentFactory for KeyFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Key
    }

    fn flavors(&self) -> Vec<Flavor> {
        vec![Flavor::Key]
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        if occupancy.is_flavor_taken(Flavor::Key) {
            return None;
        }
        let footprint = pick_rect(occupancy, 2, 2, rng)?;
        Some(ComponentInstance::new(id, footprint, Box::new(Key::new())))
    }
}
