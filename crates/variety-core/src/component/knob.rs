use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{pick_rect, ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::Occupancy;
use rand::rngs::StdRng;
use rand::Rng;

pub const MIN_TICKS: u32 = 5;
pub const MAX_TICKS: u32 = 10;

/// Rotary knob; each press advances one tick, wrapping around
#[derive(Debug, Clone)]
pub struct Knob {
    ticks: u32,
    state: State,
}

impl Knob {
    pub fn new(ticks: u32, position: u32) -> Self {
        let ticks = ticks.max(1);
        Self {
            ticks,
            state: State::Value(position % ticks),
        }
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    fn position(&self) -> u32 {
        self.state.value().unwrap_or(0)
    }
}

impl Component for Knob {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Knob
    }

    fn flavor(&self) -> Flavor {
        Flavor::Knob
    }

    fn num_states(&self) -> u32 {
        self.ticks
    }

    fn state(&self) -> State {
        self.state
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        match action {
            Action::Press => {
                let next = (self.position() + 1) % self.ticks;
                Ok(set_state(&mut self.state, State::Value(next)))
            }
            other => Err(InputError::Unsupported {
                component: self.describe(),
                action: other.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("knob with {} positions", self.ticks)
    }

    fn readout(&self) -> String {
        format!("{}/{}", self.position(), self.ticks)
    }

    fn describe_solution(&self, state: u32) -> String {
        format!("set the knob to {}", state)
    }

    fn describe_action(&self) -> String {
        "you twisted the knob".to_string()
    }

    fn describe_expected(&self, state: u32) -> String {
        format!("you should have set the knob to {} (instead of {})", state, self.state)
    }
}

#[derive(Debug, Clone, Default)]
pub struct KnobFactory;

impl ComponentFactory for KnobFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Knob
    }

    fn flavors(&self) -> Vec<Flavor> {
        vec![Flavor::Knob]
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        if occupancy.is_flavor_taken(Flavor::Knob) {
            return None;
        }
        let footprint = pick_rect(occupancy, 3, 3, rng)?;
        let ticks = rng.gen_range(MIN_TICKS..=MAX_TICKS);
        let position = rng.gen_range(0..ticks);
        Some(ComponentInstance::new(id, footprint, Box::new(Knob::new(ticks, position))))
    }
}
