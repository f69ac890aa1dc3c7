//! Single-cell decoration with no state.

use super::{Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::{Footprint, Occupancy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Default)]
pub struct Dummy;

impl Component for Dummy {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Dummy
    }

    fn flavor(&self) -> Flavor {
        Flavor::Dummy
    }

    fn num_states(&self) -> u32 {
        0
    }

    fn can_provide_stage(&self) -> bool {
        false
    }

    fn state(&self) -> State {
        State::Unset
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        Err(InputError::Unsupported {
            component: self.describe(),
            action: action.clone(),
        })
    }

    fn describe(&self) -> String {
        "dummy".to_string()
    }

    fn readout(&self) -> String {
        String::new()
    }

    fn describe_solution(&self, _state: u32) -> String {
        "leave the dummy alone".to_string()
    }

    fn describe_action(&self) -> String {
        "you touched a dummy".to_string()
    }

    fn describe_expected(&self, _state: u32) -> String {
        "dummies do nothing".to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DummyFactory;

impl ComponentFactory for DummyFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Dummy
    }

    fn flavors(&self) -> Vec<Flavor> {
        vec![Flavor::Dummy]
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        let cell = *occupancy.free_cells().choose(rng)?;
        Some(ComponentInstance::new(
            id,
            Footprint::from_cells(vec![cell]),
            Box::new(Dummy),
        ))
    }
}
