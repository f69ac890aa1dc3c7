use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{pick_rect, ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::Occupancy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

pub const MIN_STAGES: usize = 2;
pub const MAX_STAGES: usize = 10;

/// Single-digit display that shows a different digit each time an earlier
/// stage provider changes.
///
/// State `s` means the display shows the digit that was assigned to stage `s`.
#[derive(Debug, Clone, Default)]
pub struct DigitDisplay {
    stage_digits: Vec<u8>,
    shown: Option<u8>,
    state: State,
}

impl DigitDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Option<u8> {
        self.shown
    }

    pub fn stage_digits(&self) -> &[u8] {
        &self.stage_digits
    }

    fn show(&mut self, digit: u8) -> Option<Transition> {
        self.shown = Some(digit);
        let stage = self.stage_digits.iter().position(|&d| d == digit);
        set_state(&mut self.state, State::from(stage.map(|s| s as u32)))
    }

    fn digit_text(&self, stage: u32) -> String {
        self.stage_digits
            .get(stage as usize)
            .map_or_else(|| "?".to_string(), |d| d.to_string())
    }
}

impl Component for DigitDisplay {
    fn kind(&self) -> FactoryKind {
        FactoryKind::DigitDisplay
    }

    fn flavor(&self) -> Flavor {
        Flavor::DigitDisplay
    }

    fn num_states(&self) -> u32 {
        self.stage_digits.len() as u32
    }

    fn state(&self) -> State {
        self.state
    }

    fn decide_states(&mut self, prior_stage_providers: usize, rng: &mut StdRng) -> bool {
        if !(MIN_STAGES..=MAX_STAGES).contains(&prior_stage_providers) {
            return false;
        }
        let mut digits: Vec<u8> = (0..=9).collect();
        digits.shuffle(rng);
        digits.truncate(prior_stage_providers);
        self.stage_digits = digits;
        true
    }

    fn receive_stage_change(&mut self, stage: usize) -> Option<Transition> {
        if let Some(&digit) = self.stage_digits.get(stage) {
            self.shown = Some(digit);
        }
        set_state(&mut self.state, State::Unset)
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        let next = match (action, self.shown) {
            (Action::Increment, Some(d)) => (d + 1) % 10,
            (Action::Increment, None) => 0,
            (Action::Decrement, Some(d)) => (d + 9) % 10,
            (Action::Decrement, None) => 9,
            (other, _) => {
                return Err(InputError::Unsupported {
                    component: self.describe(),
                    action: other.clone(),
                })
            }
        };
        Ok(self.show(next))
    }

    fn describe(&self) -> String {
        "digit display".to_string()
    }

    fn readout(&self) -> String {
        self.shown.map_or_else(|| "blank".to_string(), |d| d.to_string())
    }

    fn describe_solution(&self, state: u32) -> String {
        format!(
            "set the digit display to {} (the digit at stage {})",
            self.digit_text(state),
            state
        )
    }

    fn describe_action(&self) -> String {
        "you changed the digit display".to_string()
    }

    fn describe_expected(&self, state: u32) -> String {
        let actual = match self.state {
            State::Unset => "leaving it unchanged".to_string(),
            State::Value(v) => self.digit_text(v),
        };
        format!(
            "you should have changed the digit display to {} (instead of {})",
            self.digit_text(state),
            actual
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DigitDisplayFactory;

impl ComponentFactory for DigitDisplayFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::DigitDisplay
    }

    fn flavors(&self) -> Vec<Flavor> {
        vec![Flavor::DigitDisplay]
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        if occupancy.is_flavor_taken(Flavor::DigitDisplay) {
            return None;
        }
        let footprint = pick_rect(occupancy, 2, 3, rng)?;
        Some(ComponentInstance::new(id, footprint, Box::new(DigitDisplay::new())))
    }
}
