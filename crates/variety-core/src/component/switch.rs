use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{pick_rect, ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::Occupancy;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const POSITION_NAMES: [&[&str]; 3] = [
    &["up", "down"],
    &["up", "middle", "down"],
    &["up", "half-up", "half-down", "down"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchColor {
    Blue,
    Red,
    Yellow,
    White,
}

impl SwitchColor {
    pub const ALL: [SwitchColor; 4] = [
        SwitchColor::Blue,
        SwitchColor::Red,
        SwitchColor::Yellow,
        SwitchColor::White,
    ];
}

impl fmt::Display for SwitchColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SwitchColor::Blue => "blue",
            SwitchColor::Red => "red",
            SwitchColor::Yellow => "yellow",
            SwitchColor::White => "white",
        };
        f.write_str(name)
    }
}

/// Toggle switch with 2 to 4 positions. Starts up and sweeps down then back.
#[derive(Debug, Clone)]
pub struct Switch {
    color: SwitchColor,
    positions: u32,
    state: State,
    moving_down: bool,
}

impl Switch {
    pub fn new(color: SwitchColor, positions: u32) -> Self {
        Self {
            color,
            positions: positions.clamp(2, 4),
            state: State::Value(0),
            moving_down: false,
        }
    }

    pub fn color(&self) -> SwitchColor {
        self.color
    }

    pub fn position_name(&self, position: u32) -> &'static str {
        let names = POSITION_NAMES[(self.positions - 2) as usize];
        names.get(position as usize).copied().unwrap_or("?")
    }

    fn position(&self) -> u32 {
        self.state.value().unwrap_or(0)
    }
}

impl Component for Switch {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Switch
    }

    fn flavor(&self) -> Flavor {
        Flavor::Switch(self.color)
    }

    fn num_states(&self) -> u32 {
        self.positions
    }

    fn state(&self) -> State {
        self.state
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        match action {
            Action::Press => {
                let position = self.position();
                if position == 0 {
                    self.moving_down = true;
                } else if position == self.positions - 1 {
                    self.moving_down = false;
                }
                let next = if self.moving_down { position + 1 } else { position - 1 };
                Ok(set_state(&mut self.state, State::Value(next)))
            }
            other => Err(InputError::Unsupported {
                component: self.describe(),
                action: other.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("{} switch", self.color)
    }

    fn readout(&self) -> String {
        self.position_name(self.position()).to_string()
    }

    fn describe_solution(&self, state: u32) -> String {
        format!("set the {} switch to {}", self.color, self.position_name(state))
    }

    fn describe_action(&self) -> String {
        format!("you toggled the {} switch", self.color)
    }

    fn describe_expected(&self, state: u32) -> String {
        format!(
            "you should have toggled the {} switch to {} (instead of {})",
            self.color,
            self.position_name(state),
            self.position_name(self.position())
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct SwitchFactory;

impl ComponentFactory for SwitchFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Switch
    }

    fn flavors(&self) -> Vec<Flavor> {
        SwitchColor::ALL.iter().map(|&c| Flavor::Switch(c)).collect()
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        let color = SwitchColor::ALL
            .iter()
            .copied()
            .filter(|&c| !occupancy.is_flavor_taken(Flavor::Switch(c)))
            .choose(rng)?;
        let footprint = pick_rect(occupancy, 1, 4, rng)?;
        let positions = rng.gen_range(2..=4);
        Some(ComponentInstance::new(
            id,
            footprint,
            Box::new(Switch::new(color, positions)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(switch: &mut Switch) -> u32 {
        switch.apply(&Action::Press).unwrap();
        switch.state().value().unwrap()
    }

    #[test]
    fn test_switch_sweeps_and_returns() {
        let mut switch = Switch::new(SwitchColor::Red, 3);
        assert_eq!(switch.state(), State::Value(0));
        let walk: Vec<u32> = (0..5).map(|_| press(&mut switch)).collect();
        assert_eq!(walk, vec![1, 2, 1, 0, 1]);
    }

    #[test]
    fn test_two_position_switch_toggles() {
        let mut switch = Switch::new(SwitchColor::Blue, 2);
        assert_eq!(press(&mut switch), 1);
        assert_eq!(press(&mut switch), 0);
        assert_eq!(switch.readout(), "up");
    }

    #[test]
    fn test_position_names() {
        let switch = Switch::new(SwitchColor::White, 4);
        assert_eq!(switch.describe_solution(2), "set the white switch to half-down");
        assert_eq!(switch.position_name(9), "?");
    }
}
