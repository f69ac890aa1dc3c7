use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::{Footprint, Occupancy};
use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireColor {
    Black,
    Blue,
    Red,
    Yellow,
    White,
    Green,
}

impl WireColor {
    pub const ALL: [WireColor; 6] = [
        WireColor::Black,
        WireColor::Blue,
        WireColor::Red,
        WireColor::Yellow,
        WireColor::White,
        WireColor::Green,
    ];
}

impl fmt::Display for WireColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireColor::Black => "black",
            WireColor::Blue => "blue",
            WireColor::Red => "red",
            WireColor::Yellow => "yellow",
            WireColor::White => "white",
            WireColor::Green => "green",
        };
        f.write_str(name)
    }
}

/// A wire between two arbitrary cells. State 0 is uncut, 1 is cut.
#[derive(Debug, Clone)]
pub struct Wire {
    color: WireColor,
    ends: (String, String),
    state: State,
    stuck: bool,
}

impl Wire {
    pub fn new(color: WireColor, ends: (String, String)) -> Self {
        Self {
            color,
            ends,
            state: State::Value(0),
            stuck: false,
        }
    }

    pub fn color(&self) -> WireColor {
        self.color
    }

    pub fn is_cut(&self) -> bool {
        self.state.matches(1)
    }
}

impl Component for Wire {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Wire
    }

    fn flavor(&self) -> Flavor {
        Flavor::Wire(self.color)
    }

    fn num_states(&self) -> u32 {
        2
    }

    fn can_provide_stage(&self) -> bool {
        false
    }

    fn state(&self) -> State {
        self.state
    }

    fn is_stuck(&self) -> bool {
        self.stuck
    }

    // A wire cut out of turn can never be uncut, so it stops being judged
    fn checked(&mut self) {
        self.stuck = self.is_cut();
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        match action {
            Action::Cut => Ok(set_state(&mut self.state, State::Value(1))),
            other => Err(InputError::Unsupported {
                component: self.describe(),
                action: other.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("{} wire from {} to {}", self.color, self.ends.0, self.ends.1)
    }

    fn readout(&self) -> String {
        let text = if self.is_cut() { "cut" } else { "intact" };
        text.to_string()
    }

    fn describe_solution(&self, state: u32) -> String {
        if state == 0 {
            format!("don’t cut the {} wire", self.color)
        } else {
            format!("cut the {} wire", self.color)
        }
    }

    fn describe_action(&self) -> String {
        format!("you cut the {} wire", self.color)
    }

    fn describe_expected(&self, state: u32) -> String {
        if state == 0 {
            format!("you should not have cut the {} wire", self.color)
        } else {
            format!("you should have cut the {} wire", self.color)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WireFactory;

impl ComponentFactory for WireFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Wire
    }

    fn flavors(&self) -> Vec<Flavor> {
        WireColor::ALL.iter().map(|&c| Flavor::Wire(c)).collect()
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        let free = occupancy.free_cells();
        if free.len() < 2 {
            return None;
        }
        let color = WireColor::ALL
            .iter()
            .copied()
            .filter(|&c| !occupancy.is_flavor_taken(Flavor::Wire(c)))
            .choose(rng)?;

        let ends: Vec<_> = free.choose_multiple(rng, 2).copied().collect();
        let grid = occupancy.grid();
        let footprint = Footprint::from_cells(ends);
        let labels = (
            grid.label(footprint.cells()[0]),
            grid.label(footprint.cells()[1]),
        );
        Some(ComponentInstance::new(id, footprint, Box::new(Wire::new(color, labels))))
    }
}
