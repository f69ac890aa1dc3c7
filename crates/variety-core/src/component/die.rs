use super::{set_state, Action, Component, ComponentId, ComponentInstance, Direction, State, Transition};
use crate::error::InputError;
use crate::factory::{pick_rect, ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::Occupancy;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// For each top side, the four sides around it in clockwise order
const SIDES: [[u8; 4]; 6] = [
    [2, 4, 5, 3],
    [5, 4, 2, 3],
    [1, 4, 0, 3],
    [5, 1, 2, 0],
    [5, 0, 2, 1],
    [0, 4, 1, 3],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DieStyle {
    LightOnDark,
    DarkOnLight,
}

impl DieStyle {
    pub const ALL: [DieStyle; 2] = [DieStyle::LightOnDark, DieStyle::DarkOnLight];
}

impl fmt::Display for DieStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DieStyle::LightOnDark => f.write_str("light-on-dark"),
            DieStyle::DarkOnLight => f.write_str("dark-on-light"),
        }
    }
}

fn opposite(side: u8) -> u8 {
    (7 - side) % 6
}

/// Sides that can face the status light while `top` is up
fn around(top: u8) -> impl Iterator<Item = u8> {
    (0..6).filter(move |&s| s != top && s != opposite(top))
}

fn position_of(top: u8, side: u8) -> usize {
    SIDES[top as usize].iter().position(|&s| s == side).unwrap_or(0)
}

/// Die on a 2×2 pad with four roll buttons.
///
/// The state combines the top side and the side facing the status light:
/// `top + 6 × k`, where `k` ranks the facing side among the four sides
/// around the top. All 24 orientations are reachable.
#[derive(Debug, Clone)]
pub struct Die {
    style: DieStyle,
    top: u8,
    turn: usize,
    state: State,
}

impl Die {
    pub fn new(style: DieStyle, top: u8, turn: usize) -> Self {
        let mut die = Self {
            style,
            top: top % 6,
            turn: turn % 4,
            state: State::Unset,
        };
        die.state = State::Value(die.orientation());
        die
    }

    pub fn top(&self) -> u8 {
        self.top
    }

    /// Side facing the status light
    pub fn facing(&self) -> u8 {
        SIDES[self.top as usize][self.turn]
    }

    fn orientation(&self) -> u32 {
        let k = around(self.top).position(|s| s == self.facing()).unwrap_or(0);
        self.top as u32 + 6 * k as u32
    }

    /// Top and facing sides of an orientation
    pub fn sides_of(state: u32) -> (u8, u8) {
        let top = (state % 6) as u8;
        let facing = around(top).nth((state / 6) as usize).unwrap_or(0);
        (top, facing)
    }

    fn roll(&mut self, direction: Direction) {
        let top = self.top;
        let turn = self.turn;
        let sides = SIDES[top as usize];
        let (next, toward) = match direction {
            Direction::Up => (sides[(turn + 3) % 4], sides[turn]),
            Direction::Right => (sides[(turn + 2) % 4], top),
            Direction::Left => (sides[turn], opposite(top)),
            Direction::Down => (sides[(turn + 1) % 4], sides[turn]),
        };
        self.top = next;
        self.turn = position_of(next, toward);
    }
}

impl Component for Die {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Die
    }

    fn flavor(&self) -> Flavor {
        Flavor::Die(self.style)
    }

    fn num_states(&self) -> u32 {
        24
    }

    fn state(&self) -> State {
        self.state
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        let Action::Move(direction) = action else {
            return Err(InputError::Unsupported {
                component: self.describe(),
                action: action.clone(),
            });
        };
        self.roll(*direction);
        let to = State::Value(self.orientation());
        Ok(set_state(&mut self.state, to))
    }

    fn describe(&self) -> String {
        format!("{} die", self.style)
    }

    fn readout(&self) -> String {
        format!("top {}, facing {}", self.top, self.facing())
    }

    fn describe_solution(&self, state: u32) -> String {
        let (top, facing) = Self::sides_of(state);
        format!(
            "rotate the {} die so you can see the {} side and the {} side is facing the status light",
            self.style, top, facing
        )
    }

    fn describe_action(&self) -> String {
        format!("you rotated the {} die", self.style)
    }

    fn describe_expected(&self, state: u32) -> String {
        let (top, facing) = Self::sides_of(state);
        format!(
            "you should have rotated the {} die so you can see the {} side and the {} side is facing the status light (you can see the {} side and the {} side is facing the status light)",
            self.style,
            top,
            facing,
            self.top,
            self.facing()
        )
    }
}

/// Places at most one die per puzzle, in either style
#[derive(Debug, Clone, Default)]
pub struct DieFactory;

impl ComponentFactory for DieFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Die
    }

    fn flavors(&self) -> Vec<Flavor> {
        DieStyle::ALL.iter().map(|&s| Flavor::Die(s)).collect()
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        if DieStyle::ALL.iter().any(|&s| occupancy.is_flavor_taken(Flavor::Die(s))) {
            return None;
        }
        let footprint = pick_rect(occupancy, 2, 2, rng)?;
        let style = DieStyle::ALL[rng.gen_range(0..DieStyle::ALL.len())];
        let die = Die::new(style, rng.gen_range(0..6), rng.gen_range(0..4));
        Some(ComponentInstance::new(id, footprint, Box::new(die)))
    }
}
