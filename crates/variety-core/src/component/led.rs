use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{pick_rect, ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::Occupancy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LedColor {
    Black,
    Red,
    Yellow,
    Blue,
    White,
}

impl LedColor {
    pub const ALL: [LedColor; 5] = [
        LedColor::Black,
        LedColor::Red,
        LedColor::Yellow,
        LedColor::Blue,
        LedColor::White,
    ];
}

impl fmt::Display for LedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LedColor::Black => "black",
            LedColor::Red => "red",
            LedColor::Yellow => "yellow",
            LedColor::Blue => "blue",
            LedColor::White => "white",
        };
        f.write_str(name)
    }
}

/// What the LED is doing between presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    /// Flashing its two table colors
    TableColors,
    /// Cycling through every color
    PossibleColors,
    /// Frozen on the color that was showing when pressed
    SetColor,
}

/// Answer lists for every pair of flashing colors, keyed with the lower color first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedTable {
    answers: BTreeMap<(LedColor, LedColor), Vec<LedColor>>,
}

impl LedTable {
    pub fn generate(rng: &mut StdRng) -> Self {
        let mut answers: BTreeMap<(LedColor, LedColor), Vec<LedColor>> = BTreeMap::new();
        for (i, &c1) in LedColor::ALL.iter().enumerate() {
            for &c2 in &LedColor::ALL[i + 1..] {
                let list = loop {
                    let mut colors = LedColor::ALL.to_vec();
                    colors.shuffle(rng);
                    colors.truncate(rng.gen_range(2..=5));
                    if !answers.values().any(|existing| *existing == colors) {
                        break colors;
                    }
                };
                answers.insert((c1, c2), list);
            }
        }
        Self { answers }
    }

    pub fn answers(&self, a: LedColor, b: LedColor) -> &[LedColor] {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.answers.get(&key).map_or(&[], Vec::as_slice)
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&(LedColor, LedColor), &Vec<LedColor>)> {
        self.answers.iter()
    }
}

/// Flashing LED. The player reads its two colors, looks up the answer list,
/// then freezes it on the right answer.
#[derive(Debug, Clone)]
pub struct Led {
    colors: (LedColor, LedColor),
    answers: Vec<LedColor>,
    mode: LedMode,
    cycle: usize,
    state: State,
}

impl Led {
    pub fn new(colors: (LedColor, LedColor), answers: Vec<LedColor>) -> Self {
        Self {
            colors,
            answers,
            mode: LedMode::TableColors,
            cycle: 0,
            state: State::Unset,
        }
    }

    pub fn mode(&self) -> LedMode {
        self.mode
    }

    pub fn answers(&self) -> &[LedColor] {
        &self.answers
    }

    /// Color currently lit
    pub fn shown(&self) -> LedColor {
        match self.mode {
            LedMode::TableColors if self.cycle % 2 == 0 => self.colors.0,
            LedMode::TableColors => self.colors.1,
            _ => LedColor::ALL[self.cycle % LedColor::ALL.len()],
        }
    }

    fn answer_name(&self, state: u32) -> String {
        self.answers
            .get(state as usize)
            .map_or_else(|| "?".to_string(), |c| c.to_string())
    }
}

impl Component for Led {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Led
    }

    fn flavor(&self) -> Flavor {
        Flavor::Led
    }

    fn num_states(&self) -> u32 {
        self.answers.len() as u32
    }

    fn state(&self) -> State {
        self.state
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        if *action != Action::Press {
            return Err(InputError::Unsupported {
                component: self.describe(),
                action: action.clone(),
            });
        }
        let to = match self.mode {
            LedMode::TableColors => {
                self.mode = LedMode::PossibleColors;
                self.cycle = 0;
                State::Unset
            }
            LedMode::PossibleColors => {
                let shown = self.shown();
                self.mode = LedMode::SetColor;
                let answer = self.answers.iter().position(|&c| c == shown);
                State::from(answer.map(|a| a as u32))
            }
            LedMode::SetColor => {
                self.mode = LedMode::TableColors;
                self.cycle = 0;
                State::Unset
            }
        };
        Ok(set_state(&mut self.state, to))
    }

    fn tick(&mut self) -> bool {
        if self.mode == LedMode::SetColor {
            return false;
        }
        self.cycle = self.cycle.wrapping_add(1);
        true
    }

    fn describe(&self) -> String {
        format!("LED flashing {} and {}", self.colors.0, self.colors.1)
    }

    fn readout(&self) -> String {
        match self.mode {
            LedMode::SetColor => format!("set to {}", self.shown()),
            _ => format!("showing {}", self.shown()),
        }
    }

    fn describe_solution(&self, state: u32) -> String {
        format!("set the LED to {}", self.answer_name(state))
    }

    fn describe_action(&self) -> String {
        "you set the LED to a color".to_string()
    }

    fn describe_expected(&self, state: u32) -> String {
        let actual = if self.mode == LedMode::SetColor {
            format!("instead of {}", self.shown())
        } else {
            "you left it cycling".to_string()
        };
        format!("you should have set the LED to {} ({})", self.answer_name(state), actual)
    }
}

#[derive(Debug, Clone)]
pub struct LedFactory {
    table: LedTable,
}

impl LedFactory {
    /// Draw the answer table from the configuration stream
    pub fn new(config_rng: &mut StdRng) -> Self {
        Self {
            table: LedTable::generate(config_rng),
        }
    }

    pub fn table(&self) -> &LedTable {
        &self.table
    }
}

impl ComponentFactory for LedFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Led
    }

    fn flavors(&self) -> Vec<Flavor> {
        vec![Flavor::Led]
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        if occupancy.is_flavor_taken(Flavor::Led) {
            return None;
        }
        let footprint = pick_rect(occupancy, 2, 2, rng)?;
        let mut pair: Vec<LedColor> = LedColor::ALL.choose_multiple(rng, 2).copied().collect();
        pair.sort();
        let colors = (pair[0], pair[1]);
        let answers = self.table.answers(colors.0, colors.1).to_vec();
        Some(ComponentInstance::new(id, footprint, Box::new(Led::new(colors, answers))))
    }
}
