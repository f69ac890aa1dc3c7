use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::{Footprint, Occupancy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypadColor {
    Red,
    Yellow,
    Blue,
}

impl KeypadColor {
    pub const ALL: [KeypadColor; 3] = [KeypadColor::Red, KeypadColor::Yellow, KeypadColor::Blue];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for KeypadColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeypadColor::Red => "red",
            KeypadColor::Yellow => "yellow",
            KeypadColor::Blue => "blue",
        };
        f.write_str(name)
    }
}

/// Key layout of a colored keypad, columns by rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColoredKeypadSize {
    OneByFour,
    OneByFive,
    OneBySix,
    TwoByTwo,
    TwoByThree,
    ThreeByTwo,
    FourByOne,
    FiveByOne,
    SixByOne,
}

impl ColoredKeypadSize {
    pub const ALL: [ColoredKeypadSize; 9] = [
        ColoredKeypadSize::OneByFour,
        ColoredKeypadSize::OneByFive,
        ColoredKeypadSize::OneBySix,
        ColoredKeypadSize::TwoByTwo,
        ColoredKeypadSize::TwoByThree,
        ColoredKeypadSize::ThreeByTwo,
        ColoredKeypadSize::FourByOne,
        ColoredKeypadSize::FiveByOne,
        ColoredKeypadSize::SixByOne,
    ];

    pub fn keys(self) -> (usize, usize) {
        match self {
            ColoredKeypadSize::OneByFour => (1, 4),
            ColoredKeypadSize::OneByFive => (1, 5),
            ColoredKeypadSize::OneBySix => (1, 6),
            ColoredKeypadSize::TwoByTwo => (2, 2),
            ColoredKeypadSize::TwoByThree => (2, 3),
            ColoredKeypadSize::ThreeByTwo => (3, 2),
            ColoredKeypadSize::FourByOne => (4, 1),
            ColoredKeypadSize::FiveByOne => (5, 1),
            ColoredKeypadSize::SixByOne => (6, 1),
        }
    }

    pub fn key_count(self) -> usize {
        let (w, h) = self.keys();
        w * h
    }

    /// Cells covered, keys plus the backing plate
    pub fn extent(self) -> (usize, usize) {
        match self {
            ColoredKeypadSize::OneByFour => (2, 6),
            ColoredKeypadSize::OneByFive => (2, 7),
            ColoredKeypadSize::OneBySix => (2, 8),
            ColoredKeypadSize::TwoByTwo => (3, 3),
            ColoredKeypadSize::TwoByThree => (3, 4),
            ColoredKeypadSize::ThreeByTwo => (4, 3),
            ColoredKeypadSize::FourByOne => (6, 2),
            ColoredKeypadSize::FiveByOne => (7, 2),
            ColoredKeypadSize::SixByOne => (8, 2),
        }
    }
}

impl fmt::Display for ColoredKeypadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.keys();
        write!(f, "{}×{}", w, h)
    }
}

/// Keypad where a fixed number of keys, chosen per color, must be held down.
///
/// The state is the index of the pressed set among all sets of that size,
/// ordered as bit masks with key 0 in the most significant bit.
#[derive(Debug, Clone)]
pub struct ColoredKeypad {
    color: KeypadColor,
    size: ColoredKeypadSize,
    required: usize,
    combinations: Vec<u32>,
    presses: BTreeSet<usize>,
    state: State,
}

impl ColoredKeypad {
    pub fn new(color: KeypadColor, size: ColoredKeypadSize, required: usize) -> Self {
        let keys = size.key_count();
        let combinations = (0..1u32 << keys)
            .filter(|mask| mask.count_ones() as usize == required)
            .collect();
        Self {
            color,
            size,
            required,
            combinations,
            presses: BTreeSet::new(),
            state: State::Unset,
        }
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn presses(&self) -> impl Iterator<Item = usize> + '_ {
        self.presses.iter().copied()
    }

    fn mask_of(&self, keys: impl Iterator<Item = usize>) -> u32 {
        let count = self.size.key_count();
        keys.fold(0, |mask, key| mask | 1 << (count - 1 - key))
    }

    /// Keys of the set with the given index, lowest first
    pub fn keys_for(&self, state: u32) -> Vec<usize> {
        let count = self.size.key_count();
        let mask = self.combinations.get(state as usize).copied().unwrap_or(0);
        (0..count).filter(|&key| mask & 1 << (count - 1 - key) != 0).collect()
    }

    fn keys_text(keys: impl Iterator<Item = usize>) -> String {
        keys.map(|k| (k + 1).to_string()).collect::<Vec<_>>().join(", ")
    }
}

impl Component for ColoredKeypad {
    fn kind(&self) -> FactoryKind {
        FactoryKind::ColoredKeypad
    }

    fn flavor(&self) -> Flavor {
        Flavor::ColoredKeypad(self.color)
    }

    fn num_states(&self) -> u32 {
        self.combinations.len() as u32
    }

    fn state(&self) -> State {
        self.state
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        let key = match action {
            Action::PressKey(key) => *key,
            other => {
                return Err(InputError::Unsupported {
                    component: self.describe(),
                    action: other.clone(),
                })
            }
        };
        if key >= self.size.key_count() {
            return Err(InputError::OutOfRange {
                component: self.describe(),
                index: key,
            });
        }

        if !self.presses.insert(key) {
            self.presses.clear();
        }
        let to = if self.presses.len() == self.required {
            let mask = self.mask_of(self.presses.iter().copied());
            State::from(self.combinations.iter().position(|&m| m == mask).map(|i| i as u32))
        } else {
            State::Unset
        };
        Ok(set_state(&mut self.state, to))
    }

    fn describe(&self) -> String {
        format!("{} keypad with {} keys", self.color, self.size.key_count())
    }

    fn readout(&self) -> String {
        format!("[{}] of {}", Self::keys_text(self.presses()), self.required)
    }

    fn describe_solution(&self, state: u32) -> String {
        format!(
            "press keys {} on the {} keypad",
            Self::keys_text(self.keys_for(state).into_iter()),
            self.color
        )
    }

    fn describe_action(&self) -> String {
        format!("you pressed keys on the {} keypad", self.color)
    }

    fn describe_expected(&self, state: u32) -> String {
        let actual = if self.presses.is_empty() {
            "you didn't press any".to_string()
        } else {
            format!("instead of {}", Self::keys_text(self.presses()))
        };
        format!(
            "you should have pressed keys {} on the {} keypad ({})",
            Self::keys_text(self.keys_for(state).into_iter()),
            self.color,
            actual
        )
    }
}

/// Places colored keypads; how many keys each color wants is fixed per rule seed.
#[derive(Debug, Clone)]
pub struct ColoredKeypadFactory {
    required: [usize; 3],
}

impl ColoredKeypadFactory {
    pub fn new(config_rng: &mut StdRng) -> Self {
        let mut required = [2, 3, 4];
        required.shuffle(config_rng);
        Self { required }
    }

    pub fn required(&self, color: KeypadColor) -> usize {
        self.required[color.index()]
    }
}

impl ComponentFactory for ColoredKeypadFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::ColoredKeypad
    }

    fn flavors(&self) -> Vec<Flavor> {
        KeypadColor::ALL.iter().map(|&c| Flavor::ColoredKeypad(c)).collect()
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        let slots: Vec<(KeypadColor, ColoredKeypadSize, usize)> = KeypadColor::ALL
            .iter()
            .copied()
            .filter(|&c| !occupancy.is_flavor_taken(Flavor::ColoredKeypad(c)))
            .flat_map(|color| {
                let required = self.required(color);
                ColoredKeypadSize::ALL
                    .iter()
                    .copied()
                    .filter(move |size| size.key_count() > required)
                    .map(move |size| (color, size))
            })
            .flat_map(|(color, size)| {
                let (w, h) = size.extent();
                occupancy
                    .rect_spots(w, h)
                    .into_iter()
                    .map(move |cell| (color, size, cell))
            })
            .collect();
        let &(color, size, cell) = slots.choose(rng)?;
        let (w, h) = size.extent();
        let keypad = ColoredKeypad::new(color, size, self.required(color));
        Some(ComponentInstance::new(
            id,
            Footprint::rect(occupancy.grid(), cell, w, h),
            Box::new(keypad),
        ))
    }
}
