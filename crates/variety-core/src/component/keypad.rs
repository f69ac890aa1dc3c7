use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::{Footprint, Occupancy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key layout of a keypad, columns by rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeypadSize {
    TwoByTwo,
    OneByThree,
    OneByFour,
    ThreeByOne,
    FourByOne,
}

impl KeypadSize {
    pub const ALL: [KeypadSize; 5] = [
        KeypadSize::TwoByTwo,
        KeypadSize::OneByThree,
        KeypadSize::OneByFour,
        KeypadSize::ThreeByOne,
        KeypadSize::FourByOne,
    ];

    /// Keys per row and per column
    pub fn keys(self) -> (usize, usize) {
        match self {
            KeypadSize::TwoByTwo => (2, 2),
            KeypadSize::OneByThree => (1, 3),
            KeypadSize::OneByFour => (1, 4),
            KeypadSize::ThreeByOne => (3, 1),
            KeypadSize::FourByOne => (4, 1),
        }
    }

    pub fn key_count(self) -> usize {
        let (w, h) = self.keys();
        w * h
    }

    /// Each key takes a 2×2 block of cells
    pub fn extent(self) -> (usize, usize) {
        let (w, h) = self.keys();
        (2 * w, 2 * h)
    }
}

impl fmt::Display for KeypadSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.keys();
        write!(f, "{}×{}", w, h)
    }
}

/// Keypad whose state is the rank of the order in which all keys were pressed.
///
/// The rank is a mixed-radix number: the first press is a digit in base `n`,
/// the second in base `n - 1` among the keys still unpressed, and so on.
#[derive(Debug, Clone)]
pub struct Keypad {
    size: KeypadSize,
    presses: Vec<usize>,
    state: State,
}

impl Keypad {
    pub fn new(size: KeypadSize) -> Self {
        Self {
            size,
            presses: Vec::new(),
            state: State::Unset,
        }
    }

    pub fn size(&self) -> KeypadSize {
        self.size
    }

    pub fn presses(&self) -> &[usize] {
        &self.presses
    }

    /// Rank of a complete press order
    pub fn rank(sequence: &[usize], key_count: usize) -> u32 {
        let mut remaining: Vec<usize> = (0..key_count).collect();
        let mut rank = 0u32;
        let mut mult = 1u32;
        for key in sequence {
            if let Some(ix) = remaining.iter().position(|k| k == key) {
                rank += mult * ix as u32;
                mult *= remaining.len() as u32;
                remaining.remove(ix);
            }
        }
        rank
    }

    /// Press order for a rank
    pub fn sequence(mut rank: u32, key_count: usize) -> Vec<usize> {
        let mut remaining: Vec<usize> = (0..key_count).collect();
        let mut sequence = Vec::with_capacity(key_count);
        while !remaining.is_empty() {
            let len = remaining.len() as u32;
            let ix = (rank % len) as usize;
            rank /= len;
            sequence.push(remaining.remove(ix));
        }
        sequence
    }

    fn sequence_text(&self, rank: u32) -> String {
        Self::sequence(rank, self.size.key_count())
            .iter()
            .map(|k| (k + 1).to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Component for Keypad {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Keypad
    }

    fn flavor(&self) -> Flavor {
        Flavor::Keypad(self.size)
    }

    fn num_states(&self) -> u32 {
        (1..=self.size.key_count() as u32).product()
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
        let count = self.size.key_count();
        if key >= count {
            return Err(InputError::OutOfRange {
                component: self.describe(),
                index: key,
            });
        }

        if self.presses.contains(&key) {
            self.presses.clear();
        } else {
            self.presses.push(key);
        }
        let to = if self.presses.len() == count {
            State::Value(Self::rank(&self.presses, count))
        } else {
            State::Unset
        };
        Ok(set_state(&mut self.state, to))
    }

    fn describe(&self) -> String {
        format!("{} keypad", self.size)
    }

    fn readout(&self) -> String {
        let lit: Vec<String> = self.presses.iter().map(|k| (k + 1).to_string()).collect();
        format!("[{}]", lit.join(" "))
    }

    fn describe_solution(&self, state: u32) -> String {
        format!(
            "press the keys on the {} keypad in the order {}",
            self.size,
            self.sequence_text(state)
        )
    }

    fn describe_action(&self) -> String {
        format!("you pressed keys on the {} keypad", self.size)
    }

    fn describe_expected(&self, state: u32) -> String {
        let actual = match self.state {
            State::Unset => "you left it unfinished".to_string(),
            State::Value(v) => format!("instead of {}", self.sequence_text(v)),
        };
        format!(
            "you should have pressed the keys on the {} keypad in the order {} ({})",
            self.size,
            self.sequence_text(state),
            actual
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeypadFactory;

impl ComponentFactory for KeypadFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Keypad
    }

    fn flavors(&self) -> Vec<Flavor> {
        KeypadSize::ALL.iter().map(|&s| Flavor::Keypad(s)).collect()
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        let slots: Vec<(KeypadSize, usize)> = KeypadSize::ALL
            .iter()
            .filter(|&&s| !occupancy.is_flavor_taken(Flavor::Keypad(s)))
            .flat_map(|&s| {
                let (w, h) = s.extent();
                occupancy.rect_spots(w, h).into_iter().map(move |cell| (s, cell))
            })
            .collect();
        let &(size, cell) = slots.choose(rng)?;
        let (w, h) = size.extent();
        Some(ComponentInstance::new(
            id,
            Footprint::rect(occupancy.grid(), cell, w, h),
            Box::new(Keypad::new(size)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press_all(keypad: &mut Keypad, keys: &[usize]) -> Option<Transition> {
        let mut last = None;
        for &k in keys {
            last = keypad.apply(&Action::PressKey(k)).unwrap();
        }
        last
    }

    #[test]
    fn test_rank_and_sequence_agree() {
        for rank in 0..24 {
            let seq = Keypad::sequence(rank, 4);
            assert_eq!(Keypad::rank(&seq, 4), rank);
        }
        assert_eq!(Keypad::sequence(0, 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_complete_sequence_sets_state() {
        let mut keypad = Keypad::new(KeypadSize::ThreeByOne);
        assert_eq!(keypad.num_states(), 6);
        keypad.apply(&Action::PressKey(2)).unwrap();
        assert_eq!(keypad.state(), State::Unset);
        let t = press_all(&mut keypad, &[0, 1]).expect("last press completes");
        assert_eq!(t.to, State::Value(Keypad::rank(&[2, 0, 1], 3)));
    }

    #[test]
    fn test_repress_clears_sequence() {
        let mut keypad = Keypad::new(KeypadSize::TwoByTwo);
        press_all(&mut keypad, &[1, 3]);
        keypad.apply(&Action::PressKey(1)).unwrap();
        assert!(keypad.presses().is_empty());
        assert_eq!(keypad.state(), State::Unset);
    }

    #[test]
    fn test_out_of_range_key() {
        let mut keypad = Keypad::new(KeypadSize::OneByThree);
        assert_eq!(
            keypad.apply(&Action::PressKey(3)),
            Err(InputError::OutOfRange {
                component: "1×3 keypad".to_string(),
                index: 3
            })
        );
    }

    #[test]
    fn test_describe_expected_unfinished() {
        let keypad = Keypad::new(KeypadSize::FourByOne);
        let text = keypad.describe_expected(0);
        assert!(text.contains("in the order 1, 2, 3, 4"));
        assert!(text.ends_with("(you left it unfinished)"));
    }
}
