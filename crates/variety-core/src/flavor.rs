//! Component flavors and their rule-seeded canonical order.

use crate::component::colored_keypad::KeypadColor;
use crate::component::colored_knob::KnobColor;
use crate::component::die::DieStyle;
use crate::component::keypad::KeypadSize;
use crate::component::slider::SliderOrientation;
use crate::component::switch::SwitchColor;
use crate::component::timer::TimerDirection;
use crate::component::wire::WireColor;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Identity token of a component variant.
///
/// Used for uniqueness bookkeeping during placement and to rank components
/// canonically when building the serial. It carries no behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    Dummy,
    Wire(WireColor),
    Key,
    Knob,
    Slider(SliderOrientation),
    Switch(SwitchColor),
    Keypad(KeypadSize),
    DigitDisplay,
    Maze { width: u8, height: u8 },
    Led,
    LetterDisplay,
    Timer(TimerDirection),
    ColoredKnob(KnobColor),
    ColoredKeypad(KeypadColor),
    Die(DieStyle),
}

impl Flavor {
    /// Whether at most one component of this flavor may exist per puzzle
    pub fn is_unique(self) -> bool {
        !matches!(self, Flavor::Dummy)
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flavor::Dummy => write!(f, "dummy"),
            Flavor::Wire(color) => write!(f, "{} wire", color),
            Flavor::Key => write!(f, "key"),
            Flavor::Knob => write!(f, "knob"),
            Flavor::Slider(orientation) => write!(f, "{} slider", orientation),
            Flavor::Switch(color) => write!(f, "{} switch", color),
            Flavor::Keypad(size) => write!(f, "{} keypad", size),
            Flavor::DigitDisplay => write!(f, "digit display"),
            Flavor::Maze { width, height } => write!(f, "{}×{} maze", width, height),
            Flavor::Led => write!(f, "LED"),
            Flavor::LetterDisplay => write!(f, "letter display"),
            Flavor::Timer(direction) => write!(f, "{} timer", direction),
            Flavor::ColoredKnob(color) => write!(f, "{} knob", color),
            Flavor::ColoredKeypad(color) => write!(f, "{} keypad", color),
            Flavor::Die(style) => write!(f, "{} die", style),
        }
    }
}

/// Canonical permutation of every flavor the catalog can produce.
///
/// Computed once per rule seed from the configuration stream, so it does not
/// depend on which flavors end up instantiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorOrder {
    order: Vec<Flavor>,
    ranks: HashMap<Flavor, usize>,
}

impl FlavorOrder {
    /// Shuffle all possible flavors (Fisher-Yates) with the configuration stream
    pub fn compute(all_flavors: impl IntoIterator<Item = Flavor>, rng: &mut StdRng) -> Self {
        let mut order: Vec<Flavor> = Vec::new();
        for flavor in all_flavors {
            if !order.contains(&flavor) {
                order.push(flavor);
            }
        }
        order.shuffle(rng);
        Self::from_order(order)
    }

    /// Use an explicit order (tests and replays)
    pub fn from_order(order: Vec<Flavor>) -> Self {
        let ranks = order.iter().enumerate().map(|(i, &f)| (f, i)).collect();
        Self { order, ranks }
    }

    /// Canonical rank of a flavor, if the catalog knows it
    pub fn rank(&self, flavor: Flavor) -> Option<usize> {
        self.ranks.get(&flavor).copied()
    }

    pub fn as_slice(&self) -> &[Flavor] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn sample_flavors() -> Vec<Flavor> {
        let mut flavors = vec![Flavor::Key, Flavor::Knob, Flavor::DigitDisplay, Flavor::Led];
        flavors.extend(WireColor::ALL.iter().map(|&c| Flavor::Wire(c)));
        flavors
    }

    #[test]
    fn test_order_is_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let order = FlavorOrder::compute(sample_flavors(), &mut rng);
        assert_eq!(order.len(), sample_flavors().len());
        for flavor in sample_flavors() {
            let rank = order.rank(flavor).expect("every flavor has a rank");
            assert_eq!(order.as_slice()[rank], flavor);
        }
    }

    #[test]
    fn test_order_reproducible_from_seed() {
        let a = FlavorOrder::compute(sample_flavors(), &mut StdRng::seed_from_u64(99));
        let b = FlavorOrder::compute(sample_flavors(), &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicates_collapse() {
        let order = FlavorOrder::compute(
            vec![Flavor::Key, Flavor::Key, Flavor::Knob],
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(order.len(), 2);
    }

    #[test]
    fn test_absent_flavor_has_no_rank() {
        let order = FlavorOrder::from_order(vec![Flavor::Key]);
        assert_eq!(order.rank(Flavor::Key), Some(0));
        assert_eq!(order.rank(Flavor::Led), None);
    }

    #[test]
    fn test_only_dummy_is_shared() {
        assert!(!Flavor::Dummy.is_unique());
        assert!(Flavor::Maze { width: 3, height: 3 }.is_unique());
    }
}
