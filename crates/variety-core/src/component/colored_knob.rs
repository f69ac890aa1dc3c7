use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{pick_rect, ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::Occupancy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every colored knob has eight spots, 45° apart
pub const SPOTS: usize = 8;

const COMPASS: [&str; 4] = ["North", "East", "South", "West"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnobColor {
    Red,
    Black,
    Blue,
    Yellow,
}

impl KnobColor {
    pub const ALL: [KnobColor; 4] = [KnobColor::Red, KnobColor::Black, KnobColor::Blue, KnobColor::Yellow];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for KnobColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KnobColor::Red => "red",
            KnobColor::Black => "black",
            KnobColor::Blue => "blue",
            KnobColor::Yellow => "yellow",
        };
        f.write_str(name)
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Knob with eight spots of which only some click.
///
/// The state is the index of the current spot among the clicking spots,
/// counted clockwise from the knob's base rotation; a non-clicking spot is
/// unset.
#[derive(Debug, Clone)]
pub struct ColoredKnob {
    color: KnobColor,
    base_rotation: usize,
    clicks: [bool; SPOTS],
    rotation: usize,
    state: State,
}

impl ColoredKnob {
    pub fn new(color: KnobColor, base_rotation: usize, clicks: [bool; SPOTS], rotation: usize) -> Self {
        let mut knob = Self {
            color,
            base_rotation: base_rotation % COMPASS.len(),
            clicks,
            rotation: rotation % SPOTS,
            state: State::Unset,
        };
        knob.state = knob.state_at(knob.rotation);
        knob
    }

    pub fn rotation(&self) -> usize {
        self.rotation
    }

    pub fn clicks(&self) -> &[bool; SPOTS] {
        &self.clicks
    }

    fn state_at(&self, spot: usize) -> State {
        if !self.clicks[spot] {
            return State::Unset;
        }
        State::Value(self.clicks[..spot].iter().filter(|&&c| c).count() as u32)
    }

    fn click_count(&self) -> u32 {
        self.clicks.iter().filter(|&&c| c).count() as u32
    }
}

impl Component for ColoredKnob {
    fn kind(&self) -> FactoryKind {
        FactoryKind::ColoredKnob
    }

    fn flavor(&self) -> Flavor {
        Flavor::ColoredKnob(self.color)
    }

    fn num_states(&self) -> u32 {
        self.click_count()
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
        self.rotation = (self.rotation + 1) % SPOTS;
        let to = self.state_at(self.rotation);
        Ok(set_state(&mut self.state, to))
    }

    fn describe(&self) -> String {
        format!("{} knob ({} clicks)", self.color, self.click_count())
    }

    fn readout(&self) -> String {
        let feel = if self.clicks[self.rotation] { "click" } else { "no click" };
        format!("spot {}/{} ({})", self.rotation, SPOTS, feel)
    }

    fn describe_solution(&self, state: u32) -> String {
        format!(
            "set the {} knob to the {} clicking spot from {}",
            self.color,
            ordinal(state),
            COMPASS[self.base_rotation]
        )
    }

    fn describe_action(&self) -> String {
        format!("you turned the {} knob", self.color)
    }

    fn describe_expected(&self, state: u32) -> String {
        let actual = match self.state {
            State::Value(v) => format!("the {}", ordinal(v)),
            State::Unset => "a non-clicking spot".to_string(),
        };
        format!(
            "you should have set the {} knob to the {} clicking spot (instead of {})",
            self.color,
            ordinal(state),
            actual
        )
    }
}

/// Places colored knobs; which compass point each color counts from is
/// fixed per rule seed.
#[derive(Debug, Clone)]
pub struct ColoredKnobFactory {
    base_rotations: [usize; 4],
}

impl ColoredKnobFactory {
    pub fn new(config_rng: &mut StdRng) -> Self {
        let mut base_rotations = [0, 1, 2, 3];
        base_rotations.shuffle(config_rng);
        Self { base_rotations }
    }

    pub fn base_rotation(&self, color: KnobColor) -> usize {
        self.base_rotations[color.index()]
    }
}

impl ComponentFactory for ColoredKnobFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::ColoredKnob
    }

    fn flavors(&self) -> Vec<Flavor> {
        KnobColor::ALL.iter().map(|&c| Flavor::ColoredKnob(c)).collect()
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        let free: Vec<KnobColor> = KnobColor::ALL
            .iter()
            .copied()
            .filter(|&c| !occupancy.is_flavor_taken(Flavor::ColoredKnob(c)))
            .collect();
        let footprint = pick_rect(occupancy, 2, 2, rng)?;
        let &color = free.choose(rng)?;
        let clicking = rng.gen_range(3..=6);
        let mut clicks = [false; SPOTS];
        for spot in clicks.iter_mut().take(clicking) {
            *spot = true;
        }
        clicks.shuffle(rng);
        let rotation = rng.gen_range(0..SPOTS);
        let knob = ColoredKnob::new(color, self.base_rotation(color), clicks, rotation);
        Some(ComponentInstance::new(id, footprint, Box::new(knob)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSize;
    use rand::SeedableRng;

    const CLICKS: [bool; SPOTS] = [true, false, true, true, false, false, true, false];

    #[test]
    fn test_state_counts_clicking_spots() {
        let mut knob = ColoredKnob::new(KnobColor::Blue, 0, CLICKS, 0);
        assert_eq!(knob.num_states(), 4);
        assert_eq!(knob.state(), State::Value(0));

        let t = knob.apply(&Action::Press).unwrap().unwrap();
        assert_eq!(t.to, State::Unset);
        knob.apply(&Action::Press).unwrap();
        assert_eq!(knob.state(), State::Value(1));
        knob.apply(&Action::Press).unwrap();
        assert_eq!(knob.state(), State::Value(2));
    }

    #[test]
    fn test_full_turn_returns_to_start() {
        let mut knob = ColoredKnob::new(KnobColor::Red, 2, CLICKS, 6);
        assert_eq!(knob.state(), State::Value(3));
        for _ in 0..SPOTS {
            knob.apply(&Action::Press).unwrap();
        }
        assert_eq!(knob.rotation(), 6);
        assert_eq!(knob.state(), State::Value(3));
    }

    #[test]
    fn test_descriptions() {
        let knob = ColoredKnob::new(KnobColor::Yellow, 3, CLICKS, 1);
        assert_eq!(knob.describe(), "yellow knob (4 clicks)");
        assert_eq!(
            knob.describe_solution(2),
            "set the yellow knob to the 2nd clicking spot from West"
        );
        assert_eq!(
            knob.describe_expected(0),
            "you should have set the yellow knob to the 0th clicking spot (instead of a non-clicking spot)"
        );
    }

    #[test]
    fn test_base_rotations_are_a_permutation() {
        let factory = ColoredKnobFactory::new(&mut StdRng::seed_from_u64(8));
        let mut rotations: Vec<usize> = KnobColor::ALL.iter().map(|&c| factory.base_rotation(c)).collect();
        rotations.sort();
        assert_eq!(rotations, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_factory_click_count_in_range() {
        let factory = ColoredKnobFactory::new(&mut StdRng::seed_from_u64(1));
        let grid = GridSize::default();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let inst = factory.generate(ComponentId(0), &Occupancy::new(grid), &mut rng).unwrap();
            assert!((3..=6).contains(&inst.num_states()));
            assert_eq!(inst.footprint().len(), 4);
        }
    }
}
