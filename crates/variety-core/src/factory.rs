//! Component factories and the catalog they are drawn from.

use crate::component::colored_keypad::ColoredKeypadFactory;
use crate::component::colored_knob::ColoredKnobFactory;
use crate::component::die::DieFactory;
use crate::component::digit_display::DigitDisplayFactory;
use crate::component::dummy::DummyFactory;
use crate::component::key::KeyFactory;
use crate::component::keypad::KeypadFactory;
use crate::component::knob::KnobFactory;
use crate::component::led::LedFactory;
use crate::component::letter_display::LetterDisplayFactory;
use crate::component::maze::MazeFactory;
use crate::component::slider::SliderFactory;
use crate::component::switch::SwitchFactory;
use crate::component::timer::TimerFactory;
use crate::component::wire::WireFactory;
use crate::component::{ComponentId, ComponentInstance};
use crate::config::PuzzleConfig;
use crate::flavor::Flavor;
use crate::grid::{Footprint, Occupancy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Component types the catalog knows how to place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryKind {
    Dummy,
    Wire,
    Key,
    Knob,
    Slider,
    Switch,
    Keypad,
    DigitDisplay,
    Maze,
    Led,
    LetterDisplay,
    Timer,
    ColoredKnob,
    ColoredKeypad,
    Die,
}

impl FactoryKind {
    pub const ALL: [FactoryKind; 15] = [
        FactoryKind::Dummy,
        FactoryKind::Wire,
        FactoryKind::Key,
        FactoryKind::Knob,
        FactoryKind::Slider,
        FactoryKind::Switch,
        FactoryKind::Keypad,
        FactoryKind::DigitDisplay,
        FactoryKind::Maze,
        FactoryKind::Led,
        FactoryKind::LetterDisplay,
        FactoryKind::Timer,
        FactoryKind::ColoredKnob,
        FactoryKind::ColoredKeypad,
        FactoryKind::Die,
    ];

    /// Starting weight in the placement pool
    pub fn default_weight(self) -> u32 {
        match self {
            FactoryKind::Dummy => 0,
            FactoryKind::Wire => 1,
            FactoryKind::Keypad | FactoryKind::ColoredKeypad | FactoryKind::Maze => 3,
            _ => 2,
        }
    }

    /// Decorative kinds have no states and are placed after the target count is reached
    pub fn is_decorative(self) -> bool {
        matches!(self, FactoryKind::Dummy)
    }
}

impl fmt::Display for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FactoryKind::Dummy => "dummy",
            FactoryKind::Wire => "wire",
            FactoryKind::Key => "key",
            FactoryKind::Knob => "knob",
            FactoryKind::Slider => "slider",
            FactoryKind::Switch => "switch",
            FactoryKind::Keypad => "keypad",
            FactoryKind::DigitDisplay => "digit display",
            FactoryKind::Maze => "maze",
            FactoryKind::Led => "LED",
            FactoryKind::LetterDisplay => "letter display",
            FactoryKind::Timer => "timer",
            FactoryKind::ColoredKnob => "colored knob",
            FactoryKind::ColoredKeypad => "colored keypad",
            FactoryKind::Die => "die",
        };
        f.write_str(name)
    }
}

/// Produces component instances that fit the current occupancy.
///
/// `generate` must only return instances whose footprint is available and
/// whose flavor is not yet taken; the caller claims both. Returning `None`
/// means the factory cannot place anything right now.
pub trait ComponentFactory: fmt::Debug {
    fn kind(&self) -> FactoryKind;

    /// Every flavor this factory can ever produce
    fn flavors(&self) -> Vec<Flavor>;

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance>;
}

/// Pick a random free `width`×`height` rectangle
pub(crate) fn pick_rect(occupancy: &Occupancy, width: usize, height: usize, rng: &mut StdRng) -> Option<Footprint> {
    let spots = occupancy.rect_spots(width, height);
    let &cell = spots.choose(rng)?;
    Some(Footprint::rect(occupancy.grid(), cell, width, height))
}

/// The set of factories available for one rule seed
#[derive(Debug)]
pub struct Catalog {
    factories: Vec<Box<dyn ComponentFactory>>,
    weights: Vec<u32>,
}

impl Catalog {
    /// Every built-in factory with the configured weights.
    ///
    /// Maze walls, the LED answer table, colored knob base rotations and
    /// colored keypad press counts are drawn from `config_rng` here, in that order.
    pub fn standard(config: &PuzzleConfig, config_rng: &mut StdRng) -> Self {
        let mut catalog = Self::empty();
        for kind in FactoryKind::ALL {
            let factory: Box<dyn ComponentFactory> = match kind {
                FactoryKind::Dummy => Box::new(DummyFactory),
                FactoryKind::Wire => Box::new(WireFactory),
                FactoryKind::Key => Box::new(KeyFactory),
                FactoryKind::Knob => Box::new(KnobFactory),
                FactoryKind::Slider => Box::new(SliderFactory),
                FactoryKind::Switch => Box::new(SwitchFactory),
                FactoryKind::Keypad => Box::new(KeypadFactory),
                FactoryKind::DigitDisplay => Box::new(DigitDisplayFactory),
                FactoryKind::Maze => Box::new(MazeFactory::new(config_rng)),
                FactoryKind::Led => Box::new(LedFactory::new(config_rng)),
                FactoryKind::LetterDisplay => Box::new(LetterDisplayFactory),
                FactoryKind::Timer => Box::new(TimerFactory),
                FactoryKind::ColoredKnob => Box::new(ColoredKnobFactory::new(config_rng)),
                FactoryKind::ColoredKeypad => Box::new(ColoredKeypadFactory::new(config_rng)),
                FactoryKind::Die => Box::new(DieFactory),
            };
            catalog.push(factory, config.weight(kind));
        }
        catalog
    }

    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn push(&mut self, factory: Box<dyn ComponentFactory>, weight: u32) {
        self.factories.push(factory);
        self.weights.push(weight);
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    pub fn factories(&self) -> impl Iterator<Item = &dyn ComponentFactory> {
        self.factories.iter().map(|f| f.as_ref())
    }

    /// Flavors of every factory, in catalog order, for the flavor ordering
    pub fn all_flavors(&self) -> Vec<Flavor> {
        self.factories.iter().flat_map(|f| f.flavors()).collect()
    }

    /// Fresh pool of interactive factories with their starting weights
    pub(crate) fn interactive_pool(&self) -> Vec<(&dyn ComponentFactory, u32)> {
        self.factories
            .iter()
            .zip(&self.weights)
            .filter(|(f, _)| !f.kind().is_decorative())
            .map(|(f, &w)| (f.as_ref(), w))
            .collect()
    }

    pub(crate) fn decorative(&self) -> Vec<&dyn ComponentFactory> {
        self.factories
            .iter()
            .filter(|f| f.kind().is_decorative())
            .map(|f| f.as_ref())
            .collect()
    }
}
