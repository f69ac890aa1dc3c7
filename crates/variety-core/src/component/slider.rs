use super::{set_state, Action, Component, ComponentId, ComponentInstance, State, Transition};
use crate::error::InputError;
use crate::factory::{ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::{Footprint, Occupancy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const LONG_SIDE: usize = 5;
const SHORT_SIDE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliderOrientation {
    Horizontal,
    Vertical,
}

impl SliderOrientation {
    pub const ALL: [SliderOrientation; 2] = [SliderOrientation::Horizontal, SliderOrientation::Vertical];

    /// Footprint width and height in cells
    pub fn extent(self) -> (usize, usize) {
        match self {
            SliderOrientation::Horizontal => (LONG_SIDE, SHORT_SIDE),
            SliderOrientation::Vertical => (SHORT_SIDE, LONG_SIDE),
        }
    }
}

impl fmt::Display for SliderOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliderOrientation::Horizontal => f.write_str("horizontal"),
            SliderOrientation::Vertical => f.write_str("vertical"),
        }
    }
}

/// Slider that travels one tick per press and reverses at either end
#[derive(Debug, Clone)]
pub struct Slider {
    orientation: SliderOrientation,
    ticks: u32,
    state: State,
    forward: bool,
}

impl Slider {
    pub fn new(orientation: SliderOrientation, ticks: u32, position: u32) -> Self {
        let ticks = ticks.max(2);
        let position = position.min(ticks - 1);
        Self {
            orientation,
            ticks,
            state: State::Value(position),
            forward: position != ticks - 1,
        }
    }

    pub fn orientation(&self) -> SliderOrientation {
        self.orientation
    }

    fn position(&self) -> u32 {
        self.state.value().unwrap_or(0)
    }
}

impl Component for Slider {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Slider
    }

    fn flavor(&self) -> Flavor {
        Flavor::Slider(self.orientation)
    }

    fn num_states(&self) -> u32 {
        self.ticks
    }

    fn state(&self) -> State {
        self.state
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        match action {
            Action::Press => {
                let position = self.position();
                let next = if self.forward { position + 1 } else { position.saturating_sub(1) };
                if next == 0 {
                    self.forward = true;
                } else if next == self.ticks - 1 {
                    self.forward = false;
                }
                Ok(set_state(&mut self.state, State::Value(next)))
            }
            other => Err(InputError::Unsupported {
                component: self.describe(),
                action: other.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("{} slider", self.orientation)
    }

    fn readout(&self) -> String {
        format!("{}/{}", self.position(), self.ticks)
    }

    fn describe_solution(&self, state: u32) -> String {
        format!("set the {} slider to {}", self.orientation, state)
    }

    fn describe_action(&self) -> String {
        format!("you changed the {} slider", self.orientation)
    }

    fn describe_expected(&self, state: u32) -> String {
        format!(
            "you should have set the {} slider to {} (instead of {})",
            self.orientation, state, self.state
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct SliderFactory;

impl ComponentFactory for SliderFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Slider
    }

    fn flavors(&self) -> Vec<Flavor> {
        SliderOrientation::ALL.iter().map(|&o| Flavor::Slider(o)).collect()
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        let spots: Vec<(SliderOrientation, usize)> = SliderOrientation::ALL
            .iter()
            .filter(|&&o| !occupancy.is_flavor_taken(Flavor::Slider(o)))
            .flat_map(|&o| {
                let (w, h) = o.extent();
                occupancy.rect_spots(w, h).into_iter().map(move |cell| (o, cell))
            })
            .collect();
        let &(orientation, cell) = spots.choose(rng)?;
        let (w, h) = orientation.extent();
        let footprint = Footprint::rect(occupancy.grid(), cell, w, h);
        let ticks = rng.gen_range(3..=7);
        let position = rng.gen_range(0..ticks);
        Some(ComponentInstance::new(
            id,
            footprint,
            Box::new(Slider::new(orientation, ticks, position)),
        ))
    }
}
