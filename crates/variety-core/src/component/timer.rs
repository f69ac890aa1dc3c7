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

/// Digit bases a timer can count in
const BASES: [u32; 4] = [2, 3, 5, 7];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerDirection {
    Ascending,
    Descending,
}

impl TimerDirection {
    pub const ALL: [TimerDirection; 2] = [TimerDirection::Ascending, TimerDirection::Descending];
}

impl fmt::Display for TimerDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerDirection::Ascending => f.write_str("ascending"),
            TimerDirection::Descending => f.write_str("descending"),
        }
    }
}

/// Two-digit timer cycling through `major × minor` values, one per tick.
///
/// The first digit counts in base `major`, the second in base `minor`.
/// While it runs the state is unset; stopping it sets the state to the
/// value shown.
#[derive(Debug, Clone)]
pub struct Timer {
    direction: TimerDirection,
    major: u32,
    minor: u32,
    elapsed: u32,
    running: bool,
    state: State,
}

impl Timer {
    pub fn new(direction: TimerDirection, major: u32, minor: u32) -> Self {
        Self {
            direction,
            major: major.max(1),
            minor: minor.max(1),
            elapsed: 0,
            running: true,
            state: State::Unset,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn positions(&self) -> u32 {
        self.major * self.minor
    }

    /// Value currently on the digits
    pub fn shown(&self) -> u32 {
        let t = self.elapsed % self.positions();
        match self.direction {
            TimerDirection::Ascending => t,
            TimerDirection::Descending => self.positions() - 1 - t,
        }
    }

    fn format_time(&self, value: u32) -> String {
        format!("{}:{}", value / self.minor, value % self.minor)
    }
}

impl Component for Timer {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Timer
    }

    fn flavor(&self) -> Flavor {
        Flavor::Timer(self.direction)
    }

    fn num_states(&self) -> u32 {
        self.positions()
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
        self.running = !self.running;
        let to = if self.running {
            State::Unset
        } else {
            State::Value(self.shown())
        };
        Ok(set_state(&mut self.state, to))
    }

    fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed = self.elapsed.wrapping_add(1);
        true
    }

    fn describe(&self) -> String {
        format!("{} timer ({}×{})", self.direction, self.major, self.minor)
    }

    fn readout(&self) -> String {
        let status = if self.running { "running" } else { "stopped" };
        format!("{} {}", self.format_time(self.shown()), status)
    }

    fn describe_solution(&self, state: u32) -> String {
        format!("set the {} timer to {}", self.direction, self.format_time(state))
    }

    fn describe_action(&self) -> String {
        match self.state {
            State::Value(v) if !self.running => {
                format!("you set the {} timer to {}", self.direction, self.format_time(v))
            }
            _ => format!("you left the {} timer running", self.direction),
        }
    }

    fn describe_expected(&self, state: u32) -> String {
        let actual = match self.state {
            State::Value(v) if !self.running => format!("instead of {}", self.format_time(v)),
            _ => "you left it running".to_string(),
        };
        format!(
            "you should have set the {} timer to {} ({})",
            self.direction,
            self.format_time(state),
            actual
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct TimerFactory;

impl ComponentFactory for TimerFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Timer
    }

    fn flavors(&self) -> Vec<Flavor> {
        TimerDirection::ALL.iter().map(|&d| Flavor::Timer(d)).collect()
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        let free: Vec<TimerDirection> = TimerDirection::ALL
            .iter()
            .copied()
            .filter(|&d| !occupancy.is_flavor_taken(Flavor::Timer(d)))
            .collect();
        let &direction = free.choose(rng)?;
        let footprint = pick_rect(occupancy, 2, 2, rng)?;
        // Larger first bases leave fewer choices for the second
        let major = rng.gen_range(0..BASES.len());
        let minor = if major < 3 { rng.gen_range(0..3 - major) } else { 0 };
        let timer = Timer::new(direction, BASES[major], BASES[minor]);
        Some(ComponentInstance::new(id, footprint, Box::new(timer)))
    }
}
