//! Variety puzzle engine.
//!
//! Places a random set of interactive components on a grid, encodes their
//! solve order and target states into a single serial number, and judges
//! player input against that order at runtime.

pub mod arbiter;
pub mod component;
pub mod config;
pub mod encoder;
pub mod error;
pub mod factory;
pub mod flavor;
pub mod grid;
pub mod placement;
pub mod puzzle;
pub mod rng;
pub mod serial;

pub use arbiter::{ArbiterState, ArbitrationController, ChangeOrigin, Strike, Verdict};
pub use component::{Action, Component, ComponentId, ComponentInstance, Direction, State, Transition};
pub use config::PuzzleConfig;
pub use encoder::{Encoding, Solution, StateEncoder, TrialOutcome, TrialRejection, TrialSummary};
pub use error::{ConfigError, EncodeError, GenerationError, InputError, PuzzleError, SubscriptionError};
pub use factory::{Catalog, ComponentFactory, FactoryKind};
pub use flavor::{Flavor, FlavorOrder};
pub use grid::{Cell, Footprint, GridSize, Occupancy};
pub use placement::{Placement, PlacementEngine, Shortfall};
pub use puzzle::{ComponentSummary, Occupant, Puzzle, PuzzleEvent, PuzzleId, PuzzleSummary};
pub use rng::{RngStreams, Seeds, DEFAULT_RULE_SEED};
pub use serial::{DigitStrip, PuzzleSerial};
