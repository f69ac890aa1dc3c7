//! The puzzle facade: generation with bounded retries plus the host entry points.

use crate::arbiter::{ArbitrationController, ChangeOrigin, Strike, Verdict};
use crate::component::{Action, ComponentId, ComponentInstance, Transition};
use crate::config::PuzzleConfig;
use crate::encoder::{Encoding, Solution, StateEncoder, TrialSummary};
use crate::error::{EncodeError, GenerationError, PuzzleError};
use crate::factory::{Catalog, FactoryKind};
use crate::flavor::{Flavor, FlavorOrder};
use crate::grid::{Cell, GridSize};
use crate::placement::{Placement, PlacementEngine};
use crate::rng::Seeds;
use crate::serial::{DigitStrip, PuzzleSerial};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned puzzle identifier, used to tag log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PuzzleId(pub u32);

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the host sees happen during play
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuzzleEvent {
    Strike(Strike),
    Pass,
}

/// What occupies a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    /// Interactive component at this solve position
    Component(usize),
    /// Index into the decorations
    Decoration(usize),
}

/// A generated, playable puzzle
#[derive(Debug)]
pub struct Puzzle {
    id: PuzzleId,
    seeds: Seeds,
    grid: GridSize,
    digit_cap: u32,
    flavor_order: FlavorOrder,
    /// Interactive components in solve order
    components: Vec<ComponentInstance>,
    decorations: Vec<ComponentInstance>,
    encoding: Encoding,
    /// Generation attempts used, counting the successful one
    attempts: usize,
    arbiter: ArbitrationController,
    cell_map: Vec<Option<Occupant>>,
    strikes: u32,
    events: Vec<PuzzleEvent>,
}

impl Puzzle {
    /// Generate a puzzle, retrying placement and encoding up to the configured cap
    pub fn generate(id: PuzzleId, config: &PuzzleConfig, seeds: Seeds) -> Result<Self, GenerationError> {
        config.validate()?;
        let streams = seeds.streams();
        let mut config_rng = streams.config;
        let mut rng = streams.instance;

        let catalog = Catalog::standard(config, &mut config_rng);
        let flavor_order = FlavorOrder::compute(catalog.all_flavors(), &mut config_rng);
        let grid = config.grid();
        let engine = PlacementEngine::new(id, &catalog, grid, config.target_components, config.decorations);
        let encoder = StateEncoder::from_config(id, config);

        for iteration in 1..=config.max_generation_attempts {
            debug!("<Variety #{}> Iteration {}", id, iteration);

            let Placement {
                mut components,
                decorations,
                ..
            } = match engine.attempt(&mut rng) {
                Ok(placement) => placement,
                Err(shortfall) => {
                    debug!(
                        "<Variety #{}> Placed only {} of {} components, retrying",
                        id, shortfall.placed, shortfall.target
                    );
                    continue;
                }
            };

            let encoding = match encoder.encode(&mut components, &flavor_order, &mut rng) {
                Ok(encoding) => encoding,
                Err(err) => {
                    debug!("<Variety #{}> Encoding failed: {}", id, err);
                    continue;
                }
            };

            components.sort_by_key(|c| encoding.solution.position(c.id()).unwrap_or(usize::MAX));
            let arbiter = ArbitrationController::finalize(id, &mut components, encoding.solution.expected.clone())?;

            let puzzle = Self {
                id,
                seeds,
                grid,
                digit_cap: encoder.digit_cap(),
                cell_map: build_cell_map(grid, &components, &decorations),
                flavor_order,
                components,
                decorations,
                encoding,
                attempts: iteration,
                arbiter,
                strikes: 0,
                events: Vec::new(),
            };
            puzzle.log_solution();
            return Ok(puzzle);
        }

        Err(GenerationError::Exhausted {
            attempts: config.max_generation_attempts,
            target: config.target_components,
            width: grid.width,
            height: grid.height,
        })
    }

    fn log_solution(&self) {
        info!("[Variety #{}] Serial number: {}", self.id, self.serial());
        for (step, action) in self.expected_actions().iter().enumerate() {
            info!("[Variety #{}] Step {}: {}", self.id, step + 1, action);
        }
    }

    pub fn id(&self) -> PuzzleId {
        self.id
    }

    pub fn seeds(&self) -> Seeds {
        self.seeds
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn serial(&self) -> PuzzleSerial {
        self.encoding.serial
    }

    /// The serial as shown to the player, one position per allowed digit
    pub fn digit_strip(&self) -> DigitStrip {
        self.serial().digit_strip(self.digit_cap as usize)
    }

    pub fn digit_cap(&self) -> u32 {
        self.digit_cap
    }

    pub fn solution(&self) -> &Solution {
        &self.encoding.solution
    }

    pub fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    pub fn trials(&self) -> &[TrialSummary] {
        &self.encoding.trials
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Interactive components in solve order
    pub fn components(&self) -> &[ComponentInstance] {
        &self.components
    }

    pub fn decorations(&self) -> &[ComponentInstance] {
        &self.decorations
    }

    pub fn flavor_order(&self) -> &FlavorOrder {
        &self.flavor_order
    }

    pub fn occupant(&self, cell: Cell) -> Option<Occupant> {
        self.cell_map.get(cell).copied().flatten()
    }

    /// Solve position of the interactive component covering `cell`
    pub fn component_at(&self, cell: Cell) -> Option<usize> {
        match self.occupant(cell)? {
            Occupant::Component(position) => Some(position),
            Occupant::Decoration(_) => None,
        }
    }

    /// One instruction per solve position
    pub fn expected_actions(&self) -> Vec<String> {
        self.components
            .iter()
            .zip(self.arbiter.expected())
            .map(|(c, &state)| c.component().describe_solution(state))
            .collect()
    }

    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    pub fn is_solved(&self) -> bool {
        self.arbiter.is_solved()
    }

    pub fn events(&self) -> &[PuzzleEvent] {
        &self.events
    }

    /// A player gesture on the component at `position`; the arbiter judges it
    pub fn apply_user_input(&mut self, position: usize, action: &Action) -> Result<Option<Verdict>, PuzzleError> {
        let Some(transition) = self.apply(position, action)? else {
            return Ok(None);
        };
        let verdict = self
            .arbiter
            .on_state_changed(&mut self.components, position, transition, ChangeOrigin::User);
        match &verdict {
            Some(Verdict::Strike(strike)) => {
                self.strikes += 1;
                self.events.push(PuzzleEvent::Strike(strike.clone()));
            }
            Some(Verdict::Pass) => self.events.push(PuzzleEvent::Pass),
            None => {}
        }
        Ok(verdict)
    }

    /// Drive a component from the host without judging the result
    pub fn apply_programmatic_input(&mut self, position: usize, action: &Action) -> Result<(), PuzzleError> {
        if let Some(transition) = self.apply(position, action)? {
            self.route_programmatic(position, transition);
        }
        Ok(())
    }

    /// Advance time-driven displays; returns whether anything shown changed.
    /// States never change on a tick, so nothing reaches the arbiter.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        for instance in &mut self.components {
            changed |= instance.component_mut().tick();
        }
        changed
    }

    fn apply(&mut self, position: usize, action: &Action) -> Result<Option<Transition>, PuzzleError> {
        let component = self
            .components
            .get_mut(position)
            .ok_or(PuzzleError::UnknownPosition(position))?;
        Ok(component.component_mut().apply(action)?)
    }

    fn route_programmatic(&mut self, position: usize, transition: Transition) {
        self.arbiter
            .on_state_changed(&mut self.components, position, transition, ChangeOrigin::Programmatic);
    }

    /// Decode the serial again and check it gives back the committed solution
    pub fn verify_round_trip(&self) -> Result<(), EncodeError> {
        let encoder = StateEncoder::new(self.id, 1, self.digit_cap);
        let decoded = encoder.decode(self.serial(), &self.components, &self.flavor_order)?;
        let refolded = self.solution().refold()?;
        if decoded != *self.solution() || refolded != self.serial() {
            return Err(EncodeError::RoundTripMismatch {
                serial: self.serial().value(),
            });
        }
        Ok(())
    }

    /// Every footprint is in bounds and no two overlap
    pub fn footprints_disjoint(&self) -> bool {
        let mut seen = vec![false; self.grid.cell_count()];
        for instance in self.components.iter().chain(&self.decorations) {
            for &cell in instance.footprint().cells() {
                if !self.grid.contains(cell) || seen[cell] {
                    return false;
                }
                seen[cell] = true;
            }
        }
        true
    }

    pub fn summary(&self) -> PuzzleSummary {
        PuzzleSummary {
            id: self.id,
            seeds: self.seeds,
            grid: self.grid,
            serial: self.serial(),
            digit_cap: self.digit_cap,
            attempts: self.attempts,
            trials: self.encoding.trials.len(),
            flavor_order: self.flavor_order.as_slice().to_vec(),
            components: self
                .components
                .iter()
                .zip(self.arbiter.expected())
                .enumerate()
                .map(|(position, (c, &expected))| ComponentSummary {
                    position,
                    id: c.id(),
                    kind: c.kind(),
                    flavor: c.flavor(),
                    anchor: self.grid.label(c.footprint().anchor()),
                    num_states: c.num_states(),
                    expected,
                    instruction: c.component().describe_solution(expected),
                })
                .collect(),
            decorations: self
                .decorations
                .iter()
                .map(|d| self.grid.label(d.footprint().anchor()))
                .collect(),
        }
    }
}

fn build_cell_map(
    grid: GridSize,
    components: &[ComponentInstance],
    decorations: &[ComponentInstance],
) -> Vec<Option<Occupant>> {
    let mut map = vec![None; grid.cell_count()];
    let tagged = components
        .iter()
        .enumerate()
        .map(|(i, c)| (Occupant::Component(i), c))
        .chain(decorations.iter().enumerate().map(|(i, d)| (Occupant::Decoration(i), d)));
    for (occupant, instance) in tagged {
        for &cell in instance.footprint().cells() {
            if let Some(slot) = map.get_mut(cell) {
                *slot = Some(occupant);
            }
        }
    }
    map
}

/// Serializable overview of a generated puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSummary {
    pub id: PuzzleId,
    pub seeds: Seeds,
    pub grid: GridSize,
    pub serial: PuzzleSerial,
    pub digit_cap: u32,
    pub attempts: usize,
    pub trials: usize,
    pub flavor_order: Vec<Flavor>,
    pub components: Vec<ComponentSummary>,
    /// Anchor labels of the decorative components
    pub decorations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub position: usize,
    pub id: ComponentId,
    pub kind: FactoryKind,
    pub flavor: Flavor,
    pub anchor: String,
    pub num_states: u32,
    pub expected: u32,
    pub instruction: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(instance_seed: u64) -> Puzzle {
        Puzzle::generate(PuzzleId(1), &PuzzleConfig::default(), Seeds::new(1, instance_seed)).unwrap()
    }

    #[test]
    fn test_generate_default_puzzle() {
        let puzzle = generate(42);
        assert_eq!(puzzle.components().len(), 8);
        assert!(puzzle.decorations().len() <= 4);
        assert!(puzzle.serial().digit_count() <= 17);
        assert!(puzzle.footprints_disjoint());
        assert!(puzzle.verify_round_trip().is_ok());
        assert!(!puzzle.is_solved());
        assert_eq!(puzzle.strikes(), 0);
    }

    #[test]
    fn test_components_are_stored_in_solve_order() {
        let puzzle = generate(7);
        let ids: Vec<ComponentId> = puzzle.components().iter().map(|c| c.id()).collect();
        assert_eq!(ids, puzzle.solution().order);
        for (position, c) in puzzle.components().iter().enumerate() {
            assert_eq!(c.subscription().map(|s| s.position()), Some(position));
        }
    }

    #[test]
    fn test_same_seeds_same_puzzle() {
        let a = generate(99);
        let b = generate(99);
        assert_eq!(a.serial(), b.serial());
        assert_eq!(a.summary(), b.summary());
    }

    #[test]
    fn test_rule_seed_fixes_flavor_order() {
        let config = PuzzleConfig::default();
        let a = Puzzle::generate(PuzzleId(1), &config, Seeds::new(5, 1)).unwrap();
        let b = Puzzle::generate(PuzzleId(2), &config, Seeds::new(5, 2)).unwrap();
        assert_eq!(a.flavor_order(), b.flavor_order());
    }

    #[test]
    fn test_component_at_matches_footprints() {
        let puzzle = generate(3);
        for (position, c) in puzzle.components().iter().enumerate() {
            for &cell in c.footprint().cells() {
                assert_eq!(puzzle.component_at(cell), Some(position));
            }
        }
        for d in puzzle.decorations() {
            assert_eq!(puzzle.component_at(d.footprint().anchor()), None);
        }
    }

    #[test]
    fn test_unknown_position_is_an_error() {
        let mut puzzle = generate(4);
        let err = puzzle.apply_user_input(99, &Action::Press).unwrap_err();
        assert_eq!(err, PuzzleError::UnknownPosition(99));
    }

    #[test]
    fn test_exhausted_when_grid_is_too_small() {
        let config = PuzzleConfig {
            width: 3,
            height: 3,
            max_generation_attempts: 5,
            ..PuzzleConfig::default()
        };
        let err = Puzzle::generate(PuzzleId(1), &config, Seeds::new(1, 1)).unwrap_err();
        assert!(matches!(err, GenerationError::Exhausted { attempts: 5, target: 8, .. }));
    }

    #[test]
    fn test_invalid_config_fails_before_generation() {
        let config = PuzzleConfig {
            digit_cap: 0,
            ..PuzzleConfig::default()
        };
        let err = Puzzle::generate(PuzzleId(1), &config, Seeds::new(1, 1)).unwrap_err();
        assert!(matches!(err, GenerationError::Config(_)));
    }

    #[test]
    fn test_expected_actions_cover_every_position() {
        let puzzle = generate(11);
        assert_eq!(puzzle.expected_actions().len(), puzzle.components().len());
        assert_eq!(puzzle.summary().components.len(), puzzle.components().len());
    }

    #[test]
    fn test_ticks_never_change_states() {
        let mut puzzle = generate(21);
        let before: Vec<_> = puzzle.components().iter().map(|c| c.state()).collect();
        for _ in 0..20 {
            puzzle.tick();
        }
        let after: Vec<_> = puzzle.components().iter().map(|c| c.state()).collect();
        assert_eq!(before, after);
        assert_eq!(puzzle.strikes(), 0);
        assert!(puzzle.events().is_empty());
        assert!(!puzzle.is_solved());
    }
}
