//! Weighted random placement of components on the grid.

use crate::component::{ComponentId, ComponentInstance};
use crate::factory::{Catalog, ComponentFactory};
use crate::grid::{GridSize, Occupancy};
use crate::puzzle::PuzzleId;
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Outcome of one successful placement attempt
#[derive(Debug)]
pub struct Placement {
    /// Interactive components, in placement order
    pub components: Vec<ComponentInstance>,
    /// Decorative components from the decoration pass
    pub decorations: Vec<ComponentInstance>,
    pub occupancy: Occupancy,
}

/// The pool emptied before enough interactive components were placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub placed: usize,
    pub target: usize,
}

/// Index picked by a weighted draw: the first entry whose cumulative weight
/// exceeds a uniform cut in `0..total`. All-zero weights pick index 0.
pub fn pick_weighted(weights: &[u32], rng: &mut StdRng) -> usize {
    let total: u64 = weights.iter().map(|&w| u64::from(w)).sum();
    if total == 0 {
        return 0;
    }
    let cut = rng.gen_range(0..total);
    let mut cumulative = 0u64;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += u64::from(w);
        if cut < cumulative {
            return i;
        }
    }
    weights.len() - 1
}

#[derive(Debug)]
pub struct PlacementEngine<'a> {
    puzzle: PuzzleId,
    catalog: &'a Catalog,
    grid: GridSize,
    target: usize,
    decorations: usize,
}

impl<'a> PlacementEngine<'a> {
    pub fn new(puzzle: PuzzleId, catalog: &'a Catalog, grid: GridSize, target: usize, decorations: usize) -> Self {
        Self {
            puzzle,
            catalog,
            grid,
            target,
            decorations,
        }
    }

    /// One attempt from empty occupancy.
    ///
    /// A factory that declines is retired for the rest of the attempt; one that
    /// succeeds loses a point of weight, never dropping below 1.
    pub fn attempt(&self, rng: &mut StdRng) -> Result<Placement, Shortfall> {
        let mut occupancy = Occupancy::new(self.grid);
        let mut pool = self.catalog.interactive_pool();
        let mut components = Vec::with_capacity(self.target);
        let mut next_id = 0u32;

        while components.len() < self.target && !pool.is_empty() {
            let weights: Vec<u32> = pool.iter().map(|&(_, w)| w).collect();
            let pick = pick_weighted(&weights, rng);
            let (factory, weight) = pool[pick];

            match factory.generate(ComponentId(next_id), &occupancy, rng) {
                Some(instance) => {
                    next_id += 1;
                    occupancy.claim(instance.footprint(), instance.flavor());
                    debug!(
                        "<Variety #{}> Placed {} at {}",
                        self.puzzle,
                        instance.describe(),
                        self.grid.label(instance.footprint().anchor())
                    );
                    components.push(instance);
                    pool[pick].1 = weight.saturating_sub(1).max(1);
                }
                None => {
                    debug!("<Variety #{}> Retiring {} factory", self.puzzle, factory.kind());
                    pool.remove(pick);
                }
            }
        }

        if components.len() < self.target {
            return Err(Shortfall {
                placed: components.len(),
                target: self.target,
            });
        }

        let decorations = self.decorate(&mut occupancy, &mut next_id, rng);
        Ok(Placement {
            components,
            decorations,
            occupancy,
        })
    }

    /// Fill up to `decorations` cells with decorative components
    fn decorate(&self, occupancy: &mut Occupancy, next_id: &mut u32, rng: &mut StdRng) -> Vec<ComponentInstance> {
        let mut pool: Vec<&dyn ComponentFactory> = self.catalog.decorative();
        let mut placed = Vec::new();
        while placed.len() < self.decorations && !pool.is_empty() {
            let pick = rng.gen_range(0..pool.len());
            match pool[pick].generate(ComponentId(*next_id), occupancy, rng) {
                Some(instance) => {
                    *next_id += 1;
                    occupancy.claim(instance.footprint(), instance.flavor());
                    placed.push(instance);
                }
                None => {
                    pool.remove(pick);
                }
            }
        }
        placed
    }
}
