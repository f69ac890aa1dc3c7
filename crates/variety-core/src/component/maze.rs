//! Small mazes with a movable dot.
//!
//! The walls of each maze size are fixed per rule seed: the factory carves one
//! spanning tree per size from the configuration stream when it is built, so
//! every puzzle sharing a rule seed shows the same walls for the same size.

use super::{set_state, Action, Component, ComponentId, ComponentInstance, Direction, State, Transition};
use crate::error::InputError;
use crate::factory::{ComponentFactory, FactoryKind};
use crate::flavor::Flavor;
use crate::grid::{Footprint, Occupancy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

/// Supported maze sizes, width by height
pub const MAZE_SIZES: [(u8, u8); 4] = [(3, 3), (3, 4), (4, 3), (4, 4)];

/// Open passages of a maze, per cell and direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeLayout {
    width: usize,
    height: usize,
    open: Vec<[bool; 4]>,
}

impl MazeLayout {
    /// Carve a perfect maze with an iterative randomized depth-first search
    pub fn carve(width: usize, height: usize, rng: &mut StdRng) -> Self {
        let mut open = vec![[false; 4]; width * height];
        let mut visited = vec![false; width * height];
        let start = rng.gen_range(0..width * height);
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(&cell) = stack.last() {
            let (x, y) = ((cell % width) as isize, (cell / width) as isize);
            let candidates: Vec<(Direction, usize)> = Direction::ALL
                .iter()
                .filter_map(|&dir| {
                    let (dx, dy) = dir.offset();
                    let (nx, ny) = (x + dx, y + dy);
                    if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                        return None;
                    }
                    let next = nx as usize + width * ny as usize;
                    (!visited[next]).then_some((dir, next))
                })
                .collect();
            match candidates.choose(rng) {
                Some(&(dir, next)) => {
                    open[cell][dir.index()] = true;
                    open[next][dir.opposite().index()] = true;
                    visited[next] = true;
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }
        Self { width, height, open }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_open(&self, cell: usize, dir: Direction) -> bool {
        self.open.get(cell).is_some_and(|o| o[dir.index()])
    }

    /// Cell reached by moving from `cell`, if no wall is in the way
    pub fn step(&self, cell: usize, dir: Direction) -> Option<usize> {
        if !self.is_open(cell, dir) {
            return None;
        }
        let (dx, dy) = dir.offset();
        let x = (cell % self.width) as isize + dx;
        let y = (cell / self.width) as isize + dy;
        Some(x as usize + self.width * y as usize)
    }

    fn label(&self, cell: usize) -> String {
        let column = (b'A' + (cell % self.width) as u8) as char;
        format!("{}{}", column, cell / self.width + 1)
    }
}

/// A maze whose state is the cell the dot occupies
#[derive(Debug, Clone)]
pub struct Maze {
    layout: Arc<MazeLayout>,
    state: State,
}

impl Maze {
    pub fn new(layout: Arc<MazeLayout>, position: usize) -> Self {
        let cells = layout.width * layout.height;
        Self {
            layout,
            state: State::Value((position % cells) as u32),
        }
    }

    pub fn layout(&self) -> &MazeLayout {
        &self.layout
    }

    fn position(&self) -> usize {
        self.state.value().unwrap_or(0) as usize
    }
}

impl Component for Maze {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Maze
    }

    fn flavor(&self) -> Flavor {
        Flavor::Maze {
            width: self.layout.width as u8,
            height: self.layout.height as u8,
        }
    }

    fn num_states(&self) -> u32 {
        (self.layout.width * self.layout.height) as u32
    }

    fn state(&self) -> State {
        self.state
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        match action {
            Action::Move(dir) => match self.layout.step(self.position(), *dir) {
                Some(next) => Ok(set_state(&mut self.state, State::Value(next as u32))),
                None => Ok(None),
            },
            other => Err(InputError::Unsupported {
                component: self.describe(),
                action: other.clone(),
            }),
        }
    }

    fn describe(&self) -> String {
        format!("{}×{} maze", self.layout.width, self.layout.height)
    }

    fn readout(&self) -> String {
        self.layout.label(self.position())
    }

    fn describe_solution(&self, state: u32) -> String {
        format!("move the dot in the {} to {}", self.describe(), self.layout.label(state as usize))
    }

    fn describe_action(&self) -> String {
        format!("you moved in the {}", self.describe())
    }

    fn describe_expected(&self, state: u32) -> String {
        format!(
            "you should have moved the dot in the {} to {} (instead of {})",
            self.describe(),
            self.layout.label(state as usize),
            self.layout.label(self.position())
        )
    }
}

#[derive(Debug, Clone)]
pub struct MazeFactory {
    layouts: Vec<Arc<MazeLayout>>,
}

impl MazeFactory {
    /// Carve the walls of every size from the configuration stream
    pub fn new(config_rng: &mut StdRng) -> Self {
        let layouts = MAZE_SIZES
            .iter()
            .map(|&(w, h)| Arc::new(MazeLayout::carve(w as usize, h as usize, config_rng)))
            .collect();
        Self { layouts }
    }

    pub fn layouts(&self) -> &[Arc<MazeLayout>] {
        &self.layouts
    }
}

impl ComponentFactory for MazeFactory {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Maze
    }

    fn flavors(&self) -> Vec<Flavor> {
        MAZE_SIZES
            .iter()
            .map(|&(width, height)| Flavor::Maze { width, height })
            .collect()
    }

    fn generate(&self, id: ComponentId, occupancy: &Occupancy, rng: &mut StdRng) -> Option<ComponentInstance> {
        let spots: Vec<(&Arc<MazeLayout>, usize)> = self
            .layouts
            .iter()
            .filter(|layout| {
                !occupancy.is_flavor_taken(Flavor::Maze {
                    width: layout.width as u8,
                    height: layout.height as u8,
                })
            })
            .flat_map(|layout| {
                occupancy
                    .rect_spots(layout.width, layout.height)
                    .into_iter()
                    .map(move |cell| (layout, cell))
            })
            .collect();
        let &(layout, cell) = spots.choose(rng)?;
        let footprint = Footprint::rect(occupancy.grid(), cell, layout.width, layout.height);
        let position = rng.gen_range(0..layout.width * layout.height);
        Some(ComponentInstance::new(
            id,
            footprint,
            Box::new(Maze::new(Arc::clone(layout), position)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn reachable(layout: &MazeLayout) -> usize {
        let cells = layout.width() * layout.height();
        let mut seen = vec![false; cells];
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(cell) = stack.pop() {
            for dir in Direction::ALL {
                if let Some(next) = layout.step(cell, dir) {
                    if !seen[next] {
                        seen[next] = true;
                        stack.push(next);
                    }
                }
            }
        }
        seen.iter().filter(|&&s| s).count()
    }

    #[test]
    fn test_carved_maze_is_a_spanning_tree() {
        for seed in 0..10 {
            let layout = MazeLayout::carve(4, 3, &mut StdRng::seed_from_u64(seed));
            assert_eq!(reachable(&layout), 12);
            let passages: usize = layout.open.iter().map(|o| o.iter().filter(|&&b| b).count()).sum();
            // Each passage is recorded from both sides; a tree on 12 cells has 11 edges
            assert_eq!(passages, 22);
        }
    }

    #[test]
    fn test_walls_fixed_by_config_stream() {
        let a = MazeFactory::new(&mut StdRng::seed_from_u64(21));
        let b = MazeFactory::new(&mut StdRng::seed_from_u64(21));
        assert_eq!(a.layouts(), b.layouts());
    }

    #[test]
    fn test_blocked_move_changes_nothing() {
        let layout = Arc::new(MazeLayout::carve(3, 3, &mut StdRng::seed_from_u64(2)));
        let mut maze = Maze::new(Arc::clone(&layout), 0);
        // The top-left corner never has a passage up or left
        assert_eq!(maze.apply(&Action::Move(Direction::Up)).unwrap(), None);
        assert_eq!(maze.apply(&Action::Move(Direction::Left)).unwrap(), None);
        assert_eq!(maze.state(), State::Value(0));

        let dir = if layout.is_open(0, Direction::Right) {
            Direction::Right
        } else {
            Direction::Down
        };
        let t = maze.apply(&Action::Move(dir)).unwrap().expect("open passage");
        assert_eq!(t.to.value(), layout.step(0, dir).map(|c| c as u32));
    }

    #[test]
    fn test_solution_text_uses_maze_coordinates() {
        let layout = Arc::new(MazeLayout::carve(4, 4, &mut StdRng::seed_from_u64(0)));
        let maze = Maze::new(layout, 5);
        assert_eq!(maze.readout(), "B2");
        assert_eq!(maze.describe_solution(15), "move the dot in the 4×4 maze to D4");
    }
}
