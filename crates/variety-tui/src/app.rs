use crate::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use log::info;
use std::time::{Duration, Instant};
use variety_core::{
    Action, Cell, Direction, FactoryKind, GenerationError, Puzzle, PuzzleConfig, PuzzleId, Seeds, Verdict,
};

/// Host ticks between two puzzle ticks (about one second)
pub const PUZZLE_TICK_DIVISOR: u32 = 10;

/// Result of handling a key press
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenState {
    Playing,
    Solved,
}

/// The main application state
pub struct App {
    /// Current puzzle
    pub puzzle: Puzzle,
    config: PuzzleConfig,
    rule_seed: u64,
    next_id: u32,
    /// Cell under the cursor
    pub cursor: Cell,
    /// Solve position of the selected component
    pub selected: Option<usize>,
    /// Color theme
    pub theme: Theme,
    /// Message to display
    pub message: Option<String>,
    message_timer: u32,
    pub screen_state: ScreenState,
    /// Whether the solution overlay is shown
    pub show_solution: bool,
    started: Instant,
    ticks: u32,
}

impl App {
    pub fn new(config: PuzzleConfig, seeds: Seeds, id: PuzzleId) -> Result<Self, GenerationError> {
        let puzzle = Puzzle::generate(id, &config, seeds)?;
        Ok(Self::with_puzzle(puzzle, config))
    }

    pub fn with_puzzle(puzzle: Puzzle, config: PuzzleConfig) -> Self {
        Self {
            rule_seed: puzzle.seeds().rule_seed,
            next_id: puzzle.id().0.wrapping_add(1),
            selected: puzzle.component_at(0),
            puzzle,
            config,
            cursor: 0,
            theme: Theme::dark(),
            message: None,
            message_timer: 0,
            screen_state: ScreenState::Playing,
            show_solution: false,
            started: Instant::now(),
            ticks: 0,
        }
    }

    pub fn get_tick_rate(&self) -> Duration {
        Duration::from_millis(100)
    }

    /// Update timers and time-driven components (called every tick)
    pub fn tick(&mut self) {
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message = None;
            }
        }

        self.ticks = self.ticks.wrapping_add(1);
        if self.screen_state == ScreenState::Playing && self.ticks % PUZZLE_TICK_DIVISOR == 0 {
            self.puzzle.tick();
        }
    }

    /// Show a temporary message
    pub fn show_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_timer = 50; // ~5 seconds at 100ms poll
    }

    /// Last digit of the elapsed seconds, read by keys when turned
    pub fn timer_digit(&self) -> u8 {
        (self.started.elapsed().as_secs() % 10) as u8
    }

    pub fn elapsed_string(&self) -> String {
        let secs = self.started.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen_state {
            ScreenState::Solved => self.handle_solved_key(key),
            ScreenState::Playing => self.handle_game_key(key),
        }
    }

    fn handle_solved_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,
            KeyCode::Char('n') | KeyCode::Enter | KeyCode::Char(' ') => self.new_puzzle(),
            KeyCode::Char('?') => self.show_solution = !self.show_solution,
            _ => {}
        }
        AppAction::Continue
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('q') => return AppAction::Quit,

            // Navigation
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(0, -1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(0, 1),
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1, 0),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1, 0),
            KeyCode::Tab => self.cycle_selection(true),
            KeyCode::BackTab => self.cycle_selection(false),

            KeyCode::Char('?') => self.show_solution = !self.show_solution,
            KeyCode::Char('n') => self.new_puzzle(),
            KeyCode::Char('t') => {
                self.theme = if self.theme.is_dark() {
                    Theme::light()
                } else {
                    Theme::dark()
                };
            }

            // Component gestures
            code => {
                let Some(position) = self.selected else {
                    if matches!(code, KeyCode::Char(' ') | KeyCode::Enter) {
                        self.show_message("Nothing selected");
                    }
                    return AppAction::Continue;
                };
                let kind = self.puzzle.components()[position].kind();
                if let Some(action) = action_for_key(kind, code, self.timer_digit()) {
                    self.perform(position, action);
                }
            }
        }
        AppAction::Continue
    }

    /// Send a player gesture to the component at a solve position
    pub fn perform(&mut self, position: usize, action: Action) {
        match self.puzzle.apply_user_input(position, &action) {
            Ok(Some(Verdict::Strike(strike))) => self.show_message(&strike.to_string()),
            Ok(Some(Verdict::Pass)) => {
                self.screen_state = ScreenState::Solved;
                self.show_message("Module solved!");
            }
            Ok(None) => {}
            Err(err) => self.show_message(&err.to_string()),
        }
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let grid = self.puzzle.grid();
        let x = (grid.x(self.cursor) as isize + dx).clamp(0, grid.width as isize - 1);
        let y = (grid.y(self.cursor) as isize + dy).clamp(0, grid.height as isize - 1);
        self.cursor = grid.cell(x as usize, y as usize);
        self.selected = self.puzzle.component_at(self.cursor);
    }

    /// Solve positions ordered by where they sit on the grid
    pub fn browse_order(&self) -> Vec<usize> {
        let mut positions: Vec<usize> = (0..self.puzzle.components().len()).collect();
        positions.sort_by_key(|&p| self.puzzle.components()[p].footprint().anchor());
        positions
    }

    fn cycle_selection(&mut self, forward: bool) {
        let order = self.browse_order();
        if order.is_empty() {
            return;
        }
        let next = match self.selected.and_then(|s| order.iter().position(|&p| p == s)) {
            Some(i) if forward => (i + 1) % order.len(),
            Some(i) => (i + order.len() - 1) % order.len(),
            None if forward => 0,
            None => order.len() - 1,
        };
        let position = order[next];
        self.selected = Some(position);
        self.cursor = self.puzzle.components()[position].footprint().anchor();
    }

    fn new_puzzle(&mut self) {
        let seeds = Seeds::with_random_instance(self.rule_seed);
        match Puzzle::generate(PuzzleId(self.next_id), &self.config, seeds) {
            Ok(puzzle) => {
                info!("Started puzzle #{} (instance seed {})", puzzle.id(), seeds.instance_seed);
                let message = format!("New puzzle #{}", puzzle.id());
                let theme = self.theme.clone();
                let config = self.config.clone();
                *self = Self::with_puzzle(puzzle, config);
                self.theme = theme;
                self.show_message(&message);
            }
            Err(err) => self.show_message(&err.to_string()),
        }
    }
}

/// Gesture a key stands for on a component of the given kind
pub fn action_for_key(kind: FactoryKind, code: KeyCode, timer_digit: u8) -> Option<Action> {
    let primary = matches!(code, KeyCode::Char(' ') | KeyCode::Enter);
    match kind {
        FactoryKind::Wire if primary => Some(Action::Cut),
        FactoryKind::Key if primary => Some(Action::TurnKey { timer_digit }),
        FactoryKind::Knob
        | FactoryKind::ColoredKnob
        | FactoryKind::Slider
        | FactoryKind::Switch
        | FactoryKind::Led
        | FactoryKind::Timer
            if primary =>
        {
            Some(Action::Press)
        }
        FactoryKind::DigitDisplay => match code {
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::Increment),
            KeyCode::Char('-') => Some(Action::Decrement),
            _ if primary => Some(Action::Increment),
            _ => None,
        },
        FactoryKind::Keypad | FactoryKind::ColoredKeypad => match code {
            KeyCode::Char(c @ '1'..='9') => c.to_digit(10).map(|d| Action::PressKey(d as usize - 1)),
            _ => None,
        },
        FactoryKind::LetterDisplay => match code {
            KeyCode::Char(c @ '1'..='3') => c.to_digit(10).map(|d| Action::PressSlot(d as usize - 1)),
            _ => None,
        },
        FactoryKind::Maze | FactoryKind::Die => match code {
            KeyCode::Char('w') => Some(Action::Move(Direction::Up)),
            KeyCode::Char('a') => Some(Action::Move(Direction::Left)),
            KeyCode::Char('s') => Some(Action::Move(Direction::Down)),
            KeyCode::Char('d') => Some(Action::Move(Direction::Right)),
            _ => None,
        },
        _ => None,
    }
}
