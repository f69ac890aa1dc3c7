//! Ordered-correctness scenarios driven through the public arbiter API.

use variety_core::{
    Action, ArbitrationController, ChangeOrigin, Component, ComponentId, ComponentInstance, FactoryKind, Flavor,
    Footprint, InputError, PuzzleId, State, Transition, Verdict,
};

/// Component whose state is whatever number was last pressed
#[derive(Debug)]
struct Dial {
    states: u32,
    state: State,
    stuck: bool,
}

impl Component for Dial {
    fn kind(&self) -> FactoryKind {
        FactoryKind::Knob
    }

    fn flavor(&self) -> Flavor {
        Flavor::Knob
    }

    fn num_states(&self) -> u32 {
        self.states
    }

    fn state(&self) -> State {
        self.state
    }

    fn is_stuck(&self) -> bool {
        self.stuck
    }

    fn apply(&mut self, action: &Action) -> Result<Option<Transition>, InputError> {
        let Action::PressKey(value) = action else {
            return Err(InputError::Unsupported {
                component: "dial".to_string(),
                action: action.clone(),
            });
        };
        let to = State::Value(*value as u32);
        if to == self.state {
            return Ok(None);
        }
        let from = std::mem::replace(&mut self.state, to);
        Ok(Some(Transition { from, to }))
    }

    fn describe(&self) -> String {
        "dial".to_string()
    }

    fn describe_solution(&self, state: u32) -> String {
        format!("set the dial to {}", state)
    }

    fn describe_action(&self) -> String {
        "you turned a dial".to_string()
    }

    fn describe_expected(&self, state: u32) -> String {
        format!("a dial should have been set to {} first", state)
    }
}

struct Board {
    components: Vec<ComponentInstance>,
    arbiter: ArbitrationController,
}

impl Board {
    fn new(expected: Vec<u32>, stuck: &[usize]) -> Self {
        let mut components: Vec<ComponentInstance> = (0..expected.len())
            .map(|i| {
                let dial = Dial {
                    states: 3,
                    state: State::Unset,
                    stuck: stuck.contains(&i),
                };
                ComponentInstance::new(ComponentId(i as u32), Footprint::from_cells(vec![i]), Box::new(dial))
            })
            .collect();
        let arbiter = ArbitrationController::finalize(PuzzleId(7), &mut components, expected).unwrap();
        Self { components, arbiter }
    }

    fn set(&mut self, position: usize, value: usize) -> Option<Verdict> {
        let transition = self.components[position]
            .component_mut()
            .apply(&Action::PressKey(value))
            .unwrap()?;
        self.arbiter
            .on_state_changed(&mut self.components, position, transition, ChangeOrigin::User)
    }
}

#[test]
fn test_correct_order_yields_one_pass() {
    let mut board = Board::new(vec![2, 0, 1], &[]);
    let verdicts: Vec<Option<Verdict>> = vec![board.set(0, 2), board.set(1, 0), board.set(2, 1)];
    assert_eq!(verdicts, vec![None, None, Some(Verdict::Pass)]);
    assert!(board.arbiter.is_solved());
}

#[test]
fn test_skipping_ahead_strikes_first_unmet() {
    let mut board = Board::new(vec![2, 0, 1], &[]);
    let Some(Verdict::Strike(strike)) = board.set(2, 1) else {
        panic!("setting the last dial first must strike");
    };
    assert_eq!(strike.culprit, 0);
    assert_eq!(strike.culprit_id, ComponentId(0));
    assert_eq!(strike.trigger, 2);
    assert_eq!(
        strike.to_string(),
        "You received a strike when you turned a dial because a dial should have been set to 2 first."
    );
}

#[test]
fn test_culprit_is_first_mismatch_not_first_position() {
    let mut board = Board::new(vec![2, 0, 1], &[]);
    assert_eq!(board.set(0, 2), None);
    let Some(Verdict::Strike(strike)) = board.set(2, 1) else {
        panic!("position 1 is still unset");
    };
    assert_eq!(strike.culprit, 1);
}

#[test]
fn test_stuck_mismatch_is_skipped_by_both_scans() {
    let mut board = Board::new(vec![2, 0, 1], &[0]);
    assert_eq!(board.set(1, 0), None);
    assert_eq!(board.set(2, 1), Some(Verdict::Pass));
}

#[test]
fn test_stuck_mismatch_after_last_change_does_not_block_completion() {
    // Position 2 stays unset; only the completion scan ever looks at it
    let mut board = Board::new(vec![2, 0, 1], &[2]);
    assert_eq!(board.set(0, 2), None);
    assert_eq!(board.set(1, 0), Some(Verdict::Pass));
    assert!(board.arbiter.is_solved());
}

#[test]
fn test_unstuck_mismatch_after_last_change_blocks_completion() {
    let mut board = Board::new(vec![2, 0, 1], &[]);
    assert_eq!(board.set(0, 2), None);
    assert_eq!(board.set(1, 0), None);
    assert!(!board.arbiter.is_solved());
}

#[test]
fn test_events_after_solve_are_ignored() {
    let mut board = Board::new(vec![2, 0, 1], &[]);
    board.set(0, 2);
    board.set(1, 0);
    assert_eq!(board.set(2, 1), Some(Verdict::Pass));
    assert_eq!(board.set(0, 0), None);
    assert_eq!(board.set(2, 2), None);
    assert_eq!(board.set(2, 1), None);
    assert!(board.arbiter.is_solved());
}

#[test]
fn test_correcting_after_strike_still_solves() {
    let mut board = Board::new(vec![1, 1], &[]);
    assert!(matches!(board.set(1, 1), Some(Verdict::Strike(_))));
    // Position 1 already matches, so fixing position 0 completes the puzzle
    assert_eq!(board.set(0, 1), Some(Verdict::Pass));
}
