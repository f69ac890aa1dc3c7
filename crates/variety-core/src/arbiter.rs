//! Runtime judge of player input against the decided solution.

use crate::component::{ComponentId, ComponentInstance, State, Transition};
use crate::error::SubscriptionError;
use crate::puzzle::PuzzleId;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArbiterState {
    Unsolved,
    Solved,
}

/// Who caused a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// A genuine player gesture; judged
    User,
    /// Set by the host, a timer or a stage broadcast; never judged
    Programmatic,
}

/// A strike, naming the earlier component that was not yet in its target state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strike {
    /// Solve position of the component that was wrong
    pub culprit: usize,
    pub culprit_id: ComponentId,
    /// Solve position of the component the player changed
    pub trigger: usize,
    pub trigger_id: ComponentId,
    /// What the player did
    pub did: String,
    /// What should have happened first
    pub should: String,
}

impl fmt::Display for Strike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "You received a strike when {} because {}.", self.did, self.should)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Strike(Strike),
    Pass,
}

/// Enforces that components reach their targets in solve order.
///
/// Positions are indices into the solve-ordered component slice the controller
/// was finalized with; the same slice must be passed to every event.
#[derive(Debug, Clone)]
pub struct ArbitrationController {
    puzzle: PuzzleId,
    expected: Vec<u32>,
    /// Rank among stage providers, per solve position
    stage_ranks: Vec<Option<usize>>,
    state: ArbiterState,
}

impl ArbitrationController {
    /// Subscribe every component at its solve position
    pub fn finalize(
        puzzle: PuzzleId,
        components: &mut [ComponentInstance],
        expected: Vec<u32>,
    ) -> Result<Self, SubscriptionError> {
        let mut stage_ranks = Vec::with_capacity(components.len());
        let mut providers = 0;
        for (position, component) in components.iter_mut().enumerate() {
            component.subscribe(position)?;
            if component.can_provide_stage() {
                stage_ranks.push(Some(providers));
                providers += 1;
            } else {
                stage_ranks.push(None);
            }
        }
        Ok(Self {
            puzzle,
            expected,
            stage_ranks,
            state: ArbiterState::Unsolved,
        })
    }

    pub fn state(&self) -> ArbiterState {
        self.state
    }

    pub fn is_solved(&self) -> bool {
        self.state == ArbiterState::Solved
    }

    pub fn expected(&self) -> &[u32] {
        &self.expected
    }

    pub fn stage_rank(&self, position: usize) -> Option<usize> {
        self.stage_ranks.get(position).copied().flatten()
    }

    fn is_satisfied(&self, component: &ComponentInstance, position: usize) -> bool {
        component.is_stuck() || component.state().matches(self.expected[position])
    }

    /// React to a component at `position` having changed state
    pub fn on_state_changed(
        &mut self,
        components: &mut [ComponentInstance],
        position: usize,
        transition: Transition,
        origin: ChangeOrigin,
    ) -> Option<Verdict> {
        if position >= components.len() || position >= self.expected.len() {
            return None;
        }
        if components[position].subscription().is_none() || transition.to == State::Unset {
            return None;
        }

        if let Some(rank) = self.stage_rank(position) {
            for later in position + 1..components.len() {
                if let Some(t) = components[later].component_mut().receive_stage_change(rank) {
                    self.on_state_changed(components, later, t, ChangeOrigin::Programmatic);
                }
            }
        }

        if self.is_solved() || origin == ChangeOrigin::Programmatic {
            return None;
        }

        for earlier in 0..position {
            if !self.is_satisfied(&components[earlier], earlier) {
                let strike = Strike {
                    culprit: earlier,
                    culprit_id: components[earlier].id(),
                    trigger: position,
                    trigger_id: components[position].id(),
                    did: components[position].component().describe_action(),
                    should: components[earlier].component().describe_expected(self.expected[earlier]),
                };
                info!("[Variety #{}] {}", self.puzzle, strike);
                components[earlier].component_mut().checked();
                return Some(Verdict::Strike(strike));
            }
        }

        if (position..components.len()).any(|p| !self.is_satisfied(&components[p], p)) {
            debug!("<Variety #{}> Position {} correct, puzzle not complete", self.puzzle, position);
            return None;
        }

        info!("[Variety #{}] Puzzle solved.", self.puzzle);
        self.state = ArbiterState::Solved;
        Some(Verdict::Pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::testing::{instance, Scripted};
    use crate::component::Action;
    use crate::flavor::Flavor;

    fn three() -> (Vec<ComponentInstance>, ArbitrationController) {
        let mut components: Vec<ComponentInstance> = (0..3)
            .map(|i| instance(i, Scripted::new(Flavor::Maze { width: i as u8, height: 1 }, 3)))
            .collect();
        let arbiter = ArbitrationController::finalize(PuzzleId(1), &mut components, vec![2, 0, 1]).unwrap();
        (components, arbiter)
    }

    fn set(
        components: &mut [ComponentInstance],
        arbiter: &mut ArbitrationController,
        position: usize,
        value: usize,
    ) -> Option<Verdict> {
        let t = components[position]
            .component_mut()
            .apply(&Action::PressKey(value))
            .unwrap()?;
        arbiter.on_state_changed(components, position, t, ChangeOrigin::User)
    }

    #[test]
    fn test_in_order_solve_passes_once() {
        let (mut components, mut arbiter) = three();
        assert_eq!(set(&mut components, &mut arbiter, 0, 2), None);
        assert_eq!(set(&mut components, &mut arbiter, 1, 0), None);
        assert_eq!(set(&mut components, &mut arbiter, 2, 1), Some(Verdict::Pass));
        assert!(arbiter.is_solved());
    }

    #[test]
    fn test_out_of_order_blames_first_unmet() {
        let (mut components, mut arbiter) = three();
        match set(&mut components, &mut arbiter, 2, 1) {
            Some(Verdict::Strike(strike)) => {
                assert_eq!(strike.culprit, 0);
                assert_eq!(strike.trigger, 2);
                assert!(strike.to_string().starts_with("You received a strike when you changed"));
            }
            other => panic!("expected a strike, got {:?}", other),
        }
    }

    #[test]
    fn test_stuck_component_is_exempt() {
        let mut components: Vec<ComponentInstance> = (0..3)
            .map(|i| {
                let mut s = Scripted::new(Flavor::Maze { width: i as u8, height: 1 }, 3);
                s.stuck = i == 1;
                instance(i, s)
            })
            .collect();
        let mut arbiter = ArbitrationController::finalize(PuzzleId(1), &mut components, vec![2, 0, 1]).unwrap();
        // Position 1 is stuck in the wrong state; skipping it neither strikes nor blocks the pass
        assert_eq!(set(&mut components, &mut arbiter, 0, 2), None);
        assert_eq!(set(&mut components, &mut arbiter, 2, 1), Some(Verdict::Pass));
    }

    #[test]
    fn test_checked_latch_exempts_after_strike() {
        let mut components: Vec<ComponentInstance> = (0..2)
            .map(|i| {
                let mut s = Scripted::new(Flavor::Maze { width: i as u8, height: 1 }, 3);
                s.latch_on_check = i == 0;
                instance(i, s)
            })
            .collect();
        let mut arbiter = ArbitrationController::finalize(PuzzleId(1), &mut components, vec![2, 1]).unwrap();
        assert_eq!(set(&mut components, &mut arbiter, 0, 1), None);
        assert!(matches!(set(&mut components, &mut arbiter, 1, 1), Some(Verdict::Strike(_))));
        assert!(components[0].is_stuck());
        // Now exempt: any further change at position 1 completes the puzzle
        assert_eq!(set(&mut components, &mut arbiter, 1, 2), None);
        assert_eq!(set(&mut components, &mut arbiter, 1, 1), Some(Verdict::Pass));
    }

    #[test]
    fn test_solved_absorbs_events() {
        let (mut components, mut arbiter) = three();
        set(&mut components, &mut arbiter, 0, 2);
        set(&mut components, &mut arbiter, 1, 0);
        set(&mut components, &mut arbiter, 2, 1);
        assert_eq!(set(&mut components, &mut arbiter, 0, 1), None);
        assert_eq!(set(&mut components, &mut arbiter, 2, 0), None);
        assert_eq!(set(&mut components, &mut arbiter, 2, 1), None);
        assert_eq!(arbiter.state(), ArbiterState::Solved);
    }

    #[test]
    fn test_programmatic_changes_are_not_judged() {
        let (mut components, mut arbiter) = three();
        let t = components[2].component_mut().apply(&Action::PressKey(1)).unwrap().unwrap();
        assert_eq!(
            arbiter.on_state_changed(&mut components, 2, t, ChangeOrigin::Programmatic),
            None
        );
    }

    #[test]
    fn test_stage_broadcast_reaches_later_components_only() {
        let mut logs = Vec::new();
        let mut components: Vec<ComponentInstance> = (0..3)
            .map(|i| {
                let mut s = Scripted::new(Flavor::Maze { width: i as u8, height: 1 }, 3);
                s.stage_provider = i != 0;
                logs.push(s.received_stages.clone());
                instance(i, s)
            })
            .collect();
        let mut arbiter = ArbitrationController::finalize(PuzzleId(1), &mut components, vec![0, 0, 0]).unwrap();
        assert_eq!(arbiter.stage_rank(0), None);
        assert_eq!(arbiter.stage_rank(1), Some(0));
        assert_eq!(arbiter.stage_rank(2), Some(1));

        set(&mut components, &mut arbiter, 1, 2);
        set(&mut components, &mut arbiter, 0, 1);
        // Only position 2 sits after the provider at position 1
        let received: Vec<Vec<usize>> = logs.iter().map(|log| log.borrow().clone()).collect();
        assert_eq!(received, vec![vec![], vec![], vec![0]]);
    }

    #[test]
    fn test_transition_into_unset_is_ignored() {
        let (mut components, mut arbiter) = three();
        let t = Transition {
            from: State::Value(1),
            to: State::Unset,
        };
        assert_eq!(arbiter.on_state_changed(&mut components, 2, t, ChangeOrigin::User), None);
    }

    #[test]
    fn test_finalize_twice_fails() {
        let (mut components, _) = three();
        let err = ArbitrationController::finalize(PuzzleId(1), &mut components, vec![2, 0, 1]).unwrap_err();
        assert!(matches!(err, SubscriptionError::AlreadySubscribed { position: 0, .. }));
    }
}
