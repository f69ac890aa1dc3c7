//! The mixed-radix serial encoder.
//!
//! A serial is read as a sequence of digits of varying base. Starting from the
//! components in canonical flavor order, the first digit (base = number of
//! components left) picks the next component to solve and the second digit
//! (base = that component's state count) picks its target state. This repeats
//! until every component is ordered, so each serial below the product of all
//! bases names exactly one solve order with one set of targets.

use crate::component::{ComponentId, ComponentInstance};
use crate::config::PuzzleConfig;
use crate::error::EncodeError;
use crate::flavor::FlavorOrder;
use crate::puzzle::PuzzleId;
use crate::serial::{decimal_digits, PuzzleSerial};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Decided solve order and target states, plus what is needed to refold them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    /// Components in canonical flavor order, the starting working list
    pub canonical: Vec<ComponentId>,
    /// Solve order
    pub order: Vec<ComponentId>,
    /// Target state per solve position
    pub expected: Vec<u32>,
    /// State count per solve position
    pub num_states: Vec<u32>,
}

impl Solution {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Solve position of a component
    pub fn position(&self, id: ComponentId) -> Option<usize> {
        self.order.iter().position(|&o| o == id)
    }

    /// Rebuild the serial from the solve order and expected states
    pub fn refold(&self) -> Result<PuzzleSerial, EncodeError> {
        let mut list = self.canonical.clone();
        let mut fold = Fold::default();
        for (pos, &id) in self.order.iter().enumerate() {
            let index = list
                .iter()
                .position(|&c| c == id)
                .ok_or(EncodeError::UnknownComponent { id })?;
            let len = list.len() as u128;
            list.remove(index);
            fold.push(index as u128, len);

            let states = self.num_states[pos];
            if states == 0 {
                return Err(EncodeError::ZeroStates { id });
            }
            fold.push(u128::from(self.expected[pos]), u128::from(states));
        }
        fold.serial()
    }
}

/// Running mixed-radix accumulator
#[derive(Debug, Clone, Copy)]
struct Fold {
    value: u128,
    mult: u128,
}

impl Default for Fold {
    fn default() -> Self {
        Self { value: 0, mult: 1 }
    }
}

impl Fold {
    // Once the multiplier saturates only zero digits can follow, since the
    // value is always bounded by the raw draw
    fn push(&mut self, digit: u128, base: u128) {
        self.value = self.value.saturating_add(self.mult.saturating_mul(digit));
        self.mult = self.mult.saturating_mul(base);
    }

    fn serial(self) -> Result<PuzzleSerial, EncodeError> {
        u64::try_from(self.value)
            .map(PuzzleSerial::new)
            .map_err(|_| EncodeError::Overflow)
    }
}

/// Why a trial was thrown away
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialRejection {
    /// A component refused its place in the order
    DecideStatesRefused {
        id: ComponentId,
        prior_stage_providers: usize,
    },
    /// A component decided it has no states
    NoStates { id: ComponentId },
    /// The serial has more digits than the display
    DigitCapExceeded { digits: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrialOutcome {
    Accepted {
        serial: PuzzleSerial,
        trailing_zeros: u32,
    },
    Rejected(TrialRejection),
}

/// Record of one encoding trial
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub raw: u64,
    pub outcome: TrialOutcome,
}

impl TrialSummary {
    pub fn trailing_zeros(&self) -> Option<u32> {
        match self.outcome {
            TrialOutcome::Accepted { trailing_zeros, .. } => Some(trailing_zeros),
            TrialOutcome::Rejected(_) => None,
        }
    }
}

/// Result of a successful encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoding {
    pub serial: PuzzleSerial,
    pub solution: Solution,
    /// Every trial in the order it ran
    pub trials: Vec<TrialSummary>,
    /// Index into `trials` of the committed trial
    pub committed: usize,
}

struct Trial {
    serial: PuzzleSerial,
    order: Vec<usize>,
    expected: Vec<u32>,
    num_states: Vec<u32>,
    prior_providers: Vec<usize>,
}

/// Component indices sorted by canonical flavor rank, unranked flavors last
pub fn canonical_order(components: &[ComponentInstance], flavor_order: &FlavorOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..components.len()).collect();
    indices.sort_by_key(|&i| {
        let c = &components[i];
        (flavor_order.rank(c.flavor()).unwrap_or(usize::MAX), c.id())
    });
    indices
}

#[derive(Debug, Clone)]
pub struct StateEncoder {
    puzzle: PuzzleId,
    trials: usize,
    digit_cap: u32,
}

impl StateEncoder {
    pub fn new(puzzle: PuzzleId, trials: usize, digit_cap: u32) -> Self {
        Self {
            puzzle,
            trials: trials.max(1),
            digit_cap: digit_cap.clamp(1, crate::config::MAX_DIGIT_CAP),
        }
    }

    pub fn from_config(puzzle: PuzzleId, config: &PuzzleConfig) -> Self {
        Self::new(puzzle, config.encoder_trials, config.digit_cap)
    }

    pub fn digit_cap(&self) -> u32 {
        self.digit_cap
    }

    /// Exclusive upper bound of the raw draw
    fn ceiling(&self) -> u64 {
        10u64.pow(self.digit_cap)
    }

    /// Choose a solve order and target states, minimizing trailing zeros of the serial.
    ///
    /// Components get their `decide_states` hook on every trial; the committed
    /// trial is replayed at the end so their final decisions match it.
    pub fn encode(
        &self,
        components: &mut [ComponentInstance],
        flavor_order: &FlavorOrder,
        rng: &mut StdRng,
    ) -> Result<Encoding, EncodeError> {
        let canonical = canonical_order(components, flavor_order);
        let mut summaries = Vec::with_capacity(self.trials);
        let mut best: Option<(usize, u32, Trial)> = None;

        for _ in 0..self.trials {
            let raw = rng.gen_range(0..self.ceiling());
            let outcome = match self.run_trial(raw, components, &canonical, rng) {
                Ok(trial) => {
                    let zeros = trial.serial.trailing_zeros();
                    let outcome = TrialOutcome::Accepted {
                        serial: trial.serial,
                        trailing_zeros: zeros,
                    };
                    if best.as_ref().map_or(true, |(_, z, _)| zeros < *z) {
                        best = Some((summaries.len(), zeros, trial));
                    }
                    outcome
                }
                Err(rejection) => {
                    debug!("<Variety #{}> Trial {} rejected: {:?}", self.puzzle, raw, rejection);
                    TrialOutcome::Rejected(rejection)
                }
            };
            summaries.push(TrialSummary { raw, outcome });
            if matches!(best, Some((_, 0, _))) {
                break;
            }
        }

        let (committed, _, trial) = best.ok_or(EncodeError::Exhausted {
            trials: summaries.len(),
        })?;
        self.replay(&trial, components, rng)?;

        let solution = Solution {
            canonical: canonical.iter().map(|&i| components[i].id()).collect(),
            order: trial.order.iter().map(|&i| components[i].id()).collect(),
            expected: trial.expected,
            num_states: trial.num_states,
        };
        debug!(
            "<Variety #{}> Committed trial {} of {} with serial {}",
            self.puzzle,
            committed + 1,
            summaries.len(),
            trial.serial
        );
        Ok(Encoding {
            serial: trial.serial,
            solution,
            trials: summaries,
            committed,
        })
    }

    fn run_trial(
        &self,
        mut raw: u64,
        components: &mut [ComponentInstance],
        canonical: &[usize],
        rng: &mut StdRng,
    ) -> Result<Trial, TrialRejection> {
        let mut list = canonical.to_vec();
        let mut fold = Fold::default();
        let mut providers = 0usize;
        let mut trial = Trial {
            serial: PuzzleSerial::new(0),
            order: Vec::with_capacity(list.len()),
            expected: Vec::with_capacity(list.len()),
            num_states: Vec::with_capacity(list.len()),
            prior_providers: Vec::with_capacity(list.len()),
        };

        while !list.is_empty() {
            let len = list.len() as u64;
            let index = (raw % len) as usize;
            let chosen = list[index];
            let component = &mut components[chosen];
            if !component.component_mut().decide_states(providers, rng) {
                return Err(TrialRejection::DecideStatesRefused {
                    id: component.id(),
                    prior_stage_providers: providers,
                });
            }
            let states = component.num_states();
            if states == 0 {
                return Err(TrialRejection::NoStates { id: component.id() });
            }

            list.remove(index);
            fold.push(index as u128, u128::from(len));
            raw /= len;

            let state = (raw % u64::from(states)) as u32;
            fold.push(u128::from(state), u128::from(states));
            raw /= u64::from(states);

            trial.order.push(chosen);
            trial.expected.push(state);
            trial.num_states.push(states);
            trial.prior_providers.push(providers);
            if component.can_provide_stage() {
                providers += 1;
            }
        }

        let digits = match u64::try_from(fold.value) {
            Ok(value) => {
                trial.serial = PuzzleSerial::new(value);
                decimal_digits(value)
            }
            Err(_) => u32::MAX,
        };
        // The fold is `raw mod ∏ bases`, so a raw below the ceiling never trips this
        if digits > self.digit_cap {
            return Err(TrialRejection::DigitCapExceeded { digits });
        }
        Ok(trial)
    }

    /// Re-run `decide_states` for the committed order
    fn replay(&self, trial: &Trial, components: &mut [ComponentInstance], rng: &mut StdRng) -> Result<(), EncodeError> {
        for (pos, &i) in trial.order.iter().enumerate() {
            let component = &mut components[i];
            let id = component.id();
            let accepted = component.component_mut().decide_states(trial.prior_providers[pos], rng);
            let actual = component.num_states();
            if !accepted || actual != trial.num_states[pos] {
                return Err(EncodeError::UnstableStates {
                    id,
                    expected: trial.num_states[pos],
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Recover the solution a serial encodes for these components
    pub fn decode(
        &self,
        serial: PuzzleSerial,
        components: &[ComponentInstance],
        flavor_order: &FlavorOrder,
    ) -> Result<Solution, EncodeError> {
        let canonical = canonical_order(components, flavor_order);
        let mut list = canonical.clone();
        let mut raw = serial.value();
        let mut solution = Solution {
            canonical: canonical.iter().map(|&i| components[i].id()).collect(),
            order: Vec::with_capacity(list.len()),
            expected: Vec::with_capacity(list.len()),
            num_states: Vec::with_capacity(list.len()),
        };

        while !list.is_empty() {
            let len = list.len() as u64;
            let index = (raw % len) as usize;
            raw /= len;
            let component = &components[list.remove(index)];
            let states = component.num_states();
            if states == 0 {
                return Err(EncodeError::ZeroStates { id: component.id() });
            }
            solution.order.push(component.id());
            solution.expected.push((raw % u64::from(states)) as u32);
            solution.num_states.push(states);
            raw /= u64::from(states);
        }

        if raw != 0 {
            return Err(EncodeError::SerialOutOfRange {
                serial: serial.value(),
                leftover: raw,
            });
        }
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::testing::{instance, Scripted};
    use crate::flavor::Flavor;
    use rand::SeedableRng;

    fn scripted(states: &[u32]) -> Vec<ComponentInstance> {
        states
            .iter()
            .enumerate()
            .map(|(i, &n)| instance(i as u32, Scripted::new(Flavor::Maze { width: i as u8, height: 0 }, n)))
            .collect()
    }

    fn order_of(components: &[ComponentInstance]) -> FlavorOrder {
        FlavorOrder::from_order(components.iter().map(|c| c.flavor()).collect())
    }

    #[test]
    fn test_two_component_fold() {
        // Working list [A(3 states), B(2 states)]; pick A first (index 0 of 2),
        // target 1, then B (index 0 of 1), target 0.
        let solution = Solution {
            canonical: vec![ComponentId(0), ComponentId(1)],
            order: vec![ComponentId(0), ComponentId(1)],
            expected: vec![1, 0],
            num_states: vec![3, 2],
        };
        // 0 + 1*2*1 + 0*6 + 0*6*1 = 2
        assert_eq!(solution.refold().unwrap(), PuzzleSerial::new(2));

        let components = scripted(&[3, 2]);
        let encoder = StateEncoder::new(PuzzleId(0), 1, 17);
        let decoded = encoder.decode(PuzzleSerial::new(2), &components, &order_of(&components)).unwrap();
        assert_eq!(decoded, solution);
    }

    #[test]
    fn test_second_component_first() {
        let components = scripted(&[3, 2]);
        let encoder = StateEncoder::new(PuzzleId(0), 1, 17);
        // index 1 of 2, then state 1 of 2, then index 0 of 1, then state 2 of 3
        let serial = 1 + 2 * 1 + 4 * 0 + 4 * 2;
        let decoded = encoder
            .decode(PuzzleSerial::new(serial), &components, &order_of(&components))
            .unwrap();
        assert_eq!(decoded.order, vec![ComponentId(1), ComponentId(0)]);
        assert_eq!(decoded.expected, vec![1, 2]);
        assert_eq!(decoded.refold().unwrap().value(), serial);
    }

    #[test]
    fn test_decode_rejects_oversized_serial() {
        let components = scripted(&[3, 2]);
        let encoder = StateEncoder::new(PuzzleId(0), 1, 17);
        // Only 2 * 3 * 1 * 2 = 12 serials exist
        let err = encoder
            .decode(PuzzleSerial::new(12), &components, &order_of(&components))
            .unwrap_err();
        assert_eq!(err, EncodeError::SerialOutOfRange { serial: 12, leftover: 1 });
    }

    #[test]
    fn test_encode_round_trips() {
        for seed in 0..20 {
            let mut components = scripted(&[3, 2, 7, 10, 24]);
            let flavors = order_of(&components);
            let encoder = StateEncoder::new(PuzzleId(0), 100, 17);
            let encoding = encoder
                .encode(&mut components, &flavors, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            assert_eq!(encoding.solution.refold().unwrap(), encoding.serial);
            let decoded = encoder.decode(encoding.serial, &components, &flavors).unwrap();
            assert_eq!(decoded, encoding.solution);
            for (pos, &expected) in encoding.solution.expected.iter().enumerate() {
                assert!(expected < encoding.solution.num_states[pos]);
            }
        }
    }

    #[test]
    fn test_committed_trial_has_fewest_trailing_zeros() {
        let mut components = scripted(&[2, 2, 2]);
        let flavors = order_of(&components);
        let encoder = StateEncoder::new(PuzzleId(0), 100, 17);
        let encoding = encoder
            .encode(&mut components, &flavors, &mut StdRng::seed_from_u64(5))
            .unwrap();
        let committed = encoding.trials[encoding.committed].trailing_zeros().unwrap();
        assert!(encoding.trials.iter().filter_map(|t| t.trailing_zeros()).all(|z| committed <= z));
        assert_eq!(committed, encoding.serial.trailing_zeros());
    }

    #[test]
    fn test_refusal_exhausts_trials() {
        let mut components = scripted(&[2, 2]);
        let mut picky = Scripted::new(Flavor::DigitDisplay, 3);
        picky.min_prior_providers = 5;
        components.push(instance(9, picky));
        let flavors = order_of(&components);
        let encoder = StateEncoder::new(PuzzleId(0), 10, 17);
        let err = encoder
            .encode(&mut components, &flavors, &mut StdRng::seed_from_u64(1))
            .unwrap_err();
        assert_eq!(err, EncodeError::Exhausted { trials: 10 });
    }

    #[test]
    fn test_decide_states_sees_prior_providers() {
        let mut components = scripted(&[2, 2]);
        let mut needs_two = Scripted::new(Flavor::DigitDisplay, 3);
        needs_two.min_prior_providers = 2;
        components.push(instance(2, needs_two));
        let flavors = order_of(&components);
        let encoder = StateEncoder::new(PuzzleId(0), 100, 17);
        let encoding = encoder
            .encode(&mut components, &flavors, &mut StdRng::seed_from_u64(11))
            .unwrap();
        // Only orders that put it last survive
        assert_eq!(encoding.solution.order.last(), Some(&ComponentId(2)));
        for trial in &encoding.trials {
            if let TrialOutcome::Rejected(rejection) = &trial.outcome {
                assert!(matches!(
                    rejection,
                    TrialRejection::DecideStatesRefused { id: ComponentId(2), prior_stage_providers } if *prior_stage_providers < 2
                ));
            }
        }
    }

    #[test]
    fn test_digit_cap_limits_serial() {
        let mut components = scripted(&[10, 10, 10, 10]);
        let flavors = order_of(&components);
        let encoder = StateEncoder::new(PuzzleId(0), 50, 3);
        let encoding = encoder
            .encode(&mut components, &flavors, &mut StdRng::seed_from_u64(2))
            .unwrap();
        assert!(encoding.serial.digit_count() <= 3);
        assert_eq!(encoder.decode(encoding.serial, &components, &flavors).unwrap(), encoding.solution);
    }

    #[test]
    fn test_trial_serial_is_raw_modulo_radix_product() {
        let mut components = scripted(&[10, 10, 10, 10]);
        let flavors = order_of(&components);
        let canonical = canonical_order(&components, &flavors);
        let encoder = StateEncoder::new(PuzzleId(0), 1, 17);
        let mut rng = StdRng::seed_from_u64(0);
        // 4! orders times 10^4 states
        let product = 240_000;
        for raw in [0, 123, 239_999, 240_000, 987_654] {
            let trial = encoder.run_trial(raw, &mut components, &canonical, &mut rng).unwrap();
            assert_eq!(trial.serial.value(), raw % product);
            assert!(trial.serial.value() <= raw);
        }

        let capped = StateEncoder::new(PuzzleId(0), 1, 3);
        assert!(matches!(
            capped.run_trial(987_654, &mut components, &canonical, &mut rng),
            Err(TrialRejection::DigitCapExceeded { digits: 5 })
        ));
    }

    #[test]
    fn test_canonical_order_follows_flavor_rank() {
        let components = scripted(&[2, 2, 2]);
        let reversed = FlavorOrder::from_order(components.iter().rev().map(|c| c.flavor()).collect());
        assert_eq!(canonical_order(&components, &reversed), vec![2, 1, 0]);
    }
}
