//! Seeds and the two random streams a puzzle is built from.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Rule seed used when the host does not pick one
pub const DEFAULT_RULE_SEED: u64 = 1;

/// Seeds for the two independent random streams of a puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seeds {
    /// Drives the flavor order and type-specific fixed parameters (maze walls, LED tables)
    pub rule_seed: u64,
    /// Drives placement and every per-instance choice
    pub instance_seed: u64,
}

impl Seeds {
    pub const fn new(rule_seed: u64, instance_seed: u64) -> Self {
        Self {
            rule_seed,
            instance_seed,
        }
    }

    /// Default rule seed with a fresh instance seed
    pub fn from_entropy() -> Self {
        Self::with_random_instance(DEFAULT_RULE_SEED)
    }

    /// Keep the rules, randomize the instance
    pub fn with_random_instance(rule_seed: u64) -> Self {
        Self::new(rule_seed, entropy_seed())
    }

    /// Open both streams from the start
    pub fn streams(&self) -> RngStreams {
        RngStreams {
            config: StdRng::seed_from_u64(self.rule_seed),
            instance: StdRng::seed_from_u64(self.instance_seed),
        }
    }
}

/// The configuration and instance streams, replayable from [`Seeds`]
#[derive(Debug, Clone)]
pub struct RngStreams {
    pub config: StdRng,
    pub instance: StdRng,
}

fn entropy_seed() -> u64 {
    let mut seed_bytes = [0u8; 8];
    if getrandom::getrandom(&mut seed_bytes).is_err() {
        // Clock fallback for targets without an entropy source
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5eed);
        seed_bytes = nanos.to_le_bytes();
    }
    u64::from_le_bytes(seed_bytes)
}
