use crate::component::{Action, ComponentId};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a [`PuzzleConfig`](crate::PuzzleConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid JSON for a puzzle config
    #[error("Malformed puzzle config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but describes an impossible puzzle
    #[error("Invalid puzzle config: {reason}")]
    Invalid { reason: String },
}

/// Fatal setup errors. These surface before a puzzle is ever shown.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The outer retry cap was reached without a complete configuration
    #[error("Puzzle generation exhausted after {attempts} attempts: could not place and encode {target} components on a {width}x{height} grid")]
    Exhausted {
        attempts: usize,
        target: usize,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Subscription(#[from] SubscriptionError),
}

/// Errors from the serial encoder and decoder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Every trial was rejected
    #[error("No encoding trial succeeded within {trials} trials")]
    Exhausted { trials: usize },

    /// Replaying the committed trial produced a different state count
    #[error("Component {id} changed its state count from {expected} to {actual} while replaying the committed trial")]
    UnstableStates {
        id: ComponentId,
        expected: u32,
        actual: u32,
    },

    /// A component in the fold has no states to encode
    #[error("Component {id} has no states and cannot be part of the solve order")]
    ZeroStates { id: ComponentId },

    /// The solution refers to a component that is not in the list
    #[error("Component {id} is not part of the encoded component list")]
    UnknownComponent { id: ComponentId },

    /// Decoding consumed every component but the serial was not used up
    #[error("Serial {serial} is out of range for this component set (leftover {leftover})")]
    SerialOutOfRange { serial: u64, leftover: u64 },

    /// Decoding the serial gave a different solution than the committed one
    #[error("Serial {serial} decodes to a different solution than the one committed")]
    RoundTripMismatch { serial: u64 },

    /// The refolded value does not fit the serial type
    #[error("Refolded serial overflows 64 bits")]
    Overflow,
}

/// A component rejected a gesture
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("The {component} does not respond to {action:?}")]
    Unsupported { component: String, action: Action },

    #[error("The {component} has no control number {index}")]
    OutOfRange { component: String, index: usize },
}

/// Errors surfaced to the host by [`Puzzle`](crate::Puzzle) input entry points
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("No component at solve position {0}")]
    UnknownPosition(usize),

    #[error(transparent)]
    Input(#[from] InputError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// The state-change slot of a component may only be filled once
    #[error("Component {id} is already subscribed at solve position {position}")]
    AlreadySubscribed { id: ComponentId, position: usize },
}
