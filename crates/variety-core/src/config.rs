use crate::error::ConfigError;
use crate::factory::FactoryKind;
use crate::grid::GridSize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Largest digit cap whose serials always fit in a `u64`
pub const MAX_DIGIT_CAP: u32 = 19;

/// Configuration for puzzle generation.
///
/// Deserializes with defaults for every missing field, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// Grid columns
    pub width: usize,
    /// Grid rows
    pub height: usize,
    /// Interactive components per puzzle
    pub target_components: usize,
    /// Decorative components placed once the target is reached
    pub decorations: usize,
    /// Outer placement and encoding attempts before giving up
    pub max_generation_attempts: usize,
    /// Random trials per encoding
    pub encoder_trials: usize,
    /// Maximum decimal digits of the serial
    pub digit_cap: u32,
    /// Starting weight overrides; kinds not listed keep their default weight
    pub weights: BTreeMap<FactoryKind, u32>,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        Self {
            width: 13,
            height: 10,
            target_components: 8,
            decorations: 4,
            max_generation_attempts: 100,
            encoder_trials: 100,
            digit_cap: 17,
            weights: BTreeMap::new(),
        }
    }
}

impl PuzzleConfig {
    /// Fewer, larger-state components
    pub fn compact() -> Self {
        Self {
            target_components: 6,
            decorations: 2,
            ..Self::default()
        }
    }

    /// As many components as the default serial width allows
    pub fn crowded() -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(FactoryKind::Wire, 3);
        weights.insert(FactoryKind::Keypad, 1);
        Self {
            target_components: 10,
            decorations: 6,
            max_generation_attempts: 200,
            weights,
            ..Self::default()
        }
    }

    /// Look up a named preset
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "compact" => Some(Self::compact()),
            "crowded" => Some(Self::crowded()),
            _ => None,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn grid(&self) -> GridSize {
        GridSize::new(self.width, self.height)
    }

    /// Starting weight of a factory kind
    pub fn weight(&self, kind: FactoryKind) -> u32 {
        self.weights
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_weight())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid { reason });
        if self.width == 0 || self.width > 26 {
            return invalid(format!("width must be between 1 and 26 (got {})", self.width));
        }
        if self.height == 0 {
            return invalid("height must be at least 1".to_string());
        }
        if self.digit_cap == 0 || self.digit_cap > MAX_DIGIT_CAP {
            return invalid(format!(
                "digit_cap must be between 1 and {} (got {})",
                MAX_DIGIT_CAP, self.digit_cap
            ));
        }
        if self.encoder_trials == 0 {
            return invalid("encoder_trials must be at least 1".to_string());
        }
        if self.max_generation_attempts == 0 {
            return invalid("max_generation_attempts must be at least 1".to_string());
        }
        if self.target_components == 0 {
            return invalid("target_components must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PuzzleConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid(), GridSize::new(13, 10));
        assert_eq!(config.weight(FactoryKind::Maze), 3);
    }

    #[test]
    fn test_presets_are_valid() {
        for name in ["default", "compact", "crowded"] {
            let config = PuzzleConfig::preset(name).unwrap();
            assert!(config.validate().is_ok(), "{} preset", name);
        }
        assert!(PuzzleConfig::preset("huge").is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PuzzleConfig::from_json_str(r#"{ "target_components": 5, "weights": { "wire": 4 } }"#).unwrap();
        assert_eq!(config.target_components, 5);
        assert_eq!(config.width, 13);
        assert_eq!(config.weight(FactoryKind::Wire), 4);
        assert_eq!(config.weight(FactoryKind::Key), 2);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = PuzzleConfig::from_json_str(r#"{ "width": 27 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        let err = PuzzleConfig::from_json_str(r#"{ "digit_cap": 20 }"#).unwrap_err();
        assert!(err.to_string().contains("digit_cap"));
    }

    #[test]
    fn test_malformed_json() {
        let err = PuzzleConfig::from_json_str("{ width: }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = PuzzleConfig::crowded();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(PuzzleConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = PuzzleConfig::from_path(Path::new("/nonexistent/variety.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
