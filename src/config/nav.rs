//! Main NavConfig and section accessors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cover::CoverSection;
use super::error::ConfigLoadError;
use super::paths::PathSection;
use super::pruning::PruneSection;
use super::review::ReviewSection;

/// Full builder configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct NavConfig {
    /// Edge building settings
    #[serde(default)]
    pub paths: PathSection,

    /// Basic and aggressive pruning settings
    #[serde(default)]
    pub pruning: PruneSection,

    /// Cover network settings
    #[serde(default)]
    pub cover: CoverSection,

    /// Review/diagnostic settings
    #[serde(default)]
    pub review: ReviewSection,
}

impl NavConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/default.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/default.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let mut config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.paths.sort_capsule_sizes();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the builders cannot work with.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.paths.capsule_sizes.is_empty() {
            return Err(ConfigLoadError::Invalid(
                "paths.capsule_sizes must list at least one size".to_string(),
            ));
        }
        if !self.paths.capsule_sizes_sorted() {
            return Err(ConfigLoadError::Invalid(
                "paths.capsule_sizes must be ordered largest first".to_string(),
            ));
        }
        if self.pruning.path_pruning < 1.0 {
            return Err(ConfigLoadError::Invalid(format!(
                "pruning.path_pruning must be >= 1.0, got {}",
                self.pruning.path_pruning
            )));
        }
        if self.cover.exposure_dot <= 0.0 {
            return Err(ConfigLoadError::Invalid(
                "cover.exposure_dot must be positive".to_string(),
            ));
        }
        if !(self.cover.exposure_dot..=1.0).contains(&self.cover.edge_exposure_dot) {
            return Err(ConfigLoadError::Invalid(format!(
                "cover.edge_exposure_dot must lie in [exposure_dot, 1], got {}",
                self.cover.edge_exposure_dot
            )));
        }
        if !(0.0..1.0).contains(&self.cover.edge_check_dot) {
            return Err(ConfigLoadError::Invalid(format!(
                "cover.edge_check_dot must lie in [0, 1), got {}",
                self.cover.edge_check_dot
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = NavConfig::from_yaml("{}").unwrap();
        assert_eq!(config.paths.max_path_distance, 1200.0);
        assert_eq!(config.pruning.path_pruning, 1.2);
        assert_eq!(config.review.max_unreachable_reports, 8);
        assert_eq!(config.paths.capsule_sizes.len(), 3);
    }

    #[test]
    fn test_partial_section_override() {
        let yaml = r#"
pruning:
  aggressive: false
  path_pruning: 1.5
cover:
  danger_dist: 800.0
"#;
        let config = NavConfig::from_yaml(yaml).unwrap();
        assert!(!config.pruning.aggressive);
        assert_eq!(config.pruning.path_pruning, 1.5);
        // Untouched keys keep defaults
        assert_eq!(config.pruning.intersect_tolerance, 25.0);
        assert_eq!(config.cover.danger_dist, 800.0);
        assert_eq!(config.cover.max_fire_link_dist, 2048.0);
    }

    #[test]
    fn test_capsule_sizes_parse() {
        let yaml = r#"
paths:
  capsule_sizes:
    - { radius: 50.0, height: 90.0 }
"#;
        let config = NavConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.paths.capsule_sizes.len(), 1);
        assert_eq!(config.paths.capsule_sizes[0].radius, 50.0);
    }

    #[test]
    fn test_capsule_sizes_sorted_largest_first() {
        let yaml = r#"
paths:
  capsule_sizes:
    - { radius: 34.0, height: 88.0 }
    - { radius: 96.0, height: 120.0 }
    - { radius: 64.0, height: 100.0 }
"#;
        let config = NavConfig::from_yaml(yaml).unwrap();
        let radii: Vec<f32> = config.paths.capsule_sizes.iter().map(|c| c.radius).collect();
        assert_eq!(radii, vec![96.0, 64.0, 34.0]);

        let mut reversed = NavConfig::default();
        reversed.paths.capsule_sizes.reverse();
        assert!(matches!(reversed.validate(), Err(ConfigLoadError::Invalid(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            NavConfig::from_yaml("paths:\n  capsule_sizes: []\n"),
            Err(ConfigLoadError::Invalid(_))
        ));
        assert!(matches!(
            NavConfig::from_yaml("pruning:\n  path_pruning: 0.5\n"),
            Err(ConfigLoadError::Invalid(_))
        ));
        assert!(matches!(
            NavConfig::from_yaml("cover:\n  edge_exposure_dot: 0.2\n"),
            Err(ConfigLoadError::Invalid(_))
        ));
        assert!(matches!(
            NavConfig::from_yaml("cover:\n  edge_check_dot: 1.5\n"),
            Err(ConfigLoadError::Invalid(_))
        ));
        assert!(matches!(
            NavConfig::from_yaml("paths: [1, 2"),
            Err(ConfigLoadError::Parse(_))
        ));
    }
}
