//! Engine configuration, loaded from YAML.

use crate::error::{WaterError, WaterResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Batches at least this long are evaluated on the rayon pool.
pub const DEFAULT_PARALLEL_MIN_BATCH: usize = 1024;

/// What to do with a query outside the declared domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainPolicy {
    /// Reject with `WaterError::OutOfDomain`.
    #[default]
    Strict,
    /// Clamp to the nearest bound and flag the result.
    Clamp,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub domain_policy: DomainPolicy,
    /// Overrides the table's lower saturation bound [Pa].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturation_floor_pa: Option<f64>,
    pub parallel_min_batch: usize,
    /// Alternate coefficient table; the packaged one when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            domain_policy: DomainPolicy::Strict,
            saturation_floor_pa: None,
            parallel_min_batch: DEFAULT_PARALLEL_MIN_BATCH,
            table_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(raw: &str) -> WaterResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_yaml(path: &Path) -> WaterResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn save_yaml(&self, path: &Path) -> WaterResult<()> {
        self.validate()?;
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Checks that need no table. The floor is range-checked when the engine is built.
    pub fn validate(&self) -> WaterResult<()> {
        match self.saturation_floor_pa {
            Some(floor) if !floor.is_finite() || floor <= 0.0 => Err(WaterError::InvalidConfig {
                what: format!("saturation_floor_pa must be a positive pressure, got {floor}"),
            }),
            _ => Ok(()),
        }
    }
}
