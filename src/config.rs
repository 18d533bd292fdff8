use serde::{Deserialize, Serialize};

use crate::engine::simulation::SimulationConfig;
use crate::error::{GraphError, Result};
use crate::graph::matrix::MatrixMode;
use crate::graph::sample::SampleConfig;
use crate::layout::{LayoutConfig, Strategy};
use crate::protocol::format::ImportOptions;

/// Everything a `NetworkGraph` can be tuned with. Missing JSON fields take
/// their defaults, so `{}` is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub strategy: Strategy,
    pub matrix_mode: MatrixMode,
    pub import: ImportOptions,
    pub simulation: SimulationConfig,
    pub sample: SampleConfig,
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(text).map_err(|e| GraphError::InvalidConfig {
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        if !self.import.threshold.is_finite() {
            return Err(GraphError::InvalidConfig {
                reason: "import threshold must be finite".to_string(),
            });
        }
        if !self.simulation.is_valid() {
            return Err(GraphError::InvalidConfig {
                reason: "simulation probabilities must lie in [0, 1]".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.sample.edge_probability) {
            return Err(GraphError::InvalidConfig {
                reason: "sample edge probability must lie in [0, 1]".to_string(),
            });
        }
        Ok(())
    }
}
