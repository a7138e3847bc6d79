use crate::generator::script::ScheduledCommand;
use anyhow::Context;
use radarcore::protocol::{LinkConfig, ResyncPolicy};
use radarcore::simulation::{ProfileKind, SimulationConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Sensor parameters at power-on.
    pub link: LinkConfig,
    pub simulation: SimulationConfig,
    pub resync: ResyncPolicy,
    /// Ticks to run offline.
    pub ticks: u64,
    pub commands: Vec<ScheduledCommand>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            simulation: SimulationConfig::default(),
            resync: ResyncPolicy::Reset,
            ticks: 600,
            commands: Vec::new(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(ticks: u64, seed: u64, profile: ProfileKind) -> Self {
        Self {
            ticks,
            simulation: SimulationConfig {
                seed,
                profile,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Command-line values win over the file.
    pub fn with_overrides(
        mut self,
        ticks: Option<u64>,
        seed: Option<u64>,
        profile: Option<ProfileKind>,
        resync: Option<ResyncPolicy>,
    ) -> Self {
        if let Some(ticks) = ticks {
            self.ticks = ticks;
        }
        if let Some(seed) = seed {
            self.simulation.seed = seed;
        }
        if let Some(profile) = profile {
            self.simulation.profile = profile;
        }
        if let Some(resync) = resync {
            self.resync = resync;
        }
        self
    }
}
