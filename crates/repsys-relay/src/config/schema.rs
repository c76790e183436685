use std::time::Duration;

use serde::Deserialize;
use repsys_core::error::{RepSysError, Result};
use repsys_core::{ClassMask, MsgClass, SAFETY_COMPONENT};

use crate::processor::ProcessorSettings;
use crate::simulate::GeneratorSettings;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub version: u32,

    #[serde(default)]
    pub processor: ProcessorSection,

    #[serde(default)]
    pub ops: OpsSection,

    #[serde(default)]
    pub simulator: SimulatorSection,
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RepSysError::UnsupportedVersion);
        }

        self.processor.validate()?;
        self.simulator.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessorSection {
    #[serde(default = "default_class_mask")]
    pub class_mask: Vec<MsgClass>,

    #[serde(default = "default_tracked_component")]
    pub tracked_component: u32,

    #[serde(default = "default_content_len")]
    pub content_len: usize,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_display_interval_ms")]
    pub display_interval_ms: u64,

    #[serde(default = "default_true")]
    pub scan_on_start: bool,
}

impl Default for ProcessorSection {
    fn default() -> Self {
        Self {
            class_mask: default_class_mask(),
            tracked_component: default_tracked_component(),
            content_len: default_content_len(),
            poll_interval_ms: default_poll_interval_ms(),
            display_interval_ms: default_display_interval_ms(),
            scan_on_start: true,
        }
    }
}

impl ProcessorSection {
    pub fn validate(&self) -> Result<()> {
        if self.class_mask.is_empty() {
            return Err(RepSysError::Config("processor.class_mask must not be empty".into()));
        }
        if !(8..=4096).contains(&self.content_len) {
            return Err(RepSysError::Config(
                "processor.content_len must be between 8 and 4096".into(),
            ));
        }
        if !(10..=600_000).contains(&self.poll_interval_ms) {
            return Err(RepSysError::Config(
                "processor.poll_interval_ms must be between 10 and 600000".into(),
            ));
        }
        if !(10..=600_000).contains(&self.display_interval_ms) {
            return Err(RepSysError::Config(
                "processor.display_interval_ms must be between 10 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn mask(&self) -> ClassMask {
        self.class_mask.iter().copied().collect()
    }

    /// Runtime form consumed by the processor.
    pub fn settings(&self) -> ProcessorSettings {
        ProcessorSettings {
            class_mask: self.mask(),
            tracked_component: self.tracked_component,
            content_len: self.content_len,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            display_interval: Duration::from_millis(self.display_interval_ms),
        }
    }
}

fn default_class_mask() -> Vec<MsgClass> {
    MsgClass::ALL
        .iter()
        .copied()
        .filter(|c| ClassMask::DEFAULT_RANGE.contains(*c))
        .collect()
}
fn default_tracked_component() -> u32 {
    SAFETY_COMPONENT
}
fn default_content_len() -> usize {
    60
}
fn default_poll_interval_ms() -> u64 {
    3000
}
fn default_display_interval_ms() -> u64 {
    5000
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpsSection {
    /// Address of the ops HTTP endpoints; unset disables them.
    #[serde(default)]
    pub listen: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorSection {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_sim_class")]
    pub class: MsgClass,

    #[serde(default = "default_tracked_component")]
    pub component: u32,

    #[serde(default = "default_sim_interval_ms")]
    pub interval_ms: u64,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            enabled: false,
            class: default_sim_class(),
            component: default_tracked_component(),
            interval_ms: default_sim_interval_ms(),
        }
    }
}

impl SimulatorSection {
    pub fn validate(&self) -> Result<()> {
        if self.enabled && !(10..=600_000).contains(&self.interval_ms) {
            return Err(RepSysError::Config(
                "simulator.interval_ms must be between 10 and 600000".into(),
            ));
        }
        Ok(())
    }

    pub fn settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            class: self.class,
            component: self.component,
            interval: Duration::from_millis(self.interval_ms),
        }
    }
}

fn default_sim_class() -> MsgClass {
    MsgClass::Warning
}
fn default_sim_interval_ms() -> u64 {
    500
}
