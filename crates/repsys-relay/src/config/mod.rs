//! Relay config loader (strict parsing).

pub mod schema;

use std::fs;

use repsys_core::error::{RepSysError, Result};

pub use schema::{OpsSection, ProcessorSection, RelayConfig, SimulatorSection};

pub fn load_from_file(path: &str) -> Result<RelayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| RepSysError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RelayConfig> {
    let cfg: RelayConfig = serde_yaml::from_str(s)
        .map_err(|e| RepSysError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
