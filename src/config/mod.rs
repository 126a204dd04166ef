use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod city;
pub mod emergency;
pub mod fleet;

pub use city::*;
pub use emergency::*;
pub use fleet::*;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub simulation: SimulationParams,
    pub city: CityConfig,
    pub fleet: FleetConfig,
    pub emergency: EmergencyConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationParams {
    pub tick_interval_ms: u64,
    pub seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            tick_interval_ms: 150,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("invalid configuration in {}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Converts a wall-clock delay into a whole number of ticks, rounding up.
    pub fn ms_to_ticks(&self, ms: u64) -> u64 {
        let interval = self.simulation.tick_interval_ms.max(1);
        (ms + interval - 1) / interval
    }
}

impl Validate for SimulationConfig {
    fn validate(&self) -> Result<()> {
        if self.simulation.tick_interval_ms == 0 {
            anyhow::bail!("Tick interval must be greater than zero");
        }

        self.city.validate()?;
        self.fleet.validate()?;
        self.emergency.validate()?;

        Ok(())
    }
}

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_defaults() -> Result<()> {
        let config = SimulationConfig::from_toml_str(include_str!("../../greenwave.toml"))?;
        assert_eq!(config, SimulationConfig::default());
        Ok(())
    }

    #[test]
    fn partial_config_falls_back_to_defaults() -> Result<()> {
        let config = SimulationConfig::from_toml_str("[city]\ngrid_size = 6\n")?;
        assert_eq!(config.city.grid_size, 6);
        assert_eq!(config.fleet.civilian_count, 20);
        assert_eq!(config.emergency.look_ahead, 2);
        Ok(())
    }

    #[test]
    fn rejects_degenerate_grid() {
        assert!(SimulationConfig::from_toml_str("[city]\ngrid_size = 1\n").is_err());
    }

    #[test]
    fn delay_conversion_rounds_up() {
        let config = SimulationConfig::default();
        assert_eq!(config.ms_to_ticks(0), 0);
        assert_eq!(config.ms_to_ticks(150), 1);
        assert_eq!(config.ms_to_ticks(1000), 7);
        assert_eq!(config.ms_to_ticks(1200), 8);
    }
}
