use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmergencyConfig {
    /// Intersections ahead of the ambulance that are held green.
    pub look_ahead: usize,
    pub min_spawn_distance: f32,
    pub spawn_attempts: u32,
    pub auto_trigger_min_ms: u64,
    pub auto_trigger_max_ms: u64,
    pub detect_to_route_ms: u64,
    pub route_to_activate_ms: u64,
}

impl Default for EmergencyConfig {
    fn default() -> Self {
        Self {
            look_ahead: 2,
            min_spawn_distance: 200.0,
            spawn_attempts: 20,
            auto_trigger_min_ms: 5000,
            auto_trigger_max_ms: 15000,
            detect_to_route_ms: 1000,
            route_to_activate_ms: 1200,
        }
    }
}

impl Validate for EmergencyConfig {
    fn validate(&self) -> Result<()> {
        if self.spawn_attempts == 0 {
            return Err(anyhow!("Ambulance spawn attempts must be greater than zero"));
        }

        if self.min_spawn_distance < 0.0 {
            return Err(anyhow!("Minimum spawn distance must be non-negative"));
        }

        if self.auto_trigger_min_ms > self.auto_trigger_max_ms {
            return Err(anyhow!(
                "Auto trigger window is inverted: {}ms > {}ms",
                self.auto_trigger_min_ms, self.auto_trigger_max_ms
            ));
        }

        Ok(())
    }
}
