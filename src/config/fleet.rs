use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FleetConfig {
    pub civilian_count: usize,
    pub delivery_bot_count: usize,
    pub brake_rate: f32,
    pub civilian: VehicleProfile,
    pub delivery_bot: VehicleProfile,
    pub ambulance: AmbulanceProfile,
}

/// Speeds are fractions of an edge travelled per tick.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct VehicleProfile {
    pub initial_speed_min: f32,
    pub initial_speed_max: f32,
    pub target_speed: f32,
    pub acceleration: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AmbulanceProfile {
    pub cruise_speed: f32,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            civilian_count: 20,
            delivery_bot_count: 12,
            brake_rate: 0.0005,
            civilian: VehicleProfile {
                initial_speed_min: 0.005,
                initial_speed_max: 0.008,
                target_speed: 0.008,
                acceleration: 0.0002,
            },
            delivery_bot: VehicleProfile {
                initial_speed_min: 0.003,
                initial_speed_max: 0.003,
                target_speed: 0.003,
                acceleration: 0.0002,
            },
            ambulance: AmbulanceProfile { cruise_speed: 0.015 },
        }
    }
}

impl VehicleProfile {
    fn validate_named(&self, name: &str) -> Result<()> {
        if self.target_speed <= 0.0 {
            return Err(anyhow!("Target speed for '{}' must be positive", name));
        }

        if self.initial_speed_min < 0.0 || self.initial_speed_min > self.initial_speed_max {
            return Err(anyhow!("Initial speed band for '{}' is empty or negative", name));
        }

        if self.initial_speed_max > self.target_speed {
            return Err(anyhow!(
                "Initial speed for '{}' may not exceed its target speed ({} > {})",
                name, self.initial_speed_max, self.target_speed
            ));
        }

        if self.acceleration <= 0.0 {
            return Err(anyhow!("Acceleration for '{}' must be positive", name));
        }

        Ok(())
    }
}

impl Validate for FleetConfig {
    fn validate(&self) -> Result<()> {
        if self.brake_rate <= 0.0 {
            return Err(anyhow!("Brake rate must be positive"));
        }

        self.civilian.validate_named("civilian")?;
        self.delivery_bot.validate_named("delivery_bot")?;

        if self.ambulance.cruise_speed <= 0.0 || self.ambulance.cruise_speed >= 1.0 {
            return Err(anyhow!("Ambulance cruise speed must be in range (0, 1)"));
        }

        Ok(())
    }
}
