use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CityConfig {
    pub grid_size: usize,
    pub map_width: f32,
    pub map_height: f32,
    // Rendering only
    pub road_width: f32,
    pub lane_offset: f32,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            grid_size: 4,
            map_width: 800.0,
            map_height: 600.0,
            road_width: 40.0,
            lane_offset: 10.0,
        }
    }
}

impl CityConfig {
    pub fn cell_width(&self) -> f32 {
        self.map_width / (self.grid_size + 1) as f32
    }

    pub fn cell_height(&self) -> f32 {
        self.map_height / (self.grid_size + 1) as f32
    }
}

impl Validate for CityConfig {
    fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            return Err(anyhow!("Grid size must be at least 2, got {}", self.grid_size));
        }

        if self.map_width <= 0.0 || self.map_height <= 0.0 {
            return Err(anyhow!("Map dimensions must be positive"));
        }

        if self.road_width < 0.0 || self.lane_offset < 0.0 {
            return Err(anyhow!("Road width and lane offset must be non-negative"));
        }

        if self.lane_offset > self.road_width {
            return Err(anyhow!(
                "Lane offset {} exceeds road width {}",
                self.lane_offset,
                self.road_width
            ));
        }

        Ok(())
    }
}
