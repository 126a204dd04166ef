use super::{CityGraph, Vehicle, VehicleKind};
use crate::config::FleetConfig;
use rand::Rng;

pub struct PhysicsEngine {
    fleet: FleetConfig,
}

impl PhysicsEngine {
    pub fn new(fleet: FleetConfig) -> Self {
        Self { fleet }
    }

    pub fn target_speed(&self, kind: VehicleKind) -> f32 {
        match kind {
            VehicleKind::Civilian => self.fleet.civilian.target_speed,
            VehicleKind::DeliveryBot => self.fleet.delivery_bot.target_speed,
            VehicleKind::Ambulance => self.fleet.ambulance.cruise_speed,
        }
    }

    fn acceleration(&self, kind: VehicleKind) -> f32 {
        match kind {
            VehicleKind::Civilian => self.fleet.civilian.acceleration,
            VehicleKind::DeliveryBot => self.fleet.delivery_bot.acceleration,
            VehicleKind::Ambulance => 0.0,
        }
    }

    // Returns true once the vehicle reaches the end of its edge
    pub fn integrate(&self, vehicle: &mut Vehicle) -> bool {
        if vehicle.stopped {
            // Brake, never below zero, and hold position
            if vehicle.speed > 0.0 {
                vehicle.speed = (vehicle.speed - self.fleet.brake_rate).max(0.0);
            }
            return false;
        }

        // Ambulances hold their cruising speed
        if !vehicle.kind.is_emergency() {
            let target = self.target_speed(vehicle.kind);
            if vehicle.speed < target {
                vehicle.speed = (vehicle.speed + self.acceleration(vehicle.kind)).min(target);
            }
        }

        vehicle.progress += vehicle.speed;
        vehicle.progress >= 1.0
    }

    pub fn wander<R: Rng>(&self, vehicle: &mut Vehicle, city: &CityGraph, rng: &mut R) {
        // Unknown edge: park at the end of it rather than run off
        let Some(edge) = city.edge(vehicle.edge) else {
            log::debug!("{} is on unknown edge {}, skipping", vehicle.label(), vehicle.edge);
            vehicle.progress = vehicle.progress.min(1.0);
            return;
        };

        // No way out: stall and retry the intersection next time round
        let next = city.outgoing(edge.to);
        if next.is_empty() {
            log::debug!("{} reached dead end at {}", vehicle.label(), edge.to);
            vehicle.progress = 0.0;
            return;
        }

        vehicle.edge = next[rng.gen_range(0..next.len())];
        vehicle.progress = 0.0;
    }
}
