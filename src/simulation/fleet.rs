use super::{CityGraph, EdgeId, Vehicle, VehicleId, VehicleKind};
use crate::config::{EmergencyConfig, FleetConfig, VehicleProfile};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnChoice {
    pub edge: EdgeId,
    pub attempts: u32,
    pub qualified: bool,
}

pub struct FleetSpawner<'a> {
    config: &'a FleetConfig,
    city: &'a CityGraph,
}

impl<'a> FleetSpawner<'a> {
    pub fn new(config: &'a FleetConfig, city: &'a CityGraph) -> Self {
        Self { config, city }
    }

    pub fn spawn_background<R: Rng>(&self, rng: &mut R) -> Vec<Vehicle> {
        let total = self.config.civilian_count + self.config.delivery_bot_count;
        let mut vehicles = Vec::with_capacity(total + 1);

        // Civilians take the low ids, delivery bots follow
        for _ in 0..self.config.civilian_count {
            let id = VehicleId(vehicles.len());
            vehicles.push(self.spawn_one(id, VehicleKind::Civilian, &self.config.civilian, rng));
        }

        for _ in 0..self.config.delivery_bot_count {
            let id = VehicleId(vehicles.len());
            let profile = &self.config.delivery_bot;
            vehicles.push(self.spawn_one(id, VehicleKind::DeliveryBot, profile, rng));
        }

        log::debug!(
            "Spawned {} civilians and {} delivery bots",
            self.config.civilian_count, self.config.delivery_bot_count
        );

        vehicles
    }

    fn spawn_one<R: Rng>(
        &self,
        id: VehicleId,
        kind: VehicleKind,
        profile: &VehicleProfile,
        rng: &mut R,
    ) -> Vehicle {
        let speed_band =
            Uniform::new_inclusive(profile.initial_speed_min, profile.initial_speed_max);
        Vehicle {
            id,
            kind,
            edge: random_edge(self.city, rng),
            progress: rng.gen_range(0.0..1.0),
            speed: speed_band.sample(rng),
            stopped: false,
        }
    }

    pub fn spawn_ambulance(&self, id: VehicleId, edge: EdgeId) -> Vehicle {
        Vehicle {
            id,
            kind: VehicleKind::Ambulance,
            edge,
            progress: 0.0,
            speed: self.config.ambulance.cruise_speed,
            stopped: false,
        }
    }
}

pub fn random_edge<R: Rng>(city: &CityGraph, rng: &mut R) -> EdgeId {
    EdgeId(rng.gen_range(0..city.edges().len()))
}

pub fn choose_ambulance_edge<R: Rng>(
    city: &CityGraph,
    emergency: &EmergencyConfig,
    rng: &mut R,
) -> SpawnChoice {
    let hospital = city.hospital();
    let mut choice = SpawnChoice {
        edge: random_edge(city, rng),
        attempts: 0,
        qualified: false,
    };

    // Bounded rejection sampling: the source must be far enough from the
    // hospital and the edge must not already end there
    while choice.attempts < emergency.spawn_attempts {
        choice.edge = random_edge(city, rng);
        choice.attempts += 1;

        let Some(edge) = city.edge(choice.edge) else { continue };
        let distance = city.distance(edge.from, hospital).unwrap_or(0.0);
        if distance >= emergency.min_spawn_distance && edge.to != hospital {
            choice.qualified = true;
            break;
        }
    }

    // Out of attempts, keep the last sample
    if !choice.qualified {
        log::warn!(
            "No ambulance spawn edge qualified after {} attempts, using {}",
            choice.attempts, choice.edge
        );
    }

    choice
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CityConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn background_fleet_respects_profiles() {
        let city = CityGraph::new(&CityConfig::default());
        let config = FleetConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let vehicles = FleetSpawner::new(&config, &city).spawn_background(&mut rng);

        assert_eq!(vehicles.len(), 32);
        for (i, v) in vehicles.iter().enumerate() {
            assert_eq!(v.id, VehicleId(i));
            assert!(!v.stopped);
            assert!((0.0..1.0).contains(&v.progress));
            assert!(city.edge(v.edge).is_some());
            let profile = match v.kind {
                VehicleKind::Civilian => &config.civilian,
                VehicleKind::DeliveryBot => &config.delivery_bot,
                VehicleKind::Ambulance => panic!("no ambulance in background fleet"),
            };
            assert!(v.speed >= profile.initial_speed_min && v.speed <= profile.initial_speed_max);
        }
        assert_eq!(vehicles.iter().filter(|v| v.kind == VehicleKind::DeliveryBot).count(), 12);
    }

    #[test]
    fn ambulance_edge_keeps_distance_from_hospital() {
        let city = CityGraph::new(&CityConfig::default());
        let emergency = EmergencyConfig::default();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let choice = choose_ambulance_edge(&city, &emergency, &mut rng);
            if choice.qualified {
                let edge = city.edge(choice.edge).unwrap();
                assert_ne!(edge.to, city.hospital());
                assert!(city.distance(edge.from, city.hospital()).unwrap() >= 200.0);
            }
            assert!(choice.attempts <= emergency.spawn_attempts);
        }
    }

    #[test]
    fn ambulance_edge_falls_back_after_exhausting_attempts() {
        let city = CityGraph::new(&CityConfig::default());
        let emergency = EmergencyConfig {
            min_spawn_distance: 10_000.0,
            spawn_attempts: 5,
            ..EmergencyConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(3);

        let choice = choose_ambulance_edge(&city, &emergency, &mut rng);
        assert!(!choice.qualified);
        assert_eq!(choice.attempts, 5);
        assert!(city.edge(choice.edge).is_some());
    }
}
