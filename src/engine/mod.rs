use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::iter;

pub mod events;
pub mod phase;

pub use events::*;
pub use phase::*;

use crate::agents::{LogisticsAgent, TrafficAgent};
use crate::config::{SimulationConfig, Validate};
use crate::simulation::{
    choose_ambulance_edge, CityGraph, EdgeId, FleetSpawner, LightState, NodeId, PhysicsEngine,
    Point, StateSnapshot, Vehicle, VehicleId,
};

// `edges` starts with the edge the ambulance occupied when the route was
// planned; `remaining` is always a suffix of it
#[derive(Debug, Clone, Default)]
pub struct PlannedRoute {
    edges: Vec<EdgeId>,
    remaining: VecDeque<EdgeId>,
}

impl PlannedRoute {
    fn new(origin: EdgeId, route: Vec<EdgeId>) -> Self {
        let mut edges = Vec::with_capacity(route.len() + 1);
        edges.push(origin);
        edges.extend_from_slice(&route);
        Self {
            edges,
            remaining: route.into(),
        }
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn remaining(&self) -> &VecDeque<EdgeId> {
        &self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn position_of(&self, edge: EdgeId) -> Option<usize> {
        self.edges.iter().position(|&e| e == edge)
    }
}

/// Owns the whole city and advances it one tick at a time.
pub struct SimulationEngine {
    config: SimulationConfig,
    city: CityGraph,
    vehicles: Vec<Vehicle>,
    phase: EmergencyPhase,
    route: PlannedRoute,
    active_route: Vec<Point>,
    tick_count: u64,
    emergency_epoch: u64,
    traffic_agent: TrafficAgent,
    logistics_agent: LogisticsAgent,
    physics: PhysicsEngine,
    events: EventLog,
    rng: StdRng,
}

impl SimulationEngine {
    pub fn new(config: SimulationConfig) -> anyhow::Result<Self> {
        let rng = if let Some(seed) = config.simulation.seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };
        Self::with_rng(config, rng)
    }

    pub fn with_seed(config: SimulationConfig, seed: u64) -> anyhow::Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: SimulationConfig, mut rng: StdRng) -> anyhow::Result<Self> {
        // The grid builder and spawners assume a validated config
        config.validate()?;

        let city = CityGraph::new(&config.city);
        let vehicles = FleetSpawner::new(&config.fleet, &city).spawn_background(&mut rng);

        log::info!(
            "City initialised: {}x{} grid, {} vehicles, hospital at {}",
            city.grid_size(), city.grid_size(), vehicles.len(), city.hospital()
        );

        Ok(Self {
            traffic_agent: TrafficAgent::new(config.emergency.look_ahead),
            logistics_agent: LogisticsAgent::new(),
            physics: PhysicsEngine::new(config.fleet.clone()),
            config,
            city,
            vehicles,
            phase: EmergencyPhase::Idle,
            route: PlannedRoute::default(),
            active_route: Vec::new(),
            tick_count: 0,
            emergency_epoch: 0,
            events: EventLog::default(),
            rng,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn city(&self) -> &CityGraph {
        &self.city
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn phase(&self) -> EmergencyPhase {
        self.phase
    }

    pub fn emergency_active(&self) -> bool {
        self.phase.has_ambulance()
    }

    // Bumped on every reset and injection
    pub fn emergency_epoch(&self) -> u64 {
        self.emergency_epoch
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn hospital(&self) -> NodeId {
        self.city.hospital()
    }

    pub fn planned_route(&self) -> &[EdgeId] {
        self.route.edges()
    }

    pub fn remaining_route(&self) -> &VecDeque<EdgeId> {
        self.route.remaining()
    }

    pub fn ambulance(&self) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.kind.is_emergency())
    }

    pub fn events(&self) -> impl Iterator<Item = &EngineEvent> {
        self.events.iter()
    }

    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain()
    }

    fn ambulance_id(&self) -> VehicleId {
        VehicleId(self.config.fleet.civilian_count + self.config.fleet.delivery_bot_count)
    }

    fn record(&mut self, kind: EventKind, source: EventSource, level: EventLevel, message: String) {
        self.events.push(EngineEvent {
            tick: self.tick_count,
            kind,
            source,
            level,
            message,
        });
    }

    pub fn get_state(&self) -> StateSnapshot {
        StateSnapshot {
            tick_count: self.tick_count,
            phase: self.phase,
            emergency_active: self.emergency_active(),
            hospital: self.city.hospital(),
            nodes: self.city.nodes().to_vec(),
            edges: self.city.edges().to_vec(),
            vehicles: self.vehicles.clone(),
            active_route: self.active_route.clone(),
        }
    }

    pub fn reset(&mut self) {
        self.vehicles =
            FleetSpawner::new(&self.config.fleet, &self.city).spawn_background(&mut self.rng);
        self.phase = EmergencyPhase::Idle;
        self.city.set_all_lights(LightState::Normal);
        self.route = PlannedRoute::default();
        self.active_route.clear();
        self.emergency_epoch += 1;
        self.logistics_agent.resume_fleet(&mut self.vehicles);

        self.events.clear();
        self.record(
            EventKind::Reset,
            EventSource::System,
            EventLevel::Info,
            "Simulation reset.".to_string(),
        );
    }

    pub fn inject_ambulance(&mut self) -> Result<Vehicle, EngineError> {
        if !self.phase.accepts_injection() {
            return Err(EngineError::EmergencyInProgress(self.phase));
        }

        // A parked ambulance from a resolved emergency leaves the map
        self.vehicles.retain(|v| !v.kind.is_emergency());
        self.route = PlannedRoute::default();
        self.active_route.clear();
        self.city.set_all_lights(LightState::Normal);

        let choice = choose_ambulance_edge(&self.city, &self.config.emergency, &mut self.rng);
        let ambulance = FleetSpawner::new(&self.config.fleet, &self.city)
            .spawn_ambulance(self.ambulance_id(), choice.edge);
        self.vehicles.push(ambulance.clone());
        self.phase = EmergencyPhase::Detected;
        self.emergency_epoch += 1;

        self.record(
            EventKind::AmbulanceDetected,
            EventSource::Vision,
            EventLevel::Alert,
            format!(
                "TARGET ACQUIRED: AMBULANCE on {} ({} spawn attempts)",
                choice.edge, choice.attempts
            ),
        );

        Ok(ambulance)
    }

    pub fn highlight_traffic_lights(&mut self) -> Result<(), EngineError> {
        self.expect_phase("highlight traffic lights", EmergencyPhase::Detected)?;

        self.city.set_all_lights(LightState::PreemptionHighlight);
        self.phase = EmergencyPhase::Routing;

        self.record(
            EventKind::LightsPrewarned,
            EventSource::TrafficAgent,
            EventLevel::Warning,
            "Computing shortest path to City Hospital...".to_string(),
        );

        Ok(())
    }

    pub fn activate_agents(&mut self) -> Result<(), EngineError> {
        self.expect_phase("activate agents", EmergencyPhase::Routing)?;

        // Plan from wherever the ambulance is waiting right now
        let Some(origin) = self.ambulance().map(|v| v.edge) else {
            log::warn!("Routing phase without an ambulance, nothing to activate");
            return Ok(());
        };

        let hospital = self.city.hospital();
        let route = self.traffic_agent.compute_route(&self.city, origin, hospital);
        let ends_at_hospital = self.city.edge(origin).is_some_and(|e| e.to == hospital);
        // An empty route is only fine when the current edge already ends at the hospital
        if route.is_empty() && !ends_at_hospital {
            self.record(
                EventKind::RoutePlanningFailed,
                EventSource::TrafficAgent,
                EventLevel::Warning,
                format!("No route from {} to hospital, holding current edge only", origin),
            );
        }

        // Commit the route, then clear every corridor edge including the origin
        self.route = PlannedRoute::new(origin, route);
        self.active_route = self.corridor_waypoints();
        self.phase = EmergencyPhase::Active;

        let intersections = self
            .traffic_agent
            .nodes_for_route(&self.city, self.route.edges())
            .len();
        let held = self
            .logistics_agent
            .enforce_clearance(&mut self.vehicles, self.route.edges().iter().copied());

        self.record(
            EventKind::RouteCommitted,
            EventSource::TrafficAgent,
            EventLevel::Success,
            format!("Green Wave Sequence Initiated across {} intersections.", intersections),
        );
        self.record(
            EventKind::PathCleared,
            EventSource::LogisticsAgent,
            EventLevel::Success,
            format!("Clearing path: stopping {} vehicles on emergency route.", held),
        );

        Ok(())
    }

    fn expect_phase(
        &self,
        command: &'static str,
        expected: EmergencyPhase,
    ) -> Result<(), EngineError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EngineError::OutOfOrder {
                command,
                phase: self.phase,
                expected,
            })
        }
    }

    fn corridor_waypoints(&self) -> Vec<Point> {
        let mut waypoints: Vec<Point> = Vec::with_capacity(self.route.edges().len() + 1);
        for edge in self.route.edges().iter().filter_map(|&id| self.city.edge(id)) {
            for node in [edge.from, edge.to].into_iter().filter_map(|id| self.city.node(id)) {
                if waypoints.last() != Some(&node.position) {
                    waypoints.push(node.position);
                }
            }
        }
        waypoints
    }

    pub fn step(&mut self) -> StateSnapshot {
        self.tick_count += 1;

        // Clearance first so vehicles entering the corridor brake this tick
        self.update_clearance();

        // Signals follow the ambulance's position before it moves
        self.update_green_wave();

        // Kinematics, edge changes and arrival
        self.update_vehicles();

        self.get_state()
    }

    fn update_clearance(&mut self) {
        let Some((edge, stopped)) = self.ambulance().map(|v| (v.edge, v.stopped)) else {
            return;
        };

        if self.phase == EmergencyPhase::Active && !self.route.is_empty() && !stopped {
            // Only the current edge and what lies ahead; traffic behind is free
            let active = iter::once(edge).chain(self.route.remaining().iter().copied());
            let held = self.logistics_agent.enforce_clearance(&mut self.vehicles, active);
            log::debug!(
                "Tick {}: holding {} vehicles ahead of the ambulance",
                self.tick_count, held
            );
        } else if stopped {
            let released = self.logistics_agent.resume_fleet(&mut self.vehicles);
            if released > 0 {
                self.record(
                    EventKind::FleetResumed,
                    EventSource::LogisticsAgent,
                    EventLevel::Info,
                    format!("Ambulance safe, releasing {} held vehicles.", released),
                );
            }
        }
    }

    fn update_green_wave(&mut self) {
        if self.phase != EmergencyPhase::Active {
            return;
        }

        let Some(current) = self.ambulance().and_then(|v| self.route.position_of(v.edge)) else {
            return;
        };

        log::debug!(
            "Tick {}: green wave window starts at route index {}",
            self.tick_count, current
        );
        self.traffic_agent.sequence_green_wave(&mut self.city, self.route.edges(), current);
    }

    fn update_vehicles(&mut self) {
        let mut finished = None;

        for vehicle in self.vehicles.iter_mut() {
            // Brake or accelerate, then move along the edge
            if !self.physics.integrate(vehicle) {
                continue;
            }

            // Background traffic picks a random onward edge
            if !vehicle.kind.is_emergency() {
                self.physics.wander(vehicle, &self.city, &mut self.rng);
                continue;
            }

            // The ambulance follows its committed route and parks at the end
            match self.phase {
                EmergencyPhase::Active => {
                    if let Some(next) = self.route.remaining.pop_front() {
                        vehicle.edge = next;
                        vehicle.progress = 0.0;
                    } else {
                        vehicle.progress = 1.0;
                        vehicle.stopped = true;
                        finished = Some(vehicle.edge);
                    }
                }
                EmergencyPhase::Resolved => {
                    vehicle.progress = 1.0;
                    vehicle.stopped = true;
                }
                // No committed route yet, wait at the intersection
                _ => vehicle.progress = 1.0,
            }
        }

        // Resolve once the loop releases the vehicle borrow
        if let Some(edge) = finished {
            self.resolve(edge);
        }
    }

    fn resolve(&mut self, edge: EdgeId) {
        self.phase = EmergencyPhase::Resolved;
        self.city.set_all_lights(LightState::Normal);

        let hospital = self.city.hospital();
        if self.city.edge(edge).is_some_and(|e| e.to == hospital) {
            self.record(
                EventKind::AmbulanceArrived,
                EventSource::System,
                EventLevel::Success,
                "Ambulance arrived at City Hospital. Signals restored.".to_string(),
            );
        } else {
            self.record(
                EventKind::AmbulanceHalted,
                EventSource::System,
                EventLevel::Warning,
                format!("Ambulance halted on {} short of the hospital. Signals restored.", edge),
            );
        }
    }
}
