use nalgebra::Point2;
use serde::Serialize;
use std::fmt;

pub mod city;
pub mod fleet;
pub mod perf;
pub mod physics;

pub use city::*;
pub use fleet::*;
pub use perf::*;
pub use physics::*;

use crate::engine::EmergencyPhase;

pub type Point = Point2<f32>;

/// Index of an intersection, `row * grid_size + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

/// Index of a directed road segment in construction order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VehicleId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LightState {
    #[default]
    Normal,
    PreemptionHighlight,
    GreenWave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleKind {
    Civilian,
    DeliveryBot,
    Ambulance,
}

impl VehicleKind {
    pub fn is_emergency(self) -> bool {
        self == VehicleKind::Ambulance
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub col: usize,
    pub row: usize,
    pub position: Point,
    pub light: LightState,
}

impl Node {
    pub fn label(&self) -> String {
        format!("n_{}_{}", self.col, self.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub kind: VehicleKind,
    pub edge: EdgeId,
    pub progress: f32,
    pub speed: f32,
    pub stopped: bool,
}

impl Vehicle {
    pub fn label(&self) -> String {
        match self.kind {
            VehicleKind::Civilian => format!("civ_{}", self.id.0),
            VehicleKind::DeliveryBot => format!("delivery_{}", self.id.0),
            VehicleKind::Ambulance => "ambulance_1".to_string(),
        }
    }
}

/// Read-only copy of the engine state handed to renderers and drivers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub tick_count: u64,
    pub phase: EmergencyPhase,
    pub emergency_active: bool,
    pub hospital: NodeId,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub vehicles: Vec<Vehicle>,
    pub active_route: Vec<Point>,
}

impl StateSnapshot {
    pub fn ambulance(&self) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.kind.is_emergency())
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn count_lights(&self, light: LightState) -> usize {
        self.nodes.iter().filter(|n| n.light == light).count()
    }

    pub fn stopped_vehicles(&self) -> usize {
        self.vehicles.iter().filter(|v| v.stopped && !v.kind.is_emergency()).count()
    }
}
