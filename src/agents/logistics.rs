use crate::simulation::{EdgeId, Vehicle};
use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct LogisticsAgent;

impl LogisticsAgent {
    pub fn new() -> Self {
        Self
    }

    // Recomputed from scratch each call; returns the held count
    pub fn enforce_clearance<I>(&self, vehicles: &mut [Vehicle], active_edges: I) -> usize
    where
        I: IntoIterator<Item = EdgeId>,
    {
        let active: HashSet<EdgeId> = active_edges.into_iter().collect();
        let mut held = 0;

        for vehicle in vehicles.iter_mut().filter(|v| !v.kind.is_emergency()) {
            vehicle.stopped = active.contains(&vehicle.edge);
            if vehicle.stopped {
                held += 1;
            }
        }

        held
    }

    pub fn resume_fleet(&self, vehicles: &mut [Vehicle]) -> usize {
        let mut released = 0;
        for vehicle in vehicles.iter_mut().filter(|v| !v.kind.is_emergency()) {
            if vehicle.stopped {
                released += 1;
            }
            vehicle.stopped = false;
        }
        released
    }
}
