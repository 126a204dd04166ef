use crate::simulation::{CityGraph, EdgeId, LightState, NodeId};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct TrafficAgent {
    look_ahead: usize,
}

impl TrafficAgent {
    pub fn new(look_ahead: usize) -> Self {
        Self { look_ahead }
    }

    pub fn look_ahead(&self) -> usize {
        self.look_ahead
    }

    pub fn compute_route(&self, city: &CityGraph, origin: EdgeId, target: NodeId) -> Vec<EdgeId> {
        // Search starts where the origin edge ends; the origin itself is not returned
        let Some(start) = city.edge(origin).map(|e| e.to) else {
            log::warn!("Route requested from unknown edge {}", origin);
            return Vec::new();
        };

        // Edge used to first reach each node
        let mut came_by: Vec<Option<EdgeId>> = vec![None; city.nodes().len()];
        let mut visited = vec![false; city.nodes().len()];
        let mut queue = VecDeque::new();

        if let Some(seen) = visited.get_mut(start.0) {
            *seen = true;
        }
        queue.push_back(start);

        // Breadth-first by edge count. Adjacency keeps construction order,
        // so the first of several equally short paths wins
        while let Some(node) = queue.pop_front() {
            if node == target {
                return Self::unwind(city, &came_by, start, target);
            }

            for &edge_id in city.outgoing(node) {
                let Some(edge) = city.edge(edge_id) else { continue };
                match visited.get_mut(edge.to.0) {
                    Some(seen) if !*seen => {
                        *seen = true;
                        came_by[edge.to.0] = Some(edge_id);
                        queue.push_back(edge.to);
                    }
                    _ => {}
                }
            }
        }

        // Unreachable target
        Vec::new()
    }

    fn unwind(
        city: &CityGraph,
        came_by: &[Option<EdgeId>],
        start: NodeId,
        target: NodeId,
    ) -> Vec<EdgeId> {
        let mut route = Vec::new();
        let mut node = target;
        while node != start {
            let Some(edge) = came_by[node.0].and_then(|id| city.edge(id)) else {
                return Vec::new();
            };
            route.push(edge.id);
            node = edge.from;
        }
        route.reverse();
        route
    }

    // The destination of each edge, first occurrence only
    pub fn nodes_for_route(&self, city: &CityGraph, route: &[EdgeId]) -> Vec<NodeId> {
        let mut nodes: Vec<NodeId> = Vec::with_capacity(route.len());
        for edge in route.iter().filter_map(|&id| city.edge(id)) {
            if !nodes.contains(&edge.to) {
                nodes.push(edge.to);
            }
        }
        nodes
    }

    pub fn sequence_green_wave(&self, city: &mut CityGraph, planned: &[EdgeId], current: usize) {
        // Behind the ambulance: normal. Window of `look_ahead` past it: green.
        // Further ahead: highlighted, unless already released to normal
        for (index, &edge_id) in planned.iter().enumerate() {
            let Some(node) = city.edge(edge_id).map(|e| e.to) else { continue };
            let Some(light) = city.light(node) else { continue };

            let next = if index < current {
                LightState::Normal
            } else if index <= current + self.look_ahead {
                LightState::GreenWave
            } else if light != LightState::Normal {
                LightState::PreemptionHighlight
            } else {
                continue;
            };

            if light != next {
                city.set_light(node, next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CityConfig;

    fn city(n: usize) -> CityGraph {
        CityGraph::new(&CityConfig { grid_size: n, ..CityConfig::default() })
    }

    fn bfs_hops(city: &CityGraph, from: NodeId, to: NodeId) -> usize {
        let mut dist = vec![usize::MAX; city.nodes().len()];
        let mut queue = VecDeque::from([from]);
        dist[from.0] = 0;
        while let Some(node) = queue.pop_front() {
            for &e in city.outgoing(node) {
                let next = city.edge(e).unwrap().to;
                if dist[next.0] == usize::MAX {
                    dist[next.0] = dist[node.0] + 1;
                    queue.push_back(next);
                }
            }
        }
        dist[to.0]
    }

    #[test]
    fn route_length_is_shortest_hop_count() {
        let city = city(5);
        let agent = TrafficAgent::new(2);
        for edge in city.edges() {
            let route = agent.compute_route(&city, edge.id, city.hospital());
            assert_eq!(route.len(), bfs_hops(&city, edge.to, city.hospital()));

            // Route is a connected walk ending at the hospital
            let mut at = edge.to;
            for &id in &route {
                let step = city.edge(id).unwrap();
                assert_eq!(step.from, at);
                at = step.to;
            }
            assert_eq!(at, city.hospital());
        }
    }

    #[test]
    fn route_from_edge_into_target_is_empty() {
        let city = city(4);
        let agent = TrafficAgent::new(2);
        let into_hospital = city
            .edges()
            .iter()
            .find(|e| e.to == city.hospital())
            .unwrap();
        assert!(agent.compute_route(&city, into_hospital.id, city.hospital()).is_empty());
    }

    #[test]
    fn route_is_deterministic() {
        let city = city(4);
        let agent = TrafficAgent::new(2);
        let first = agent.compute_route(&city, EdgeId(0), city.hospital());
        for _ in 0..10 {
            assert_eq!(agent.compute_route(&city, EdgeId(0), city.hospital()), first);
        }
    }

    #[test]
    fn ties_break_toward_first_inserted_edge() {
        // From n_0_0 the rightward edge is inserted before the downward one,
        // so the route runs along the top row first.
        let city = city(3);
        let agent = TrafficAgent::new(2);
        let origin = city.edge_between(NodeId(1), NodeId(0)).unwrap();
        let route = agent.compute_route(&city, origin, city.hospital());
        let nodes = agent.nodes_for_route(&city, &route);
        assert_eq!(nodes, vec![NodeId(1), NodeId(2), NodeId(5), NodeId(8)]);
    }

    #[test]
    fn unknown_origin_or_target_yields_empty_route() {
        let city = city(3);
        let agent = TrafficAgent::new(2);
        assert!(agent.compute_route(&city, EdgeId(500), city.hospital()).is_empty());
        assert!(agent.compute_route(&city, EdgeId(0), NodeId(500)).is_empty());
    }

    #[test]
    fn green_wave_window_follows_position() {
        let mut city = city(4);
        let agent = TrafficAgent::new(2);
        let origin = city.edge_between(NodeId(1), NodeId(0)).unwrap();
        let mut planned = vec![origin];
        planned.extend(agent.compute_route(&city, origin, city.hospital()));
        let nodes = agent.nodes_for_route(&city, &planned);
        assert_eq!(nodes.len(), planned.len());

        city.set_all_lights(LightState::PreemptionHighlight);
        for current in 0..planned.len() {
            agent.sequence_green_wave(&mut city, &planned, current);
            for (i, &node) in nodes.iter().enumerate() {
                let expected = if i < current {
                    LightState::Normal
                } else if i <= current + 2 {
                    LightState::GreenWave
                } else {
                    LightState::PreemptionHighlight
                };
                assert_eq!(city.light(node), Some(expected), "index {} at position {}", i, current);
            }
        }
    }
}
