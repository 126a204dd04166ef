use super::{Edge, EdgeId, LightState, Node, NodeId, Point};
use crate::config::CityConfig;
use std::collections::HashMap;

// Nodes and edges are indexed by their ids. Outgoing adjacency keeps
// construction order; route tie-breaking depends on it
#[derive(Debug, Clone)]
pub struct CityGraph {
    grid_size: usize,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<EdgeId>>,
    edge_lookup: HashMap<(NodeId, NodeId), EdgeId>,
    hospital: NodeId,
}

impl CityGraph {
    pub fn new(config: &CityConfig) -> Self {
        let n = config.grid_size;
        let cell_width = config.cell_width();
        let cell_height = config.cell_height();

        let mut nodes = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                nodes.push(Node {
                    id: NodeId(row * n + col),
                    col,
                    row,
                    position: Point::new(
                        (col + 1) as f32 * cell_width,
                        (row + 1) as f32 * cell_height,
                    ),
                    light: LightState::Normal,
                });
            }
        }

        let mut graph = Self {
            grid_size: n,
            nodes,
            edges: Vec::with_capacity(4 * n * n.saturating_sub(1)),
            outgoing: vec![Vec::new(); n * n],
            edge_lookup: HashMap::new(),
            hospital: NodeId((n * n).saturating_sub(1)),
        };

        // Right neighbour first, then the one below, each in both directions
        for row in 0..n {
            for col in 0..n {
                let here = NodeId(row * n + col);
                if col + 1 < n {
                    let right = NodeId(here.0 + 1);
                    graph.push_edge(here, right);
                    graph.push_edge(right, here);
                }
                if row + 1 < n {
                    let below = NodeId(here.0 + n);
                    graph.push_edge(here, below);
                    graph.push_edge(below, here);
                }
            }
        }

        log::debug!(
            "Built {}x{} city: {} nodes, {} edges, hospital at {}",
            n, n, graph.nodes.len(), graph.edges.len(), graph.hospital
        );

        graph
    }

    // Drops every way out of `node`, leaving a dead end
    #[cfg(test)]
    pub(crate) fn close_intersection(&mut self, node: NodeId) {
        if let Some(out) = self.outgoing.get_mut(node.0) {
            out.clear();
        }
    }

    fn push_edge(&mut self, from: NodeId, to: NodeId) {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge { id, from, to });
        self.outgoing[from.0].push(id);
        self.edge_lookup.insert((from, to), id);
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn hospital(&self) -> NodeId {
        self.hospital
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    pub fn node_at(&self, col: usize, row: usize) -> Option<NodeId> {
        (col < self.grid_size && row < self.grid_size).then(|| NodeId(row * self.grid_size + col))
    }

    pub fn edge_between(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.edge_lookup.get(&(from, to)).copied()
    }

    pub fn outgoing(&self, node: NodeId) -> &[EdgeId] {
        self.outgoing.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set_light(&mut self, node: NodeId, light: LightState) {
        if let Some(node) = self.nodes.get_mut(node.0) {
            node.light = light;
        }
    }

    pub fn set_all_lights(&mut self, light: LightState) {
        for node in &mut self.nodes {
            node.light = light;
        }
    }

    pub fn light(&self, node: NodeId) -> Option<LightState> {
        self.node(node).map(|n| n.light)
    }

    pub fn distance(&self, a: NodeId, b: NodeId) -> Option<f32> {
        let a = self.node(a)?;
        let b = self.node(b)?;
        Some(nalgebra::distance(&a.position, &b.position))
    }

    // 2 * n * (n - 1)
    pub fn adjacency_count(&self) -> usize {
        2 * self.grid_size * (self.grid_size - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(n: usize) -> CityGraph {
        CityGraph::new(&CityConfig { grid_size: n, ..CityConfig::default() })
    }

    #[test]
    fn node_and_edge_counts() {
        for n in 2..8 {
            let graph = city(n);
            assert_eq!(graph.nodes().len(), n * n);
            assert_eq!(graph.edges().len(), 2 * graph.adjacency_count());
        }
    }

    #[test]
    fn every_adjacency_is_reciprocal() {
        let graph = city(5);
        for row in 0..5 {
            for col in 0..5 {
                let here = graph.node_at(col, row).unwrap();
                let mut neighbours = Vec::new();
                if col + 1 < 5 {
                    neighbours.push(graph.node_at(col + 1, row).unwrap());
                }
                if row + 1 < 5 {
                    neighbours.push(graph.node_at(col, row + 1).unwrap());
                }
                for other in neighbours {
                    assert!(graph.edge_between(here, other).is_some());
                    assert!(graph.edge_between(other, here).is_some());
                }
            }
        }
    }

    #[test]
    fn degenerate_grids_build_without_edges() {
        for n in [0, 1] {
            let graph = city(n);
            assert_eq!(graph.nodes().len(), n * n);
            assert!(graph.edges().is_empty());
            assert_eq!(graph.hospital(), NodeId(0));
        }
    }

    #[test]
    fn hospital_is_far_corner() {
        let graph = city(4);
        let hospital = graph.node(graph.hospital()).unwrap();
        assert_eq!((hospital.col, hospital.row), (3, 3));
        assert_eq!(hospital.label(), "n_3_3");
        assert_eq!(hospital.position, Point::new(640.0, 480.0));
    }

    #[test]
    fn ids_index_their_storage() {
        let graph = city(4);
        for (i, node) in graph.nodes().iter().enumerate() {
            assert_eq!(node.id, NodeId(i));
        }
        for (i, edge) in graph.edges().iter().enumerate() {
            assert_eq!(edge.id, EdgeId(i));
            assert!(graph.outgoing(edge.from).contains(&edge.id));
        }
    }

    #[test]
    fn unknown_ids_are_tolerated() {
        let mut graph = city(3);
        assert!(graph.node(NodeId(99)).is_none());
        assert!(graph.edge(EdgeId(999)).is_none());
        assert!(graph.outgoing(NodeId(99)).is_empty());
        graph.set_light(NodeId(99), LightState::GreenWave);
        assert_eq!(graph.distance(NodeId(0), NodeId(99)), None);
    }
}
