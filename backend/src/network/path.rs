//! Path queries over the network graph
//!
//! - Minimum-hop paths: breadth-first search, neighbours visited in edge
//!   insertion order so ties resolve deterministically.
//! - Weighted paths: Dijkstra over non-negative edge weights. A weight of
//!   `None` (attribute absent) or a non-finite value means "impassable":
//!   the edge is never relaxed. Between a pair of nodes joined by parallel
//!   edges, relaxation naturally keeps the cheapest one.
//!
//! Disruptions are not deletions; [`NetworkGraph::find_operational_path`]
//! is the query that routes around them.

use crate::models::Edge;
use crate::network::{GraphError, NetworkGraph};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};
use tracing::debug;

/// Heap entry for Dijkstra; ordered so `BinaryHeap` pops the lowest cost,
/// then the earliest pushed entry
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    seq: u64,
    node: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl NetworkGraph {
    /// Find a path from `source_id` to `target_id`
    ///
    /// Without a weight selector the path with the fewest hops is returned.
    /// With one, the selector names an edge attribute (see
    /// [`Edge::attribute`]) and the cheapest path by that attribute is
    /// returned; edges lacking the attribute are impassable.
    ///
    /// # Returns
    /// * `Ok(Some(path))` - node ids from source to target, inclusive
    /// * `Ok(None)` - target unreachable
    /// * `Err(UnknownNode)` - an endpoint is not in the graph
    pub fn find_path(
        &self,
        source_id: &str,
        target_id: &str,
        weight_selector: Option<&str>,
    ) -> Result<Option<Vec<String>>, GraphError> {
        let path = match weight_selector {
            None => self.min_hop_path(source_id, target_id)?,
            Some(attribute) => {
                self.find_path_by(source_id, target_id, |edge| edge.attribute(attribute))?
            }
        };

        debug!(
            source = source_id,
            target = target_id,
            weight = weight_selector.unwrap_or("hops"),
            found = path.is_some(),
            "Path query"
        );
        Ok(path)
    }

    /// Cheapest path under an arbitrary per-edge weight function
    ///
    /// `weight` returning `None` or a non-finite value excludes the edge.
    ///
    /// # Errors
    /// `NegativeWeight` if a relaxed edge has a negative weight.
    pub fn find_path_by<F>(
        &self,
        source_id: &str,
        target_id: &str,
        weight: F,
    ) -> Result<Option<Vec<String>>, GraphError>
    where
        F: Fn(&Edge) -> Option<f64>,
    {
        let (source, target) = self.endpoints(source_id, target_id)?;

        let n = self.nodes.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut pred: Vec<Option<usize>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;

        dist[source] = 0.0;
        heap.push(Frontier {
            cost: 0.0,
            seq,
            node: source,
        });

        while let Some(Frontier { cost, node, .. }) = heap.pop() {
            if settled[node] {
                continue;
            }
            settled[node] = true;
            if node == target {
                break;
            }

            for &edge_idx in &self.outgoing[node] {
                let edge = &self.edges[edge_idx];
                let w = match weight(edge) {
                    Some(w) if w.is_finite() => w,
                    _ => continue,
                };
                if w < 0.0 {
                    return Err(GraphError::NegativeWeight {
                        edge_id: edge.id().to_string(),
                        weight: w,
                    });
                }

                let next = self.node_index[edge.target_id()];
                let candidate = cost + w;
                if !settled[next] && candidate < dist[next] {
                    dist[next] = candidate;
                    pred[next] = Some(node);
                    seq += 1;
                    heap.push(Frontier {
                        cost: candidate,
                        seq,
                        node: next,
                    });
                }
            }
        }

        if !settled[target] {
            return Ok(None);
        }
        Ok(Some(self.reconstruct(&pred, source, target)))
    }

    /// Path that avoids disrupted elements
    ///
    /// Edges that are DISRUPTED, or whose source or target node is
    /// DISRUPTED, are impassable. Other edges are weighted by
    /// `weight_selector` (or count one hop each when it is `None`).
    pub fn find_operational_path(
        &self,
        source_id: &str,
        target_id: &str,
        weight_selector: Option<&str>,
    ) -> Result<Option<Vec<String>>, GraphError> {
        self.find_path_by(source_id, target_id, |edge| {
            if !self.is_passable(edge) {
                return None;
            }
            match weight_selector {
                Some(attribute) => edge.attribute(attribute),
                None => Some(1.0),
            }
        })
    }

    /// Total cost of a path under `weight_selector`
    ///
    /// Each hop costs its cheapest parallel edge. Returns `None` if some
    /// hop has no edge carrying the attribute.
    pub fn path_cost(&self, path: &[String], weight_selector: &str) -> Option<f64> {
        path.windows(2)
            .map(|hop| {
                self.edges_between(&hop[0], &hop[1])
                    .into_iter()
                    .filter_map(|edge| edge.attribute(weight_selector))
                    .filter(|w| w.is_finite())
                    .min_by(f64::total_cmp)
            })
            .sum()
    }

    fn is_passable(&self, edge: &Edge) -> bool {
        let endpoint_ok = |id: &str| self.get_node(id).map_or(false, |n| !n.is_disrupted());
        !edge.is_disrupted() && endpoint_ok(edge.source_id()) && endpoint_ok(edge.target_id())
    }

    fn min_hop_path(
        &self,
        source_id: &str,
        target_id: &str,
    ) -> Result<Option<Vec<String>>, GraphError> {
        let (source, target) = self.endpoints(source_id, target_id)?;

        let mut visited = vec![false; self.nodes.len()];
        let mut pred: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut queue = VecDeque::new();
        visited[source] = true;
        queue.push_back(source);

        while let Some(node) = queue.pop_front() {
            if node == target {
                return Ok(Some(self.reconstruct(&pred, source, target)));
            }
            for &edge_idx in &self.outgoing[node] {
                let next = self.node_index[self.edges[edge_idx].target_id()];
                if !visited[next] {
                    visited[next] = true;
                    pred[next] = Some(node);
                    queue.push_back(next);
                }
            }
        }

        Ok(None)
    }

    fn endpoints(&self, source_id: &str, target_id: &str) -> Result<(usize, usize), GraphError> {
        let source = *self
            .node_index
            .get(source_id)
            .ok_or_else(|| GraphError::UnknownNode(source_id.to_string()))?;
        let target = *self
            .node_index
            .get(target_id)
            .ok_or_else(|| GraphError::UnknownNode(target_id.to_string()))?;
        Ok((source, target))
    }

    fn reconstruct(&self, pred: &[Option<usize>], source: usize, target: usize) -> Vec<String> {
        let mut path = vec![self.nodes[target].id().to_string()];
        let mut current = target;
        while current != source {
            match pred[current] {
                Some(prev) => {
                    path.push(self.nodes[prev].id().to_string());
                    current = prev;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::node::{NodeKind, WarehouseAttributes};
    use crate::models::Node;

    fn line_graph() -> NetworkGraph {
        let mut graph = NetworkGraph::new("line");
        for id in ["A", "B", "C"] {
            graph
                .add_node(Node::new(id, id, NodeKind::Warehouse(WarehouseAttributes::default())))
                .unwrap();
        }
        graph
            .add_edge(Edge::new("AB", "A", "B", "Road").with_cost_per_unit(1.0))
            .unwrap();
        graph
            .add_edge(Edge::new("BC", "B", "C", "Road").with_cost_per_unit(1.0))
            .unwrap();
        graph
    }

    #[test]
    fn test_frontier_pops_lowest_cost_first() {
        let mut heap = BinaryHeap::new();
        heap.push(Frontier { cost: 3.0, seq: 0, node: 0 });
        heap.push(Frontier { cost: 1.0, seq: 1, node: 1 });
        heap.push(Frontier { cost: 1.0, seq: 2, node: 2 });

        assert_eq!(heap.pop().unwrap().node, 1);
        assert_eq!(heap.pop().unwrap().node, 2);
        assert_eq!(heap.pop().unwrap().node, 0);
    }

    #[test]
    fn test_source_equals_target() {
        let graph = line_graph();
        assert_eq!(graph.find_path("B", "B", None).unwrap(), Some(vec!["B".to_string()]));
        assert_eq!(
            graph.find_path("B", "B", Some("cost")).unwrap(),
            Some(vec!["B".to_string()])
        );
    }

    #[test]
    fn test_edges_are_directed() {
        let graph = line_graph();
        assert_eq!(graph.find_path("C", "A", None).unwrap(), None);
    }

    #[test]
    fn test_path_cost_sums_hops() {
        let graph = line_graph();
        let path = graph.find_path("A", "C", Some("cost_per_unit")).unwrap().unwrap();
        assert_eq!(graph.path_cost(&path, "cost_per_unit"), Some(2.0));
        assert_eq!(graph.path_cost(&path, "distance_km"), None);
    }
}
