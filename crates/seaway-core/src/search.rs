//! Single-source, single-target Dijkstra over a [`GridGraph`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::error::{Result, RouteError};
use crate::graph::{Edge, GridGraph};

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    cost: FloatOrd,
    node: usize,
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Result of a successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub total_cost: f64,
    /// Node ids from start to end, inclusive.
    pub path: Vec<usize>,
    /// Nodes settled before the end node was reached.
    pub nodes_visited: usize,
}

/// Find the cheapest path from `start` to `end`.
///
/// `edge_cost` is called for each relaxed edge with the source node and the
/// edge; it must return a non-negative cost. An error from it aborts the
/// search. An exhausted frontier is reported as [`RouteError::Unreachable`].
pub fn shortest_path<F>(
    graph: &GridGraph,
    start: usize,
    end: usize,
    mut edge_cost: F,
) -> Result<SearchOutcome>
where
    F: FnMut(usize, &Edge) -> Result<f64>,
{
    let num_nodes = graph.num_nodes();
    if start >= num_nodes || end >= num_nodes {
        return Err(RouteError::invalid_request(format!(
            "node out of range (start {start}, end {end}, nodes {num_nodes})"
        )));
    }

    let mut dist = vec![f64::INFINITY; num_nodes];
    let mut prev: Vec<Option<usize>> = vec![None; num_nodes];
    let mut settled = vec![false; num_nodes];
    let mut open_set: BinaryHeap<Reverse<OpenNode>> = BinaryHeap::new();

    dist[start] = 0.0;
    open_set.push(Reverse(OpenNode {
        cost: FloatOrd(0.0),
        node: start,
    }));

    let mut nodes_visited = 0usize;
    let mut reached = false;

    while let Some(Reverse(current)) = open_set.pop() {
        let node = current.node;
        if settled[node] || current.cost.0 > dist[node] {
            continue;
        }
        settled[node] = true;
        nodes_visited += 1;

        if node == end {
            reached = true;
            break;
        }

        for edge in graph.neighbors(node) {
            if settled[edge.to] {
                continue;
            }
            let step = edge_cost(node, edge)?;
            if !step.is_finite() || step < 0.0 {
                return Err(RouteError::computation(format!(
                    "edge {node}->{} has invalid cost {step}",
                    edge.to
                )));
            }
            let candidate = dist[node] + step;
            if candidate < dist[edge.to] {
                dist[edge.to] = candidate;
                prev[edge.to] = Some(node);
                open_set.push(Reverse(OpenNode {
                    cost: FloatOrd(candidate),
                    node: edge.to,
                }));
            }
        }
    }

    if !reached {
        return Err(RouteError::Unreachable { start, end });
    }

    let mut path = vec![end];
    let mut current = end;
    while let Some(node) = prev[current] {
        path.push(node);
        current = node;
    }
    path.reverse();

    Ok(SearchOutcome {
        total_cost: dist[end],
        path,
        nodes_visited,
    })
}
