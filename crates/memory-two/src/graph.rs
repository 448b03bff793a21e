//! Small directed graphs over integer node ids
//!
//! Both graphs keep a plain edge list, so parallel edges and self-loops
//! survive exactly as they were added. Node ids are `0..node_count`; naming a
//! node outside that range is a programming error and panics.

use std::collections::VecDeque;

/// Unweighted directed multigraph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectedGraph {
    node_count: usize,
    edges: Vec<(usize, usize)>,
}

impl DirectedGraph {
    pub fn new(node_count: usize) -> Self {
        Self { node_count, edges: Vec::new() }
    }

    pub fn add_edge(&mut self, from: usize, to: usize) {
        assert!(
            from < self.node_count && to < self.node_count,
            "edge {}->{} outside graph of {} nodes",
            from,
            to,
            self.node_count
        );
        self.edges.push((from, to));
    }

    fn check_node(&self, node: usize) {
        assert!(
            node < self.node_count,
            "node {} outside graph of {} nodes",
            node,
            self.node_count
        );
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.edges.contains(&(from, to))
    }

    /// Targets of the edges leaving `node`, duplicates included.
    pub fn successors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.check_node(node);
        self.edges
            .iter()
            .filter(move |(from, _)| *from == node)
            .map(|(_, to)| *to)
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.successors(node).count()
    }

    fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.node_count];
        for &(from, to) in &self.edges {
            adj[from].push(to);
        }
        adj
    }

    /// Whether a path (possibly empty) leads from `from` to `to`.
    pub fn is_reachable(&self, from: usize, to: usize) -> bool {
        self.check_node(from);
        self.check_node(to);
        if from == to {
            return true;
        }
        let adj = self.adjacency();
        let mut seen = vec![false; self.node_count];
        let mut queue = VecDeque::from([from]);
        seen[from] = true;
        while let Some(node) = queue.pop_front() {
            for &next in &adj[node] {
                if next == to {
                    return true;
                }
                if !seen[next] {
                    seen[next] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }

    /// Strongly connected components (Tarjan), in reverse topological order.
    /// Each component's nodes are sorted.
    pub fn strongly_connected_components(&self) -> Vec<Vec<usize>> {
        const UNVISITED: usize = usize::MAX;

        let adj = self.adjacency();
        let n = self.node_count;
        let mut index = vec![UNVISITED; n];
        let mut low = vec![0; n];
        let mut on_stack = vec![false; n];
        let mut stack = Vec::new();
        let mut components = Vec::new();
        let mut next_index = 0;

        for root in 0..n {
            if index[root] != UNVISITED {
                continue;
            }
            // (node, position of the next successor to look at)
            let mut call_stack = vec![(root, 0usize)];
            index[root] = next_index;
            low[root] = next_index;
            next_index += 1;
            stack.push(root);
            on_stack[root] = true;

            while let Some(frame) = call_stack.last_mut() {
                let node = frame.0;
                if let Some(&next) = adj[node].get(frame.1) {
                    frame.1 += 1;
                    if index[next] == UNVISITED {
                        index[next] = next_index;
                        low[next] = next_index;
                        next_index += 1;
                        stack.push(next);
                        on_stack[next] = true;
                        call_stack.push((next, 0));
                    } else if on_stack[next] {
                        low[node] = low[node].min(index[next]);
                    }
                    continue;
                }

                call_stack.pop();
                if let Some(&(parent, _)) = call_stack.last() {
                    low[parent] = low[parent].min(low[node]);
                }
                if low[node] == index[node] {
                    let mut component = Vec::new();
                    while let Some(member) = stack.pop() {
                        on_stack[member] = false;
                        component.push(member);
                        if member == node {
                            break;
                        }
                    }
                    component.sort_unstable();
                    components.push(component);
                }
            }
        }
        components
    }

    /// Components with no edge leaving them.
    pub fn sink_components(&self) -> Vec<Vec<usize>> {
        let mut component_of = vec![0; self.node_count];
        let components = self.strongly_connected_components();
        for (c, members) in components.iter().enumerate() {
            for &node in members {
                component_of[node] = c;
            }
        }
        components
            .into_iter()
            .enumerate()
            .filter(|(c, _)| {
                self.edges
                    .iter()
                    .all(|&(from, to)| component_of[from] != *c || component_of[to] == *c)
            })
            .map(|(_, members)| members)
            .collect()
    }
}

/// Directed multigraph with integer edge weights
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightedDirectedGraph {
    node_count: usize,
    edges: Vec<(usize, usize, i64)>,
}

impl WeightedDirectedGraph {
    pub fn new(node_count: usize) -> Self {
        Self { node_count, edges: Vec::new() }
    }

    pub fn add_edge(&mut self, from: usize, to: usize, weight: i64) {
        assert!(
            from < self.node_count && to < self.node_count,
            "edge {}->{} outside graph of {} nodes",
            from,
            to,
            self.node_count
        );
        self.edges.push((from, to, weight));
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// `(from, to, weight)` triples in insertion order.
    pub fn edges(&self) -> &[(usize, usize, i64)] {
        &self.edges
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.edges.iter().filter(|(from, _, _)| *from == node).count()
    }
}
