use std::collections::BTreeMap;

use petgraph::graph::{NodeIndex, UnGraph};

use crate::component::Ladder;

/// Ground net names recognised in records (`0`, `gnd`, `gnd!`).
pub fn is_ground(node: &str) -> bool {
    node == "0" || node.eq_ignore_ascii_case("gnd") || node.eq_ignore_ascii_case("gnd!")
}

/// Node adjacency of a ladder: one graph node per net, one edge per component.
///
/// Edge weights are indices into [`Ladder::components`]. Only built when every
/// component carries two node names.
#[derive(Debug, Clone)]
pub struct NodeGraph {
    graph: UnGraph<String, usize>,
    index: BTreeMap<String, NodeIndex>,
}

impl NodeGraph {
    pub fn build(ladder: &Ladder) -> Option<Self> {
        if !ladder.has_nodes() {
            return None;
        }

        let mut graph = UnGraph::new_undirected();
        let mut index: BTreeMap<String, NodeIndex> = BTreeMap::new();
        let mut node_for = |name: &str, graph: &mut UnGraph<String, usize>| -> NodeIndex {
            *index
                .entry(name.to_string())
                .or_insert_with(|| graph.add_node(name.to_string()))
        };

        for (i, component) in ladder.components().iter().enumerate() {
            let (a, b) = component.nodes.as_ref()?;
            let ia = node_for(a, &mut graph);
            let ib = node_for(b, &mut graph);
            graph.add_edge(ia, ib, i);
        }

        Some(Self { graph, index })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Indices of the components touching `node`, in ladder order.
    #[cfg(test)]
    fn incident(&self, node: &str) -> Vec<usize> {
        let Some(&ix) = self.index.get(node) else {
            return Vec::new();
        };
        let mut edges: Vec<usize> = self.graph.edges(ix).map(|e| *e.weight()).collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }

    /// Dense position of a net, stable for the lifetime of the graph.
    pub fn position(&self, node: &str) -> Option<usize> {
        self.index.get(node).map(|ix| ix.index())
    }
}
