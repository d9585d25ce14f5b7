//! Node membership of one scene (or of the shared scenery).

use crate::{KnowledgeGraph, NodeId};
use roaring::RoaringBitmap;

/// The set of nodes belonging to one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    members: RoaringBitmap,
}

impl Partition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: NodeId) -> bool {
        self.members.insert(node.raw())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(node.raw())
    }

    /// Members ever inserted, including nodes removed from the graph since.
    pub fn len(&self) -> usize {
        self.members.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members still present in `graph`.
    pub fn live(&self, graph: &KnowledgeGraph) -> RoaringBitmap {
        &self.members & graph.nodes.live()
    }

    pub fn live_nodes(&self, graph: &KnowledgeGraph) -> Vec<NodeId> {
        self.live(graph).iter().map(NodeId::new).collect()
    }

    /// Live members of `class`.
    pub fn search(&self, graph: &KnowledgeGraph, class: &str) -> Vec<NodeId> {
        (graph.find_by_class(class) & &self.members)
            .iter()
            .map(NodeId::new)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_is_scoped_to_members() {
        let mut graph = KnowledgeGraph::new();
        let mut scene_a = Partition::new();
        let mut scene_b = Partition::new();

        let a = graph.add_node("l1_core:Road", vec![]);
        scene_a.insert(a);
        let b = graph.add_node("l1_core:Road", vec![]);
        scene_b.insert(b);

        assert_eq!(scene_a.search(&graph, "l1_core:Road"), vec![a]);
        assert_eq!(scene_b.search(&graph, "l1_core:Road"), vec![b]);
        assert!(scene_a.search(&graph, "l1_core:Lane").is_empty());
    }

    #[test]
    fn removed_nodes_leave_the_live_view() {
        let mut graph = KnowledgeGraph::new();
        let mut scene = Partition::new();
        let a = graph.add_node("A", vec![]);
        let b = graph.add_node("A", vec![]);
        scene.insert(a);
        scene.insert(b);

        graph.remove_node(a);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.live_nodes(&graph), vec![b]);
        assert_eq!(scene.search(&graph, "A"), vec![b]);
    }
}
