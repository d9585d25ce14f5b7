//! Identity Linker: cross-scene identity of re-materialized entities.
//!
//! Every scene builds fresh nodes for the entities alive in it. The linker
//! keeps, per [`EntityKey`], the history of node lists produced for it
//! (its identity chain per epoch) and connects position `i` of a new list to
//! position `i` of the previous one with an `identical_to` equivalence.
//!
//! The history is a side table owned by the linker; source entities are
//! never mutated.

use crate::entity::EntityKey;
use std::collections::HashMap;
use trafficgraph_graph::{KnowledgeGraph, NodeId, IDENTICAL_TO};

/// When a node list was produced: during scenery conversion or in scene `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Epoch {
    Scenery,
    Scene(usize),
}

#[derive(Debug, Default)]
pub struct IdentityLinker {
    /// Ascending by epoch; the last entry is the current chain.
    chains: HashMap<EntityKey, Vec<(Epoch, Vec<NodeId>)>>,
}

impl IdentityLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently recorded chain of `key`.
    pub fn current(&self, key: &EntityKey) -> Option<&[NodeId]> {
        self.chains
            .get(key)
            .and_then(|history| history.last())
            .map(|(_, nodes)| nodes.as_slice())
    }

    /// The chain recorded for `key` in exactly `epoch`.
    pub fn chain_at(&self, key: &EntityKey, epoch: Epoch) -> Option<&[NodeId]> {
        self.chains.get(key)?.iter().find_map(|(e, nodes)| {
            (*e == epoch).then_some(nodes.as_slice())
        })
    }

    /// Link `nodes` to the previous chain of `key` and make them current.
    ///
    /// Returns the number of `identical_to` links created. A previous node
    /// that no longer exists is treated as "no previous identity". An epoch
    /// older than the current one is ignored so chains only move forward.
    pub fn link(
        &mut self,
        graph: &mut KnowledgeGraph,
        key: EntityKey,
        nodes: &[NodeId],
        epoch: Epoch,
    ) -> usize {
        let history = self.chains.entry(key).or_default();
        match history.last() {
            Some((last, _)) if *last > epoch => {
                tracing::warn!(
                    entity = %key,
                    epoch = ?epoch,
                    current = ?last,
                    "ignoring identity update older than the current chain"
                );
                return 0;
            }
            Some((last, _)) if *last == epoch => {
                history.pop();
            }
            _ => {}
        }

        let mut linked = 0;
        if let Some((_, previous)) = history.last() {
            for (new, prev) in nodes.iter().zip(previous) {
                if !graph.contains(*prev) || !graph.contains(*new) {
                    continue;
                }
                if matches!(graph.add_equivalence(*new, *prev, IDENTICAL_TO), Ok(true)) {
                    linked += 1;
                }
            }
        }
        history.push((epoch, nodes.to_vec()));
        linked
    }

    /// Number of entities with at least one recorded chain.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(graph: &mut KnowledgeGraph, n: usize) -> Vec<NodeId> {
        (0..n).map(|_| graph.add_node("test:Thing", vec![])).collect()
    }

    #[test]
    fn links_positionally_to_the_previous_chain() {
        let mut graph = KnowledgeGraph::new();
        let mut linker = IdentityLinker::new();
        let key = EntityKey::RoadUser(1);

        let first = nodes(&mut graph, 2);
        assert_eq!(linker.link(&mut graph, key, &first, Epoch::Scene(0)), 0);

        let second = nodes(&mut graph, 2);
        assert_eq!(linker.link(&mut graph, key, &second, Epoch::Scene(1)), 2);
        assert_eq!(graph.equivalents(second[0], IDENTICAL_TO), vec![first[0]]);
        assert_eq!(graph.equivalents(second[1], IDENTICAL_TO), vec![first[1]]);
        assert_eq!(linker.current(&key), Some(second.as_slice()));
        assert_eq!(linker.chain_at(&key, Epoch::Scene(0)), Some(first.as_slice()));
    }

    #[test]
    fn shorter_lists_only_link_shared_positions() {
        let mut graph = KnowledgeGraph::new();
        let mut linker = IdentityLinker::new();
        let key = EntityKey::RoadUser(4);

        let first = nodes(&mut graph, 2);
        linker.link(&mut graph, key, &first, Epoch::Scene(0));
        let parked = nodes(&mut graph, 1);
        assert_eq!(linker.link(&mut graph, key, &parked, Epoch::Scene(1)), 1);
    }

    #[test]
    fn removed_previous_nodes_are_skipped() {
        let mut graph = KnowledgeGraph::new();
        let mut linker = IdentityLinker::new();
        let key = EntityKey::Ego(0);

        let first = nodes(&mut graph, 2);
        linker.link(&mut graph, key, &first, Epoch::Scene(0));
        graph.remove_node(first[0]);

        let second = nodes(&mut graph, 2);
        assert_eq!(linker.link(&mut graph, key, &second, Epoch::Scene(1)), 1);
        assert!(graph.equivalents(second[0], IDENTICAL_TO).is_empty());
    }

    #[test]
    fn stale_updates_do_not_move_the_chain_backwards() {
        let mut graph = KnowledgeGraph::new();
        let mut linker = IdentityLinker::new();
        let key = EntityKey::MiscObject(2);

        let later = nodes(&mut graph, 1);
        linker.link(&mut graph, key, &later, Epoch::Scene(3));
        let earlier = nodes(&mut graph, 1);
        assert_eq!(linker.link(&mut graph, key, &earlier, Epoch::Scene(1)), 0);
        assert_eq!(linker.current(&key), Some(later.as_slice()));
    }
}
