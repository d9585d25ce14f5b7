//! The context handed to every converter call.
//!
//! A [`ConversionContext`] is the only way a converter touches the graph. It
//! carries the vocabulary, the target partition (scenery or one scene), a
//! read-only view of identity chains and the deferred relation queue.

use crate::entity::EntityKey;
use crate::identity::{Epoch, IdentityLinker};
use crate::relations::{DeferredRelation, RelationResolver, RelationScope};
use crate::scene::Scenery;
use anyhow::Result;
use geo::{MultiPolygon, Polygon};
use std::fmt::Display;
use trafficgraph_graph::{
    Class, KnowledgeGraph, Namespace, NodeId, Ontology, Partition, Vocabulary, VocabularyError,
};

/// Where newly created nodes land.
enum Target<'a> {
    Scenery(&'a mut Scenery),
    Scene {
        partition: &'a mut Partition,
        scenery: &'a Scenery,
        frame: u32,
    },
}

pub struct ConversionContext<'a> {
    graph: &'a mut KnowledgeGraph,
    target: Target<'a>,
    vocabulary: &'a Vocabulary,
    identity: &'a IdentityLinker,
    relations: &'a mut RelationResolver,
    epoch: Epoch,
}

impl<'a> ConversionContext<'a> {
    /// Context for infrastructure conversion into the scenery.
    pub fn scenery(
        graph: &'a mut KnowledgeGraph,
        scenery: &'a mut Scenery,
        vocabulary: &'a Vocabulary,
        identity: &'a IdentityLinker,
        relations: &'a mut RelationResolver,
    ) -> Self {
        Self {
            graph,
            target: Target::Scenery(scenery),
            vocabulary,
            identity,
            relations,
            epoch: Epoch::Scenery,
        }
    }

    /// Context for conversion into scene `index` at `frame`.
    #[allow(clippy::too_many_arguments)]
    pub fn scene(
        graph: &'a mut KnowledgeGraph,
        partition: &'a mut Partition,
        scenery: &'a Scenery,
        vocabulary: &'a Vocabulary,
        identity: &'a IdentityLinker,
        relations: &'a mut RelationResolver,
        index: usize,
        frame: u32,
    ) -> Self {
        Self {
            graph,
            target: Target::Scene {
                partition,
                scenery,
                frame,
            },
            vocabulary,
            identity,
            relations,
            epoch: Epoch::Scene(index),
        }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// The scene's frame, `None` while converting the scenery.
    pub fn frame(&self) -> Option<u32> {
        match &self.target {
            Target::Scenery(_) => None,
            Target::Scene { frame, .. } => Some(*frame),
        }
    }

    pub fn ontology(&self, ontology: Ontology) -> Result<Namespace, VocabularyError> {
        self.vocabulary.namespace(ontology)
    }

    // ------------------------------------------------------------------------
    // Node creation
    // ------------------------------------------------------------------------

    /// Create a node of `class` in the current partition.
    pub fn create_node(&mut self, class: &Class) -> NodeId {
        let node = self.graph.add_node(class.as_str(), Vec::new());
        self.partition_mut().insert(node);
        node
    }

    pub fn add_class(&mut self, node: NodeId, class: &Class) -> Result<()> {
        self.graph.add_class(node, class.as_str())
    }

    pub fn set_attr(&mut self, node: NodeId, key: &str, value: impl Display) -> Result<()> {
        self.graph.set_attr(node, key, &value.to_string())
    }

    /// Relate two existing nodes immediately.
    pub fn relate(&mut self, source: NodeId, relation: &str, target: NodeId) -> Result<()> {
        self.graph.add_relation_once(relation, source, target)?;
        Ok(())
    }

    pub fn remove_node(&mut self, node: NodeId) -> bool {
        self.graph.remove_node(node)
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// Live nodes of `class` visible from here: the current scene plus the
    /// scenery, or just the scenery while converting it.
    pub fn search(&self, class: &Class) -> Vec<NodeId> {
        match &self.target {
            Target::Scenery(scenery) => scenery.partition.search(&*self.graph, class.as_str()),
            Target::Scene {
                partition, scenery, ..
            } => {
                let mut found = partition.search(&*self.graph, class.as_str());
                found.extend(scenery.partition.search(&*self.graph, class.as_str()));
                found
            }
        }
    }

    /// Key of the road user with `id`, which may be the ego vehicle.
    pub fn road_user_key(&self, id: u32) -> EntityKey {
        let scenery = match &self.target {
            Target::Scenery(scenery) => &**scenery,
            Target::Scene { scenery, .. } => *scenery,
        };
        match scenery.ego {
            Some(ego) if ego == id => EntityKey::Ego(id),
            _ => EntityKey::RoadUser(id),
        }
    }

    /// Current identity chain of another entity.
    pub fn representation(&self, key: &EntityKey) -> Option<&[NodeId]> {
        self.identity.current(key)
    }

    pub fn graph(&self) -> &KnowledgeGraph {
        &*self.graph
    }

    /// Outlines of the drivable lanes registered so far.
    pub fn drivable_area(&self) -> &MultiPolygon<f64> {
        match &self.target {
            Target::Scenery(scenery) => &scenery.drivable_area,
            Target::Scene { scenery, .. } => &scenery.drivable_area,
        }
    }

    /// Register a drivable lane outline; only meaningful for the scenery.
    pub fn add_drivable_area(&mut self, polygon: Polygon<f64>) -> bool {
        match &mut self.target {
            Target::Scenery(scenery) => {
                scenery.drivable_area.0.push(polygon);
                true
            }
            Target::Scene { .. } => false,
        }
    }

    // ------------------------------------------------------------------------
    // Deferred relations
    // ------------------------------------------------------------------------

    /// Queue `source -relation-> target` until `target` has been converted.
    pub fn defer_relation(
        &mut self,
        owner: EntityKey,
        source: NodeId,
        relation: &str,
        target: EntityKey,
        scope: RelationScope,
    ) {
        self.relations.defer(DeferredRelation {
            owner,
            source,
            relation: relation.to_string(),
            target,
            scope,
            epoch: self.epoch,
        });
    }

    fn partition_mut(&mut self) -> &mut Partition {
        match &mut self.target {
            Target::Scenery(scenery) => &mut scenery.partition,
            Target::Scene { partition, .. } => &mut **partition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_search_sees_the_scenery_but_not_other_scenes() {
        let vocabulary = Vocabulary::default();
        let mut graph = KnowledgeGraph::new();
        let mut scenery = Scenery::new();
        let identity = IdentityLinker::new();
        let mut relations = RelationResolver::new();
        let road = vocabulary
            .namespace(Ontology::L1Core)
            .unwrap()
            .class("Road");

        let mut ctx =
            ConversionContext::scenery(&mut graph, &mut scenery, &vocabulary, &identity, &mut relations);
        let static_road = ctx.create_node(&road);
        assert_eq!(ctx.frame(), None);

        let mut other = Partition::new();
        let mut ctx = ConversionContext::scene(
            &mut graph, &mut other, &scenery, &vocabulary, &identity, &mut relations, 0, 0,
        );
        let scene_road = ctx.create_node(&road);
        assert_eq!(ctx.search(&road), vec![scene_road, static_road]);

        let mut next = Partition::new();
        let ctx = ConversionContext::scene(
            &mut graph, &mut next, &scenery, &vocabulary, &identity, &mut relations, 1, 1,
        );
        assert_eq!(ctx.search(&road), vec![static_road]);
        assert_eq!(ctx.frame(), Some(1));
    }

    #[test]
    fn deferred_relations_carry_the_epoch() {
        let vocabulary = Vocabulary::default();
        let mut graph = KnowledgeGraph::new();
        let scenery = Scenery::new();
        let identity = IdentityLinker::new();
        let mut relations = RelationResolver::new();
        let mut partition = Partition::new();

        let mut ctx = ConversionContext::scene(
            &mut graph, &mut partition, &scenery, &vocabulary, &identity, &mut relations, 4, 8,
        );
        let vehicle = vocabulary
            .namespace(Ontology::L4Core)
            .unwrap()
            .class("Vehicle");
        let node = ctx.create_node(&vehicle);
        ctx.defer_relation(
            EntityKey::RoadUser(1),
            node,
            "connected_to",
            EntityKey::RoadUser(2),
            RelationScope::Scenario,
        );

        assert_eq!(relations.pending().len(), 1);
        assert_eq!(relations.pending()[0].epoch, Epoch::Scene(4));
    }

    #[test]
    fn road_user_ids_resolve_to_the_ego_key() {
        let vocabulary = Vocabulary::default();
        let mut graph = KnowledgeGraph::new();
        let mut scenery = Scenery::new();
        scenery.ego = Some(100);
        let identity = IdentityLinker::new();
        let mut relations = RelationResolver::new();
        let mut partition = Partition::new();

        let ctx = ConversionContext::scene(
            &mut graph, &mut partition, &scenery, &vocabulary, &identity, &mut relations, 0, 0,
        );
        assert_eq!(ctx.road_user_key(100), EntityKey::Ego(100));
        assert_eq!(ctx.road_user_key(7), EntityKey::RoadUser(7));
    }

    #[test]
    fn extended_vocabularies_need_to_be_enabled() {
        let vocabulary = Vocabulary::new(false);
        let mut graph = KnowledgeGraph::new();
        let mut scenery = Scenery::new();
        let identity = IdentityLinker::new();
        let mut relations = RelationResolver::new();
        let ctx =
            ConversionContext::scenery(&mut graph, &mut scenery, &vocabulary, &identity, &mut relations);
        assert_eq!(
            ctx.ontology(Ontology::Criticality),
            Err(VocabularyError::NotLoaded(Ontology::Criticality))
        );
    }
}
