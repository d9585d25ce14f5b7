//! Assembled output: the shared scenery, the scenes and the scenario.

use crate::entity::EntityKind;
use crate::speed_limit::SpeedLimit;
use geo::MultiPolygon;
use serde::Serialize;
use std::collections::BTreeMap;
use trafficgraph_graph::{KnowledgeGraph, NodeId, Partition, IDENTICAL_TO};

/// Static infrastructure converted once per snippet.
#[derive(Debug)]
pub struct Scenery {
    pub partition: Partition,
    /// Outlines of every drivable lane, registered by the lane converter.
    pub drivable_area: MultiPolygon<f64>,
    /// Road user id of the snippet's ego vehicle.
    pub ego: Option<u32>,
}

impl Scenery {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Scenery {
    fn default() -> Self {
        Self {
            partition: Partition::default(),
            drivable_area: MultiPolygon::new(Vec::new()),
            ego: None,
        }
    }
}

/// One timestamped snapshot.
#[derive(Debug)]
pub struct Scene {
    pub index: usize,
    /// Frame index in the snippet's native rate.
    pub frame: u32,
    /// Seconds, on the recording's clock.
    pub timestamp: f64,
    pub speed_limit: SpeedLimit,
    pub partition: Partition,
}

impl Scene {
    pub fn new(index: usize, frame: u32, timestamp: f64, speed_limit: SpeedLimit) -> Self {
        Self {
            index,
            frame,
            timestamp,
            speed_limit,
            partition: Partition::new(),
        }
    }
}

/// The full output for one snippet.
#[derive(Debug)]
pub struct Scenario {
    pub snippet_id: Option<u32>,
    pub graph: KnowledgeGraph,
    pub scenery: Scenery,
    pub scenes: Vec<Scene>,
    pub stats: AssemblyStats,
}

/// Bookkeeping collected while assembling a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Converter invocations per entity kind
    pub conversions: BTreeMap<EntityKind, usize>,
    pub identity_links: usize,
    pub relations_resolved: usize,
    pub relations_dropped: usize,
}

impl AssemblyStats {
    pub fn conversions_of(&self, kind: EntityKind) -> usize {
        self.conversions.get(&kind).copied().unwrap_or(0)
    }
}

impl Scenario {
    /// Borrowed view of scene `index` together with the shared scenery.
    pub fn scene(&self, index: usize) -> Option<SceneView<'_>> {
        self.scenes.get(index).map(|scene| SceneView {
            scene,
            scenery: &self.scenery,
            graph: &self.graph,
        })
    }

    pub fn scene_views(&self) -> impl Iterator<Item = SceneView<'_>> {
        self.scenes.iter().map(|scene| SceneView {
            scene,
            scenery: &self.scenery,
            graph: &self.graph,
        })
    }

    /// Live scenery nodes of `class`.
    pub fn scenery_search(&self, class: &str) -> Vec<NodeId> {
        self.scenery.partition.search(&self.graph, class)
    }

    pub fn summary(&self) -> ScenarioSummary {
        let scene_nodes: Vec<usize> = self
            .scenes
            .iter()
            .map(|s| s.partition.live(&self.graph).len() as usize)
            .collect();
        ScenarioSummary {
            snippet_id: self.snippet_id,
            scenes: self.scenes.len(),
            start: self.scenes.first().map(|s| s.timestamp),
            end: self.scenes.last().map(|s| s.timestamp),
            speed_limit: self
                .scenes
                .first()
                .map_or(SpeedLimit::Unknown, |s| s.speed_limit),
            scenery_nodes: self.scenery.partition.live(&self.graph).len() as usize,
            scene_nodes,
            relations: self.graph.relations.len(),
            identity_links: self.graph.equivalence_count(IDENTICAL_TO),
            dropped_relations: self.stats.relations_dropped,
        }
    }
}

/// A scene seen together with the scenery it shares.
#[derive(Debug, Clone, Copy)]
pub struct SceneView<'a> {
    pub scene: &'a Scene,
    pub scenery: &'a Scenery,
    pub graph: &'a KnowledgeGraph,
}

impl SceneView<'_> {
    /// Live nodes created for this scene (scenery excluded).
    pub fn nodes(&self) -> Vec<NodeId> {
        self.scene.partition.live_nodes(self.graph)
    }

    /// Live nodes of `class` in this scene or the scenery.
    pub fn search(&self, class: &str) -> Vec<NodeId> {
        let mut found = self.scene.partition.search(self.graph, class);
        found.extend(self.scenery.partition.search(self.graph, class));
        found
    }

    /// Whether `node` is visible from this scene.
    pub fn contains(&self, node: NodeId) -> bool {
        self.graph.contains(node)
            && (self.scene.partition.contains(node) || self.scenery.partition.contains(node))
    }
}

/// Counts reported per converted scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSummary {
    pub snippet_id: Option<u32>,
    pub scenes: usize,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub speed_limit: SpeedLimit,
    pub scenery_nodes: usize,
    pub scene_nodes: Vec<usize>,
    pub relations: usize,
    pub identity_links: usize,
    pub dropped_relations: usize,
}
