//! Relation Resolver: deferred relation requests and their resolution passes.
//!
//! Converters cannot always relate a node to another entity's node at
//! creation time, because the target may be converted later in the scene or
//! in another category. They queue a [`DeferredRelation`] instead, naming
//! the target by [`EntityKey`]. Requests are bound through the
//! [`IdentityLinker`]:
//!
//! - the target's chain recorded in the same epoch as the request, else
//! - the target's scenery chain.
//!
//! Binding never looks at a later epoch, so a request queued in scene 2 is
//! never attached to the scene 5 representation of its target.

use crate::entity::EntityKey;
use crate::identity::{Epoch, IdentityLinker};
use trafficgraph_graph::{KnowledgeGraph, NodeId};

/// When a request becomes eligible for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationScope {
    /// At the end of the epoch that queued it.
    Scene,
    /// Only in the final snippet-wide flush.
    Scenario,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredRelation {
    /// Entity whose conversion queued the request
    pub owner: EntityKey,
    pub source: NodeId,
    pub relation: String,
    pub target: EntityKey,
    pub scope: RelationScope,
    pub epoch: Epoch,
}

/// Outcome of the final flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub resolved: usize,
    pub dropped: usize,
}

#[derive(Debug, Default)]
pub struct RelationResolver {
    pending: Vec<DeferredRelation>,
    resolved: usize,
}

impl RelationResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer(&mut self, request: DeferredRelation) {
        self.pending.push(request);
    }

    pub fn pending(&self) -> &[DeferredRelation] {
        &self.pending
    }

    /// Requests resolved so far.
    pub fn resolved(&self) -> usize {
        self.resolved
    }

    /// Intra-scene pass: resolve the scene-scoped requests queued in `epoch`.
    ///
    /// Requests whose target has no chain yet stay queued for the final
    /// flush. Returns the number of requests resolved.
    pub fn resolve_epoch(
        &mut self,
        epoch: Epoch,
        graph: &mut KnowledgeGraph,
        identity: &IdentityLinker,
    ) -> usize {
        let (eligible, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|r| r.scope == RelationScope::Scene && r.epoch == epoch);
        self.pending = rest;

        let mut resolved = 0;
        for request in eligible {
            if Self::materialize(&request, graph, identity) {
                resolved += 1;
            } else {
                self.pending.push(request);
            }
        }
        self.resolved += resolved;
        resolved
    }

    /// Final pass: resolve every queued request or drop it.
    pub fn flush(&mut self, graph: &mut KnowledgeGraph, identity: &IdentityLinker) -> FlushReport {
        let mut report = FlushReport::default();
        for request in std::mem::take(&mut self.pending) {
            if Self::materialize(&request, graph, identity) {
                report.resolved += 1;
            } else {
                tracing::debug!(
                    owner = %request.owner,
                    relation = %request.relation,
                    target = %request.target,
                    "dropping relation to an entity that was never converted"
                );
                report.dropped += 1;
            }
        }
        self.resolved += report.resolved;
        report
    }

    fn bind<'a>(request: &DeferredRelation, identity: &'a IdentityLinker) -> Option<&'a [NodeId]> {
        let non_empty = |chain: &&[NodeId]| !chain.is_empty();
        identity
            .chain_at(&request.target, request.epoch)
            .filter(non_empty)
            .or_else(|| identity.chain_at(&request.target, Epoch::Scenery).filter(non_empty))
    }

    /// Add the request's edges; `false` if it could not be bound.
    fn materialize(
        request: &DeferredRelation,
        graph: &mut KnowledgeGraph,
        identity: &IdentityLinker,
    ) -> bool {
        if !graph.contains(request.source) {
            return false;
        }
        let Some(targets) = Self::bind(request, identity) else {
            return false;
        };
        let mut bound = false;
        for target in targets {
            if graph.contains(*target)
                && graph
                    .add_relation_once(&request.relation, request.source, *target)
                    .is_ok()
            {
                bound = true;
            }
        }
        bound
    }
}
