//! Scenario Assembler: drives the conversion of one snippet.
//!
//! Order of work per snippet:
//! 1. infrastructure, once, into the scenery (per road: lanes, markings,
//!    structural objects, road objects, signs, then the road itself),
//!    followed by the scenery's relation pass
//! 2. per sampled frame: road users (ego last), misc objects, signal
//!    states and weather, each linked to its previous identity, followed by
//!    the scene's relation pass
//! 3. a second signal-state sweep over every scene (not identity linked)
//! 4. the final relation flush

use crate::config::PipelineConfig;
use crate::context::ConversionContext;
use crate::converters::ConverterRegistry;
use crate::entity::{Converted, EntityKey, EntityRef, SourceEntity};
use crate::error::PipelineError;
use crate::identity::{Epoch, IdentityLinker};
use crate::lifecycle;
use crate::relations::RelationResolver;
use crate::sampler::TemporalSampler;
use crate::scene::{AssemblyStats, Scenario, Scene, Scenery};
use crate::speed_limit::speed_limit_for;
use trafficgraph_graph::{KnowledgeGraph, Vocabulary};
use trafficgraph_recording::{Recording, Road, SignRef};

/// Mutable state of one snippet under construction.
#[derive(Default)]
struct Build {
    graph: KnowledgeGraph,
    scenery: Scenery,
    scenes: Vec<Scene>,
    identity: IdentityLinker,
    relations: RelationResolver,
    stats: AssemblyStats,
}

pub struct ScenarioAssembler<'r> {
    registry: &'r ConverterRegistry,
    vocabulary: Vocabulary,
    sampler: TemporalSampler,
}

impl<'r> ScenarioAssembler<'r> {
    pub fn new(config: &PipelineConfig, registry: &'r ConverterRegistry) -> Self {
        Self {
            registry,
            vocabulary: Vocabulary::new(config.load_criticality_vocabularies),
            sampler: TemporalSampler::from_config(config),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Convert one snippet into a scenario.
    pub fn assemble(&self, snippet: &Recording, snippet_id: Option<u32>) -> Result<Scenario, PipelineError> {
        let schedule = self.sampler.schedule(&snippet.timestamps)?;
        let speed_limit = speed_limit_for(&snippet.meta_data);
        let mut build = Build::default();
        build.scenery.ego = snippet.ego_vehicle.as_ref().map(|ego| ego.id);

        tracing::debug!(roads = snippet.roads.len(), "converting infrastructure");
        for (road_id, road) in &snippet.roads {
            self.convert_road(&mut build, *road_id, road)?;
        }
        build.stats.relations_resolved +=
            build
                .relations
                .resolve_epoch(Epoch::Scenery, &mut build.graph, &build.identity);

        for (index, frame) in schedule.frames().enumerate() {
            let timestamp = schedule.timestamp(frame);
            build
                .scenes
                .push(Scene::new(index, frame, timestamp, speed_limit));
            let epoch = Epoch::Scene(index);

            let active = lifecycle::active_at(snippet, frame);
            tracing::debug!(
                scene = index,
                frame,
                timestamp,
                road_users = active.road_users.len(),
                misc_objects = active.misc_objects.len(),
                states = snippet.states.len(),
                "building scene"
            );
            for (key, user) in &active.road_users {
                let source = SourceEntity::new(*key, EntityRef::RoadUser(user));
                self.convert_linked(&mut build, epoch, source)?;
            }
            for (key, misc) in &active.misc_objects {
                let source = SourceEntity::new(*key, EntityRef::MiscObject(misc));
                self.convert_linked(&mut build, epoch, source)?;
            }
            for (id, state) in &snippet.states {
                let source = SourceEntity::new(EntityKey::SignalState(*id), EntityRef::SignalState(state));
                self.convert_linked(&mut build, epoch, source)?;
            }
            match &snippet.weather {
                Some(weather) => {
                    let source = SourceEntity::new(EntityKey::Weather, EntityRef::Weather(weather));
                    self.convert_linked(&mut build, epoch, source)?;
                }
                None => tracing::debug!(scene = index, "no weather information in recording"),
            }

            build.stats.relations_resolved +=
                build
                    .relations
                    .resolve_epoch(epoch, &mut build.graph, &build.identity);
        }

        // Signal states once more, now that every scene exists.
        for index in 0..build.scenes.len() {
            for (id, state) in &snippet.states {
                let source = SourceEntity::new(EntityKey::SignalState(*id), EntityRef::SignalState(state));
                self.convert(&mut build, Epoch::Scene(index), source)?;
            }
        }

        let report = build.relations.flush(&mut build.graph, &build.identity);
        build.stats.relations_resolved += report.resolved;
        build.stats.relations_dropped += report.dropped;
        tracing::debug!(
            scenes = build.scenes.len(),
            nodes = build.graph.node_count(),
            relations_resolved = build.stats.relations_resolved,
            relations_dropped = build.stats.relations_dropped,
            "finished assembling scenario"
        );

        Ok(Scenario {
            snippet_id,
            graph: build.graph,
            scenery: build.scenery,
            scenes: build.scenes,
            stats: build.stats,
        })
    }

    fn convert_road(&self, build: &mut Build, road_id: u32, road: &Road) -> Result<(), PipelineError> {
        for (lane, data) in &road.lanes {
            let key = EntityKey::Lane { road: road_id, lane: *lane };
            self.convert_linked(build, Epoch::Scenery, SourceEntity::new(key, EntityRef::Lane(data)))?;
        }
        for (marking, data) in &road.lateral_markings {
            let key = EntityKey::LateralMarking {
                road: road_id,
                marking: *marking,
            };
            let source = SourceEntity::new(key, EntityRef::LateralMarking(data));
            self.convert_linked(build, Epoch::Scenery, source)?;
        }
        for (object, data) in &road.structural_objects {
            let key = EntityKey::StructuralObject {
                road: road_id,
                object: *object,
            };
            let source = SourceEntity::new(key, EntityRef::StructuralObject(data));
            self.convert_linked(build, Epoch::Scenery, source)?;
        }
        for (object, data) in &road.road_objects {
            let key = EntityKey::RoadObject {
                road: road_id,
                object: *object,
            };
            let source = SourceEntity::new(key, EntityRef::RoadObject(data));
            self.convert_linked(build, Epoch::Scenery, source)?;
        }
        for (sign, data) in &road.signs {
            let key = EntityKey::Sign(SignRef {
                road: road_id,
                sign: *sign,
            });
            self.convert_linked(build, Epoch::Scenery, SourceEntity::new(key, EntityRef::Sign(data)))?;
        }
        let source = SourceEntity::new(EntityKey::Road(road_id), EntityRef::Road(road));
        self.convert_linked(build, Epoch::Scenery, source)?;
        Ok(())
    }

    /// Convert and move the identity chains of the converted entities.
    fn convert_linked(
        &self,
        build: &mut Build,
        epoch: Epoch,
        source: SourceEntity<'_>,
    ) -> Result<Vec<Converted>, PipelineError> {
        let converted = self.convert(build, epoch, source)?;
        for (key, nodes) in &converted {
            build.stats.identity_links += build.identity.link(&mut build.graph, *key, nodes, epoch);
        }
        Ok(converted)
    }

    fn convert(
        &self,
        build: &mut Build,
        epoch: Epoch,
        source: SourceEntity<'_>,
    ) -> Result<Vec<Converted>, PipelineError> {
        let kind = source.kind();
        let converter = self
            .registry
            .get(kind)
            .ok_or(PipelineError::NoConverter(kind))?;
        *build.stats.conversions.entry(kind).or_default() += 1;

        let mut ctx = match epoch {
            Epoch::Scenery => ConversionContext::scenery(
                &mut build.graph,
                &mut build.scenery,
                &self.vocabulary,
                &build.identity,
                &mut build.relations,
            ),
            Epoch::Scene(index) => {
                let scene = &mut build.scenes[index];
                ConversionContext::scene(
                    &mut build.graph,
                    &mut scene.partition,
                    &build.scenery,
                    &self.vocabulary,
                    &build.identity,
                    &mut build.relations,
                    index,
                    scene.frame,
                )
            }
        };
        converter
            .convert(source, &mut ctx)
            .map_err(|err| PipelineError::Converter {
                key: source.key,
                source: err,
            })
    }
}

/// Convert every selected snippet of `recording` with the default converters.
pub fn convert(recording: &Recording, config: &PipelineConfig) -> Result<Vec<Scenario>, PipelineError> {
    convert_with(recording, config, &ConverterRegistry::with_defaults())
}

/// Convert every selected snippet of `recording` with `registry`.
pub fn convert_with(
    recording: &Recording,
    config: &PipelineConfig,
    registry: &ConverterRegistry,
) -> Result<Vec<Scenario>, PipelineError> {
    let plan = crate::snippet::SnippetExtractor::from_config(recording, config).plan();
    let assembler = ScenarioAssembler::new(config, registry);
    let total = plan.len();

    let mut scenarios = Vec::with_capacity(total);
    for (i, snippet) in plan.snippets().enumerate() {
        let snippet = snippet?;
        tracing::debug!(snippet = i + 1, total, id = ?snippet.id, "assembling snippet");
        scenarios.push(assembler.assemble(&snippet.recording, snippet.id)?);
    }
    Ok(scenarios)
}
