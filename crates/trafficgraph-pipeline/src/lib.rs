//! Recording to scene-graph pipeline
//!
//! Turns a [`Recording`](trafficgraph_recording::Recording) into one
//! [`Scenario`] per snippet. A scenario is a single
//! [`KnowledgeGraph`](trafficgraph_graph::KnowledgeGraph) partitioned into a
//! shared scenery (roads, lanes, markings, objects, signs) and a sequence of
//! timestamped scenes (road users, misc objects, signal states, weather).
//!
//! Stages:
//! 1. [`SnippetExtractor`] splits the recording (or passes it through whole)
//! 2. [`TemporalSampler`] picks the frames that become scenes
//! 3. [`lifecycle`] filters the dynamic entities alive at each frame
//! 4. [`ScenarioAssembler`] runs the [`converters`] and links identities
//!    across scenes with [`IdentityLinker`]
//! 5. [`RelationResolver`] binds relations whose target did not exist yet
//!
//! ```no_run
//! use trafficgraph_pipeline::{convert, PipelineConfig};
//! use trafficgraph_recording::Recording;
//!
//! let recording = Recording::from_json_file("recording.json")?;
//! let config = PipelineConfig {
//!     hertz: Some(5),
//!     ..Default::default()
//! };
//! for scenario in convert(&recording, &config)? {
//!     println!("{} scenes", scenario.scenes.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod assembler;
mod config;
mod context;
pub mod converters;
mod entity;
mod error;
mod identity;
pub mod lifecycle;
mod relations;
mod sampler;
mod scene;
mod snippet;
mod speed_limit;

pub use assembler::{convert, convert_with, ScenarioAssembler};
pub use config::PipelineConfig;
pub use context::ConversionContext;
pub use converters::{ConverterRegistry, EntityConverter};
pub use entity::{Converted, EntityKey, EntityKind, EntityRef, SourceEntity};
pub use error::PipelineError;
pub use identity::{Epoch, IdentityLinker};
pub use lifecycle::{active_at, alive_at, ActiveEntities};
pub use relations::{DeferredRelation, FlushReport, RelationResolver, RelationScope};
pub use sampler::{FrameSchedule, TemporalSampler};
pub use scene::{AssemblyStats, Scenario, ScenarioSummary, Scene, SceneView, Scenery};
pub use snippet::{Snippet, SnippetExtractor, SnippetPlan};
pub use speed_limit::{speed_limit_for, SpeedLimit};
