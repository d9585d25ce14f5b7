//! Source entity identities and borrowed views handed to converters.

use std::fmt;
use trafficgraph_graph::NodeId;
use trafficgraph_recording::{
    Lane, LateralMarking, MiscObject, Road, RoadObject, RoadUser, Sign, SignRef, SignalState,
    StructuralObject, Weather,
};

/// Stable identity of one source entity within a snippet.
///
/// Keys survive across scenes, so they index the identity side table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKey {
    Road(u32),
    Lane { road: u32, lane: u32 },
    LateralMarking { road: u32, marking: u32 },
    StructuralObject { road: u32, object: u32 },
    RoadObject { road: u32, object: u32 },
    Sign(SignRef),
    RoadUser(u32),
    /// The recording vehicle, by its road user id.
    Ego(u32),
    MiscObject(u32),
    SignalState(u32),
    Weather,
}

impl EntityKey {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityKey::Road(_) => EntityKind::Road,
            EntityKey::Lane { .. } => EntityKind::Lane,
            EntityKey::LateralMarking { .. } => EntityKind::LateralMarking,
            EntityKey::StructuralObject { .. } => EntityKind::StructuralObject,
            EntityKey::RoadObject { .. } => EntityKind::RoadObject,
            EntityKey::Sign(_) => EntityKind::Sign,
            EntityKey::RoadUser(_) | EntityKey::Ego(_) => EntityKind::RoadUser,
            EntityKey::MiscObject(_) => EntityKind::MiscObject,
            EntityKey::SignalState(_) => EntityKind::SignalState,
            EntityKey::Weather => EntityKind::Weather,
        }
    }

    /// Value of the `identifier` attribute on the entity's primary node.
    ///
    /// Infrastructure identifiers encode the owning road and the category
    /// (`_0` lanes, `_1` markings, `_2` structural objects, `_3` road
    /// objects, `_4` signs).
    pub fn identifier(&self) -> String {
        match self {
            EntityKey::Road(id) => format!("road{id}"),
            EntityKey::Lane { road, lane } => format!("road{road}_0_{lane}"),
            EntityKey::LateralMarking { road, marking } => format!("road{road}_1_{marking}"),
            EntityKey::StructuralObject { road, object } => format!("road{road}_2_{object}"),
            EntityKey::RoadObject { road, object } => format!("road{road}_3_{object}"),
            EntityKey::Sign(sign) => format!("road{}_4_{}", sign.road, sign.sign),
            EntityKey::RoadUser(id) | EntityKey::Ego(id) | EntityKey::MiscObject(id) => {
                id.to_string()
            }
            EntityKey::SignalState(id) => format!("state{id}"),
            EntityKey::Weather => "weather".to_string(),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Road(id) => write!(f, "road {id}"),
            EntityKey::Lane { road, lane } => write!(f, "lane {road}/{lane}"),
            EntityKey::LateralMarking { road, marking } => {
                write!(f, "lateral marking {road}/{marking}")
            }
            EntityKey::StructuralObject { road, object } => {
                write!(f, "structural object {road}/{object}")
            }
            EntityKey::RoadObject { road, object } => write!(f, "road object {road}/{object}"),
            EntityKey::Sign(sign) => write!(f, "sign {}/{}", sign.road, sign.sign),
            EntityKey::RoadUser(id) => write!(f, "road user {id}"),
            EntityKey::Ego(id) => write!(f, "ego vehicle {id}"),
            EntityKey::MiscObject(id) => write!(f, "misc object {id}"),
            EntityKey::SignalState(id) => write!(f, "signal state {id}"),
            EntityKey::Weather => f.write_str("weather"),
        }
    }
}

/// Kind tag used to dispatch to a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Road,
    Lane,
    LateralMarking,
    StructuralObject,
    RoadObject,
    Sign,
    RoadUser,
    MiscObject,
    SignalState,
    Weather,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Road,
        EntityKind::Lane,
        EntityKind::LateralMarking,
        EntityKind::StructuralObject,
        EntityKind::RoadObject,
        EntityKind::Sign,
        EntityKind::RoadUser,
        EntityKind::MiscObject,
        EntityKind::SignalState,
        EntityKind::Weather,
    ];
}

/// Borrowed source data of one entity.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Road(&'a Road),
    Lane(&'a Lane),
    LateralMarking(&'a LateralMarking),
    StructuralObject(&'a StructuralObject),
    RoadObject(&'a RoadObject),
    Sign(&'a Sign),
    RoadUser(&'a RoadUser),
    MiscObject(&'a MiscObject),
    SignalState(&'a SignalState),
    Weather(&'a Weather),
}

impl EntityRef<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Road(_) => EntityKind::Road,
            EntityRef::Lane(_) => EntityKind::Lane,
            EntityRef::LateralMarking(_) => EntityKind::LateralMarking,
            EntityRef::StructuralObject(_) => EntityKind::StructuralObject,
            EntityRef::RoadObject(_) => EntityKind::RoadObject,
            EntityRef::Sign(_) => EntityKind::Sign,
            EntityRef::RoadUser(_) => EntityKind::RoadUser,
            EntityRef::MiscObject(_) => EntityKind::MiscObject,
            EntityRef::SignalState(_) => EntityKind::SignalState,
            EntityRef::Weather(_) => EntityKind::Weather,
        }
    }
}

/// One entity handed to a converter: its key plus its data.
#[derive(Debug, Clone, Copy)]
pub struct SourceEntity<'a> {
    pub key: EntityKey,
    pub entity: EntityRef<'a>,
}

impl<'a> SourceEntity<'a> {
    pub fn new(key: EntityKey, entity: EntityRef<'a>) -> Self {
        Self { key, entity }
    }

    pub fn kind(&self) -> EntityKind {
        self.entity.kind()
    }
}

/// What a converter returns per source entity: the entity and the nodes
/// created for it, in a positionally stable order.
pub type Converted = (EntityKey, Vec<NodeId>);
