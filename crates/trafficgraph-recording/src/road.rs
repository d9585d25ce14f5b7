//! Static infrastructure: roads and everything attached to them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A closed outline in the recording's local metric frame.
pub type Polygon = Vec<[f64; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadLocation {
    Urban,
    NonUrban,
    Highway,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Road {
    pub location: RoadLocation,
    pub lanes: BTreeMap<u32, Lane>,
    pub lateral_markings: BTreeMap<u32, LateralMarking>,
    pub structural_objects: BTreeMap<u32, StructuralObject>,
    pub road_objects: BTreeMap<u32, RoadObject>,
    pub signs: BTreeMap<u32, Sign>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneType {
    #[default]
    Driving,
    Bicycle,
    Sidewalk,
    Parking,
    Bus,
    Tram,
    Shoulder,
    #[serde(other)]
    Other,
}

impl LaneType {
    pub fn is_drivable(self) -> bool {
        matches!(self, LaneType::Driving | LaneType::Bus | LaneType::Parking)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceMaterial {
    Asphalt,
    Concrete,
    Cobblestone,
    Gravel,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lane {
    #[serde(rename = "type")]
    pub lane_type: LaneType,
    pub polygon: Polygon,
    pub material: SurfaceMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateralMarkingType {
    #[default]
    Solid,
    Dashed,
    DoubleSolid,
    SolidDashed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LateralMarking {
    #[serde(rename = "type")]
    pub marking_type: LateralMarkingType,
    pub polyline: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralObjectType {
    Vegetation,
    Building,
    BusShelter,
    Tunnel,
    Bridge,
    Fence,
    Bench,
    RoadWork,
    BodyOfWater,
    Garage,
    Billboard,
    AdvertisingPillar,
    PhoneBox,
    PostBox,
    OverheadStructure,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructuralObject {
    #[serde(rename = "type")]
    pub object_type: StructuralObjectType,
    pub height: f64,
    pub polygon: Polygon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadObjectType {
    StreetLamp,
    TrafficIsland,
    RoundaboutCenter,
    Parking,
    CrossingAid,
    SpeedBump,
    PotHole,
    Reflector,
    Stud,
    Bollard,
    CrashAbsorber,
    Bitumen,
    ManholeCover,
    Grating,
    Rut,
    Puddle,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadObject {
    #[serde(rename = "type")]
    pub object_type: RoadObjectType,
    pub height: f64,
    pub walkable: bool,
    pub drivable: bool,
    pub polygon: Polygon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignType {
    TrafficLight,
    Regulatory,
    Warning,
    Directional,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sign {
    #[serde(rename = "type")]
    pub sign_type: SignType,
    pub position: Option<[f64; 3]>,
}
