//! Structural objects beside the road and objects on it.

use super::geometry::attach_polygon;
use super::{wrong_kind, EntityConverter};
use crate::context::ConversionContext;
use crate::entity::{Converted, EntityKind, EntityRef, SourceEntity};
use anyhow::Result;
use trafficgraph_graph::Ontology;
use trafficgraph_recording::{RoadObjectType, StructuralObjectType};

fn structural_class(object_type: StructuralObjectType) -> Option<(Ontology, &'static str)> {
    use StructuralObjectType::*;
    let class = match object_type {
        Vegetation => (Ontology::L2Core, "Road_Side_Vegetation"),
        Building => (Ontology::L2De, "Building"),
        BusShelter => (Ontology::L2De, "Bus_Stop"),
        Tunnel => (Ontology::L2De, "Tunnel"),
        Bridge => (Ontology::L2De, "Bridge"),
        Fence => (Ontology::L2De, "Fence"),
        Bench => (Ontology::L2De, "Bench"),
        RoadWork => (Ontology::L3De, "Construction_Site"),
        BodyOfWater => (Ontology::L2Core, "Water_Body"),
        Garage => (Ontology::L2De, "Garage"),
        Billboard => (Ontology::L2De, "Billboard"),
        AdvertisingPillar => (Ontology::L2De, "Advertising_Pillar"),
        PhoneBox => (Ontology::L2De, "Phone_Box"),
        PostBox => (Ontology::L2De, "Post_Box"),
        OverheadStructure => (Ontology::L2De, "Overhead_Traffic_Structure"),
        Other => return None,
    };
    Some(class)
}

fn road_object_class(object_type: RoadObjectType) -> Option<(Ontology, &'static str)> {
    use RoadObjectType::*;
    let class = match object_type {
        StreetLamp => (Ontology::L2De, "Street_Light"),
        TrafficIsland | CrossingAid => (Ontology::L1De, "Traffic_Island"),
        RoundaboutCenter => (Ontology::L1De, "Roundabout_Center"),
        Parking => (Ontology::L2De, "Parking_Space"),
        SpeedBump => (Ontology::L1De, "Speed_Bump"),
        PotHole => (Ontology::L1De, "Pothole"),
        Reflector => (Ontology::L1De, "Reflecting_Guidance_System"),
        Stud => (Ontology::L1De, "Raised_Pavement_Marker"),
        Bollard => (Ontology::L2De, "Bollard"),
        CrashAbsorber => (Ontology::L2De, "Impact_Attenuator"),
        Bitumen => (Ontology::L1De, "Bitumen_Repair"),
        ManholeCover => (Ontology::L1De, "Manhole_Cover"),
        Grating => (Ontology::L1De, "Grating"),
        Rut => (Ontology::L1De, "Rut"),
        Puddle => (Ontology::L5De, "Rain_Puddle"),
        Other => return None,
    };
    Some(class)
}

pub struct StructuralObjectConverter;

impl EntityConverter for StructuralObjectConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::StructuralObject
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let EntityRef::StructuralObject(object) = source.entity else {
            return Err(wrong_kind(EntityKind::StructuralObject, &source));
        };
        let ph = ctx.ontology(Ontology::Physics)?;

        let node = ctx.create_node(&ph.class("Spatial_Object"));
        ctx.set_attr(node, "identifier", source.key.identifier())?;
        if let Some((ontology, local)) = structural_class(object.object_type) {
            let class = ctx.ontology(ontology)?.class(local);
            ctx.add_class(node, &class)?;
        }
        ctx.set_attr(node, "has_height", object.height)?;
        attach_polygon(ctx, node, &object.polygon)?;

        Ok(vec![(source.key, vec![node])])
    }
}

pub struct RoadObjectConverter;

impl EntityConverter for RoadObjectConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::RoadObject
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let EntityRef::RoadObject(object) = source.entity else {
            return Err(wrong_kind(EntityKind::RoadObject, &source));
        };
        let ph = ctx.ontology(Ontology::Physics)?;
        let l1_core = ctx.ontology(Ontology::L1Core)?;

        let node = ctx.create_node(&ph.class("Spatial_Object"));
        ctx.set_attr(node, "identifier", source.key.identifier())?;
        if let Some((ontology, local)) = road_object_class(object.object_type) {
            let class = ctx.ontology(ontology)?.class(local);
            ctx.add_class(node, &class)?;
        }
        let walkable = if object.walkable {
            "Walkable_Road_Element"
        } else {
            "Non_Walkable_Road_Element"
        };
        let drivable = if object.drivable {
            "Driveable_Road_Element"
        } else {
            "Non_Driveable_Road_Element"
        };
        ctx.add_class(node, &l1_core.class(walkable))?;
        ctx.add_class(node, &l1_core.class(drivable))?;
        ctx.set_attr(node, "has_height", object.height)?;
        attach_polygon(ctx, node, &object.polygon)?;

        Ok(vec![(source.key, vec![node])])
    }
}
