//! Roads, lanes and lateral markings.

use super::geometry::{
    attach_geometry, attach_polygon, linestring_wkt, multipolygon_wkt, to_polygon,
};
use super::{wrong_kind, EntityConverter};
use crate::context::ConversionContext;
use crate::entity::{Converted, EntityKey, EntityKind, EntityRef, SourceEntity};
use crate::relations::RelationScope;
use anyhow::Result;
use std::collections::BTreeSet;
use trafficgraph_graph::Ontology;
use trafficgraph_recording::{LaneType, LateralMarkingType, RoadLocation, SurfaceMaterial};

fn material_name(material: SurfaceMaterial) -> Option<&'static str> {
    match material {
        SurfaceMaterial::Asphalt => Some("asphalt"),
        SurfaceMaterial::Concrete => Some("concrete"),
        SurfaceMaterial::Cobblestone => Some("cobblestone"),
        SurfaceMaterial::Gravel => Some("gravel"),
        SurfaceMaterial::Unknown => None,
    }
}

// ============================================================================
// Road
// ============================================================================

/// Converts a road after its lanes: relates it to the lane nodes found
/// through their identity chains.
pub struct RoadConverter;

impl EntityConverter for RoadConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::Road
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let (EntityRef::Road(road), EntityKey::Road(road_id)) = (source.entity, source.key) else {
            return Err(wrong_kind(EntityKind::Road, &source));
        };
        let l1_core = ctx.ontology(Ontology::L1Core)?;
        let l1_de = ctx.ontology(Ontology::L1De)?;

        let node = ctx.create_node(&l1_core.class("Road"));
        ctx.set_attr(node, "identifier", source.key.identifier())?;
        let location = match road.location {
            RoadLocation::Urban => Some("Urban_Road"),
            RoadLocation::NonUrban => Some("Rural_Road"),
            RoadLocation::Highway => Some("Highway_Road"),
            RoadLocation::Unknown => None,
        };
        if let Some(class) = location {
            ctx.add_class(node, &l1_de.class(class))?;
        }

        if road.lanes.is_empty() {
            tracing::warn!(road = road_id, "found a road without lanes");
        }
        let mut materials = BTreeSet::new();
        for (lane_id, lane) in &road.lanes {
            let key = EntityKey::Lane {
                road: road_id,
                lane: *lane_id,
            };
            let Some(&lane_node) = ctx.representation(&key).and_then(|chain| chain.first()) else {
                tracing::debug!(road = road_id, lane = lane_id, "lane has no node, skipping has_lane");
                continue;
            };
            ctx.relate(node, "has_lane", lane_node)?;
            ctx.relate(lane_node, "has_road", node)?;
            materials.extend(material_name(lane.material));
        }
        if !materials.is_empty() {
            let joined: Vec<&str> = materials.into_iter().collect();
            ctx.set_attr(node, "has_road_material", joined.join(","))?;
        }
        if let Some(wkt) = multipolygon_wkt(road.lanes.values().map(|lane| &lane.polygon)) {
            attach_geometry(ctx, node, wkt)?;
        }

        Ok(vec![(source.key, vec![node])])
    }
}

// ============================================================================
// Lane
// ============================================================================

pub struct LaneConverter;

impl EntityConverter for LaneConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::Lane
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let EntityRef::Lane(lane) = source.entity else {
            return Err(wrong_kind(EntityKind::Lane, &source));
        };
        let l1_core = ctx.ontology(Ontology::L1Core)?;
        let l1_de = ctx.ontology(Ontology::L1De)?;

        let node = ctx.create_node(&l1_core.class("Lane"));
        ctx.set_attr(node, "identifier", source.key.identifier())?;
        let lane_class = match lane.lane_type {
            LaneType::Driving => Some("Driving_Lane"),
            LaneType::Bicycle => Some("Bicycle_Lane"),
            LaneType::Sidewalk => Some("Sidewalk"),
            LaneType::Parking => Some("Parking_Lane"),
            LaneType::Bus => Some("Bus_Lane"),
            LaneType::Tram => Some("Tram_Lane"),
            LaneType::Shoulder => Some("Shoulder_Lane"),
            LaneType::Other => None,
        };
        if let Some(class) = lane_class {
            ctx.add_class(node, &l1_de.class(class))?;
        }
        if lane.lane_type.is_drivable() {
            ctx.add_class(node, &l1_core.class("Driveable_Lane"))?;
            if let Some(outline) = to_polygon(&lane.polygon) {
                ctx.add_drivable_area(outline);
            }
        }
        if let Some(material) = material_name(lane.material) {
            ctx.set_attr(node, "has_lane_material", material)?;
        }
        attach_polygon(ctx, node, &lane.polygon)?;

        Ok(vec![(source.key, vec![node])])
    }
}

// ============================================================================
// Lateral marking
// ============================================================================

/// Converts a marking and queues `applies_to` towards its road, which is
/// converted after all of the road's children.
pub struct LateralMarkingConverter;

impl EntityConverter for LateralMarkingConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::LateralMarking
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let (EntityRef::LateralMarking(marking), EntityKey::LateralMarking { road, .. }) =
            (source.entity, source.key)
        else {
            return Err(wrong_kind(EntityKind::LateralMarking, &source));
        };
        let l1_core = ctx.ontology(Ontology::L1Core)?;
        let l1_de = ctx.ontology(Ontology::L1De)?;

        let node = ctx.create_node(&l1_core.class("Lane_Marking"));
        ctx.set_attr(node, "identifier", source.key.identifier())?;
        let marking_class = match marking.marking_type {
            LateralMarkingType::Solid => Some("Solid_Line"),
            LateralMarkingType::Dashed => Some("Dashed_Line"),
            LateralMarkingType::DoubleSolid => Some("Double_Solid_Line"),
            LateralMarkingType::SolidDashed => Some("Solid_Dashed_Line"),
            LateralMarkingType::Other => None,
        };
        if let Some(class) = marking_class {
            ctx.add_class(node, &l1_de.class(class))?;
        }
        if let Some(wkt) = linestring_wkt(&marking.polyline) {
            attach_geometry(ctx, node, wkt)?;
        }
        ctx.defer_relation(
            source.key,
            node,
            "applies_to",
            EntityKey::Road(road),
            RelationScope::Scene,
        );

        Ok(vec![(source.key, vec![node])])
    }
}
