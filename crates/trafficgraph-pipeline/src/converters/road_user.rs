//! Road users: a person (or riderless object) plus the vehicle it drives.
//!
//! A driven road user yields `[driver, vehicle]`; the vehicle is the
//! physical representation carrying kinematics, bounding box and lights. A
//! pedestrian or riderless object yields just `[node]`. A stopped vehicle
//! outside every drivable lane counts as parked: the driver node is removed
//! but its slot is kept, so the vehicle links to the same position in
//! every scene.

use super::geometry::{add_bounding_box, add_physical_properties, attach_geometry, point_wkt};
use super::{wrong_kind, EntityConverter};
use crate::context::ConversionContext;
use crate::entity::{Converted, EntityKind, EntityRef, SourceEntity};
use crate::relations::RelationScope;
use anyhow::{Context, Result};
use geo::{Contains, Point};
use trafficgraph_graph::{Class, Namespace, NodeId, Ontology};
use trafficgraph_recording::{Light, LightState, Lifetime, RoadUser, RoadUserSubType, RoadUserType};

/// Below this speed (m/s) a vehicle counts as standing.
const STANDSTILL_SPEED: f64 = 1e-9;

/// `l4_de` classes of the vehicle driven by `user`, `None` if it drives
/// nothing.
fn vehicle_classes(user: &RoadUser) -> Option<Vec<&'static str>> {
    use RoadUserSubType as Sub;
    let mut classes = match (user.kind, user.sub_type) {
        (RoadUserType::Car, _) => vec!["Passenger_Car"],
        (RoadUserType::Truck, Sub::StreetCleaning) => vec!["Truck", "Street_Cleaning_Truck"],
        (RoadUserType::Truck, _) => vec!["Truck"],
        (RoadUserType::Bus, Sub::BendyBus) => vec!["Bus", "Bendy_Bus"],
        (RoadUserType::Bus, Sub::TrolleyBus) => vec!["Bus", "Trolleybus"],
        (RoadUserType::Bus, _) => vec!["Bus"],
        (RoadUserType::Motorcycle, _) => vec!["Motorcycle"],
        (RoadUserType::Bicycle, _) => vec!["Bicycle"],
        (RoadUserType::Wheelchair, _) => vec!["Wheelchair"],
        (RoadUserType::PersonalMobilityDevice, _) => vec!["Personal_Mobility_Device"],
        (RoadUserType::Trailer, Sub::CarTrailer) => vec!["Trailer", "Passenger_Vehicle_Trailer"],
        (RoadUserType::Trailer, Sub::Caravan) => vec!["Trailer", "Caravan"],
        (RoadUserType::Trailer, Sub::TruckTrailer) => vec!["Trailer", "Truck_Trailer"],
        (RoadUserType::Trailer, Sub::TrainTrailer) => vec!["Trailer", "Train_Trailer"],
        (RoadUserType::Trailer, Sub::BendyBusTrailer) => vec!["Trailer", "Bendy_Bus_Trailer"],
        (RoadUserType::Trailer, _) => vec!["Trailer"],
        (RoadUserType::Farming, _) => vec!["Farming_Vehicle"],
        (RoadUserType::Rail, _) => vec!["Rail_Vehicle"],
        (RoadUserType::Carriage, _) => vec!["Carriage"],
        (RoadUserType::Regular | RoadUserType::Pedestrian | RoadUserType::Other, _) => {
            return None
        }
    };
    match user.sub_type {
        Sub::Emergency => classes.push("Emergency_Vehicle"),
        Sub::Construction => classes.push("Construction_Vehicle"),
        _ => {}
    }
    Some(classes)
}

fn light_class(light: Light) -> &'static str {
    match light {
        Light::IndicatorRight => "Indicator_Light_Right",
        Light::IndicatorLeft => "Indicator_Light_Left",
        Light::Brake => "Brake_Light",
        Light::Head => "Headlight",
        Light::Reversing => "Reversing_Light",
        Light::Blue => "Emergency_Light",
    }
}

fn add_classes(ctx: &mut ConversionContext<'_>, node: NodeId, ns: &Namespace, locals: &[&str]) -> Result<()> {
    for local in locals {
        ctx.add_class(node, &ns.class(local))?;
    }
    Ok(())
}

pub struct RoadUserConverter;

impl RoadUserConverter {
    /// Stopped and outside every drivable lane.
    fn is_parked(user: &RoadUser, s: usize, ctx: &ConversionContext<'_>) -> bool {
        let stopped = user
            .trajectory
            .speed(s)
            .is_some_and(|speed| speed <= STANDSTILL_SPEED);
        let Some([x, y, _]) = user.trajectory.position(s) else {
            return false;
        };
        stopped && !ctx.drivable_area().contains(&Point::new(x, y))
    }

    fn add_lights(
        ctx: &mut ConversionContext<'_>,
        owner: NodeId,
        user: &RoadUser,
        s: usize,
    ) -> Result<()> {
        let ph = ctx.ontology(Ontology::Physics)?;
        let l4_de = ctx.ontology(Ontology::L4De)?;
        for light in Light::ALL {
            let Some(state) = user.vehicle_lights.state(light, s) else {
                continue;
            };
            let lamp = ctx.create_node(&l4_de.class(light_class(light)));
            let lamp_state: Option<Class> = match state {
                LightState::On => Some(ph.class("Active_Lamp")),
                LightState::Off => Some(ph.class("Inactive_Lamp")),
                LightState::Unclassified => None,
            };
            if let Some(class) = lamp_state {
                ctx.add_class(lamp, &class)?;
            }
            ctx.relate(owner, "has_part", lamp)?;
        }
        Ok(())
    }
}

impl EntityConverter for RoadUserConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::RoadUser
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let EntityRef::RoadUser(user) = source.entity else {
            return Err(wrong_kind(EntityKind::RoadUser, &source));
        };
        let frame = ctx.frame().context("road users are converted per scene")?;
        let s = user
            .sample_index(frame)
            .with_context(|| format!("{} is not alive at frame {frame}", source.key))?;

        let pe = ctx.ontology(Ontology::Perception)?;
        let l4_core = ctx.ontology(Ontology::L4Core)?;
        let l4_de = ctx.ontology(Ontology::L4De)?;

        let vehicle = vehicle_classes(user);
        let riderless = user.sub_type == RoadUserSubType::WithoutRider;

        let person = if riderless {
            let node = ctx.create_node(&l4_core.class("Traffic_Object"));
            // The object itself is the vehicle
            if let Some(classes) = &vehicle {
                add_classes(ctx, node, &l4_de, classes)?;
            }
            node
        } else {
            let node = ctx.create_node(&l4_core.class("Human"));
            ctx.add_class(node, &pe.class("Observer"))?;
            node
        };
        match (user.kind, user.sub_type) {
            (RoadUserType::Pedestrian, sub) => {
                ctx.add_class(person, &l4_core.class("Pedestrian"))?;
                match sub {
                    RoadUserSubType::Child => ctx.add_class(person, &l4_de.class("Child"))?,
                    RoadUserSubType::Adult => ctx.add_class(person, &l4_de.class("Adult"))?,
                    RoadUserSubType::Construction => {
                        ctx.add_class(person, &l4_de.class("Road_Worker"))?
                    }
                    _ => {}
                }
            }
            (RoadUserType::Regular, _) => {
                ctx.add_class(person, &l4_core.class("Traffic_Subject"))?;
            }
            _ => {}
        }

        let position = user.trajectory.position(s);
        let mut driver_geometry = None;
        let physical = match &vehicle {
            Some(classes) if !riderless => {
                let node = ctx.create_node(&l4_core.class("Vehicle"));
                add_classes(ctx, node, &l4_de, classes)?;
                ctx.relate(person, "drives", node)?;
                if let Some(position) = position {
                    driver_geometry = Some(attach_geometry(ctx, person, point_wkt(position))?);
                }
                node
            }
            _ => person,
        };

        if let Some(target) = user.connected_to {
            ctx.defer_relation(
                source.key,
                physical,
                "connected_to",
                ctx.road_user_key(target),
                RelationScope::Scenario,
            );
        }
        add_physical_properties(ctx, physical, &user.trajectory, s)?;
        add_bounding_box(ctx, physical, user.bounding_box)?;
        if let Some(position) = position {
            attach_geometry(ctx, physical, point_wkt(position))?;
        }

        let parked = physical != person && Self::is_parked(user, s, ctx);
        if parked {
            tracing::debug!(road_user = %source.key, frame, "parked vehicle, dropping its driver");
            ctx.remove_node(person);
            if let Some(geometry) = driver_geometry {
                ctx.remove_node(geometry);
            }
        }

        Self::add_lights(ctx, physical, user, s)?;

        let identifier = source.key.identifier();
        if physical == person {
            ctx.set_attr(person, "identifier", &identifier)?;
            return Ok(vec![(source.key, vec![person])]);
        }
        if parked {
            ctx.set_attr(physical, "identifier", &identifier)?;
        } else {
            ctx.set_attr(person, "identifier", &identifier)?;
            ctx.set_attr(physical, "identifier", format!("repr{identifier}"))?;
        }
        // The removed driver keeps its slot so the vehicle stays at position 1.
        Ok(vec![(source.key, vec![person, physical])])
    }
}
