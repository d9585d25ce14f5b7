//! Signs and the signal states they show.

use super::geometry::{attach_geometry, point_wkt};
use super::{wrong_kind, EntityConverter};
use crate::context::ConversionContext;
use crate::entity::{Converted, EntityKey, EntityKind, EntityRef, SourceEntity};
use anyhow::{Context, Result};
use trafficgraph_graph::Ontology;
use trafficgraph_recording::{SignType, StateValue};

pub struct SignConverter;

impl EntityConverter for SignConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::Sign
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let EntityRef::Sign(sign) = source.entity else {
            return Err(wrong_kind(EntityKind::Sign, &source));
        };
        let l6_core = ctx.ontology(Ontology::L6Core)?;
        let l6_de = ctx.ontology(Ontology::L6De)?;

        let node = match sign.sign_type {
            SignType::TrafficLight => ctx.create_node(&l6_core.class("Traffic_Light")),
            other => {
                let node = ctx.create_node(&l6_core.class("Traffic_Sign"));
                let detail = match other {
                    SignType::Regulatory => Some("Regulatory_Sign"),
                    SignType::Warning => Some("Warning_Sign"),
                    SignType::Directional => Some("Direction_Sign"),
                    _ => None,
                };
                if let Some(class) = detail {
                    ctx.add_class(node, &l6_de.class(class))?;
                }
                node
            }
        };
        ctx.set_attr(node, "identifier", source.key.identifier())?;
        if let Some(position) = sign.position {
            attach_geometry(ctx, node, point_wkt(position))?;
        }

        Ok(vec![(source.key, vec![node])])
    }
}

/// `l6_de` classes of a signal aspect.
fn state_classes(value: StateValue) -> &'static [&'static str] {
    match value {
        StateValue::Green => &["Green_Light"],
        StateValue::Amber => &["Amber_Light"],
        StateValue::Red => &["Red_Light"],
        StateValue::RedAmber => &["Red_Amber_Light"],
        StateValue::FlashingAmber => &["Flashing_Light", "Amber_Light"],
        StateValue::FlashingRed => &["Flashing_Light", "Red_Light"],
        StateValue::GreenArrow => &["Green_Arrow_Light"],
        StateValue::RedCross => &["Red_Cross_Light"],
        StateValue::AmberDiagonalArrowRight => &["Amber_Diagonal_Arrow_Right"],
        StateValue::AmberDiagonalArrowLeft => &["Amber_Diagonal_Arrow_Left"],
        StateValue::Active => &["Active_Signal"],
        StateValue::Inactive => &["Inactive_Signal"],
        StateValue::BusStop => &["Bus_Stop_Light"],
        StateValue::BusStraight => &["Bus_Straight_Light"],
        StateValue::BusRight => &["Bus_Right_Light"],
        StateValue::BusLeft => &["Bus_Left_Light"],
        StateValue::BusStopExpected => &["Bus_Stop_Expected_Light"],
        StateValue::BusYield => &["Bus_Yield_Light"],
        StateValue::BusWillSwitch => &["Bus_Switch_Light"],
        StateValue::Unknown => &[],
    }
}

/// Layers the aspect shown at the scene's frame onto the sign node.
///
/// Returns an empty node list when the frame lies past the recorded values
/// or the sign has no node.
pub struct SignalStateConverter;

impl EntityConverter for SignalStateConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::SignalState
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let EntityRef::SignalState(state) = source.entity else {
            return Err(wrong_kind(EntityKind::SignalState, &source));
        };
        let frame = ctx
            .frame()
            .context("signal states are converted per scene")?;

        let Some(value) = state.value_at(frame) else {
            return Ok(vec![(source.key, Vec::new())]);
        };
        let sign_key = EntityKey::Sign(state.sign);
        let Some(&sign_node) = ctx.representation(&sign_key).and_then(|chain| chain.first()) else {
            tracing::debug!(state = %source.key, sign = %sign_key, "signal state refers to an unconverted sign");
            return Ok(vec![(source.key, Vec::new())]);
        };

        let l6_core = ctx.ontology(Ontology::L6Core)?;
        let l6_de = ctx.ontology(Ontology::L6De)?;
        let node = ctx.create_node(&l6_core.class("Traffic_Light_State"));
        for class in state_classes(value) {
            ctx.add_class(node, &l6_de.class(class))?;
        }
        ctx.relate(sign_node, "delivers_signal", node)?;

        Ok(vec![(source.key, vec![node])])
    }
}
