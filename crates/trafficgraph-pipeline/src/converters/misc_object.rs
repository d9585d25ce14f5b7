use super::geometry::{add_bounding_box, add_physical_properties, attach_geometry, point_wkt};
use super::{wrong_kind, EntityConverter};
use crate::context::ConversionContext;
use crate::entity::{Converted, EntityKind, EntityRef, SourceEntity};
use anyhow::{Context, Result};
use trafficgraph_graph::Ontology;
use trafficgraph_recording::{Lifetime, MiscObjectSubType, MiscObjectType};

/// Animals, playing equipment and anything else moving that is not a road
/// user. Plain `misc` objects stay untyped beyond `Spatial_Object`.
pub struct MiscObjectConverter;

impl EntityConverter for MiscObjectConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::MiscObject
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let EntityRef::MiscObject(misc) = source.entity else {
            return Err(wrong_kind(EntityKind::MiscObject, &source));
        };
        let frame = ctx.frame().context("misc objects are converted per scene")?;
        let s = misc
            .sample_index(frame)
            .with_context(|| format!("{} is not alive at frame {frame}", source.key))?;

        let ph = ctx.ontology(Ontology::Physics)?;
        let l4_core = ctx.ontology(Ontology::L4Core)?;
        let l4_de = ctx.ontology(Ontology::L4De)?;

        let node = ctx.create_node(&ph.class("Spatial_Object"));
        ctx.set_attr(node, "identifier", source.key.identifier())?;
        match misc.kind {
            MiscObjectType::Animal => {
                ctx.add_class(node, &l4_core.class("Animal"))?;
                let species = match misc.sub_type {
                    MiscObjectSubType::Dog => Some("Dog"),
                    MiscObjectSubType::Cat => Some("Cat"),
                    MiscObjectSubType::Bird => Some("Bird"),
                    MiscObjectSubType::Horse => Some("Horse"),
                    MiscObjectSubType::Wild => Some("Deer"),
                    MiscObjectSubType::Other => None,
                };
                if let Some(class) = species {
                    ctx.add_class(node, &l4_de.class(class))?;
                }
            }
            MiscObjectType::PlayingEquipment => {
                ctx.add_class(node, &l4_de.class("Playing_Equipment"))?;
            }
            MiscObjectType::Misc => {}
        }

        add_physical_properties(ctx, node, &misc.trajectory, s)?;
        add_bounding_box(ctx, node, misc.bounding_box)?;
        if let Some(position) = misc.trajectory.position(s) {
            attach_geometry(ctx, node, point_wkt(position))?;
        }

        Ok(vec![(source.key, vec![node])])
    }
}
