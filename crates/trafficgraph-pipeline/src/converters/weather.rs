//! Weather: one `Environment` node per scene made of phenomenon layers.
//!
//! Every series is sampled at the scene's frame; a series shorter than the
//! frame simply contributes nothing. Moist surfaces and the maintenance
//! status are written onto the road nodes of the scenery.

use super::{wrong_kind, EntityConverter};
use crate::context::ConversionContext;
use crate::entity::{Converted, EntityKind, EntityRef, SourceEntity};
use anyhow::{Context, Result};
use trafficgraph_graph::{Namespace, NodeId, Ontology};
use trafficgraph_recording::{
    sample, GustType, MaintenanceStatus, PrecipitationType, SurfaceCondition, Weather,
};

pub struct WeatherConverter;

/// Shared state while building one environment node.
struct Layers<'c, 'a> {
    ctx: &'c mut ConversionContext<'a>,
    environment: NodeId,
    l5_core: Namespace,
    l5_de: Namespace,
}

impl Layers<'_, '_> {
    fn part(&mut self, ns: Ontology, local: &str) -> Result<NodeId> {
        let ns = if ns == Ontology::L5Core {
            self.l5_core
        } else {
            self.l5_de
        };
        let node = self.ctx.create_node(&ns.class(local));
        self.ctx.relate(self.environment, "consists_of", node)?;
        Ok(node)
    }

    fn tag_environment(&mut self, local: &str) -> Result<()> {
        let class = self.l5_de.class(local);
        self.ctx.add_class(self.environment, &class)
    }

    fn precipitation(&mut self, weather: &Weather, f: usize) -> Result<()> {
        let p = &weather.precipitation;
        match sample(&p.kind, f) {
            None => {}
            Some(PrecipitationType::NoRain) => self.tag_environment("No_Precipitation_Environment")?,
            Some(kind) => {
                let node = self.part(Ontology::L5Core, "Precipitation")?;
                let class = match kind {
                    PrecipitationType::LightRain => Some("Light_Rain"),
                    PrecipitationType::ModerateRain => Some("Moderate_Rain"),
                    PrecipitationType::HeavyRain => Some("Heavy_Rain"),
                    PrecipitationType::ExtremelyHeavyRain => Some("Extremely_Heavy_Rain"),
                    PrecipitationType::LightSnow => Some("Light_Snow"),
                    PrecipitationType::ModerateSnow => Some("Moderate_Snow"),
                    PrecipitationType::HeavySnow => Some("Heavy_Snow"),
                    PrecipitationType::NoRain | PrecipitationType::Other => None,
                };
                if let Some(class) = class {
                    let class = self.l5_de.class(class);
                    self.ctx.add_class(node, &class)?;
                }
                if let Some(hourly) = sample(&p.amount_hourly, f) {
                    self.ctx
                        .set_attr(node, "has_precipitation_intensity_hourly", hourly)?;
                }
                if let Some(minutely) = sample(&p.amount_minute, f) {
                    self.ctx
                        .set_attr(node, "has_precipitation_intensity_minutely", minutely)?;
                }
            }
        }

        match sample(&p.snow_depth, f) {
            Some(depth) if depth > 0.0 => {
                let cover = self.part(Ontology::L5De, "Snow_Cover")?;
                self.ctx.set_attr(cover, "has_height", depth)?;
                if let Some(new_snow) = sample(&p.new_snow_depth, f) {
                    self.ctx.set_attr(cover, "has_new_snow_height", new_snow)?;
                }
            }
            Some(_) => self.tag_environment("No_Snow_Cover_Environment")?,
            None => {}
        }
        Ok(())
    }

    fn wind(&mut self, weather: &Weather, f: usize) -> Result<()> {
        let (wind, gust) = (&weather.wind, &weather.gust_of_wind);
        let recorded = [wind.speed.len(), wind.direction.len(), gust.speed.len(), gust.kind.len()];
        if recorded.iter().all(|len| *len <= f) {
            return Ok(());
        }
        let node = self.part(Ontology::L5Core, "Wind")?;
        let mut speeds = Vec::new();
        speeds.extend(sample(&wind.speed, f));
        if let Some(direction) = sample(&wind.direction, f) {
            self.ctx.set_attr(node, "has_wind_direction", direction)?;
        }
        match sample(&gust.kind, f) {
            None => {}
            Some(GustType::NoGusts) => {
                let class = self.l5_de.class("No_Gust_Wind");
                self.ctx.add_class(node, &class)?;
            }
            Some(kind) => {
                let gust_node = self.part(Ontology::L5De, "Gust")?;
                self.ctx.relate(node, "has_environment_phenomenon", gust_node)?;
                let class = match kind {
                    GustType::GustOfWind => Some("Gust_Of_Wind"),
                    GustType::Squall => Some("Squall"),
                    GustType::HeavySquall => Some("Heavy_Squall"),
                    GustType::ViolentSquall => Some("Violent_Squall"),
                    GustType::GaleForceWinds => Some("Gale_Force_Wind"),
                    GustType::SevereGaleForceWinds => Some("Severe_Gale_Force_Wind"),
                    GustType::NoGusts | GustType::Other => None,
                };
                if let Some(class) = class {
                    let class = self.l5_de.class(class);
                    self.ctx.add_class(gust_node, &class)?;
                }
                speeds.extend(sample(&gust.speed, f));
            }
        }
        if !speeds.is_empty() {
            let joined: Vec<String> = speeds.iter().map(f64::to_string).collect();
            self.ctx.set_attr(node, "has_wind_speed", joined.join(","))?;
        }
        Ok(())
    }

    fn sky_and_air(&mut self, weather: &Weather, f: usize) -> Result<()> {
        if let Some(cloudiness) = sample(&weather.cloudiness, f) {
            let sky = self.part(Ontology::L5Core, "Sky")?;
            self.ctx.set_attr(sky, "has_cloudiness", cloudiness)?;
        }

        let air = &weather.air;
        let readings = [
            ("has_temperature_2m_height", sample(&air.temperature, f)),
            ("has_temperature_5cm_height", sample(&air.temperature_5cm, f)),
            ("has_relative_humidity", sample(&air.humidity, f)),
            ("has_atmospheric_pressure", sample(&air.pressure, f)),
            ("has_meteorological_visibility", sample(&air.visibility, f)),
        ];
        if readings.iter().any(|(_, value)| value.is_some()) {
            let node = self.part(Ontology::L5Core, "Air")?;
            for (attr, value) in readings {
                if let Some(value) = value {
                    self.ctx.set_attr(node, attr, value)?;
                }
            }
        }
        Ok(())
    }

    fn ground(&mut self, weather: &Weather, f: usize) -> Result<()> {
        let temperature = sample(&weather.ground_temperature, f);
        let spray = sample(&weather.road_condition.spray, f);
        if temperature.is_none() && spray.is_none() {
            return Ok(());
        }
        let ground = self.part(Ontology::L5Core, "Ground")?;
        if let Some(temperature) = temperature {
            self.ctx.set_attr(ground, "has_temperature", temperature)?;
        }
        match spray {
            Some(true) => {
                let spray = self.ctx.create_node(&self.l5_de.class("Spray"));
                self.ctx.relate(ground, "has_environment_phenomenon", spray)?;
            }
            Some(false) => {
                let class = self.l5_de.class("No_Spray_Ground");
                self.ctx.add_class(ground, &class)?;
            }
            None => {}
        }
        Ok(())
    }

    fn surface(&mut self, weather: &Weather, f: usize) -> Result<()> {
        let Some(condition) = sample(&weather.road_condition.surface_condition, f) else {
            return Ok(());
        };
        match condition {
            SurfaceCondition::Moist => {
                let ph = self.ctx.ontology(Ontology::Physics)?;
                let road = self.ctx.ontology(Ontology::L1Core)?.class("Road");
                let moist = ph.class("Moist_Physical_Object");
                for node in self.ctx.search(&road) {
                    self.ctx.add_class(node, &moist)?;
                }
            }
            SurfaceCondition::Wet => {
                self.part(Ontology::L5De, "Water_Layer")?;
            }
            SurfaceCondition::WetWithBodyOfWater => {
                let layer = self.part(Ontology::L5De, "Water_Layer")?;
                let class = self.l5_de.class("Water_Layer_With_Body_Of_Water");
                self.ctx.add_class(layer, &class)?;
            }
            SurfaceCondition::Slipperiness => {
                self.part(Ontology::L5De, "Ice")?;
            }
            SurfaceCondition::BlackIce => {
                self.part(Ontology::L5De, "Black_Ice")?;
            }
            SurfaceCondition::PartlySnow => {
                self.part(Ontology::L5De, "Partial_Snow_Cover")?;
            }
            SurfaceCondition::SnowCovered => {
                self.part(Ontology::L5De, "Closed_Snow_Cover")?;
            }
            SurfaceCondition::CompactedSnow => {
                self.part(Ontology::L5De, "Compacted_Snow_Cover")?;
            }
            SurfaceCondition::IceCoveredSnow => {
                let snow = self.part(Ontology::L5De, "Snow_Cover")?;
                let ice = self.part(Ontology::L5De, "Ice")?;
                self.ctx.relate(snow, "sfIntersects", ice)?;
                self.ctx.relate(ice, "sfIntersects", snow)?;
            }
            SurfaceCondition::Dry | SurfaceCondition::Other => {}
        }
        Ok(())
    }

    fn maintenance(&mut self, status: MaintenanceStatus) -> Result<()> {
        let local = match status {
            MaintenanceStatus::Untreated => "Road_Without_Contamination",
            MaintenanceStatus::Dirty => "Road_With_Dirt",
            MaintenanceStatus::Grit => "Road_With_Grit",
            MaintenanceStatus::Salted => "Road_With_Salt",
            MaintenanceStatus::Unknown => return Ok(()),
        };
        let class = self.ctx.ontology(Ontology::L3De)?.class(local);
        let road = self.ctx.ontology(Ontology::L1Core)?.class("Road");
        for node in self.ctx.search(&road) {
            self.ctx.add_class(node, &class)?;
        }
        Ok(())
    }
}

impl EntityConverter for WeatherConverter {
    fn kind(&self) -> EntityKind {
        EntityKind::Weather
    }

    fn convert(&self, source: SourceEntity<'_>, ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        let EntityRef::Weather(weather) = source.entity else {
            return Err(wrong_kind(EntityKind::Weather, &source));
        };
        let f = ctx.frame().context("weather is converted per scene")? as usize;
        let l5_core = ctx.ontology(Ontology::L5Core)?;
        let l5_de = ctx.ontology(Ontology::L5De)?;

        let environment = ctx.create_node(&l5_core.class("Environment"));
        let mut layers = Layers {
            ctx,
            environment,
            l5_core,
            l5_de,
        };
        layers.precipitation(weather, f)?;
        layers.wind(weather, f)?;
        layers.sky_and_air(weather, f)?;
        layers.ground(weather, f)?;
        layers.surface(weather, f)?;
        layers.maintenance(weather.road_condition.maintenance_status)?;

        Ok(vec![(source.key, vec![environment])])
    }
}
