//! Dynamic entities: road users and miscellaneous moving objects.
//!
//! Every per-frame series is indexed by the frame relative to the entity's
//! `birth`, so sample `s` of an entity alive at frame `f` is `f - birth`.

use crate::{clip, sample};
use serde::{Deserialize, Serialize};

/// Inclusive `[birth, end]` frame window of a dynamic entity.
pub trait Lifetime {
    fn birth(&self) -> u32;
    fn end(&self) -> u32;

    fn is_alive_at(&self, frame: u32) -> bool {
        self.birth() <= frame && frame <= self.end()
    }

    /// Index into the entity's own series for an absolute frame.
    fn sample_index(&self, frame: u32) -> Option<usize> {
        self.is_alive_at(frame)
            .then(|| (frame - self.birth()) as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadUserType {
    #[default]
    Regular,
    Car,
    Truck,
    Bus,
    Motorcycle,
    Bicycle,
    Pedestrian,
    Wheelchair,
    PersonalMobilityDevice,
    Trailer,
    Farming,
    Rail,
    Carriage,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadUserSubType {
    #[default]
    Regular,
    Emergency,
    Construction,
    StreetCleaning,
    BendyBus,
    TrolleyBus,
    WithoutRider,
    Child,
    Adult,
    CarTrailer,
    Caravan,
    TruckTrailer,
    TrainTrailer,
    BendyBusTrailer,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trajectory {
    pub pos_x: Vec<f64>,
    pub pos_y: Vec<f64>,
    pub pos_z: Vec<f64>,
    pub vel_x: Vec<f64>,
    pub vel_y: Vec<f64>,
    pub vel_z: Vec<f64>,
    pub acc_x: Vec<f64>,
    pub acc_y: Vec<f64>,
    pub acc_z: Vec<f64>,
    /// Heading in degrees.
    pub heading: Vec<f64>,
}

impl Trajectory {
    /// Position at sample `s`; a missing z defaults to ground level.
    pub fn position(&self, s: usize) -> Option<[f64; 3]> {
        Some([
            sample(&self.pos_x, s)?,
            sample(&self.pos_y, s)?,
            sample(&self.pos_z, s).unwrap_or(0.0),
        ])
    }

    pub fn velocity(&self, s: usize) -> Option<[f64; 3]> {
        Some([
            sample(&self.vel_x, s)?,
            sample(&self.vel_y, s)?,
            sample(&self.vel_z, s).unwrap_or(0.0),
        ])
    }

    pub fn acceleration(&self, s: usize) -> Option<[f64; 3]> {
        Some([
            sample(&self.acc_x, s)?,
            sample(&self.acc_y, s)?,
            sample(&self.acc_z, s).unwrap_or(0.0),
        ])
    }

    /// Magnitude of the velocity vector.
    pub fn speed(&self, s: usize) -> Option<f64> {
        self.velocity(s)
            .map(|[x, y, z]| (x * x + y * y + z * z).sqrt())
    }

    pub fn heading(&self, s: usize) -> Option<f64> {
        sample(&self.heading, s)
    }

    pub(crate) fn window(&self, from: usize, len: usize) -> Self {
        Self {
            pos_x: clip(&self.pos_x, from, len),
            pos_y: clip(&self.pos_y, from, len),
            pos_z: clip(&self.pos_z, from, len),
            vel_x: clip(&self.vel_x, from, len),
            vel_y: clip(&self.vel_y, from, len),
            vel_z: clip(&self.vel_z, from, len),
            acc_x: clip(&self.acc_x, from, len),
            acc_y: clip(&self.acc_y, from, len),
            acc_z: clip(&self.acc_z, from, len),
            heading: clip(&self.heading, from, len),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Light {
    IndicatorLeft,
    IndicatorRight,
    Brake,
    Head,
    Reversing,
    Blue,
}

impl Light {
    pub const ALL: [Light; 6] = [
        Light::IndicatorRight,
        Light::IndicatorLeft,
        Light::Brake,
        Light::Head,
        Light::Reversing,
        Light::Blue,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    Off,
    On,
    /// Recorded, but neither on nor off.
    Unclassified,
}

/// Per-sample light states: `-1` not recorded, `0` off, `1` on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleLights {
    pub indicator_left: Vec<i8>,
    pub indicator_right: Vec<i8>,
    pub brake_lights: Vec<i8>,
    pub headlights: Vec<i8>,
    pub reversing_lights: Vec<i8>,
    pub blue_light: Vec<i8>,
}

impl VehicleLights {
    fn series(&self, light: Light) -> &[i8] {
        match light {
            Light::IndicatorLeft => &self.indicator_left,
            Light::IndicatorRight => &self.indicator_right,
            Light::Brake => &self.brake_lights,
            Light::Head => &self.headlights,
            Light::Reversing => &self.reversing_lights,
            Light::Blue => &self.blue_light,
        }
    }

    /// State of `light` at sample `s`, `None` when not recorded.
    pub fn state(&self, light: Light, s: usize) -> Option<LightState> {
        match sample(self.series(light), s)? {
            -1 => None,
            0 => Some(LightState::Off),
            1 => Some(LightState::On),
            _ => Some(LightState::Unclassified),
        }
    }

    pub(crate) fn window(&self, from: usize, len: usize) -> Self {
        Self {
            indicator_left: clip(&self.indicator_left, from, len),
            indicator_right: clip(&self.indicator_right, from, len),
            brake_lights: clip(&self.brake_lights, from, len),
            headlights: clip(&self.headlights, from, len),
            reversing_lights: clip(&self.reversing_lights, from, len),
            blue_light: clip(&self.blue_light, from, len),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadUser {
    pub id: u32,
    #[serde(rename = "type", default)]
    pub kind: RoadUserType,
    #[serde(default)]
    pub sub_type: RoadUserSubType,
    pub birth: u32,
    pub end: u32,
    #[serde(default)]
    pub trajectory: Trajectory,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub vehicle_lights: VehicleLights,
    /// Id of the road user this one is physically attached to (e.g. a trailer).
    #[serde(default)]
    pub connected_to: Option<u32>,
}

impl Lifetime for RoadUser {
    fn birth(&self) -> u32 {
        self.birth
    }

    fn end(&self) -> u32 {
        self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiscObjectType {
    Animal,
    PlayingEquipment,
    #[default]
    #[serde(other)]
    Misc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiscObjectSubType {
    Dog,
    Cat,
    Bird,
    Horse,
    Wild,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiscObject {
    pub id: u32,
    #[serde(rename = "type", default)]
    pub kind: MiscObjectType,
    #[serde(default)]
    pub sub_type: MiscObjectSubType,
    pub birth: u32,
    pub end: u32,
    #[serde(default)]
    pub trajectory: Trajectory,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
}

impl Lifetime for MiscObject {
    fn birth(&self) -> u32 {
        self.birth
    }

    fn end(&self) -> u32 {
        self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(birth: u32, end: u32) -> RoadUser {
        RoadUser {
            id: 1,
            kind: RoadUserType::Car,
            sub_type: RoadUserSubType::Regular,
            birth,
            end,
            trajectory: Trajectory::default(),
            bounding_box: None,
            vehicle_lights: VehicleLights::default(),
            connected_to: None,
        }
    }

    #[test]
    fn lifetime_is_inclusive_on_both_bounds() {
        let u = user(3, 5);
        assert!(!u.is_alive_at(2));
        assert!(u.is_alive_at(3));
        assert!(u.is_alive_at(5));
        assert!(!u.is_alive_at(6));
        assert_eq!(u.sample_index(4), Some(1));
        assert_eq!(u.sample_index(7), None);
    }

    #[test]
    fn light_series_shorter_than_sample_is_absent() {
        let lights = VehicleLights {
            brake_lights: vec![-1, 0, 1],
            ..Default::default()
        };
        assert_eq!(lights.state(Light::Brake, 0), None);
        assert_eq!(lights.state(Light::Brake, 1), Some(LightState::Off));
        assert_eq!(lights.state(Light::Brake, 2), Some(LightState::On));
        assert_eq!(lights.state(Light::Brake, 3), None);
        assert_eq!(lights.state(Light::Head, 0), None);
    }

    #[test]
    fn speed_uses_all_velocity_components() {
        let t = Trajectory {
            vel_x: vec![3.0],
            vel_y: vec![4.0],
            ..Default::default()
        };
        assert_eq!(t.speed(0), Some(5.0));
        assert_eq!(t.speed(1), None);
    }
}
