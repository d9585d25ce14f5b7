//! Environmental series: traffic signal states and weather.
//!
//! Both are indexed by the recording frame (not by an entity birth), and any
//! series may be shorter than the recording; a missing sample means "not
//! recorded at this time".

use crate::clip;
use serde::{Deserialize, Serialize};

/// Points at one sign of one road.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SignRef {
    pub road: u32,
    pub sign: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateValue {
    Green,
    Amber,
    Red,
    RedAmber,
    FlashingAmber,
    FlashingRed,
    GreenArrow,
    RedCross,
    AmberDiagonalArrowRight,
    AmberDiagonalArrowLeft,
    Active,
    Inactive,
    BusStop,
    BusStraight,
    BusRight,
    BusLeft,
    BusStopExpected,
    BusYield,
    BusWillSwitch,
    #[serde(other)]
    Unknown,
}

/// Signal aspect shown by one sign over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalState {
    pub sign: SignRef,
    #[serde(default)]
    pub values: Vec<StateValue>,
}

impl SignalState {
    pub fn value_at(&self, frame: u32) -> Option<StateValue> {
        self.values.get(frame as usize).copied()
    }

    pub(crate) fn window(&self, from: usize, len: usize) -> Self {
        Self {
            sign: self.sign,
            values: clip(&self.values, from, len),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecipitationType {
    NoRain,
    LightRain,
    ModerateRain,
    HeavyRain,
    ExtremelyHeavyRain,
    LightSnow,
    ModerateSnow,
    HeavySnow,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Precipitation {
    #[serde(rename = "type")]
    pub kind: Vec<PrecipitationType>,
    pub amount_hourly: Vec<f64>,
    pub amount_minute: Vec<f64>,
    pub snow_depth: Vec<f64>,
    pub new_snow_depth: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: Vec<f64>,
    pub direction: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GustType {
    NoGusts,
    GustOfWind,
    Squall,
    HeavySquall,
    ViolentSquall,
    GaleForceWinds,
    SevereGaleForceWinds,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GustOfWind {
    #[serde(rename = "type")]
    pub kind: Vec<GustType>,
    pub speed: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Air {
    /// Temperature at 2 m height.
    pub temperature: Vec<f64>,
    pub temperature_5cm: Vec<f64>,
    pub humidity: Vec<f64>,
    pub pressure: Vec<f64>,
    pub visibility: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceCondition {
    Dry,
    Moist,
    Wet,
    WetWithBodyOfWater,
    Slipperiness,
    BlackIce,
    PartlySnow,
    SnowCovered,
    CompactedSnow,
    IceCoveredSnow,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Untreated,
    Dirty,
    Grit,
    Salted,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadCondition {
    pub surface_condition: Vec<SurfaceCondition>,
    pub spray: Vec<bool>,
    /// Constant over the recording.
    pub maintenance_status: MaintenanceStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weather {
    pub precipitation: Precipitation,
    pub wind: Wind,
    pub gust_of_wind: GustOfWind,
    /// Cloud cover in octas.
    pub cloudiness: Vec<f64>,
    pub air: Air,
    pub ground_temperature: Vec<f64>,
    pub road_condition: RoadCondition,
}

impl Weather {
    pub(crate) fn window(&self, from: usize, len: usize) -> Self {
        Self {
            precipitation: Precipitation {
                kind: clip(&self.precipitation.kind, from, len),
                amount_hourly: clip(&self.precipitation.amount_hourly, from, len),
                amount_minute: clip(&self.precipitation.amount_minute, from, len),
                snow_depth: clip(&self.precipitation.snow_depth, from, len),
                new_snow_depth: clip(&self.precipitation.new_snow_depth, from, len),
            },
            wind: Wind {
                speed: clip(&self.wind.speed, from, len),
                direction: clip(&self.wind.direction, from, len),
            },
            gust_of_wind: GustOfWind {
                kind: clip(&self.gust_of_wind.kind, from, len),
                speed: clip(&self.gust_of_wind.speed, from, len),
            },
            cloudiness: clip(&self.cloudiness, from, len),
            air: Air {
                temperature: clip(&self.air.temperature, from, len),
                temperature_5cm: clip(&self.air.temperature_5cm, from, len),
                humidity: clip(&self.air.humidity, from, len),
                pressure: clip(&self.air.pressure, from, len),
                visibility: clip(&self.air.visibility, from, len),
            },
            ground_temperature: clip(&self.ground_temperature, from, len),
            road_condition: RoadCondition {
                surface_condition: clip(&self.road_condition.surface_condition, from, len),
                spray: clip(&self.road_condition.spray, from, len),
                maintenance_status: self.road_condition.maintenance_status,
            },
        }
    }
}
