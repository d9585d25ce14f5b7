//! Best-effort speed limit derived from a recording's reference point.

use serde::Serialize;
use std::fmt;
use trafficgraph_recording::MetaData;

/// Speed limit attached to every scene of a snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedLimit {
    /// km/h
    Known(u32),
    Unknown,
}

impl SpeedLimit {
    pub fn kmh(self) -> Option<u32> {
        match self {
            SpeedLimit::Known(limit) => Some(limit),
            SpeedLimit::Unknown => None,
        }
    }
}

impl fmt::Display for SpeedLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedLimit::Known(limit) => write!(f, "{limit} km/h"),
            SpeedLimit::Unknown => f.write_str("unknown"),
        }
    }
}

struct KnownLocation {
    lat: f64,
    lon: f64,
    limit: u32,
}

/// Reference points of the recording sites in Aachen.
const KNOWN_LOCATIONS: [KnownLocation; 4] = [
    KnownLocation {
        lat: 50.78563844942432,
        lon: 6.128973907195158,
        limit: 50,
    },
    KnownLocation {
        lat: 50.779082542457765,
        lon: 6.164784245039574,
        limit: 50,
    },
    KnownLocation {
        lat: 50.768629564172194,
        lon: 6.101500261218432,
        limit: 30,
    },
    KnownLocation {
        lat: 50.78232943792871,
        lon: 6.070376552691796,
        limit: 50,
    },
];

fn close(a: f64, b: f64) -> bool {
    approx::relative_eq!(a, b, epsilon = 0.0, max_relative = 1e-9)
}

/// Look the reference point up in the table of known sites.
pub fn speed_limit_for(meta: &MetaData) -> SpeedLimit {
    KNOWN_LOCATIONS
        .iter()
        .find(|loc| close(meta.reference_point_lat, loc.lat) && close(meta.reference_point_lon, loc.lon))
        .map_or(SpeedLimit::Unknown, |loc| SpeedLimit::Known(loc.limit))
}
