//! Traffic recording model
//!
//! A [`Recording`] is a fixed-rate time series of a traffic scene:
//! - dynamic entities (road users, misc objects) with `[birth, end]` lifetimes
//! - static infrastructure (roads with lanes, markings, objects, signs)
//! - environmental series (signal states, weather)
//! - metadata such as the geographic reference point
//!
//! Recordings are read from JSON. The pipeline treats them as read-only input;
//! snippet extraction (see [`snippet`]) produces independent sub-recordings.

pub mod dynamics;
pub mod environment;
mod error;
pub mod road;
pub mod snippet;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub use dynamics::{
    BoundingBox, Lifetime, Light, LightState, MiscObject, MiscObjectSubType, MiscObjectType,
    RoadUser, RoadUserSubType, RoadUserType, Trajectory, VehicleLights,
};
pub use environment::{
    Air, GustOfWind, GustType, MaintenanceStatus, Precipitation, PrecipitationType,
    RoadCondition, SignRef, SignalState, StateValue, SurfaceCondition, Weather, Wind,
};
pub use error::RecordingError;
pub use road::{
    Lane, LaneType, LateralMarking, LateralMarkingType, Polygon, Road, RoadLocation, RoadObject,
    RoadObjectType, Sign, SignType, StructuralObject, StructuralObjectType, SurfaceMaterial,
};
pub use snippet::SnippetBounds;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaData {
    pub reference_point_lat: f64,
    pub reference_point_lon: f64,
    pub recording_name: Option<String>,
    pub location: Option<String>,
}

/// A full source recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recording {
    /// Strictly increasing sample times in seconds.
    pub timestamps: Vec<f64>,
    pub road_users: BTreeMap<u32, RoadUser>,
    /// The recording vehicle, if the recording has one.
    pub ego_vehicle: Option<RoadUser>,
    pub misc_objects: BTreeMap<u32, MiscObject>,
    pub roads: BTreeMap<u32, Road>,
    pub states: BTreeMap<u32, SignalState>,
    pub weather: Option<Weather>,
    pub meta_data: MetaData,
    /// Snippet boundaries; empty when the recording is not split.
    pub snippets: Vec<SnippetBounds>,
}

impl Recording {
    /// Parse and validate a recording from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, RecordingError> {
        let recording: Recording = serde_json::from_str(text)?;
        recording.validate()?;
        Ok(recording)
    }

    /// Read, parse and validate a recording file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RecordingError> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading recording");
        let text = std::fs::read_to_string(path).map_err(|source| RecordingError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let recording = Self::from_json_str(&text)?;
        tracing::debug!(
            frames = recording.timestamps.len(),
            road_users = recording.road_users.len(),
            roads = recording.roads.len(),
            "finished loading recording"
        );
        Ok(recording)
    }

    /// Check the structural assumptions the pipeline relies on.
    pub fn validate(&self) -> Result<(), RecordingError> {
        if self.timestamps.len() < 2 {
            return Err(RecordingError::TooFewTimestamps(self.timestamps.len()));
        }
        for (index, pair) in self.timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(RecordingError::NonIncreasingTimestamps { index: index + 1 });
            }
        }
        Ok(())
    }

    /// `t[-1] - t[0]`, or 0 for an empty recording.
    pub fn duration(&self) -> f64 {
        match (self.timestamps.first(), self.timestamps.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Sampling rate recovered from the first two timestamps, in Hz.
    pub fn native_rate(&self) -> Result<f64, RecordingError> {
        match self.timestamps.as_slice() {
            [t0, t1, ..] if t1 > t0 => Ok((1.0 / (t1 - t0)).round()),
            [_, _, ..] => Err(RecordingError::NonIncreasingTimestamps { index: 1 }),
            other => Err(RecordingError::TooFewTimestamps(other.len())),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Look up a sign through a signal state's reference.
    pub fn sign(&self, sign: SignRef) -> Option<&Sign> {
        self.roads.get(&sign.road)?.signs.get(&sign.sign)
    }
}

/// Value of `series` at `index`, if recorded.
pub fn sample<T: Copy>(series: &[T], index: usize) -> Option<T> {
    series.get(index).copied()
}

/// Up to `len` elements of `series` starting at `from`.
pub(crate) fn clip<T: Clone>(series: &[T], from: usize, len: usize) -> Vec<T> {
    series.iter().skip(from).take(len).cloned().collect()
}
