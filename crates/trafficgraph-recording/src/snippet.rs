//! Snippet boundaries and extraction of bounded sub-recordings.
//!
//! An extracted snippet is a self-contained [`Recording`]: its timestamps are
//! the selected sub-range and every frame index inside it (entity lifetimes,
//! environmental series) is re-based to the snippet's first frame.

use crate::dynamics::Lifetime;
use crate::{Recording, RecordingError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive frame range of one snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnippetBounds {
    pub id: u32,
    pub start_frame: u32,
    pub end_frame: u32,
}

/// Window of an entity lifetime inside a snippet, in snippet frames.
struct Overlap {
    birth: u32,
    end: u32,
    /// First sample of the entity's own series that falls into the snippet.
    offset: usize,
    len: usize,
}

fn overlap(entity: &impl Lifetime, start: u32, end: u32) -> Option<Overlap> {
    let from = entity.birth().max(start);
    let to = entity.end().min(end);
    if from > to {
        return None;
    }
    Some(Overlap {
        birth: from - start,
        end: to - start,
        offset: (from - entity.birth()) as usize,
        len: (to - from) as usize + 1,
    })
}

impl Recording {
    /// Snippet boundaries, optionally restricted to `ids`.
    ///
    /// Fails with [`RecordingError::NoSnippetBoundaries`] when the recording
    /// does not define any; unknown ids are ignored.
    pub fn snippet_bounds(&self, ids: Option<&[u32]>) -> Result<Vec<SnippetBounds>, RecordingError> {
        if self.snippets.is_empty() {
            return Err(RecordingError::NoSnippetBoundaries);
        }
        Ok(self
            .snippets
            .iter()
            .filter(|b| ids.map_or(true, |ids| ids.contains(&b.id)))
            .copied()
            .collect())
    }

    /// `t[end] - t[start]` of a snippet, if the bounds lie inside the recording.
    pub fn snippet_duration(&self, bounds: &SnippetBounds) -> Option<f64> {
        let start = self.timestamps.get(bounds.start_frame as usize)?;
        let end = self.timestamps.get(bounds.end_frame as usize)?;
        Some(end - start)
    }

    /// Materialize one snippet as an independent recording.
    pub fn extract(&self, bounds: &SnippetBounds) -> Result<Recording, RecordingError> {
        let frames = self.timestamps.len();
        if bounds.start_frame > bounds.end_frame || bounds.end_frame as usize >= frames {
            return Err(RecordingError::SnippetOutOfRange {
                id: bounds.id,
                start: bounds.start_frame,
                end: bounds.end_frame,
                frames,
            });
        }
        let (start, end) = (bounds.start_frame, bounds.end_frame);
        let span = (end - start) as usize + 1;

        let road_users = self
            .road_users
            .iter()
            .filter_map(|(id, user)| {
                let o = overlap(user, start, end)?;
                let mut clipped = user.clone();
                clipped.birth = o.birth;
                clipped.end = o.end;
                clipped.trajectory = user.trajectory.window(o.offset, o.len);
                clipped.vehicle_lights = user.vehicle_lights.window(o.offset, o.len);
                Some((*id, clipped))
            })
            .collect();

        let ego_vehicle = self.ego_vehicle.as_ref().and_then(|ego| {
            let o = overlap(ego, start, end)?;
            let mut clipped = ego.clone();
            clipped.birth = o.birth;
            clipped.end = o.end;
            clipped.trajectory = ego.trajectory.window(o.offset, o.len);
            clipped.vehicle_lights = ego.vehicle_lights.window(o.offset, o.len);
            Some(clipped)
        });

        let misc_objects = self
            .misc_objects
            .iter()
            .filter_map(|(id, misc)| {
                let o = overlap(misc, start, end)?;
                let mut clipped = misc.clone();
                clipped.birth = o.birth;
                clipped.end = o.end;
                clipped.trajectory = misc.trajectory.window(o.offset, o.len);
                Some((*id, clipped))
            })
            .collect();

        let states: BTreeMap<_, _> = self
            .states
            .iter()
            .map(|(id, state)| (*id, state.window(start as usize, span)))
            .collect();

        Ok(Recording {
            timestamps: self.timestamps[start as usize..=end as usize].to_vec(),
            road_users,
            ego_vehicle,
            misc_objects,
            roads: self.roads.clone(),
            states,
            weather: self
                .weather
                .as_ref()
                .map(|w| w.window(start as usize, span)),
            meta_data: self.meta_data.clone(),
            snippets: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RoadUser, RoadUserSubType, RoadUserType, Trajectory, VehicleLights};

    fn recording() -> Recording {
        let user = RoadUser {
            id: 7,
            kind: RoadUserType::Car,
            sub_type: RoadUserSubType::Regular,
            birth: 2,
            end: 6,
            trajectory: Trajectory {
                pos_x: vec![2.0, 3.0, 4.0, 5.0, 6.0],
                pos_y: vec![0.0; 5],
                ..Default::default()
            },
            bounding_box: None,
            vehicle_lights: VehicleLights::default(),
            connected_to: None,
        };
        Recording {
            timestamps: (0..10).map(|i| i as f64 * 0.1).collect(),
            road_users: [(7, user)].into_iter().collect(),
            snippets: vec![
                SnippetBounds {
                    id: 0,
                    start_frame: 0,
                    end_frame: 3,
                },
                SnippetBounds {
                    id: 1,
                    start_frame: 4,
                    end_frame: 9,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn extraction_rebases_lifetimes_and_series() {
        let rec = recording();
        let snippet = rec.extract(&rec.snippets[1]).unwrap();

        assert_eq!(snippet.timestamps.len(), 6);
        let user = &snippet.road_users[&7];
        assert_eq!((user.birth, user.end), (0, 2));
        assert_eq!(user.trajectory.pos_x, vec![4.0, 5.0, 6.0]);
        assert!(snippet.snippets.is_empty());
    }

    #[test]
    fn entities_outside_the_snippet_are_dropped() {
        let mut rec = recording();
        rec.road_users.get_mut(&7).unwrap().end = 3;
        let snippet = rec.extract(&rec.snippets[1]).unwrap();
        assert!(snippet.road_users.is_empty());
    }

    #[test]
    fn bounds_are_filtered_by_id() {
        let rec = recording();
        let only_one = rec.snippet_bounds(Some(&[1, 42])).unwrap();
        assert_eq!(only_one.len(), 1);
        assert_eq!(only_one[0].id, 1);

        let unsplit = Recording {
            timestamps: vec![0.0, 0.1],
            ..Default::default()
        };
        assert!(matches!(
            unsplit.snippet_bounds(None),
            Err(RecordingError::NoSnippetBoundaries)
        ));
    }

    #[test]
    fn out_of_range_bounds_are_rejected() {
        let rec = recording();
        let bad = SnippetBounds {
            id: 9,
            start_frame: 5,
            end_frame: 20,
        };
        assert!(rec.extract(&bad).is_err());
    }
}
