//! Lifecycle Filter: dynamic entities alive at a frame.

use crate::entity::EntityKey;
use std::collections::BTreeMap;
use trafficgraph_recording::{Lifetime, MiscObject, Recording, RoadUser};

/// Dynamic entities alive at one frame, in map order with the ego last.
#[derive(Debug, Default)]
pub struct ActiveEntities<'a> {
    pub road_users: Vec<(EntityKey, &'a RoadUser)>,
    pub misc_objects: Vec<(EntityKey, &'a MiscObject)>,
}

impl ActiveEntities<'_> {
    pub fn len(&self) -> usize {
        self.road_users.len() + self.misc_objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Entities of `entities` whose `[birth, end]` contains `frame`.
pub fn alive_at<T: Lifetime>(
    entities: &BTreeMap<u32, T>,
    frame: u32,
) -> impl Iterator<Item = (u32, &T)> + '_ {
    entities
        .iter()
        .filter(move |(_, e)| e.is_alive_at(frame))
        .map(|(id, e)| (*id, e))
}

pub fn active_at(recording: &Recording, frame: u32) -> ActiveEntities<'_> {
    let mut road_users: Vec<_> = alive_at(&recording.road_users, frame)
        .map(|(id, user)| (EntityKey::RoadUser(id), user))
        .collect();
    if let Some(ego) = recording.ego_vehicle.as_ref().filter(|e| e.is_alive_at(frame)) {
        road_users.push((EntityKey::Ego(ego.id), ego));
    }
    let misc_objects = alive_at(&recording.misc_objects, frame)
        .map(|(id, misc)| (EntityKey::MiscObject(id), misc))
        .collect();
    ActiveEntities {
        road_users,
        misc_objects,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trafficgraph_recording::{RoadUserSubType, RoadUserType, Trajectory, VehicleLights};

    fn user(id: u32, birth: u32, end: u32) -> RoadUser {
        RoadUser {
            id,
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
    fn bounds_are_inclusive() {
        let recording = Recording {
            timestamps: vec![0.0, 0.1],
            road_users: [(1, user(1, 2, 4)), (2, user(2, 5, 9))].into_iter().collect(),
            ..Default::default()
        };
        let ids = |frame| -> Vec<EntityKey> {
            active_at(&recording, frame)
                .road_users
                .into_iter()
                .map(|(key, _)| key)
                .collect()
        };
        assert!(ids(1).is_empty());
        assert_eq!(ids(2), vec![EntityKey::RoadUser(1)]);
        assert_eq!(ids(4), vec![EntityKey::RoadUser(1)]);
        assert_eq!(ids(5), vec![EntityKey::RoadUser(2)]);
    }

    #[test]
    fn ego_is_appended_while_alive() {
        let recording = Recording {
            timestamps: vec![0.0, 0.1],
            road_users: [(1, user(1, 0, 9))].into_iter().collect(),
            ego_vehicle: Some(user(0, 0, 3)),
            ..Default::default()
        };
        let active = active_at(&recording, 2);
        assert_eq!(
            active.road_users.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            vec![EntityKey::RoadUser(1), EntityKey::Ego(0)]
        );
        assert_eq!(active_at(&recording, 4).road_users.len(), 1);
    }
}
