//! Recording fixtures shared by the pipeline integration tests.

#![allow(dead_code)]

use trafficgraph_recording::{
    Lane, LaneType, Recording, Road, RoadUser, RoadUserSubType, RoadUserType, Sign, SignRef,
    SignType, SignalState, StateValue, Trajectory, VehicleLights, Weather,
};

/// `frames` timestamps at 10 Hz starting at 0.
pub fn timestamps(frames: usize) -> Vec<f64> {
    (0..frames).map(|i| i as f64 / 10.0).collect()
}

/// A car driving along the x axis inside [`driving_lane`].
pub fn moving_car(id: u32, birth: u32, end: u32) -> RoadUser {
    let samples = (end - birth + 1) as usize;
    RoadUser {
        id,
        kind: RoadUserType::Car,
        sub_type: RoadUserSubType::Regular,
        birth,
        end,
        trajectory: Trajectory {
            pos_x: (0..samples).map(|i| 10.0 + i as f64).collect(),
            pos_y: vec![5.0; samples],
            vel_x: vec![10.0; samples],
            vel_y: vec![0.0; samples],
            ..Default::default()
        },
        bounding_box: None,
        vehicle_lights: VehicleLights::default(),
        connected_to: None,
    }
}

/// A stopped car far away from every lane.
pub fn parked_car(id: u32, birth: u32, end: u32) -> RoadUser {
    let samples = (end - birth + 1) as usize;
    RoadUser {
        trajectory: Trajectory {
            pos_x: vec![50.0; samples],
            pos_y: vec![40.0; samples],
            vel_x: vec![0.0; samples],
            vel_y: vec![0.0; samples],
            ..Default::default()
        },
        ..moving_car(id, birth, end)
    }
}

pub fn driving_lane() -> Lane {
    Lane {
        lane_type: LaneType::Driving,
        polygon: vec![[0.0, 0.0], [100.0, 0.0], [100.0, 10.0], [0.0, 10.0]],
        ..Default::default()
    }
}

/// One road with a single driving lane and a traffic light.
pub fn road() -> Road {
    Road {
        lanes: [(1, driving_lane())].into_iter().collect(),
        signs: [(
            1,
            Sign {
                sign_type: SignType::TrafficLight,
                position: Some([20.0, 12.0, 3.0]),
            },
        )]
        .into_iter()
        .collect(),
        ..Default::default()
    }
}

/// 11 frames (1 s at 10 Hz): road 1, car 7 alive throughout, a green
/// light on sign 1/1 and weather.
pub fn recording() -> Recording {
    let frames = 11;
    Recording {
        timestamps: timestamps(frames),
        road_users: [(7, moving_car(7, 0, 10))].into_iter().collect(),
        roads: [(1, road())].into_iter().collect(),
        states: [(
            1,
            SignalState {
                sign: SignRef { road: 1, sign: 1 },
                values: vec![StateValue::Green; frames],
            },
        )]
        .into_iter()
        .collect(),
        weather: Some(Weather {
            cloudiness: vec![4.0; frames],
            ..Default::default()
        }),
        ..Default::default()
    }
}
