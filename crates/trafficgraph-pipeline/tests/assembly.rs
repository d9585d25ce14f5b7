//! End-to-end assembly of scenarios from in-memory recordings.

mod common;

use anyhow::Result;
use trafficgraph_graph::IDENTICAL_TO;
use trafficgraph_pipeline::{
    convert, ConversionContext, ConverterRegistry, Converted, EntityConverter, EntityKind,
    PipelineConfig, PipelineError, ScenarioAssembler, SourceEntity,
};
use trafficgraph_recording::{LateralMarking, MiscObject, RoadUserSubType, RoadUserType, SnippetBounds};

const VEHICLE: &str = "l4_core:Vehicle";
const HUMAN: &str = "l4_core:Human";

fn assemble(recording: &trafficgraph_recording::Recording) -> trafficgraph_pipeline::Scenario {
    let registry = ConverterRegistry::with_defaults();
    let assembler = ScenarioAssembler::new(&PipelineConfig::default(), &registry);
    assembler.assemble(recording, None).unwrap()
}

#[test]
fn every_scene_sees_infrastructure_dynamics_and_environment() {
    let scenario = assemble(&common::recording());
    assert_eq!(scenario.scenes.len(), 10);

    for view in scenario.scene_views() {
        assert_eq!(view.search("l1_core:Road").len(), 1);
        assert_eq!(view.search("l1_core:Lane").len(), 1);
        assert_eq!(view.search("l6_core:Traffic_Light").len(), 1);
        assert_eq!(view.search(VEHICLE).len(), 1);
        assert_eq!(view.search(HUMAN).len(), 1);
        assert_eq!(view.search("l5_core:Environment").len(), 1);
    }
    // Scenes own only their dynamic nodes
    let first = scenario.scene(0).unwrap();
    assert!(first.scene.partition.search(&scenario.graph, "l1_core:Road").is_empty());
}

#[test]
fn a_single_scene_holds_road_road_user_and_weather() {
    let mut recording = common::recording();
    recording.timestamps.truncate(2);
    recording.road_users.insert(7, common::moving_car(7, 0, 1));
    recording
        .roads
        .get_mut(&1)
        .unwrap()
        .lateral_markings
        .insert(1, LateralMarking::default());

    let scenario = assemble(&recording);
    assert_eq!(scenario.scenes.len(), 1);
    let view = scenario.scene(0).unwrap();
    let road = view.search("l1_core:Road")[0];
    assert_eq!(view.search(VEHICLE).len(), 1);
    assert_eq!(view.search("l5_core:Environment").len(), 1);

    // The marking's road relation is resolved once the road exists
    let marking = scenario.scenery_search("l1_core:Lane_Marking")[0];
    assert_eq!(scenario.graph.targets(marking, "applies_to"), vec![road]);
    assert_eq!(scenario.stats.relations_dropped, 0);
}

#[test]
fn scene_timestamps_follow_the_schedule() {
    let scenario = assemble(&common::recording());
    let frames: Vec<u32> = scenario.scenes.iter().map(|s| s.frame).collect();
    assert_eq!(frames, (0..10).collect::<Vec<_>>());
    for scene in &scenario.scenes {
        approx::assert_relative_eq!(scene.timestamp, f64::from(scene.frame) / 10.0);
    }
}

#[test]
fn infrastructure_is_converted_once_per_snippet() {
    let scenario = assemble(&common::recording());
    let stats = &scenario.stats;
    assert_eq!(stats.conversions_of(EntityKind::Road), 1);
    assert_eq!(stats.conversions_of(EntityKind::Lane), 1);
    assert_eq!(stats.conversions_of(EntityKind::Sign), 1);
    assert_eq!(stats.conversions_of(EntityKind::RoadUser), 10);
    assert_eq!(stats.conversions_of(EntityKind::Weather), 10);
    assert_eq!(scenario.scenery_search("l1_core:Road").len(), 1);
    assert_eq!(scenario.graph.find_by_class("l1_core:Road").len(), 1);
}

#[test]
fn road_and_lane_are_related_both_ways() {
    let scenario = assemble(&common::recording());
    let road = scenario.scenery_search("l1_core:Road")[0];
    let lane = scenario.scenery_search("l1_core:Lane")[0];
    assert!(scenario.graph.has_edge(road, "has_lane", lane));
    assert!(scenario.graph.has_edge(lane, "has_road", road));
    assert_eq!(scenario.graph.attr(road, "identifier"), Some("road1"));
    assert_eq!(scenario.graph.attr(lane, "identifier"), Some("road1_0_1"));
}

#[test]
fn consecutive_scenes_are_linked_by_identity() {
    let scenario = assemble(&common::recording());
    let vehicles: Vec<_> = scenario
        .scene_views()
        .map(|view| view.scene.partition.search(&scenario.graph, VEHICLE)[0])
        .collect();

    assert_eq!(scenario.graph.equivalents(vehicles[0], IDENTICAL_TO), vec![vehicles[1]]);
    let middle = scenario.graph.equivalents(vehicles[4], IDENTICAL_TO);
    assert_eq!(middle.len(), 2);
    assert!(middle.contains(&vehicles[3]) && middle.contains(&vehicles[5]));
    assert_eq!(scenario.graph.attr(vehicles[4], "identifier"), Some("repr7"));

    let weather_links = scenario.graph.equivalents(
        scenario.scene(0).unwrap().search("l5_core:Environment")[0],
        IDENTICAL_TO,
    );
    assert_eq!(weather_links.len(), 1);
    assert!(scenario.stats.identity_links >= 3 * 9);
}

#[test]
fn only_living_entities_appear_in_a_scene() {
    let mut recording = common::recording();
    recording.road_users.insert(8, common::moving_car(8, 3, 5));
    recording.misc_objects.insert(
        2,
        MiscObject {
            id: 2,
            kind: Default::default(),
            sub_type: Default::default(),
            birth: 6,
            end: 6,
            trajectory: Default::default(),
            bounding_box: None,
        },
    );

    let scenario = assemble(&recording);
    for view in scenario.scene_views() {
        let frame = view.scene.frame;
        let expected = if (3..=5).contains(&frame) { 2 } else { 1 };
        assert_eq!(view.search(VEHICLE).len(), expected, "frame {frame}");
        let misc = view.scene.partition.search(&scenario.graph, "physics:Spatial_Object");
        assert_eq!(misc.len(), usize::from(frame == 6), "frame {frame}");
    }
}

#[test]
fn signal_states_are_converted_twice_per_scene() {
    let scenario = assemble(&common::recording());
    assert_eq!(scenario.stats.conversions_of(EntityKind::SignalState), 20);

    let light = scenario.scenery_search("l6_core:Traffic_Light")[0];
    for view in scenario.scene_views() {
        let states = view.search("l6_core:Traffic_Light_State");
        assert_eq!(states.len(), 2);
        for state in states {
            assert!(scenario.graph.has_edge(light, "delivers_signal", state));
        }
    }
}

#[test]
fn connections_bind_to_the_same_scene() {
    let mut recording = common::recording();
    let mut trailer = common::moving_car(8, 0, 10);
    trailer.kind = RoadUserType::Trailer;
    trailer.sub_type = RoadUserSubType::WithoutRider;
    trailer.connected_to = Some(7);
    recording.road_users.insert(8, trailer);

    let scenario = assemble(&recording);
    let vehicles: Vec<_> = scenario
        .scene_views()
        .map(|view| view.scene.partition.search(&scenario.graph, VEHICLE)[0])
        .collect();
    for (index, view) in scenario.scene_views().enumerate() {
        let trailers = view.scene.partition.search(&scenario.graph, "l4_core:Traffic_Object");
        assert_eq!(trailers.len(), 1);
        let targets = scenario.graph.targets(trailers[0], "connected_to");
        assert!(targets.contains(&vehicles[index]));
        for (other, vehicle) in vehicles.iter().enumerate() {
            if other != index {
                assert!(!targets.contains(vehicle));
            }
        }
    }
    assert_eq!(scenario.stats.relations_dropped, 0);
    assert!(scenario.stats.relations_resolved >= 10);
}

#[test]
fn connections_to_unknown_road_users_are_dropped() {
    let mut recording = common::recording();
    let mut trailer = common::moving_car(8, 0, 10);
    trailer.connected_to = Some(99);
    recording.road_users.insert(8, trailer);

    let scenario = assemble(&recording);
    assert_eq!(scenario.stats.relations_dropped, 10);
    assert_eq!(scenario.graph.relation_count("connected_to"), 0);
}

#[test]
fn parked_vehicles_lose_their_driver() {
    let mut recording = common::recording();
    recording.road_users.insert(8, common::parked_car(8, 0, 10));

    let scenario = assemble(&recording);
    let view = scenario.scene(0).unwrap();
    assert_eq!(view.search(VEHICLE).len(), 2);
    // Only the moving car keeps its driver
    assert_eq!(view.search(HUMAN).len(), 1);

    let parked = view
        .search(VEHICLE)
        .into_iter()
        .find(|v| scenario.graph.attr(*v, "identifier") == Some("8"));
    assert!(parked.is_some());
}

#[test]
fn a_vehicle_that_parks_keeps_its_identity() {
    let mut recording = common::recording();
    let mut car = common::moving_car(9, 0, 10);
    for s in 1..car.trajectory.pos_x.len() {
        car.trajectory.pos_x[s] = 50.0;
        car.trajectory.pos_y[s] = 40.0;
        car.trajectory.vel_x[s] = 0.0;
    }
    recording.road_users.insert(9, car);

    let scenario = assemble(&recording);
    let vehicle_of = |index: usize, identifier: &str| {
        scenario
            .scene(index)
            .unwrap()
            .scene
            .partition
            .search(&scenario.graph, VEHICLE)
            .into_iter()
            .find(|v| scenario.graph.attr(*v, "identifier") == Some(identifier))
            .unwrap()
    };
    let moving = vehicle_of(0, "repr9");
    let parked = vehicle_of(1, "9");

    let links = scenario.graph.equivalents(parked, IDENTICAL_TO);
    assert!(links.contains(&moving));
    assert!(links.contains(&vehicle_of(2, "9")));
    assert!(links.iter().all(|node| !scenario.graph.has_class(*node, HUMAN)));

    let driver = scenario.graph.sources(moving, "drives")[0];
    assert!(scenario.graph.equivalents(driver, IDENTICAL_TO).is_empty());
    // Car 7 keeps its driver, car 9 loses it
    assert_eq!(scenario.scene(1).unwrap().search(HUMAN).len(), 1);
}

#[test]
fn connections_to_the_ego_vehicle_bind() {
    let mut recording = common::recording();
    recording.ego_vehicle = Some(common::moving_car(100, 0, 10));
    let mut trailer = common::moving_car(8, 0, 10);
    trailer.kind = RoadUserType::Trailer;
    trailer.sub_type = RoadUserSubType::WithoutRider;
    trailer.connected_to = Some(100);
    recording.road_users.insert(8, trailer);

    let scenario = assemble(&recording);
    for view in scenario.scene_views() {
        let ego = view
            .scene
            .partition
            .search(&scenario.graph, VEHICLE)
            .into_iter()
            .find(|v| scenario.graph.attr(*v, "identifier") == Some("repr100"))
            .unwrap();
        let trailers = view.scene.partition.search(&scenario.graph, "l4_core:Traffic_Object");
        assert_eq!(trailers.len(), 1);
        assert!(scenario.graph.targets(trailers[0], "connected_to").contains(&ego));
    }
    assert_eq!(scenario.graph.relation_count("connected_to"), 10);
    assert_eq!(scenario.stats.relations_dropped, 0);
}

#[test]
fn the_ego_vehicle_is_identified_by_its_id() {
    let mut recording = common::recording();
    recording.ego_vehicle = Some(common::moving_car(100, 0, 10));

    let scenario = assemble(&recording);
    let view = scenario.scene(0).unwrap();
    let identifiers: Vec<_> = view
        .search(HUMAN)
        .into_iter()
        .filter_map(|node| scenario.graph.attr(node, "identifier"))
        .collect();
    assert!(identifiers.contains(&"100"));
    assert!(!identifiers.contains(&"ego"));
    assert!(view
        .search(VEHICLE)
        .into_iter()
        .any(|v| scenario.graph.attr(v, "identifier") == Some("repr100")));
}

#[test]
fn a_missing_converter_aborts_the_snippet() {
    let registry = ConverterRegistry::empty();
    let assembler = ScenarioAssembler::new(&PipelineConfig::default(), &registry);
    let err = assembler.assemble(&common::recording(), None).unwrap_err();
    assert!(matches!(err, PipelineError::NoConverter(EntityKind::Lane)));
}

struct SilentWeather;

impl EntityConverter for SilentWeather {
    fn kind(&self) -> EntityKind {
        EntityKind::Weather
    }

    fn convert(&self, source: SourceEntity<'_>, _ctx: &mut ConversionContext<'_>) -> Result<Vec<Converted>> {
        Ok(vec![(source.key, Vec::new())])
    }
}

#[test]
fn registered_converters_replace_the_defaults() {
    let mut registry = ConverterRegistry::with_defaults();
    assert!(registry.register(Box::new(SilentWeather)).is_some());

    let assembler = ScenarioAssembler::new(&PipelineConfig::default(), &registry);
    let scenario = assembler.assemble(&common::recording(), Some(3)).unwrap();
    assert_eq!(scenario.snippet_id, Some(3));
    assert!(scenario.graph.find_by_class("l5_core:Environment").is_empty());
    assert_eq!(scenario.stats.conversions_of(EntityKind::Weather), 10);
}

#[test]
fn converts_each_selected_snippet() {
    let mut recording = common::recording();
    recording.snippets = vec![
        SnippetBounds {
            id: 0,
            start_frame: 0,
            end_frame: 4,
        },
        SnippetBounds {
            id: 1,
            start_frame: 5,
            end_frame: 10,
        },
    ];

    let scenarios = convert(&recording, &PipelineConfig::default()).unwrap();
    let ids: Vec<_> = scenarios.iter().map(|s| s.snippet_id).collect();
    assert_eq!(ids, vec![Some(0), Some(1)]);
    assert_eq!(scenarios[0].scenes.len(), 4);
    assert_eq!(scenarios[1].scenes.len(), 5);

    let config = PipelineConfig {
        snippet_ids: Some(vec![1]),
        ..Default::default()
    };
    let only = convert(&recording, &config).unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].snippet_id, Some(1));
}

#[test]
fn recordings_without_snippets_convert_whole() {
    let scenarios = convert(&common::recording(), &PipelineConfig::default()).unwrap();
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0].snippet_id, None);
    let summary = scenarios[0].summary();
    assert_eq!(summary.scenes, 10);
    assert_eq!(summary.scene_nodes.len(), 10);
}
