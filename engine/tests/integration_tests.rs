//! End-to-end tests of the compute-work pipeline
//!
//! Each test runs [`compute_work`] against the shared warehouse layout and
//! checks the final list the cart would receive: order, housekeeping,
//! lighting payloads and sort codes.

mod common;

use common::{ids, item_pick, pick, warehouse, CART};
use picklight_engine::config::{Config, FacilityProperty, PolicyOverrides};
use picklight_engine::sequencer::SequencerKind;
use picklight_engine::work::{compute_work, CartContext};
use sdk::types::{Color, LedCmdGroup, LocationId, Task, TaskKind, EMPTY_LED_STREAM};
use std::collections::HashMap;

fn cart() -> CartContext {
    CartContext::new(CART, Color::Blue)
}

fn config_with(bay_change: &str, repeat_pos: &str) -> Config {
    let mut config = Config::default_config();
    config.defaults.bay_change = bay_change.to_string();
    config.defaults.repeat_pos = repeat_pos.to_string();
    config
}

fn shuffled_picks() -> Vec<Task> {
    vec![
        pick("w-a3", "F1.A3.B1.T1"),
        pick("w-a1b2", "F1.A1.B2.T1"),
        pick("w-a1b1-t2", "F1.A1.B1.T2"),
        pick("w-a1b1-t1", "F1.A1.B1.T1"),
        pick("w-a2", "F1.A2.B1.T1"),
    ]
}

fn lighting(task: &Task) -> Vec<LedCmdGroup> {
    serde_json::from_str(&task.led_cmd_stream).expect("lighting payload is a JSON array")
}

#[test]
fn test_default_config_follows_path_without_housekeeping() {
    let layout = warehouse();
    let plan = compute_work(&layout, &Config::default_config(), &cart(), shuffled_picks());

    assert_eq!(plan.sequencer, SequencerKind::BayDistance);
    assert_eq!(
        ids(&plan.tasks),
        vec!["w-a1b1-t1", "w-a1b1-t2", "w-a2", "w-a1b2", "w-a3"]
    );
    assert_eq!(plan.housekeeping_inserted, 0);
    assert!(plan.unplaced.is_empty());

    let codes: Vec<&str> = plan
        .tasks
        .iter()
        .filter_map(|t| t.sort_code.as_deref())
        .collect();
    assert_eq!(codes, vec!["0001", "0002", "0003", "0004", "0005"]);
}

#[test]
fn test_positions_resolved_from_layout() {
    let layout = warehouse();
    let plan = compute_work(&layout, &Config::default_config(), &cart(), shuffled_picks());

    let a3 = plan.tasks.iter().find(|t| t.id == "w-a3").unwrap();
    assert_eq!(a3.position_along_path, Some(6.0));
    let a1b2 = plan.tasks.iter().find(|t| t.id == "w-a1b2").unwrap();
    assert_eq!(a1b2.position_along_path, Some(3.0));
}

#[test]
fn test_across_aisle_bays_need_no_acknowledgment() {
    let layout = warehouse();
    let config = config_with("BayChangeExceptAcrossAisle", "None");
    let plan = compute_work(&layout, &config, &cart(), shuffled_picks());

    // A1.B1 -> A2.B1 face each other; A2.B1 -> A1.B2 changes label;
    // A1.B2 -> A3.B1 changes segment.
    assert_eq!(
        ids(&plan.tasks),
        vec![
            "w-a1b1-t1",
            "w-a1b1-t2",
            "w-a2",
            "w-a1b2-hk-bay",
            "w-a1b2",
            "w-a3-hk-bay",
            "w-a3"
        ]
    );
    assert_eq!(plan.housekeeping_inserted, 2);
    assert_eq!(plan.tasks[6].sort_code.as_deref(), Some("0007"));
}

#[test]
fn test_every_bay_change_acknowledged() {
    let layout = warehouse();
    let config = config_with("BayChange", "None");
    let plan = compute_work(&layout, &config, &cart(), shuffled_picks());

    assert_eq!(plan.housekeeping_inserted, 3);
    assert_eq!(
        ids(&plan.tasks),
        vec![
            "w-a1b1-t1",
            "w-a1b1-t2",
            "w-a2-hk-bay",
            "w-a2",
            "w-a1b2-hk-bay",
            "w-a1b2",
            "w-a3-hk-bay",
            "w-a3"
        ]
    );
}

#[test]
fn test_segment_change_only() {
    let layout = warehouse();
    let config = config_with("PathSegmentChange", "None");
    let plan = compute_work(&layout, &config, &cart(), shuffled_picks());

    assert_eq!(plan.housekeeping_inserted, 1);
    let hk = plan
        .tasks
        .iter()
        .position(|t| t.kind == TaskKind::HkBayComplete)
        .unwrap();
    assert_eq!(plan.tasks[hk + 1].id, "w-a3");
}

#[test]
fn test_housekeeping_task_shape() {
    let layout = warehouse();
    let config = config_with("BayChange", "None");
    let tasks = vec![
        pick("first", "F1.A1.B1.T1").with_container("C7"),
        pick("second", "F1.A2.B1.T1").with_container("C8"),
    ];
    let plan = compute_work(&layout, &config, &cart(), tasks);

    let hk = &plan.tasks[1];
    assert_eq!(hk.id, "second-hk-bay");
    assert_eq!(hk.kind, TaskKind::HkBayComplete);
    assert_eq!(hk.description, "Bay Change");
    assert_eq!(hk.location_id, Some(LocationId::from("F1")));
    assert_eq!(hk.container_id.as_deref(), Some("C7"));
    assert_eq!(hk.assigned_cart.as_deref(), Some(CART));
    assert_eq!(hk.plan_quantity, Some(0));
    assert_eq!(hk.position_along_path, plan.tasks[0].position_along_path);
    assert_eq!(hk.led_cmd_stream, EMPTY_LED_STREAM);
    assert_eq!(hk.sort_code.as_deref(), Some("0002"));
}

#[test]
fn test_repeat_container_and_count() {
    let layout = warehouse();
    let config = config_with("None", "ContainerAndCount");
    let tasks = vec![
        pick("a", "F1.A1.B1.T1").with_container("C1").with_quantity(2),
        pick("b", "F1.A1.B1.T1").with_container("C1").with_quantity(2),
        pick("c", "F1.A1.B1.T1").with_container("C1").with_quantity(5),
    ];
    let plan = compute_work(&layout, &config, &cart(), tasks);

    assert_eq!(ids(&plan.tasks), vec!["a", "b-hk-repeat", "b", "c"]);
    assert_eq!(plan.tasks[1].kind, TaskKind::HkRepeatPos);
    assert_eq!(plan.tasks[1].description, "Repeat Container");
}

#[test]
fn test_bay_change_wins_over_repeat_position() {
    let layout = warehouse();
    let config = config_with("BayChange", "ContainerOnly");
    let tasks = vec![
        pick("a", "F1.A1.B1.T1").with_container("C1"),
        pick("b", "F1.A2.B1.T1").with_container("C1"),
    ];
    let plan = compute_work(&layout, &config, &cart(), tasks);

    assert_eq!(ids(&plan.tasks), vec!["a", "b-hk-bay", "b"]);
    assert_eq!(plan.housekeeping_inserted, 1);
}

#[test]
fn test_item_lighting_near_and_far_anchor() {
    let layout = warehouse();
    let tasks = vec![
        item_pick("near", "F1.A1.B1.T1", Some(0.5)),
        item_pick("far", "F1.A1.B2.T1", Some(0.5)),
    ];
    let plan = compute_work(&layout, &Config::default_config(), &cart(), tasks);

    let near = lighting(&plan.tasks[0]);
    assert_eq!(near.len(), 1);
    assert_eq!(near[0].controller_address, "0x00000012");
    assert_eq!(near[0].channel, 1);
    assert_eq!(near[0].first_position, 15);
    let positions: Vec<u16> = near[0].samples.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![15, 16, 17, 18]);
    assert!(near[0].samples.iter().all(|s| s.color == Color::Blue));

    let far = lighting(&plan.tasks[1]);
    assert_eq!(far[0].first_position, 63);
    assert_eq!(far[0].samples.len(), 4);
}

#[test]
fn test_pallet_slot_lights_full_span() {
    let layout = warehouse();
    let tasks = vec![item_pick("pallet", "F1.A1.B1.T2.S1", None)];
    let plan = compute_work(&layout, &Config::default_config(), &cart(), tasks);

    let groups = lighting(&plan.tasks[0]);
    assert_eq!(groups[0].first_position, 161);
    assert_eq!(groups[0].samples.len(), 28);
}

#[test]
fn test_unlit_location_gets_empty_payload() {
    let layout = warehouse();
    let tasks = vec![
        item_pick("dark", "F1.A3.B1.T1", Some(0.5)),
        pick("plain", "F1.A3.B1.T1"),
    ];
    let plan = compute_work(&layout, &Config::default_config(), &cart(), tasks);

    for task in &plan.tasks {
        assert_eq!(task.led_cmd_stream, EMPTY_LED_STREAM);
    }
}

#[test]
fn test_put_wall_lights_each_location() {
    let layout = warehouse();
    let task = pick("put", "F1.A1.B1.T1").with_put_locations(vec![
        LocationId::from("F1.A1.B1.T1"),
        LocationId::from("F1.A2.B1.T1"),
        LocationId::from("F1.A3.B1.T1"),
    ]);
    let plan = compute_work(&layout, &Config::default_config(), &cart(), vec![task]);

    let groups = lighting(&plan.tasks[0]);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].controller_address, "0x00000012");
    assert_eq!(groups[1].controller_address, "0x00000013");
    for group in &groups {
        let positions: Vec<u16> = group.samples.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![39, 40, 41]);
    }
}

#[test]
fn test_cart_colour_used_for_samples() {
    let layout = warehouse();
    let cart = CartContext::new(CART, Color::Magenta);
    let tasks = vec![item_pick("a", "F1.A1.B1.T1", Some(1.0))];
    let plan = compute_work(&layout, &Config::default_config(), &cart, tasks);

    let groups = lighting(&plan.tasks[0]);
    assert!(groups[0].samples.iter().all(|s| s.color == Color::Magenta));
}

#[test]
fn test_tasks_outside_path_are_reported() {
    let layout = warehouse();
    let tasks = vec![
        pick("lost", "F1.A9.B1.T1"),
        Task::new("nowhere", TaskKind::Plan).assigned_to(CART),
        pick("kept", "F1.A9.B1.T1").with_preferred_sequence(1),
        pick("normal", "F1.A1.B1.T1"),
    ];
    let plan = compute_work(&layout, &Config::default_config(), &cart(), tasks);

    assert_eq!(ids(&plan.tasks), vec!["kept", "normal"]);
    let mut unplaced = ids(&plan.unplaced);
    unplaced.sort();
    assert_eq!(unplaced, vec!["lost", "nowhere"]);
    assert!(plan.unplaced.iter().all(|t| t.sort_code.is_none()));
}

#[test]
fn test_top_tier_last() {
    let layout = warehouse();
    let mut config = Config::default_config();
    config.defaults.sequencer = "BayDistanceTopLast".to_string();
    let tasks = vec![
        pick("top-b2", "F1.A1.B2.T1"),
        pick("low-b2", "F1.A1.B2.T2"),
        pick("top-b1", "F1.A1.B1.T1"),
        pick("low-b1", "F1.A1.B1.T2"),
    ];
    let plan = compute_work(&layout, &config, &cart(), tasks);

    assert_eq!(plan.sequencer, SequencerKind::BayDistanceTopLast);
    assert_eq!(ids(&plan.tasks), vec!["low-b1", "low-b2", "top-b1", "top-b2"]);
}

#[test]
fn test_facility_override_selects_sequencer() {
    let layout = warehouse();
    let mut config = Config::default_config();
    config.facilities.insert(
        "F1".to_string(),
        PolicyOverrides {
            sequencer: Some("work_sequence".to_string()),
            ..Default::default()
        },
    );
    let tasks = vec![
        pick("second", "F1.A1.B1.T1").with_preferred_sequence(2),
        pick("first", "F1.A3.B1.T1").with_preferred_sequence(1),
        pick("outside", "F1.A9.B1.T1"),
    ];
    let plan = compute_work(&layout, &config, &cart(), tasks);

    assert_eq!(plan.sequencer, SequencerKind::WorkSequence);
    assert_eq!(ids(&plan.tasks), vec!["first", "second", "outside"]);
    assert!(plan.unplaced.is_empty());
}

#[test]
fn test_properties_from_map_source() {
    let layout = warehouse();
    let mut properties = HashMap::new();
    properties.insert(
        ("F1".to_string(), FacilityProperty::WorkSequencer),
        "Zigzag".to_string(),
    );
    properties.insert(
        ("F1".to_string(), FacilityProperty::BayChange),
        "bay change".to_string(),
    );

    let plan = compute_work(&layout, &properties, &cart(), shuffled_picks());

    // Unknown sequencer falls back to the default; missing RPEATPOS is None
    assert_eq!(plan.sequencer, SequencerKind::BayDistance);
    assert_eq!(plan.housekeeping_inserted, 3);
}

#[test]
fn test_empty_task_list() {
    let layout = warehouse();
    let config = config_with("BayChange", "ContainerOnly");
    let plan = compute_work(&layout, &config, &cart(), Vec::new());

    assert!(plan.tasks.is_empty());
    assert!(plan.unplaced.is_empty());
    assert_eq!(plan.housekeeping_inserted, 0);
}

#[test]
fn test_plan_serializes_camel_case() {
    let layout = warehouse();
    let plan = compute_work(&layout, &Config::default_config(), &cart(), shuffled_picks());

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["sequencer"], "BayDistance");
    assert_eq!(json["housekeepingInserted"], 0);
    assert_eq!(json["tasks"][0]["sortCode"], "0001");
    assert_eq!(json["tasks"][0]["ledCmdStream"], "[]");
}
