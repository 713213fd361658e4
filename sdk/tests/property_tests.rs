use proptest::prelude::*;
use sdk::errors::{EngineError, EngineErrorExt};
use sdk::types::{InventoryRef, LocationId, Task, TaskKind};

proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "\\PC*") {
        // Hints are static operator-facing text and never echo the raw detail
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::Topology(error_str.clone()),
            EngineError::UnknownLocation(error_str.clone()),
            EngineError::UnknownSequencer(error_str.clone()),
            EngineError::UnknownPolicy { policy: "BAYCHANG".to_string(), value: error_str.clone() },
            EngineError::InvalidGeometry(error_str.clone()),
            EngineError::Serialization(error_str.clone()),
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(err.to_string().contains(&error_str));
        }
    }
}

fn kind_strategy() -> impl Strategy<Value = TaskKind> {
    prop_oneof![
        Just(TaskKind::Plan),
        Just(TaskKind::Actual),
        Just(TaskKind::Indicator),
        Just(TaskKind::HkBayComplete),
        Just(TaskKind::HkRepeatPos),
    ]
}

proptest! {
    #[test]
    fn test_task_json_roundtrip(
        id in "[a-z0-9-]{1,16}",
        kind in kind_strategy(),
        location in prop::option::of("F1(\\.[A-Z][0-9]){1,4}"),
        container in prop::option::of("C[0-9]{1,3}"),
        quantity in prop::option::of(0..100i32),
        position in prop::option::of((1..1000i32).prop_map(|p| p as f64 * 0.5)),
        sequence in prop::option::of(1..1000i32),
        meters in prop::option::of((0..12i32).prop_map(|m| m as f64 * 0.25)),
    ) {
        let mut task = Task::new(id, kind);
        task.location_id = location.clone().map(LocationId::from);
        task.container_id = container;
        task.plan_quantity = quantity;
        task.position_along_path = position;
        task.preferred_sequence = sequence;
        if let Some(location) = location {
            task.inventory = Some(InventoryRef {
                location_id: LocationId::from(location),
                meters_from_anchor: meters,
                position_along_path: None,
            });
        }

        let json = serde_json::to_string(&task).expect("Failed to serialize task");
        let parsed: Task = serde_json::from_str(&json).expect("Failed to deserialize task");

        prop_assert_eq!(task, parsed);
    }
}
