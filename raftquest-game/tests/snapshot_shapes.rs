use std::hash::Hasher;

use raftquest_game::{
    HintUsage, Inventory, MissionId, ProgressEvent, ProgressionState, RaftPieceId, SnapshotRecord,
    StepId, UiFlags,
};
use serde_json::{Value, json};
use twox_hash::XxHash64;

fn snapshot_hash(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

fn sample_progression() -> ProgressionState {
    let mut state = ProgressionState::new();
    state.complete_step(StepId::from("mission-1-step-2"));
    state.complete_step(StepId::from("mission-1-step-1"));
    state.complete_mission(MissionId::from("mission-1"));
    state.set_current_mission(Some(MissionId::from("mission-2")));
    state.initialized = true;
    state
}

#[test]
fn progression_snapshot_uses_arrays_in_completion_order() {
    let value = serde_json::to_value(sample_progression()).unwrap();
    assert_eq!(
        value,
        json!({
            "current_mission_id": "mission-2",
            "current_step_id": null,
            "completed_steps": ["mission-1-step-2", "mission-1-step-1"],
            "completed_missions": ["mission-1"],
            "initialized": true
        })
    );
}

#[test]
fn duplicated_ids_in_a_snapshot_are_dropped() {
    let raw = r#"{
        "completed_steps": ["a", "b", "a", "b", "c"],
        "completed_missions": ["mission-1", "mission-1"]
    }"#;
    let state: ProgressionState = serde_json::from_str(raw).unwrap();
    assert_eq!(state.completed_steps.len(), 3);
    assert_eq!(state.completed_missions.len(), 1);
    assert!(!state.initialized);

    let rewritten = serde_json::to_value(&state).unwrap();
    assert_eq!(rewritten["completed_steps"], json!(["a", "b", "c"]));
}

#[test]
fn inventory_and_flags_snapshot_shapes() {
    let mut inventory = Inventory::new();
    for id in ["piece-mission-1-1", "piece-mission-1-2", "piece-mission-1-3", "piece-mission-2-1"] {
        inventory.add_piece(RaftPieceId::from(id));
    }
    let pieces = ["piece-mission-1-1", "piece-mission-1-2", "piece-mission-1-3"]
        .map(RaftPieceId::from);
    inventory.consume_pieces_for_fusion(&pieces, 4).unwrap();
    assert_eq!(
        serde_json::to_value(&inventory).unwrap(),
        json!({
            "collected_pieces": ["piece-mission-2-1"],
            "fused_pieces": ["fused-1"],
            "fused_count": 1
        })
    );

    let mut hints = HintUsage::default();
    hints.mark_hint_as_used(StepId::from("mission-1-step-3"));
    assert_eq!(
        serde_json::to_value(&hints).unwrap(),
        json!({ "used_hints": ["mission-1-step-3"] })
    );

    let flags: UiFlags = serde_json::from_str(r#"{ "raft_viewed": true }"#).unwrap();
    assert!(flags.raft_viewed);
    assert!(flags.viewed_missions.is_empty());
    assert_eq!(flags.last_viewed_completed_mission, None);
}

#[test]
fn inventory_snapshot_must_agree_with_its_fusion_counter() {
    let miscounted: Inventory = serde_json::from_str(
        r#"{"collected_pieces":["a","b","c"],"fused_pieces":["fused-1"],"fused_count":0}"#,
    )
    .unwrap();
    assert!(!miscounted.is_consistent());

    let skipped: Inventory =
        serde_json::from_str(r#"{"fused_pieces":["fused-1","fused-3"],"fused_count":2}"#).unwrap();
    assert!(!skipped.is_consistent());

    let legacy: Inventory =
        serde_json::from_str(r#"{"collected_pieces":["piece-mission-4-1"]}"#).unwrap();
    assert!(legacy.is_consistent());
    assert!(ProgressionState::default().is_consistent());
}

#[test]
fn snapshot_digest_survives_a_round_trip() {
    let original = serde_json::to_string(&sample_progression()).unwrap();
    let restored: ProgressionState = serde_json::from_str(&original).unwrap();
    let rewritten = serde_json::to_string(&restored).unwrap();
    assert_eq!(
        snapshot_hash(original.as_bytes()),
        snapshot_hash(rewritten.as_bytes()),
        "snapshot changed across a round trip\n{original}\n{rewritten}"
    );

    let mut advanced = restored;
    advanced.complete_step(StepId::from("mission-2-step-1"));
    let advanced = serde_json::to_string(&advanced).unwrap();
    assert_ne!(snapshot_hash(original.as_bytes()), snapshot_hash(advanced.as_bytes()));
}

#[test]
fn progress_events_are_tagged_records() {
    let fused = ProgressEvent::PiecesFused {
        consumed: ["p1", "p2", "p3"].map(RaftPieceId::from),
        fused: RaftPieceId::fused(1),
    };
    let value = serde_json::to_value(&fused).unwrap();
    assert_eq!(
        value,
        json!({ "type": "pieces_fused", "consumed": ["p1", "p2", "p3"], "fused": "fused-1" })
    );
    let unknown: Result<ProgressEvent, _> =
        serde_json::from_value(json!({ "type": "teleported", "step": "x" }));
    assert!(unknown.is_err());
    assert!(matches!(value.get("type"), Some(Value::String(_))));
}
