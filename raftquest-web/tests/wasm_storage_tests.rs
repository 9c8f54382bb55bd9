#![cfg(target_arch = "wasm32")]

use raftquest_web::bridge::{RaftDrag, RaftQuest};
use raftquest_web::dom;
use raftquest_web::game::{
    DragEvent, DragItemId, MiniGameOutcome, Rect, SnapshotStorage, StepId, TargetId,
    WebSnapshotStorage, constants, create_web_game_engine,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

fn clear_snapshots() {
    let storage = WebSnapshotStorage;
    for key in constants::STORE_KEYS {
        storage.remove(key).expect("remove snapshot");
    }
}

#[wasm_bindgen_test]
fn local_storage_round_trips_values() {
    let storage = WebSnapshotStorage;
    storage.write("raftquest.test", "{\"ok\":true}").expect("write");
    assert_eq!(
        storage.read("raftquest.test").expect("read").as_deref(),
        Some("{\"ok\":true}")
    );
    storage.remove("raftquest.test").expect("remove");
    assert_eq!(storage.read("raftquest.test").expect("read"), None);
}

#[wasm_bindgen_test]
fn progress_survives_a_reload() {
    clear_snapshots();
    let engine = create_web_game_engine();
    let mut session = engine.create_session().expect("session");
    session
        .record_outcome(&StepId::from("mission-1-step-1"), &MiniGameOutcome::succeeded())
        .expect("known step");

    let restored = engine.create_session().expect("session");
    assert!(restored.progression().is_step_completed("mission-1-step-1"));
    assert!(restored.inventory().has_piece("piece-mission-1-1"));
    clear_snapshots();
}

#[wasm_bindgen_test]
fn corrupt_snapshot_starts_fresh() {
    clear_snapshots();
    WebSnapshotStorage
        .write(constants::STORE_KEY_INVENTORY, "not json")
        .expect("write");
    let session = create_web_game_engine().create_session().expect("session");
    assert!(session.inventory().collected_pieces.is_empty());
    clear_snapshots();
}

#[wasm_bindgen_test]
fn element_rect_reads_layout() {
    let doc = dom::document().expect("document");
    let el = doc.create_element("div").expect("div");
    el.set_attribute("style", "position:absolute;left:10px;top:20px;width:30px;height:40px")
        .expect("style");
    doc.body().expect("body").append_child(&el).expect("append");
    let rect = dom::element_rect(&el);
    assert!(rect.approx_eq(&Rect::new(10.0, 20.0, 30.0, 40.0)), "{rect:?}");
    el.remove();
    assert!(dom::viewport().is_some());
    assert!(dom::orientation().is_some());
}

fn placed_box(left: u32) -> web_sys::Element {
    let doc = dom::document().expect("document");
    let el = doc.create_element("div").expect("div");
    el.set_attribute(
        "style",
        &format!("position:absolute;left:{left}px;top:10px;width:30px;height:30px"),
    )
    .expect("style");
    doc.body().expect("body").append_child(&el).expect("append");
    el
}

fn drag_event(value: JsValue) -> DragEvent {
    serde_wasm_bindgen::from_value(value).expect("drag event")
}

#[wasm_bindgen_test]
fn drag_handle_separates_taps_from_drops() {
    clear_snapshots();
    let game = RaftQuest::new().expect("game");
    let mut drag = RaftDrag::new(&game);
    let piece = placed_box(10);
    let slot = placed_box(200);
    drag.register_target("slot-1", &slot, false);
    let item = DragItemId::from("piece-mission-1-1");

    assert!(drag.pointer_down(item.as_str(), &piece, 20.0, 20.0).expect("down").is_null());
    assert_eq!(
        drag_event(drag.pointer_up(22.0, 21.0).expect("up")),
        DragEvent::Tap { item: item.clone() }
    );

    drag.pointer_down(item.as_str(), &piece, 20.0, 20.0).expect("down");
    assert_eq!(
        drag_event(drag.pointer_move(120.0, 20.0).expect("move")),
        DragEvent::Started { item: item.clone() }
    );
    assert_eq!(drag.active_item().as_deref(), Some(item.as_str()));
    assert_eq!(
        drag_event(drag.pointer_up(210.0, 20.0).expect("up")),
        DragEvent::Dropped {
            item: item.clone(),
            target: Some(TargetId::from("slot-1")),
        }
    );

    assert!(drag.set_target_disabled("slot-1", true));
    assert!(drag.key_command(item.as_str(), &piece, "a").expect("key").is_null());
    drag.key_command(item.as_str(), &piece, "Enter").expect("pick up");
    assert_eq!(
        drag_event(drag.key_command(item.as_str(), &piece, "Enter").expect("drop")),
        DragEvent::Dropped { item, target: None }
    );

    piece.remove();
    slot.remove();
}
