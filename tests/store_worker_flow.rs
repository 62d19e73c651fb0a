use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use dayPlanner::events::queue::StoreBus;
use dayPlanner::events::worker::run_store_worker;
use dayPlanner::models::item::{CalendarItem, ItemKind, Owner, UNDATED_KEY};
use dayPlanner::store::{load_db, StoreCommand, StoreSink, DB};
use tokio::sync::Mutex;

fn temp_location() -> String {
    let dir = env::temp_dir().join(format!("dayplanner_it_{}", uuid::Uuid::new_v4()));
    dir.join("planner.json").to_string_lossy().to_string()
}

#[tokio::test]
async fn worker_applies_commands_in_order_and_persists() {
    let location = temp_location();
    let shared_db: Arc<Mutex<DB>> = Arc::new(Mutex::new(HashMap::new()));
    let (bus, rx) = StoreBus::new(8);
    let worker = tokio::spawn(run_store_worker(rx, shared_db.clone(), location.clone()));

    let task = CalendarItem::new(ItemKind::Task, Owner::Binyamin, "laundry", UNDATED_KEY);
    let task_id = task.id.clone();
    bus.commit(StoreCommand::Create { item: task.clone() })
        .expect("create enqueues");

    let mut dated = task.clone();
    dated.date_key = "2026-03-09".to_string();
    dated.start_time = Some("08:00".to_string());
    dated.end_time = Some("08:30".to_string());
    bus.commit(StoreCommand::Move {
        from_key: UNDATED_KEY.to_string(),
        from_id: task_id.clone(),
        item: dated,
    })
    .expect("move enqueues");

    let doomed = CalendarItem::new(ItemKind::Event, Owner::Nana, "cancelled", "2026-03-10");
    let doomed_id = doomed.id.clone();
    bus.commit(StoreCommand::Create { item: doomed })
        .expect("create enqueues");
    bus.commit(StoreCommand::Delete {
        date_key: "2026-03-10".to_string(),
        id: doomed_id,
    })
    .expect("delete enqueues");

    // Dropping the only sender lets the worker drain and exit.
    drop(bus);
    worker.await.expect("worker should finish cleanly");

    let db = shared_db.lock().await;
    assert!(!db.contains_key(UNDATED_KEY));
    assert!(!db.contains_key("2026-03-10"));
    let moved = &db["2026-03-09"][&task_id];
    assert_eq!(moved.start_time.as_deref(), Some("08:00"));

    // The same state is reloadable from disk.
    let persisted = load_db(&location).expect("persisted file loads");
    assert_eq!(persisted["2026-03-09"].len(), 1);
    assert!(persisted["2026-03-09"].contains_key(&task_id));
}

#[tokio::test]
async fn bus_commit_is_fire_and_forget() {
    let location = temp_location();
    let shared_db: Arc<Mutex<DB>> = Arc::new(Mutex::new(HashMap::new()));
    let (bus, rx) = StoreBus::new(8);
    let worker = tokio::spawn(run_store_worker(rx, shared_db.clone(), location));

    // The engine-facing sync seam: no awaiting, no acknowledgement.
    let item = CalendarItem::new(ItemKind::Task, Owner::Shared, "groceries", UNDATED_KEY);
    bus.commit(StoreCommand::Create { item })
        .expect("commit enqueues");

    drop(bus);
    worker.await.expect("worker should finish cleanly");

    let db = shared_db.lock().await;
    assert_eq!(db[UNDATED_KEY].len(), 1);
}
