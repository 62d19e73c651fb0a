use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::store::{self, StoreCommand, DB};

/// Drains the store bus, applying each command to the authoritative map in
/// arrival order (latest write wins) and persisting best-effort. Runs until
/// every bus sender is dropped.
pub async fn run_store_worker(
    mut rx: mpsc::Receiver<StoreCommand>,
    db: Arc<Mutex<DB>>,
    location: String,
) {
    while let Some(command) = rx.recv().await {
        let mut db = db.lock().await;
        store::apply(&mut db, &command);
        if let Err(err) = store::save_db(&location, &db) {
            eprintln!("Failed to persist planner db: {}", err);
        }
    }
}
