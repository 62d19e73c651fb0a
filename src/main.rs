#![allow(non_snake_case)]

mod cli;
mod config;
mod events;
mod models;
mod service;
mod store;

use std::env;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::events::queue::StoreBus;
use crate::events::worker::run_store_worker;

#[tokio::main]
async fn main() {
    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let db_location = store::get_db_location();
    let db = store::load_db(&db_location).expect("Unable to load planner database.");
    let shared_db = Arc::new(tokio::sync::Mutex::new(db));

    let (bus, rx) = StoreBus::new(64);
    let worker = tokio::spawn(run_store_worker(rx, shared_db.clone(), db_location));

    cli::cli(shared_db.clone(), bus, config.viewer()).await;

    // The CLI owned the only bus sender; once it returns the worker drains
    // whatever is left and exits, so every commit lands before we do.
    if let Err(err) = worker.await {
        eprintln!("Store worker failed: {:?}", err);
    }
}
