use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use crate::models::item::CalendarItem;

/// The planner database: date key (or "undated") -> item id -> item.
/// The engine always works on a snapshot clone of this map.
pub type DB = HashMap<String, HashMap<String, CalendarItem>>;

// Returns the file where the planner DB lives.
// Defaults to a relative "./data/planner.json".
pub fn get_db_location() -> String {
    if let Ok(path) = env::var("PLANNER_DB_LOCATION") {
        return path;
    }
    let base = env::var("DB_LOCATION").unwrap_or("./data".to_string());
    format!("{}/planner.json", base)
}

#[derive(Debug)]
pub enum DbError {
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl std::fmt::Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbError::Io(err) => write!(f, "db io error: {}", err),
            DbError::Serde(err) => write!(f, "db serialization error: {}", err),
        }
    }
}

impl std::error::Error for DbError {}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::Io(err)
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serde(err)
    }
}

/// Loads the DB from disk. A missing file is an empty planner, not an error.
pub fn load_db(location: &str) -> Result<DB, DbError> {
    let content = match fs::read_to_string(location) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(err) => return Err(err.into()),
    };
    Ok(serde_json::from_str(&content)?)
}

pub fn save_db(location: &str, db: &DB) -> Result<(), DbError> {
    if let Some(parent) = Path::new(location).parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(location, serde_json::to_string_pretty(db)?)?;
    Ok(())
}

/// A single write against the store. The engine emits these; the store
/// worker applies them to the authoritative map and persists.
#[derive(Debug, Clone)]
pub enum StoreCommand {
    Create {
        item: CalendarItem,
    },
    Move {
        from_key: String,
        from_id: String,
        item: CalendarItem,
    },
    Delete {
        date_key: String,
        id: String,
    },
}

/// Applies one command to a map. Shared between the store worker and the
/// engine's local snapshot bookkeeping, so both always agree on semantics.
pub fn apply(db: &mut DB, command: &StoreCommand) {
    match command {
        StoreCommand::Create { item } => {
            db.entry(item.date_key.clone())
                .or_default()
                .insert(item.id.clone(), item.clone());
        }
        StoreCommand::Move {
            from_key,
            from_id,
            item,
        } => {
            if let Some(bucket) = db.get_mut(from_key) {
                bucket.remove(from_id);
                if bucket.is_empty() {
                    db.remove(from_key);
                }
            }
            db.entry(item.date_key.clone())
                .or_default()
                .insert(item.id.clone(), item.clone());
        }
        StoreCommand::Delete { date_key, id } => {
            if let Some(bucket) = db.get_mut(date_key) {
                bucket.remove(id);
                if bucket.is_empty() {
                    db.remove(date_key);
                }
            }
        }
    }
}

/// Where the engine hands off its writes. Commits are fire-and-forget:
/// a failed commit is reported but the run keeps its optimistic local view.
pub trait StoreSink: Send + Sync {
    fn commit(&self, command: StoreCommand) -> Result<(), String>;
}
