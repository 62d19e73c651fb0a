use chrono::{Duration, NaiveDate};

use crate::models::item::{
    date_key, parse_date_key, CalendarItem, ItemKind, Owner, Urgency, UNDATED_KEY,
};
use crate::service::day_load::compute_day_load;
use crate::store::{self, StoreCommand, StoreSink, DB};

/// The scheduler never looks further ahead than this, whatever the urgency.
pub const MAX_LOOKAHEAD_DAYS: i64 = 14;

/// Days scanned when booking recurring training sessions.
const TRAINING_HORIZON_DAYS: i64 = 7;

/// Outcome of trying to place one task. "No slot found" is a normal result,
/// not an error; the caller reports counts of both.
#[derive(Debug, Clone)]
pub struct PlacementResult {
    pub success: bool,
    pub title: String,
    pub date_key: Option<String>,
    pub start_time: Option<String>,
}

/// What to work on right now.
#[derive(Debug, Clone)]
pub struct Suggestion {
    pub title: String,
    pub urgency: Urgency,
    pub duration_minutes: u32,
}

/// Ranks today's and undated tasks for the viewer by urgency, longest
/// estimate first on ties, and returns the top pick. Read-only.
pub fn suggest_now(db: &DB, today: NaiveDate, viewer: Owner) -> Option<Suggestion> {
    let today_key = date_key(today);
    let mut candidates: Vec<&CalendarItem> = Vec::new();
    for (bucket_key, items) in db {
        if bucket_key != &today_key && bucket_key.as_str() != UNDATED_KEY {
            continue;
        }
        for item in items.values() {
            if item.is_task() && item.counts_for(viewer) {
                candidates.push(item);
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.urgency
            .score()
            .cmp(&a.urgency.score())
            .then(b.estimated_duration().cmp(&a.estimated_duration()))
    });

    candidates.first().map(|item| Suggestion {
        title: item.title.clone(),
        urgency: item.urgency,
        duration_minutes: item.estimated_duration(),
    })
}

/// First-fit placement of every undated task into the earliest suitable free
/// window within its urgency horizon. Greedy and non-backtracking: each task
/// is resolved independently, but the snapshot is updated after every
/// success so tasks placed later in the same run see the new occupancy.
pub fn place_undated_tasks<S: StoreSink + ?Sized>(
    db: &mut DB,
    sink: &S,
    today: NaiveDate,
) -> Vec<PlacementResult> {
    let mut undated: Vec<CalendarItem> = db
        .get(UNDATED_KEY)
        .map(|bucket| bucket.values().filter(|item| item.is_task()).cloned().collect())
        .unwrap_or_default();
    undated.sort_by(|a, b| a.id.cmp(&b.id));

    undated
        .into_iter()
        .map(|task| place_task(db, sink, &task, today))
        .collect()
}

fn place_task<S: StoreSink + ?Sized>(
    db: &mut DB,
    sink: &S,
    task: &CalendarItem,
    today: NaiveDate,
) -> PlacementResult {
    let duration = task.estimated_duration();
    for offset in 0..=task.urgency.search_horizon_days() {
        let key = date_key(today + Duration::days(offset));
        // Recomputed from the live snapshot so earlier placements in this
        // run already occupy their windows.
        let load = compute_day_load(db, &key, task.owner);
        let slot = load
            .free_slots
            .iter()
            .find(|(start, end)| end - start >= duration)
            .copied();
        if let Some((start, _)) = slot {
            let placed = task.placed_at(&key, start, duration);
            let start_time = placed.start_time.clone();
            commit(
                db,
                sink,
                StoreCommand::Move {
                    from_key: UNDATED_KEY.to_string(),
                    from_id: task.id.clone(),
                    item: placed,
                },
            );
            return PlacementResult {
                success: true,
                title: task.title.clone(),
                date_key: Some(key),
                start_time,
            };
        }
    }

    PlacementResult {
        success: false,
        title: task.title.clone(),
        date_key: None,
        start_time: None,
    }
}

/// Pushes a dated item out by its urgency offset (today +1, week +3,
/// month +7, none +1) and returns the new date key. Only defined for dated
/// items: an undated task has no date to postpone from.
pub fn postpone_task<S: StoreSink + ?Sized>(
    db: &mut DB,
    sink: &S,
    from_key: &str,
    id: &str,
) -> Result<String, String> {
    if from_key == UNDATED_KEY {
        return Err("cannot postpone an undated task; schedule it first".to_string());
    }
    let item = db
        .get(from_key)
        .and_then(|bucket| bucket.get(id))
        .cloned()
        .ok_or_else(|| format!("no item {} on {}", id, from_key))?;
    let base = parse_date_key(from_key).ok_or_else(|| format!("invalid date key {}", from_key))?;

    let new_day = base + Duration::days(item.urgency.postpone_offset_days());
    let new_key = date_key(new_day);
    let moved = CalendarItem {
        date_key: new_key.clone(),
        ..item
    };
    commit(
        db,
        sink,
        StoreCommand::Move {
            from_key: from_key.to_string(),
            from_id: id.to_string(),
            item: moved,
        },
    );
    Ok(new_key)
}

/// Books up to `sessions` training blocks over the coming week, one per
/// suitable free window, earliest first. Returns a result per booked
/// session; fewer than requested is a normal outcome.
pub fn schedule_training<S: StoreSink + ?Sized>(
    db: &mut DB,
    sink: &S,
    today: NaiveDate,
    sessions: u32,
    session_minutes: u32,
    owner: Owner,
) -> Vec<PlacementResult> {
    let mut placed = Vec::new();
    if sessions == 0 {
        return placed;
    }
    'days: for offset in 0..=TRAINING_HORIZON_DAYS {
        let key = date_key(today + Duration::days(offset));
        let load = compute_day_load(db, &key, owner);
        for (start, end) in load.free_slots {
            if end - start < session_minutes {
                continue;
            }
            let mut session = CalendarItem::new(ItemKind::Task, owner, "Training", &key);
            session.urgency = Urgency::Week;
            session.duration = Some(session_minutes as i64);
            let session = session.placed_at(&key, start, session_minutes);
            let start_time = session.start_time.clone();
            commit(db, sink, StoreCommand::Create { item: session });
            placed.push(PlacementResult {
                success: true,
                title: "Training".to_string(),
                date_key: Some(key.clone()),
                start_time,
            });
            if placed.len() as u32 >= sessions {
                break 'days;
            }
        }
    }
    placed
}

/// Up to three (date key, start minutes) options fitting `duration_minutes`,
/// scanning the next two weeks. Read-only; feeds the "when do I have time"
/// intent.
pub fn find_time_windows(
    db: &DB,
    today: NaiveDate,
    duration_minutes: u32,
    viewer: Owner,
) -> Vec<(String, u32)> {
    let mut options = Vec::new();
    for offset in 0..=MAX_LOOKAHEAD_DAYS {
        let key = date_key(today + Duration::days(offset));
        let load = compute_day_load(db, &key, viewer);
        for (start, end) in load.free_slots {
            if end - start >= duration_minutes {
                options.push((key.clone(), start));
                if options.len() >= 3 {
                    return options;
                }
            }
        }
    }
    options
}

/// Removes a completed item.
pub fn mark_done<S: StoreSink + ?Sized>(
    db: &mut DB,
    sink: &S,
    bucket_key: &str,
    id: &str,
) -> Result<(), String> {
    if !db
        .get(bucket_key)
        .is_some_and(|bucket| bucket.contains_key(id))
    {
        return Err(format!("no item {} on {}", id, bucket_key));
    }
    commit(
        db,
        sink,
        StoreCommand::Delete {
            date_key: bucket_key.to_string(),
            id: id.to_string(),
        },
    );
    Ok(())
}

/// Validates and commits a user-created item.
pub fn create_item<S: StoreSink + ?Sized>(
    db: &mut DB,
    sink: &S,
    item: CalendarItem,
) -> Result<String, String> {
    if item.title.trim().is_empty() {
        return Err("title must not be empty".to_string());
    }
    if item.date_key == UNDATED_KEY {
        if item.kind == ItemKind::Event {
            return Err("events need a date".to_string());
        }
        if item.start_time.is_some() || item.end_time.is_some() {
            return Err("an undated task cannot carry clock times".to_string());
        }
    } else if parse_date_key(&item.date_key).is_none() {
        return Err(format!("invalid date key {}", item.date_key));
    }
    if item.start_time.is_some() != item.end_time.is_some() {
        return Err("start and end times must both be set or both be empty".to_string());
    }
    if (item.start_time.is_some() || item.end_time.is_some()) && item.busy_segment().is_none() {
        return Err("times must be valid HH:MM with start not after end".to_string());
    }
    if item.duration.is_some_and(|minutes| minutes <= 0) {
        return Err("duration must be a positive number of minutes".to_string());
    }

    let id = item.id.clone();
    commit(db, sink, StoreCommand::Create { item });
    Ok(id)
}

// Updates the local snapshot first, then hands the write to the store.
// Commits are best-effort: the run keeps its optimistic view either way.
fn commit<S: StoreSink + ?Sized>(db: &mut DB, sink: &S, command: StoreCommand) {
    store::apply(db, &command);
    if let Err(err) = sink.commit(command) {
        eprintln!("Store commit failed (keeping local view): {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub struct NullSink;

    impl StoreSink for NullSink {
        fn commit(&self, _command: StoreCommand) -> Result<(), String> {
            Ok(())
        }
    }

    struct FailingSink {
        attempts: Mutex<u32>,
    }

    impl StoreSink for FailingSink {
        fn commit(&self, _command: StoreCommand) -> Result<(), String> {
            *self.attempts.lock().unwrap() += 1;
            Err("store unavailable".to_string())
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 9).unwrap()
    }

    fn insert(db: &mut DB, item: CalendarItem) -> String {
        let id = item.id.clone();
        db.entry(item.date_key.clone())
            .or_default()
            .insert(id.clone(), item);
        id
    }

    fn undated_task(title: &str, urgency: Urgency, duration: i64) -> CalendarItem {
        let mut task = CalendarItem::new(ItemKind::Task, Owner::Binyamin, title, UNDATED_KEY);
        task.urgency = urgency;
        task.duration = Some(duration);
        task
    }

    #[test]
    fn suggest_now_prefers_urgent_tasks() {
        let mut db: DB = HashMap::new();
        let mut relaxed = CalendarItem::new(ItemKind::Task, Owner::Binyamin, "sort photos", UNDATED_KEY);
        relaxed.duration = Some(240);
        insert(&mut db, relaxed);
        let mut urgent =
            CalendarItem::new(ItemKind::Task, Owner::Binyamin, "pay bill", "2026-03-09");
        urgent.urgency = Urgency::Today;
        urgent.duration = Some(10);
        insert(&mut db, urgent);

        let suggestion = suggest_now(&db, today(), Owner::Binyamin).expect("has tasks");
        assert_eq!(suggestion.title, "pay bill");
        assert_eq!(suggestion.urgency, Urgency::Today);
        assert_eq!(suggestion.duration_minutes, 10);
    }

    #[test]
    fn suggest_now_breaks_ties_by_longer_estimate() {
        let mut db: DB = HashMap::new();
        insert(&mut db, undated_task("short", Urgency::Week, 20));
        insert(&mut db, undated_task("long", Urgency::Week, 90));
        let suggestion = suggest_now(&db, today(), Owner::Binyamin).expect("has tasks");
        assert_eq!(suggestion.title, "long");
    }

    #[test]
    fn suggest_now_ignores_other_days_events_and_other_owners() {
        let mut db: DB = HashMap::new();
        insert(
            &mut db,
            CalendarItem::new(ItemKind::Task, Owner::Binyamin, "later", "2026-03-20"),
        );
        insert(
            &mut db,
            CalendarItem::new(ItemKind::Event, Owner::Binyamin, "meeting", "2026-03-09"),
        );
        insert(
            &mut db,
            CalendarItem::new(ItemKind::Task, Owner::Nana, "hers", UNDATED_KEY),
        );
        assert!(suggest_now(&db, today(), Owner::Binyamin).is_none());
    }

    #[test]
    fn postpone_moves_by_urgency_offset() {
        let mut db: DB = HashMap::new();
        let mut item = CalendarItem::new(ItemKind::Task, Owner::Binyamin, "report", "2026-03-09");
        item.urgency = Urgency::Month;
        let id = insert(&mut db, item);

        let new_key = postpone_task(&mut db, &NullSink, "2026-03-09", &id).expect("postpone");
        assert_eq!(new_key, "2026-03-16");
        assert!(!db.contains_key("2026-03-09"));
        assert_eq!(db["2026-03-16"][&id].date_key, "2026-03-16");
    }

    #[test]
    fn postpone_default_and_today_move_one_day() {
        for (urgency, expected) in [
            (Urgency::Today, "2026-03-10"),
            (Urgency::Week, "2026-03-12"),
            (Urgency::None, "2026-03-10"),
        ] {
            let mut db: DB = HashMap::new();
            let mut item = CalendarItem::new(ItemKind::Task, Owner::Nana, "chore", "2026-03-09");
            item.urgency = urgency;
            let id = insert(&mut db, item);
            let new_key = postpone_task(&mut db, &NullSink, "2026-03-09", &id).expect("postpone");
            assert_eq!(new_key, expected);
        }
    }

    #[test]
    fn postpone_rejects_undated_and_missing_items() {
        let mut db: DB = HashMap::new();
        let id = insert(
            &mut db,
            CalendarItem::new(ItemKind::Task, Owner::Binyamin, "float", UNDATED_KEY),
        );
        assert!(postpone_task(&mut db, &NullSink, UNDATED_KEY, &id).is_err());
        assert!(postpone_task(&mut db, &NullSink, "2026-03-09", "ghost").is_err());
        // Nothing was mutated.
        assert!(db[UNDATED_KEY].contains_key(&id));
    }

    #[test]
    fn failed_commits_keep_the_optimistic_local_view() {
        let mut db: DB = HashMap::new();
        insert(&mut db, undated_task("laundry", Urgency::None, 60));
        let sink = FailingSink {
            attempts: Mutex::new(0),
        };

        let results = place_undated_tasks(&mut db, &sink, today());
        assert!(results[0].success);
        assert_eq!(*sink.attempts.lock().unwrap(), 1);
        // The snapshot reflects the placement even though the store failed.
        assert!(!db.contains_key(UNDATED_KEY));
        assert_eq!(db["2026-03-09"].len(), 1);
    }

    #[test]
    fn mark_done_removes_the_item() {
        let mut db: DB = HashMap::new();
        let id = insert(
            &mut db,
            CalendarItem::new(ItemKind::Task, Owner::Binyamin, "done soon", "2026-03-09"),
        );
        mark_done(&mut db, &NullSink, "2026-03-09", &id).expect("delete");
        assert!(db.is_empty());
        assert!(mark_done(&mut db, &NullSink, "2026-03-09", &id).is_err());
    }

    #[test]
    fn create_item_validates_before_committing() {
        let mut db: DB = HashMap::new();

        let blank = CalendarItem::new(ItemKind::Task, Owner::Binyamin, "  ", UNDATED_KEY);
        assert!(create_item(&mut db, &NullSink, blank).is_err());

        let undated_event = CalendarItem::new(ItemKind::Event, Owner::Binyamin, "party", UNDATED_KEY);
        assert!(create_item(&mut db, &NullSink, undated_event).is_err());

        let mut timed_undated =
            CalendarItem::new(ItemKind::Task, Owner::Binyamin, "float", UNDATED_KEY);
        timed_undated.start_time = Some("09:00".to_string());
        timed_undated.end_time = Some("10:00".to_string());
        assert!(create_item(&mut db, &NullSink, timed_undated).is_err());

        let mut lopsided = CalendarItem::new(ItemKind::Event, Owner::Binyamin, "gym", "2026-03-09");
        lopsided.start_time = Some("09:00".to_string());
        assert!(create_item(&mut db, &NullSink, lopsided).is_err());

        let mut bad_duration =
            CalendarItem::new(ItemKind::Task, Owner::Binyamin, "stretch", UNDATED_KEY);
        bad_duration.duration = Some(0);
        assert!(create_item(&mut db, &NullSink, bad_duration).is_err());

        assert!(db.is_empty());

        let mut ok = CalendarItem::new(ItemKind::Event, Owner::Shared, "dinner", "2026-03-09");
        ok.start_time = Some("19:00".to_string());
        ok.end_time = Some("21:00".to_string());
        let id = create_item(&mut db, &NullSink, ok).expect("valid item");
        assert!(db["2026-03-09"].contains_key(&id));
    }
}
