use chrono::NaiveDate;

use crate::models::item::Owner;
use crate::service::commentary;
use crate::service::day_load::compute_day_load;
use crate::service::scheduler;
use crate::store::{StoreSink, DB};

/// Structured assistant commands. Free-text parsing lives outside the crate;
/// whoever talks to the user hands us duration, count and date already
/// extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    DayLoad { date_key: String },
    SuggestNow,
    PlaceTasks,
    FreeTime { duration_minutes: u32 },
    Training { sessions: u32, session_minutes: u32 },
}

/// Runs one intent against the snapshot and renders a human-readable report.
/// Mutating intents commit through the sink; "no slot found" comes back as a
/// normal report line, never an error.
pub fn dispatch<S: StoreSink + ?Sized>(
    db: &mut DB,
    sink: &S,
    intent: Intent,
    today: NaiveDate,
    viewer: Owner,
) -> String {
    match intent {
        Intent::DayLoad { date_key } => {
            let load = compute_day_load(db, &date_key, viewer);
            commentary::day_load_report(&date_key, &load)
        }
        Intent::SuggestNow => {
            let suggestion = scheduler::suggest_now(db, today, viewer);
            commentary::suggestion_report(suggestion.as_ref())
        }
        Intent::PlaceTasks => {
            let results = scheduler::place_undated_tasks(db, sink, today);
            commentary::placement_report(&results)
        }
        Intent::FreeTime { duration_minutes } => {
            let options = scheduler::find_time_windows(db, today, duration_minutes, viewer);
            commentary::free_time_report(&options)
        }
        Intent::Training {
            sessions,
            session_minutes,
        } => {
            let placed =
                scheduler::schedule_training(db, sink, today, sessions, session_minutes, viewer);
            commentary::training_report(&placed, sessions)
        }
    }
}
