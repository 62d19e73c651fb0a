use std::str::FromStr;
use std::sync::Arc;

use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::Text;
use tokio::sync::Mutex;

use crate::events::queue::StoreBus;
use crate::models::item::{date_key, CalendarItem, ItemKind, Owner, Urgency, UNDATED_KEY};
use crate::service::commentary;
use crate::service::routing::{dispatch, Intent};
use crate::service::scheduler;
use crate::store::DB;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task or event
    Add {
        title: String,
        /// YYYY-MM-DD, or "undated" for an unscheduled task
        #[arg(long, default_value = UNDATED_KEY)]
        date: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        /// Estimated minutes, used when no times are given
        #[arg(long)]
        duration: Option<i64>,
        #[arg(long, default_value = "task")]
        kind: ItemKind,
        #[arg(long, default_value = "none")]
        urgency: Urgency,
        /// binyamin, nana or shared; defaults to the configured viewer
        #[arg(long)]
        owner: Option<Owner>,
    },
    /// Create a task interactively
    AddPrompt {},
    /// Show one day's items, load and free windows
    Day { date: Option<String> },
    /// What should I work on right now?
    SuggestNow {},
    /// Schedule every undated task into the earliest free window
    PlaceTasks {},
    /// Find up to three windows of the given length in the next two weeks
    FindTime { minutes: u32 },
    /// Book recurring training sessions over the coming week
    Train { sessions: u32, minutes: u32 },
    /// Push an item out by its urgency offset
    Postpone { date: String, id: String },
    /// Mark an item done (removes it)
    Done { date: String, id: String },
}

pub async fn cli(shared_db: Arc<Mutex<DB>>, bus: StoreBus, viewer: Owner) {
    // Fine to panic here
    let cli = Cli::parse();
    let today = Local::now().date_naive();
    let mut snapshot = { shared_db.lock().await.clone() };

    match cli.command {
        Commands::Add {
            title,
            date,
            start,
            end,
            duration,
            kind,
            urgency,
            owner,
        } => {
            let mut item = CalendarItem::new(kind, owner.unwrap_or(viewer), &title, &date);
            item.start_time = start;
            item.end_time = end;
            item.duration = duration;
            item.urgency = urgency;
            match scheduler::create_item(&mut snapshot, &bus, item) {
                Ok(id) => println!("Created {} ({})", title, id),
                Err(e) => println!("Failed to create item: {}", e),
            }
        }
        Commands::AddPrompt {} => {
            if let Err(e) = create_item_from_prompt(&mut snapshot, &bus, viewer) {
                println!("Failed to create item: {}", e);
            }
        }
        Commands::Day { date } => {
            let key = date.unwrap_or_else(|| date_key(today));
            print_day_items(&snapshot, &key);
            let report = dispatch(
                &mut snapshot,
                &bus,
                Intent::DayLoad { date_key: key },
                today,
                viewer,
            );
            println!("{}", commentary::wrap(&report));
        }
        Commands::SuggestNow {} => {
            let report = dispatch(&mut snapshot, &bus, Intent::SuggestNow, today, viewer);
            println!("{}", commentary::wrap(&report));
        }
        Commands::PlaceTasks {} => {
            let report = dispatch(&mut snapshot, &bus, Intent::PlaceTasks, today, viewer);
            println!("{}", commentary::wrap(&report));
        }
        Commands::FindTime { minutes } => {
            let report = dispatch(
                &mut snapshot,
                &bus,
                Intent::FreeTime {
                    duration_minutes: minutes,
                },
                today,
                viewer,
            );
            println!("{}", commentary::wrap(&report));
        }
        Commands::Train { sessions, minutes } => {
            let report = dispatch(
                &mut snapshot,
                &bus,
                Intent::Training {
                    sessions,
                    session_minutes: minutes,
                },
                today,
                viewer,
            );
            println!("{}", commentary::wrap(&report));
        }
        Commands::Postpone { date, id } => {
            match scheduler::postpone_task(&mut snapshot, &bus, &date, &id) {
                Ok(new_key) => println!("Moved to {}", new_key),
                Err(e) => println!("Failed to postpone: {}", e),
            }
        }
        Commands::Done { date, id } => {
            match scheduler::mark_done(&mut snapshot, &bus, &date, &id) {
                Ok(()) => println!("Done."),
                Err(e) => println!("Failed to remove item: {}", e),
            }
        }
    }
}

fn print_day_items(db: &DB, date_key: &str) {
    let Some(bucket) = db.get(date_key) else {
        println!("Nothing on {}.", date_key);
        return;
    };
    let mut items: Vec<&CalendarItem> = bucket.values().collect();
    // Timed items first, ordered by clock; HH:MM sorts lexicographically.
    items.sort_by(|a, b| match (&a.start_time, &b.start_time) {
        (Some(a_start), Some(b_start)) => a_start.cmp(b_start),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.title.cmp(&b.title),
    });
    for item in items {
        let mut line = format!("  [{}] {} ({})", item.id, item.title, item.owner);
        if let (Some(start), Some(end)) = (&item.start_time, &item.end_time) {
            line.push_str(&format!(" {}–{}", start, end));
        }
        if item.urgency != Urgency::None {
            line.push_str(&format!(" urgency:{}", item.urgency));
        }
        if item.is_recurring() {
            line.push_str(" (recurring)");
        }
        println!("{}", line);
    }
}

fn create_item_from_prompt(db: &mut DB, bus: &StoreBus, viewer: Owner) -> Result<String, String> {
    let title = Text::new("Title:").prompt().map_err(|e| e.to_string())?;
    let date = Text::new("Date (YYYY-MM-DD, empty for undated):")
        .prompt()
        .map_err(|e| e.to_string())?;
    let kind_answer = Text::new("Kind (task/event):")
        .with_default("task")
        .prompt()
        .map_err(|e| e.to_string())?;
    let start = Text::new("Start time (HH:MM, optional):")
        .prompt()
        .map_err(|e| e.to_string())?;
    let end = Text::new("End time (HH:MM, optional):")
        .prompt()
        .map_err(|e| e.to_string())?;
    let duration = Text::new("Estimated minutes (optional):")
        .prompt()
        .map_err(|e| e.to_string())?;
    let urgency = Text::new("Urgency (today/week/month/none):")
        .with_default("none")
        .prompt()
        .map_err(|e| e.to_string())?;

    let date = if date.trim().is_empty() {
        UNDATED_KEY.to_string()
    } else {
        date.trim().to_string()
    };
    let mut item = CalendarItem::new(
        ItemKind::from_str(kind_answer.trim())?,
        viewer,
        title.trim(),
        &date,
    );
    item.start_time = non_empty(start);
    item.end_time = non_empty(end);
    item.duration = match non_empty(duration) {
        Some(value) => Some(value.parse::<i64>().map_err(|e| e.to_string())?),
        None => None,
    };
    item.urgency = Urgency::from_str(urgency.trim())?;

    let id = scheduler::create_item(db, bus, item)?;
    println!("Created {} ({})", title.trim(), id);
    Ok(id)
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
