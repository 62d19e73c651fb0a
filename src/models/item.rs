use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bucket key for tasks that have not been scheduled onto a date yet.
pub const UNDATED_KEY: &str = "undated";

/// Span estimate used when an item carries neither times nor a duration.
pub const DEFAULT_TASK_MINUTES: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    Binyamin,
    Nana,
    Shared,
}

impl std::str::FromStr for Owner {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "binyamin" => Ok(Owner::Binyamin),
            "nana" => Ok(Owner::Nana),
            "shared" => Ok(Owner::Shared),
            other => Err(format!("Unknown owner: {}", other)),
        }
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Owner::Binyamin => "binyamin",
            Owner::Nana => "nana",
            Owner::Shared => "shared",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Event,
}

impl std::str::FromStr for ItemKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "task" => Ok(ItemKind::Task),
            "event" => Ok(ItemKind::Event),
            other => Err(format!("Unknown item kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Today,
    Week,
    Month,
    #[default]
    None,
}

impl Urgency {
    /// Ranking weight for "what should I work on now".
    pub fn score(self) -> u8 {
        match self {
            Urgency::Today => 3,
            Urgency::Week => 2,
            Urgency::Month => 1,
            Urgency::None => 0,
        }
    }

    /// How many days ahead the scheduler searches for a free window.
    pub fn search_horizon_days(self) -> i64 {
        match self {
            Urgency::Today => 0,
            Urgency::Week => 7,
            Urgency::Month | Urgency::None => 14,
        }
    }

    /// How far "postpone" pushes an item out.
    pub fn postpone_offset_days(self) -> i64 {
        match self {
            Urgency::Today | Urgency::None => 1,
            Urgency::Week => 3,
            Urgency::Month => 7,
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "today" => Ok(Urgency::Today),
            "week" => Ok(Urgency::Week),
            "month" => Ok(Urgency::Month),
            "none" => Ok(Urgency::None),
            other => Err(format!("Unknown urgency: {}", other)),
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Urgency::Today => "today",
            Urgency::Week => "week",
            Urgency::Month => "month",
            Urgency::None => "none",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurring {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CalendarItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    pub owner: Owner,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date_key: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub reminder_minutes: Option<i64>,
    #[serde(default)]
    pub recurring: Recurring,
    #[serde(default)]
    pub urgency: Urgency,
}

impl CalendarItem {
    pub fn new(kind: ItemKind, owner: Owner, title: &str, date_key: &str) -> Self {
        CalendarItem {
            id: Uuid::new_v4().to_string(),
            kind,
            owner,
            title: title.to_string(),
            description: String::new(),
            date_key: date_key.to_string(),
            start_time: None,
            end_time: None,
            duration: None,
            address: String::new(),
            reminder_minutes: None,
            recurring: Recurring::None,
            urgency: Urgency::None,
        }
    }

    pub fn is_task(&self) -> bool {
        self.kind == ItemKind::Task
    }

    pub fn is_recurring(&self) -> bool {
        self.recurring != Recurring::None
    }

    /// Whether this item consumes the viewer's time. One member's solo
    /// commitments never block the other; a shared viewer counts everyone.
    pub fn counts_for(&self, viewer: Owner) -> bool {
        match viewer {
            Owner::Shared => true,
            _ => self.owner == viewer || self.owner == Owner::Shared,
        }
    }

    /// The item's busy interval in minutes since midnight, if it has
    /// well-formed clock times. Malformed or inverted times yield nothing;
    /// a single bad record must not block the rest of the day.
    pub fn busy_segment(&self) -> Option<(u32, u32)> {
        let start = parse_clock(self.start_time.as_deref()?)?;
        let end = parse_clock(self.end_time.as_deref()?)?;
        if end < start {
            return None;
        }
        Some((start, end))
    }

    /// Span estimate in minutes: explicit positive duration, else 30.
    pub fn estimated_duration(&self) -> u32 {
        match self.duration {
            Some(minutes) if minutes > 0 => minutes as u32,
            _ => DEFAULT_TASK_MINUTES,
        }
    }

    /// A dated copy of this item, placed into a concrete window. Gets a
    /// fresh id; the caller removes the original from its old bucket.
    pub fn placed_at(&self, date_key: &str, start_minutes: u32, duration: u32) -> CalendarItem {
        CalendarItem {
            id: Uuid::new_v4().to_string(),
            date_key: date_key.to_string(),
            start_time: Some(format_clock(start_minutes)),
            end_time: Some(format_clock(start_minutes + duration)),
            ..self.clone()
        }
    }
}

/// YYYY-MM-DD, zero padded. The only date format the store knows.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// "HH:MM" (24h) to minutes since midnight. None for anything malformed.
pub fn parse_clock(value: &str) -> Option<u32> {
    let (hours, minutes) = value.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

pub fn format_clock(minutes_since_midnight: u32) -> String {
    format!(
        "{:02}:{:02}",
        minutes_since_midnight / 60,
        minutes_since_midnight % 60
    )
}
