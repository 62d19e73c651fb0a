use crate::models::item::Owner;
use crate::store::DB;

/// The planner only schedules inside this fixed daily window.
pub const DAY_START_MINUTES: u32 = 8 * 60;
pub const DAY_END_MINUTES: u32 = 22 * 60;

/// Gaps shorter than this are not worth surfacing as free time.
pub const MIN_SLOT_MINUTES: u32 = 30;

/// One day's load summary: total committed minutes plus the free windows
/// (closed-open, minutes since midnight) left inside [08:00, 22:00).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLoad {
    pub daily_load_minutes: u32,
    pub free_slots: Vec<(u32, u32)>,
}

/// Computes busy minutes and free windows for one date bucket, as seen by
/// `viewer`. Pure and deterministic; items with malformed times and the
/// other member's solo items contribute nothing.
pub fn compute_day_load(db: &DB, date_key: &str, viewer: Owner) -> DayLoad {
    let mut segments: Vec<(u32, u32)> = Vec::new();
    if let Some(bucket) = db.get(date_key) {
        for item in bucket.values() {
            if !item.counts_for(viewer) {
                continue;
            }
            if let Some(segment) = item.busy_segment() {
                segments.push(segment);
            }
        }
    }

    let merged = merge_segments(segments);
    let daily_load_minutes = merged.iter().map(|(start, end)| end - start).sum();

    let mut free_slots = Vec::new();
    let mut cursor = DAY_START_MINUTES;
    for &(start, end) in &merged {
        // Segments at or past the day end cannot bound a free window; the
        // trailing gap below already stops at the day bound.
        if start >= DAY_END_MINUTES {
            break;
        }
        if start > cursor && start - cursor >= MIN_SLOT_MINUTES {
            free_slots.push((cursor, start));
        }
        cursor = cursor.max(end);
    }
    if DAY_END_MINUTES > cursor && DAY_END_MINUTES - cursor >= MIN_SLOT_MINUTES {
        free_slots.push((cursor, DAY_END_MINUTES));
    }

    DayLoad {
        daily_load_minutes,
        free_slots,
    }
}

/// Merges overlapping or touching intervals into the minimal sorted set of
/// disjoint intervals covering the same minutes.
fn merge_segments(mut segments: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    segments.sort_by_key(|segment| segment.0);
    let mut merged: Vec<(u32, u32)> = Vec::new();
    for segment in segments {
        match merged.last_mut() {
            Some(last) if segment.0 <= last.1 => last.1 = last.1.max(segment.1),
            _ => merged.push(segment),
        }
    }
    merged
}
