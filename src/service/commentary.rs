use rand::seq::SliceRandom;

use crate::models::item::format_clock;
use crate::service::day_load::DayLoad;
use crate::service::scheduler::{PlacementResult, Suggestion};

// The assistant's voice: calm, joking, roasting or smart, picked at random
// per reply. Cosmetic only; every report below is pure formatting over
// structured engine results.
const CHILL: &[&str] = &[
    "Done deal, I've got this. 😎",
    "Handled quietly in the background. 🧘",
    "Got it, carrying on. 😉",
];
const JOKES: &[&str] = &[
    "If this goes wrong you may blame me, fairly. 😂",
    "I do the work here, you just give the orders. 🤖",
    "One sec... don't tell anyone I'm more organized than you. 🤫",
];
const ROAST: &[&str] = &[
    "Honestly, without me you'd be lost in this calendar. 🔥",
    "You ask me to do things you won't even remember asking for. 😏",
    "I'll sort it this time, next time bring pastries. 😜",
];
const SMART: &[&str] = &[
    "Logistically a wise request, I approve. 📊",
    "I tucked it neatly around your existing load. 🧠",
    "Weighted urgency, load and duration. Came out perfect. 💡",
];

fn flavor_line() -> &'static str {
    let mut rng = rand::thread_rng();
    let family = [CHILL, JOKES, ROAST, SMART]
        .choose(&mut rng)
        .copied()
        .unwrap_or(CHILL);
    family.choose(&mut rng).copied().unwrap_or(CHILL[0])
}

/// Prefixes a report with one random assistant line.
pub fn wrap(report: &str) -> String {
    format!("{}\n{}", flavor_line(), report)
}

fn slot_label(slot: (u32, u32)) -> String {
    format!("{}–{}", format_clock(slot.0), format_clock(slot.1))
}

pub fn day_load_report(date_key: &str, load: &DayLoad) -> String {
    let mut report = format!(
        "On {} you are booked for {} minutes with {} meaningful free window(s) (30+ min).",
        date_key,
        load.daily_load_minutes,
        load.free_slots.len()
    );
    for &slot in &load.free_slots {
        report.push_str(&format!("\n  free {}", slot_label(slot)));
    }
    report
}

pub fn suggestion_report(suggestion: Option<&Suggestion>) -> String {
    match suggestion {
        Some(pick) => format!(
            "Work on \"{}\" now (urgency: {}, about {} min).",
            pick.title, pick.urgency, pick.duration_minutes
        ),
        None => "No tasks for today. Enjoy your free time. 🙌".to_string(),
    }
}

pub fn placement_report(results: &[PlacementResult]) -> String {
    if results.is_empty() {
        return "No undated tasks to place. 😌".to_string();
    }
    let mut lines = Vec::new();
    for result in results {
        match (&result.date_key, &result.start_time) {
            (Some(date_key), Some(start_time)) if result.success => {
                lines.push(format!(
                    "Scheduled \"{}\" for {} at {}.",
                    result.title, date_key, start_time
                ));
            }
            _ => lines.push(format!(
                "Found no suitable window for \"{}\" in the coming weeks.",
                result.title
            )),
        }
    }
    let placed = results.iter().filter(|result| result.success).count();
    lines.push(format!("Placed {} of {} task(s).", placed, results.len()));
    lines.join("\n")
}

pub fn training_report(placed: &[PlacementResult], requested: u32) -> String {
    if placed.is_empty() {
        return "Could not find free time for training this week.".to_string();
    }
    let mut lines = vec![format!(
        "Booked {} of {} training session(s) for the coming week.",
        placed.len(),
        requested
    )];
    for session in placed {
        if let (Some(date_key), Some(start_time)) = (&session.date_key, &session.start_time) {
            lines.push(format!("  {} at {}", date_key, start_time));
        }
    }
    lines.join("\n")
}

pub fn free_time_report(options: &[(String, u32)]) -> String {
    if options.is_empty() {
        return "I found no suitable time windows in the next two weeks.".to_string();
    }
    let mut lines = vec!["I found some time options for you:".to_string()];
    for (idx, (date_key, start)) in options.iter().enumerate() {
        lines.push(format!("{}. {} at {}", idx + 1, date_key, format_clock(*start)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_keeps_the_report_intact() {
        let wrapped = wrap("Placed 1 of 2 task(s).");
        assert!(wrapped.ends_with("Placed 1 of 2 task(s)."));
        assert!(wrapped.lines().count() >= 2);
    }

    #[test]
    fn day_load_report_lists_slots_as_clock_ranges() {
        let load = DayLoad {
            daily_load_minutes: 90,
            free_slots: vec![(480, 540), (630, 1320)],
        };
        let report = day_load_report("2026-03-09", &load);
        assert!(report.contains("90 minutes"));
        assert!(report.contains("08:00–09:00"));
        assert!(report.contains("10:30–22:00"));
    }

    #[test]
    fn placement_report_counts_successes_and_failures() {
        let results = vec![
            PlacementResult {
                success: true,
                title: "laundry".to_string(),
                date_key: Some("2026-03-09".to_string()),
                start_time: Some("08:00".to_string()),
            },
            PlacementResult {
                success: false,
                title: "deep clean".to_string(),
                date_key: None,
                start_time: None,
            },
        ];
        let report = placement_report(&results);
        assert!(report.contains("Scheduled \"laundry\" for 2026-03-09 at 08:00."));
        assert!(report.contains("Found no suitable window for \"deep clean\""));
        assert!(report.contains("Placed 1 of 2 task(s)."));
    }
}
