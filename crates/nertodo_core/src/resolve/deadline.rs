//! Deadline resolver.
//!
//! # Responsibility
//! - Pick the task title from the first `ACTION ITEM` entity.
//! - Map the first `RELATIVE DAY` entity onto a calendar date.
//!
//! # Invariants
//! - A recognized weekday resolves 1..=7 days after `today`, never today.
//! - An unrecognized phrase resolves to `today`.
//! - No `RELATIVE DAY` entity means no result.
//! - Input entities are never mutated.

use crate::model::entity::{Entity, EntityType};
use crate::model::task::{format_deadline, TaskDraft};
use crate::resolve::clock::Clock;
use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Weekday keywords in match priority order.
const WEEKDAY_KEYWORDS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// Title and deadline extracted from one NER response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask {
    /// Empty when no action item was recognized.
    pub title: String,
    pub deadline: NaiveDate,
}

impl ResolvedTask {
    /// Deadline in `YYYY-MM-DD` form.
    pub fn deadline_string(&self) -> String {
        format_deadline(self.deadline)
    }

    pub fn into_draft(self) -> TaskDraft {
        TaskDraft {
            title: self.title,
            deadline: self.deadline,
        }
    }
}

/// Resolves entities against an explicit `today`.
///
/// Returns `None` when no `RELATIVE DAY` entity is present. For duplicate
/// entity types the first occurrence wins.
pub fn resolve_deadline(entities: &[Entity], today: NaiveDate) -> Option<ResolvedTask> {
    let title = first_text(entities, EntityType::ActionItem).unwrap_or_default();
    let relative_day = first_text(entities, EntityType::RelativeDay)?;

    let offset = match match_weekday(relative_day) {
        Some(target) => days_until(today.weekday(), target),
        None => 0,
    };

    // Saturates at the end of the representable calendar.
    let deadline = today
        .checked_add_days(Days::new(offset))
        .unwrap_or(today);

    Some(ResolvedTask {
        title: title.to_string(),
        deadline,
    })
}

/// Resolves entities against the clock's current UTC date.
pub fn resolve_with_clock(entities: &[Entity], clock: &dyn Clock) -> Option<ResolvedTask> {
    resolve_deadline(entities, clock.today())
}

/// Finds the highest-priority weekday named in `phrase`, case-insensitively.
pub fn match_weekday(phrase: &str) -> Option<Weekday> {
    let normalized = phrase.to_lowercase();
    WEEKDAY_KEYWORDS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, weekday)| *weekday)
}

/// Days from `today` to the next `target`, in `1..=7`.
pub fn days_until(today: Weekday, target: Weekday) -> u64 {
    let diff = (i64::from(target.num_days_from_sunday())
        - i64::from(today.num_days_from_sunday()))
    .rem_euclid(7);
    if diff == 0 {
        7
    } else {
        diff as u64
    }
}

fn first_text(entities: &[Entity], kind: EntityType) -> Option<&str> {
    entities
        .iter()
        .find(|entity| entity.kind == kind)
        .map(|entity| entity.text.as_str())
}
