//! Domain constants shared across the aggregation engine.

use chrono::NaiveDate;

/// Page size used when paging through the time-entries endpoint.
pub const TIME_ENTRY_PAGE_SIZE: usize = 100;

/// Page size used when paging through the issues endpoint.
pub const ISSUE_PAGE_SIZE: usize = 100;

/// Maximum number of issue ids per batch detail lookup.
pub const ISSUE_BATCH_SIZE: usize = 20;

/// Hours counted for one business day.
pub const HOURS_PER_WORKING_DAY: f64 = 8.0;

/// Keywords that mark a time entry as non-productive when no per-user
/// list is configured. Matched case-insensitively against the entry
/// comment and the issue subject.
pub const DEFAULT_EXCLUDE_KEYWORDS: &[&str] =
    &["core day", "morning meeting", "paid leave", "コアデイ", "朝会", "有給"];

/// Status names treated as completed when a status has never been
/// classified before. Once a status is cached, the cached flag wins.
pub const COMPLETED_STATUS_NAMES: &[&str] = &[
    "Closed",
    "完了",
    "終了",
    "Resolved",
    "解決",
    "Done",
    "Fixed",
    "修正済み",
    "Feedback",
    "フィードバック",
];

/// Returns true when `name` belongs to the canonical completed set.
pub fn is_canonical_completed(name: &str) -> bool {
    COMPLETED_STATUS_NAMES.contains(&name)
}

// Japanese national holidays for 2025. Default value for the injectable
// calendar configuration, not a hard dependency of the calculator.
const DEFAULT_HOLIDAY_DATES: &[(i32, u32, u32)] = &[
    (2025, 1, 1),
    (2025, 1, 13),
    (2025, 2, 11),
    (2025, 2, 23),
    (2025, 3, 21),
    (2025, 4, 29),
    (2025, 5, 3),
    (2025, 5, 4),
    (2025, 5, 5),
    (2025, 5, 6),
    (2025, 7, 21),
    (2025, 8, 11),
    (2025, 9, 15),
    (2025, 9, 23),
    (2025, 10, 13),
    (2025, 11, 3),
    (2025, 11, 23),
    (2025, 12, 23),
];

/// Default holiday calendar used when no holidays are configured.
pub fn default_holidays() -> Vec<NaiveDate> {
    DEFAULT_HOLIDAY_DATES
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}
