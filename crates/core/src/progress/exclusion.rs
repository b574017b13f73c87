//! Exclusion filter for non-productive time entries.
//!
//! A time entry is excluded when its comment or its issue subject
//! contains one of the applicable keywords. The first matching keyword
//! in list order is the recorded reason; matching stops there.

use redtrack_domain::constants::DEFAULT_EXCLUDE_KEYWORDS;
use redtrack_domain::UserSetting;

/// Resolve the keyword list for a user: the configured non-empty list
/// wins, otherwise the default list applies.
pub fn effective_keywords(setting: Option<&UserSetting>) -> Vec<String> {
    match setting {
        Some(setting) if !setting.exclude_keywords.is_empty() => setting.exclude_keywords.clone(),
        _ => DEFAULT_EXCLUDE_KEYWORDS.iter().map(|keyword| (*keyword).to_string()).collect(),
    }
}

/// First keyword (in list order) found in the comment or the subject,
/// matched case-insensitively. `None` when the entry is productive.
pub fn exclusion_reason<'k>(
    comments: Option<&str>,
    issue_subject: Option<&str>,
    keywords: &'k [String],
) -> Option<&'k str> {
    let comments = comments.unwrap_or_default().to_lowercase();
    let subject = issue_subject.unwrap_or_default().to_lowercase();

    keywords
        .iter()
        .find(|keyword| {
            let needle = keyword.to_lowercase();
            !needle.is_empty() && (comments.contains(&needle) || subject.contains(&needle))
        })
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| (*k).to_string()).collect()
    }

    #[test]
    fn matches_keyword_in_comment_case_insensitively() {
        let list = keywords(&["paid leave"]);
        let reason = exclusion_reason(Some("Half-day Paid Leave"), None, &list);
        assert_eq!(reason, Some("paid leave"));
    }

    #[test]
    fn matches_keyword_in_issue_subject() {
        let list = keywords(&["morning meeting"]);
        let reason = exclusion_reason(None, Some("Weekly morning meeting notes"), &list);
        assert_eq!(reason, Some("morning meeting"));
    }

    #[test]
    fn first_matching_keyword_wins_over_later_ones() {
        let list = keywords(&["meeting", "morning meeting"]);
        let reason = exclusion_reason(Some("morning meeting"), None, &list);
        assert_eq!(reason, Some("meeting"));
    }

    #[test]
    fn no_match_returns_none() {
        let list = keywords(&["paid leave"]);
        assert_eq!(exclusion_reason(Some("implementing parser"), Some("Parser work"), &list), None);
    }

    #[test]
    fn japanese_keywords_match_verbatim() {
        let list = keywords(&["朝会"]);
        assert_eq!(exclusion_reason(Some("朝会に参加"), None, &list), Some("朝会"));
    }

    #[test]
    fn configured_list_replaces_default() {
        let setting = UserSetting {
            user_id: 1,
            monthly_working_hours: None,
            exclude_keywords: vec!["standup".to_string()],
        };
        assert_eq!(effective_keywords(Some(&setting)), vec!["standup".to_string()]);
    }

    #[test]
    fn empty_configured_list_falls_back_to_default() {
        let setting =
            UserSetting { user_id: 1, monthly_working_hours: None, exclude_keywords: Vec::new() };
        let resolved = effective_keywords(Some(&setting));
        assert!(resolved.iter().any(|k| k == "paid leave"));
        assert_eq!(resolved, effective_keywords(None));
    }
}
