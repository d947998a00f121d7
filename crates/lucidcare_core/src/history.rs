//! crates/lucidcare_core/src/history.rs
//!
//! Groups a user's summaries into recency buckets for the history view and
//! derives the short title and preview shown for each entry.

use chrono::{DateTime, Utc};

use crate::domain::Summary;

const FALLBACK_TITLE: &str = "Medical Summary";
const TITLE_MAX_CHARS: usize = 60;
const PREVIEW_MAX_CHARS: usize = 120;

/// A run of summaries sharing the same recency label.
#[derive(Debug, Clone)]
pub struct SummaryGroup {
    pub label: String,
    pub entries: Vec<HistoryEntry>,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub title: String,
    pub preview: String,
    pub summary: Summary,
}

/// The bucket label for a timestamp relative to `now`.
///
/// Day distance counts whole 24-hour periods, so something created 30 hours
/// ago is "Yesterday" regardless of the calendar date.
pub fn recency_label(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created_at).num_days();
    match days {
        d if d <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d < 7 => format!("{} days ago", d),
        _ => created_at.format("%B %-d, %Y").to_string(),
    }
}

/// Groups summaries by recency label, keeping the order in which labels first
/// appear. Callers pass summaries newest first, so groups come out newest first.
pub fn group_by_recency(summaries: Vec<Summary>, now: DateTime<Utc>) -> Vec<SummaryGroup> {
    let mut groups: Vec<SummaryGroup> = Vec::new();

    for summary in summaries {
        let label = recency_label(summary.created_at, now);
        let entry = HistoryEntry {
            title: derive_title(&summary.summary_text),
            preview: derive_preview(&summary.summary_text),
            summary,
        };

        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.entries.push(entry),
            None => groups.push(SummaryGroup {
                label,
                entries: vec![entry],
            }),
        }
    }

    groups
}

/// The first non-blank line with markdown emphasis/heading markers removed.
pub fn derive_title(text: &str) -> String {
    let first = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or(FALLBACK_TITLE);

    let title: String = first
        .trim_matches(|c: char| matches!(c, '#' | '*' | '_') || c.is_whitespace())
        .chars()
        .take(TITLE_MAX_CHARS)
        .collect();

    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}

/// A one-line snippet of everything after the title line.
pub fn derive_preview(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let body = lines.get(1..).map(|rest| rest.join(" ")).unwrap_or_default();
    if !body.is_empty() {
        return body.chars().take(PREVIEW_MAX_CHARS).collect();
    }

    lines
        .first()
        .map(|l| l.chars().take(PREVIEW_MAX_CHARS).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Language;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn summary(id: i64, text: &str, created_at: DateTime<Utc>) -> Summary {
        Summary {
            summary_id: id,
            user_id: Uuid::nil(),
            summary_text: text.to_string(),
            language: Language::English,
            created_at,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn labels_follow_elapsed_days() {
        let now = now();
        assert_eq!(recency_label(now - Duration::hours(3), now), "Today");
        assert_eq!(recency_label(now - Duration::hours(30), now), "Yesterday");
        assert_eq!(recency_label(now - Duration::days(4), now), "4 days ago");
        assert_eq!(recency_label(now - Duration::days(16), now), "March 4, 2025");
    }

    #[test]
    fn future_timestamps_count_as_today() {
        let now = now();
        assert_eq!(recency_label(now + Duration::minutes(5), now), "Today");
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let now = now();
        let groups = group_by_recency(
            vec![
                summary(4, "a", now - Duration::hours(1)),
                summary(3, "b", now - Duration::hours(2)),
                summary(2, "c", now - Duration::hours(26)),
                summary(1, "d", now - Duration::days(20)),
            ],
            now,
        );

        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Today", "Yesterday", "February 28, 2025"]);
        let today_ids: Vec<i64> = groups[0].entries.iter().map(|e| e.summary.summary_id).collect();
        assert_eq!(today_ids, vec![4, 3]);
    }

    #[test]
    fn title_strips_markdown_markers() {
        assert_eq!(derive_title("\n\n## **Vitals and Lab Data**\nHb: 9"), "Vitals and Lab Data");
        assert_eq!(derive_title("   "), "Medical Summary");
        assert_eq!(derive_title("***"), "Medical Summary");
        assert_eq!(derive_title("## **Vitals and Lab Data**"), "Vitals and Lab Data");
        assert_eq!(derive_title("# __ Integrated Summary __ #"), "Integrated Summary");
        assert_eq!(derive_title(&"x".repeat(100)).chars().count(), 60);
    }

    #[test]
    fn preview_skips_title_line() {
        assert_eq!(derive_preview("Title\nline one\n\nline two"), "line one line two");
        assert_eq!(derive_preview("Only line"), "Only line");
        assert_eq!(derive_preview(""), "");
    }
}
