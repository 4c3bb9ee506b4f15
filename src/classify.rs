use chrono::NaiveDate;
use tracing::debug;

use crate::models::{ActivityKind, DateTimeParts, InteractionRecord, InteractionType};
use crate::normalize::clean_campaign_name;

const DATE_FORMAT: &str = "%m/%d/%Y";

/// Day-indexes count whole days from 1960-01-01, the legacy numeric-date epoch.
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1960, 1, 1).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionStyle {
    pub label: &'static str,
    pub legend: &'static str,
    pub color: &'static str,
}

pub fn style(kind: InteractionType) -> InteractionStyle {
    let (label, legend, color) = match kind {
        InteractionType::FirstTimeInquiry => (
            "1st Time Inquiry – Requested by Org or Group",
            "First-Time Inquiry",
            "#1f77b4",
        ),
        InteractionType::FirstTimeOutreach => (
            "1st Time Outreach – Initiated by ECA Staff",
            "First-Time Outreach",
            "#2ca02c",
        ),
        InteractionType::FollowUpMeeting => (
            "Follow Up Project Planning or Problem-Solving Meeting",
            "Follow-Up Meeting",
            "#FF0000",
        ),
        InteractionType::Reoccurring => ("Reoccurring activity", "Reoccurring", "#00FF00"),
        InteractionType::Repeat => (
            "Repeat – For Purposes of Ongoing Participation or to Rep ECA",
            "Repeat",
            "#0000FF",
        ),
        InteractionType::CommunityMeeting => ("Community Meeting", "Community Meeting", "#FFA500"),
        InteractionType::Standalone => ("Stand alone activity", "Standalone", "#800080"),
        InteractionType::Scheduling => (
            "Scheduling or Show-and-Tell Visit",
            "Scheduling",
            "#008080",
        ),
        InteractionType::Concern => (
            "Resident, Institutional or City Concern",
            "Concern",
            "#FF69B4",
        ),
        InteractionType::Other => ("Other, such as Room Request", "Other", "#808080"),
    };
    InteractionStyle {
        label,
        legend,
        color,
    }
}

/// Exact match against the export's category labels, ignoring surrounding
/// whitespace. Unrecognised text is uncategorised, never an error.
pub fn parse_interaction_type(label: &str) -> Option<InteractionType> {
    let label = label.trim();
    InteractionType::ALL
        .into_iter()
        .find(|kind| style(*kind).label == label)
}

pub fn parse_activity_kind(value: Option<&str>) -> ActivityKind {
    match value.map(str::trim) {
        Some("Meeting") => ActivityKind::Meeting,
        Some("Event") => ActivityKind::Event,
        _ => ActivityKind::Other,
    }
}

pub fn split_date_time(value: Option<&str>) -> DateTimeParts {
    let Some(value) = value else {
        return DateTimeParts::default();
    };
    let (date, time) = match value.split_once(',') {
        Some((date, time)) => (date, Some(time)),
        None => (value, None),
    };
    DateTimeParts {
        date: non_blank(date),
        time: time.and_then(non_blank),
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

pub fn day_index(date: NaiveDate) -> i64 {
    (date - epoch()).num_days()
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct RawActivityRow {
    pub row: usize,
    pub parent_campaign: Option<String>,
    pub activity_type: Option<String>,
    pub interaction_type: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub site: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFlags {
    pub unparsed_date: bool,
    pub uncategorized: bool,
}

/// `None` when the row has no usable parent campaign name.
pub fn classify(raw: RawActivityRow) -> Option<(InteractionRecord, RowFlags)> {
    let parent_campaign = raw
        .parent_campaign
        .as_deref()
        .map(clean_campaign_name)
        .filter(|name| !name.is_empty())?;

    let start = split_date_time(raw.start.as_deref());
    let end = split_date_time(raw.end.as_deref());
    let day_index = start.date.as_deref().and_then(parse_date).map(day_index);

    let mut flags = RowFlags::default();
    if day_index.is_none() {
        debug!(row = raw.row, start = ?raw.start, "start date did not parse");
        flags.unparsed_date = true;
    }

    let interaction_type = raw.interaction_type.as_deref().and_then(parse_interaction_type);
    if interaction_type.is_none() {
        debug!(row = raw.row, label = ?raw.interaction_type, "uncategorized interaction type");
        flags.uncategorized = true;
    }

    let record = InteractionRecord {
        row: raw.row,
        parent_campaign,
        activity: parse_activity_kind(raw.activity_type.as_deref()),
        interaction_label: raw.interaction_type,
        interaction_type,
        start,
        end,
        day_index,
        site: raw.site,
    };
    Some((record, flags))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(interaction: &str, start: &str) -> RawActivityRow {
        RawActivityRow {
            row: 1,
            parent_campaign: Some("PARENT1: CEC - Riverside Library".to_string()),
            activity_type: Some("Meeting".to_string()),
            interaction_type: Some(interaction.to_string()),
            start: Some(start.to_string()),
            end: Some("01/05/2025, 11:30 AM".to_string()),
            site: Some("Central".to_string()),
        }
    }

    #[test]
    fn splits_on_first_comma_only() {
        let parts = split_date_time(Some("01/05/2025, 10:00 AM, late"));
        assert_eq!(parts.date.as_deref(), Some("01/05/2025"));
        assert_eq!(parts.time.as_deref(), Some("10:00 AM, late"));

        let parts = split_date_time(Some("01/05/2025"));
        assert_eq!(parts.date.as_deref(), Some("01/05/2025"));
        assert_eq!(parts.time, None);

        assert_eq!(split_date_time(None), DateTimeParts::default());
    }

    #[test]
    fn day_index_counts_from_1960() {
        assert_eq!(day_index(epoch()), 0);
        let date = parse_date("01/02/1960").unwrap();
        assert_eq!(day_index(date), 1);
        let date = parse_date("1/1/2025").unwrap();
        assert_eq!(day_index(date), 23742);
    }

    #[test]
    fn bad_dates_leave_day_index_empty() {
        let (record, flags) = classify(raw("Community Meeting", "next tuesday, 10:00 AM")).unwrap();
        assert_eq!(record.day_index, None);
        assert!(flags.unparsed_date);
        assert_eq!(record.interaction_type, Some(InteractionType::CommunityMeeting));
    }

    #[test]
    fn every_label_round_trips_through_the_style_table() {
        for kind in InteractionType::ALL {
            assert_eq!(parse_interaction_type(style(kind).label), Some(kind));
        }
        assert_eq!(
            parse_interaction_type(" 1st Time Outreach – Initiated by ECA Staff "),
            Some(InteractionType::FirstTimeOutreach)
        );
    }

    #[test]
    fn unknown_labels_are_kept_uncategorized() {
        let (record, flags) = classify(raw("Coffee chat", "01/05/2025, 10:00 AM")).unwrap();
        assert_eq!(record.interaction_type, None);
        assert_eq!(record.interaction_label.as_deref(), Some("Coffee chat"));
        assert!(!record.is_first_contact());
        assert!(flags.uncategorized);
    }

    #[test]
    fn classify_cleans_campaign_and_activity() {
        let (record, flags) = classify(raw(
            "1st Time Inquiry – Requested by Org or Group",
            "01/05/2025, 10:00 AM",
        ))
        .unwrap();
        assert_eq!(record.parent_campaign, "Riverside Library");
        assert_eq!(record.activity, ActivityKind::Meeting);
        assert!(record.is_first_contact());
        assert_eq!(record.start.time.as_deref(), Some("10:00 AM"));
        assert_eq!(record.end.time.as_deref(), Some("11:30 AM"));
        assert_eq!(record.day_index, Some(23746));
        assert_eq!(flags, RowFlags::default());
    }

    #[test]
    fn activity_kind_matches_exact_words() {
        assert_eq!(parse_activity_kind(Some("Event")), ActivityKind::Event);
        assert_eq!(parse_activity_kind(Some("meeting")), ActivityKind::Other);
        assert_eq!(parse_activity_kind(None), ActivityKind::Other);
    }

    #[test]
    fn rows_without_campaign_are_rejected() {
        let mut row = raw("Community Meeting", "01/05/2025, 10:00 AM");
        row.parent_campaign = Some("Org - ".to_string());
        assert!(classify(row).is_none());
    }
}
