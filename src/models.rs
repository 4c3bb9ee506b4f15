use std::collections::BTreeMap;

use serde::Serialize;

/// Variant order is legend order on the timeline chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    FirstTimeInquiry,
    FirstTimeOutreach,
    FollowUpMeeting,
    Reoccurring,
    Repeat,
    CommunityMeeting,
    Standalone,
    Scheduling,
    Concern,
    Other,
}

impl InteractionType {
    pub const ALL: [InteractionType; 10] = [
        InteractionType::FirstTimeInquiry,
        InteractionType::FirstTimeOutreach,
        InteractionType::FollowUpMeeting,
        InteractionType::Reoccurring,
        InteractionType::Repeat,
        InteractionType::CommunityMeeting,
        InteractionType::Standalone,
        InteractionType::Scheduling,
        InteractionType::Concern,
        InteractionType::Other,
    ];

    pub fn is_first_contact(self) -> bool {
        matches!(
            self,
            InteractionType::FirstTimeInquiry | InteractionType::FirstTimeOutreach
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Meeting,
    Event,
    Other,
}

impl ActivityKind {
    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::Meeting => "meeting",
            ActivityKind::Event => "event",
            ActivityKind::Other => "other",
        }
    }
}

/// One half of a `"<date>, <time>"` cell, split on the first comma.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeParts {
    pub date: Option<String>,
    pub time: Option<String>,
}

impl DateTimeParts {
    pub fn display(&self) -> Option<String> {
        match (&self.date, &self.time) {
            (Some(date), Some(time)) => Some(format!("{date} {time}")),
            (Some(date), None) => Some(date.clone()),
            (None, Some(time)) => Some(time.clone()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InteractionRecord {
    /// 1-based, header excluded.
    pub row: usize,
    pub parent_campaign: String,
    pub activity: ActivityKind,
    pub interaction_label: Option<String>,
    pub interaction_type: Option<InteractionType>,
    pub start: DateTimeParts,
    pub end: DateTimeParts,
    pub day_index: Option<i64>,
    pub site: Option<String>,
}

impl InteractionRecord {
    pub fn is_first_contact(&self) -> bool {
        self.interaction_type
            .map(InteractionType::is_first_contact)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub record: InteractionRecord,
    pub sequence: usize,
    pub day_offset: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ParentCampaign {
    pub name: String,
    /// Ordered by day-index, undated records last.
    pub entries: Vec<TimelineEntry>,
    pub anchor_day: Option<i64>,
    pub total_interactions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberRecord {
    pub parent_campaign: Option<String>,
    pub campaign_name: Option<String>,
    pub affiliation: Option<String>,
    pub full_name: Option<String>,
    pub interaction_type: Option<InteractionType>,
}

impl MemberRecord {
    pub fn is_first_contact(&self) -> bool {
        self.interaction_type
            .map(InteractionType::is_first_contact)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignCard {
    pub name: String,
    pub participants: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub day_offset: i64,
    pub interaction_type: InteractionType,
    pub is_first_contact: bool,
    pub sequence: usize,
    pub activity: ActivityKind,
    pub starts: Option<String>,
    pub ends: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignTimeline {
    pub campaign: String,
    pub span_days: Option<i64>,
    pub points: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub interaction_type: InteractionType,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineView {
    pub site: Option<String>,
    pub campaigns: Vec<CampaignTimeline>,
    pub legend: Vec<LegendEntry>,
    pub max_offset: Option<i64>,
}

/// Sub-campaign -> affiliation -> sorted participant names.
pub type AffiliationTree = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignDetail {
    pub campaign: String,
    pub sub_campaigns: AffiliationTree,
    pub participant_count: usize,
    pub distinct_affiliations: usize,
    pub days_after: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SummaryTiles {
    pub total_first_time: usize,
    pub unique_affiliations: usize,
    pub unique_campaigns: usize,
}
