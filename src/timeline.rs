use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::models::{InteractionRecord, ParentCampaign, TimelineEntry};

pub fn build_timeline(records: Vec<InteractionRecord>) -> Vec<ParentCampaign> {
    let mut groups: BTreeMap<String, Vec<InteractionRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.parent_campaign.clone())
            .or_default()
            .push(record);
    }

    groups
        .into_iter()
        .map(|(name, records)| build_campaign(name, records))
        .collect()
}

fn build_campaign(name: String, mut records: Vec<InteractionRecord>) -> ParentCampaign {
    // Stable: same-day records keep their input order. Undated records sort last.
    records.sort_by_key(|r| (r.day_index.is_none(), r.day_index));

    let anchor_day = first_contact_anchor(&records);
    if anchor_day.is_none() {
        warn!(campaign = %name, records = records.len(), "campaign has no dated first contact");
    }

    let total_interactions = records
        .iter()
        .filter(|r| r.interaction_label.is_some())
        .count();

    for record in records.iter().filter(|r| r.day_index.is_none()) {
        debug!(campaign = %name, row = record.row, "undated interaction ranked last");
    }

    let entries = records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| TimelineEntry {
            sequence: idx + 1,
            day_offset: day_offset(&record, anchor_day),
            record,
        })
        .collect();

    ParentCampaign {
        name,
        entries,
        anchor_day,
        total_interactions,
    }
}

pub fn first_contact_anchor(records: &[InteractionRecord]) -> Option<i64> {
    records
        .iter()
        .filter(|r| r.is_first_contact())
        .filter_map(|r| r.day_index)
        .min()
}

/// Days since the anchor. A first contact that lands after the anchor is not
/// the campaign's real first contact and gets no offset.
pub fn day_offset(record: &InteractionRecord, anchor_day: Option<i64>) -> Option<i64> {
    let offset = record.day_index? - anchor_day?;
    if record.is_first_contact() && offset > 0 {
        None
    } else {
        Some(offset)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{ActivityKind, DateTimeParts, InteractionType};
    use proptest::prelude::*;

    pub(crate) fn record(
        campaign: &str,
        kind: Option<InteractionType>,
        day_index: Option<i64>,
        row: usize,
    ) -> InteractionRecord {
        InteractionRecord {
            row,
            parent_campaign: campaign.to_string(),
            activity: ActivityKind::Meeting,
            interaction_label: kind.map(|k| crate::classify::style(k).label.to_string()),
            interaction_type: kind,
            start: DateTimeParts::default(),
            end: DateTimeParts::default(),
            day_index,
            site: None,
        }
    }

    fn offsets(campaign: &ParentCampaign) -> Vec<Option<i64>> {
        campaign.entries.iter().map(|e| e.day_offset).collect()
    }

    #[test]
    fn offsets_are_relative_to_first_outreach() {
        let records = vec![
            record("Riverside", Some(InteractionType::Repeat), Some(130), 1),
            record("Riverside", Some(InteractionType::FirstTimeOutreach), Some(100), 2),
            record("Riverside", Some(InteractionType::FollowUpMeeting), Some(105), 3),
        ];
        let campaigns = build_timeline(records);
        assert_eq!(campaigns.len(), 1);
        let campaign = &campaigns[0];
        assert_eq!(campaign.anchor_day, Some(100));
        assert_eq!(offsets(campaign), vec![Some(0), Some(5), Some(30)]);
        assert_eq!(campaign.total_interactions, 3);
    }

    #[test]
    fn later_first_contact_is_suppressed() {
        let records = vec![
            record("Harbor", Some(InteractionType::FirstTimeInquiry), Some(50), 1),
            record("Harbor", Some(InteractionType::FirstTimeOutreach), Some(60), 2),
        ];
        let campaign = &build_timeline(records)[0];
        assert_eq!(campaign.anchor_day, Some(50));
        assert_eq!(offsets(campaign), vec![Some(0), None]);
    }

    #[test]
    fn tied_first_contacts_both_sit_at_zero() {
        let records = vec![
            record("Harbor", Some(InteractionType::FirstTimeOutreach), Some(50), 1),
            record("Harbor", Some(InteractionType::FirstTimeInquiry), Some(50), 2),
            record("Harbor", Some(InteractionType::Concern), Some(52), 3),
        ];
        let campaign = &build_timeline(records)[0];
        assert_eq!(offsets(campaign), vec![Some(0), Some(0), Some(2)]);
        let rows: Vec<usize> = campaign.entries.iter().map(|e| e.record.row).collect();
        assert_eq!(rows, vec![1, 2, 3]);
    }

    #[test]
    fn campaign_without_first_contact_is_unplaced() {
        let records = vec![
            record("Lakeview", Some(InteractionType::CommunityMeeting), Some(10), 1),
            record("Lakeview", Some(InteractionType::Repeat), Some(20), 2),
        ];
        let campaign = &build_timeline(records)[0];
        assert_eq!(campaign.anchor_day, None);
        assert_eq!(offsets(campaign), vec![None, None]);
        assert_eq!(campaign.entries.len(), 2);
    }

    #[test]
    fn undated_first_contact_does_not_anchor() {
        let records = vec![
            record("Lakeview", Some(InteractionType::FirstTimeInquiry), None, 1),
            record("Lakeview", Some(InteractionType::FirstTimeOutreach), Some(40), 2),
            record("Lakeview", Some(InteractionType::Repeat), Some(30), 3),
        ];
        let campaign = &build_timeline(records)[0];
        assert_eq!(campaign.anchor_day, Some(40));
        // Sorted: day 30, day 40, undated.
        assert_eq!(offsets(campaign), vec![Some(-10), Some(0), None]);
        assert_eq!(campaign.entries[2].record.row, 1);
    }

    #[test]
    fn groups_are_keyed_by_campaign_and_ranked_from_one() {
        let records = vec![
            record("B", Some(InteractionType::FirstTimeInquiry), Some(5), 1),
            record("A", Some(InteractionType::FirstTimeInquiry), Some(9), 2),
            record("B", None, Some(7), 3),
        ];
        let campaigns = build_timeline(records);
        let names: Vec<&str> = campaigns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let ranks: Vec<usize> = campaigns[1].entries.iter().map(|e| e.sequence).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert_eq!(campaigns[1].total_interactions, 1);
    }

    fn kind() -> impl Strategy<Value = Option<InteractionType>> {
        prop_oneof![
            Just(None),
            (0..InteractionType::ALL.len()).prop_map(|i| Some(InteractionType::ALL[i])),
        ]
    }

    fn records() -> impl Strategy<Value = Vec<InteractionRecord>> {
        proptest::collection::vec((kind(), proptest::option::of(0i64..20)), 1..40).prop_map(
            |rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(row, (kind, day))| record("Campaign", kind, day, row))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn ranks_are_a_stable_permutation(records in records()) {
            let n = records.len();
            let campaign = &build_timeline(records)[0];
            let ranks: Vec<usize> = campaign.entries.iter().map(|e| e.sequence).collect();
            prop_assert_eq!(ranks, (1..=n).collect::<Vec<_>>());
            for pair in campaign.entries.windows(2) {
                let (a, b) = (&pair[0].record, &pair[1].record);
                if a.day_index == b.day_index {
                    prop_assert!(a.row < b.row);
                }
            }
        }

        #[test]
        fn first_contacts_never_render_after_day_zero(records in records()) {
            let campaign = &build_timeline(records)[0];
            if let Some(anchor) = campaign.anchor_day {
                let anchored = campaign.entries.iter().any(|e| {
                    e.record.is_first_contact()
                        && e.record.day_index == Some(anchor)
                        && e.day_offset == Some(0)
                });
                prop_assert!(anchored);
            }
            for entry in &campaign.entries {
                if entry.record.is_first_contact() {
                    prop_assert!(entry.day_offset.is_none() || entry.day_offset == Some(0));
                }
            }
        }
    }
}
