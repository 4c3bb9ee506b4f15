use std::collections::{BTreeMap, BTreeSet};

use crate::models::{AffiliationTree, CampaignCard, InteractionRecord, MemberRecord, SummaryTiles};

/// `None` when no member row belongs to the campaign. Members without an
/// affiliation are left out of the tree.
pub fn summarize(members: &[MemberRecord], campaign: &str) -> Option<AffiliationTree> {
    let mut rows = members
        .iter()
        .filter(|m| m.parent_campaign.as_deref() == Some(campaign))
        .peekable();
    rows.peek()?;

    let mut tree: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();
    for member in rows {
        let Some(sub_campaign) = &member.campaign_name else {
            continue;
        };
        let affiliations = tree.entry(sub_campaign.clone()).or_default();
        if let Some(affiliation) = &member.affiliation {
            let names = affiliations.entry(affiliation.clone()).or_default();
            if let Some(name) = &member.full_name {
                names.insert(name.clone());
            }
        }
    }

    Some(
        tree.into_iter()
            .map(|(sub_campaign, affiliations)| {
                let affiliations = affiliations
                    .into_iter()
                    .map(|(affiliation, names)| (affiliation, names.into_iter().collect()))
                    .collect();
                (sub_campaign, affiliations)
            })
            .collect(),
    )
}

pub fn distinct_affiliations<'a>(members: impl IntoIterator<Item = &'a MemberRecord>) -> usize {
    members
        .into_iter()
        .filter_map(|m| m.affiliation.as_deref())
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn first_contact_campaigns(members: &[MemberRecord]) -> BTreeSet<String> {
    members
        .iter()
        .filter(|m| m.is_first_contact())
        .filter_map(|m| m.parent_campaign.clone())
        .collect()
}

pub fn first_contact_total(reference: &[InteractionRecord]) -> usize {
    reference.iter().filter(|r| r.is_first_contact()).count()
}

pub fn campaign_cards(members: &[MemberRecord]) -> Vec<CampaignCard> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for member in members.iter().filter(|m| m.is_first_contact()) {
        if let Some(name) = member.parent_campaign.as_deref() {
            *counts.entry(name).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(name, participants)| CampaignCard {
            name: name.to_string(),
            participants,
        })
        .collect()
}

pub fn summary_tiles(members: &[MemberRecord], reference: &[InteractionRecord]) -> SummaryTiles {
    let first_contact: Vec<&MemberRecord> = members.iter().filter(|m| m.is_first_contact()).collect();
    SummaryTiles {
        total_first_time: first_contact_total(reference),
        unique_affiliations: distinct_affiliations(first_contact.iter().copied()),
        unique_campaigns: first_contact_campaigns(members).len(),
    }
}
