use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::classify::style;
use crate::config::Config;
use crate::ingest::{load_activity, load_members};
use crate::models::{
    CampaignCard, CampaignDetail, CampaignTimeline, InteractionRecord, InteractionType,
    LegendEntry, MemberRecord, ParentCampaign, SummaryTiles, TimelinePoint, TimelineView,
};
use crate::normalize::clean_campaign_name;
use crate::summary::{
    campaign_cards, distinct_affiliations, first_contact_campaigns, summarize, summary_tiles,
};
use crate::timeline::build_timeline;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum QueryOutcome<T> {
    Data(T),
    NoData(String),
    Failed(String),
}

#[cfg(test)]
impl<T> QueryOutcome<T> {
    pub fn data(self) -> Option<T> {
        match self {
            QueryOutcome::Data(data) => Some(data),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardContext {
    campaigns: Vec<ParentCampaign>,
    members: Vec<MemberRecord>,
    cards: Vec<CampaignCard>,
    tiles: SummaryTiles,
    sites: Vec<String>,
}

impl DashboardContext {
    pub fn build(
        activity: Vec<InteractionRecord>,
        members: Vec<MemberRecord>,
        reference: &[InteractionRecord],
    ) -> Self {
        let universe = first_contact_campaigns(&members);
        let sites: BTreeSet<String> = activity.iter().filter_map(|r| r.site.clone()).collect();

        let (kept, skipped): (Vec<_>, Vec<_>) = activity
            .into_iter()
            .partition(|r| universe.contains(&r.parent_campaign));
        debug!(
            kept = kept.len(),
            skipped = skipped.len(),
            "filtered activity to first-contact campaigns"
        );

        let campaigns = build_timeline(kept);
        let cards = campaign_cards(&members);
        let tiles = summary_tiles(&members, reference);

        info!(
            campaigns = campaigns.len(),
            anchored = campaigns.iter().filter(|c| c.anchor_day.is_some()).count(),
            first_time = tiles.total_first_time,
            "dashboard context ready"
        );

        Self {
            campaigns,
            members,
            cards,
            tiles,
            sites: sites.into_iter().collect(),
        }
    }

    pub fn load(config: &Config) -> anyhow::Result<Self> {
        let (activity, _) = load_activity(&config.activity)
            .with_context(|| format!("failed to load activity from {}", config.activity.display()))?;
        let members = load_members(&config.members)
            .with_context(|| format!("failed to load members from {}", config.members.display()))?;
        let (reference, _) = load_activity(&config.reference).with_context(|| {
            format!(
                "failed to load reference activity from {}",
                config.reference.display()
            )
        })?;
        Ok(Self::build(activity, members, &reference))
    }

    #[cfg(test)]
    pub fn campaigns(&self) -> &[ParentCampaign] {
        &self.campaigns
    }
}

/// Request boundary: errors and panics become `Failed` and are logged.
pub fn guarded<T>(
    operation: &str,
    query: impl FnOnce() -> anyhow::Result<QueryOutcome<T>>,
) -> QueryOutcome<T> {
    match panic::catch_unwind(AssertUnwindSafe(query)) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            let detail = format!("{err:#}");
            error!(operation = %operation, error = %detail, "query failed");
            QueryOutcome::Failed(format!("{operation} failed"))
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(operation = %operation, panic = %message, "query panicked");
            QueryOutcome::Failed(format!("{operation} failed"))
        }
    }
}

pub fn list_parent_campaigns(ctx: &DashboardContext) -> QueryOutcome<Vec<CampaignCard>> {
    guarded("list_parent_campaigns", || {
        if ctx.cards.is_empty() {
            return Ok(QueryOutcome::NoData(
                "no parent campaigns with a first contact".to_string(),
            ));
        }
        Ok(QueryOutcome::Data(ctx.cards.clone()))
    })
}

pub fn list_sites(ctx: &DashboardContext) -> QueryOutcome<Vec<String>> {
    guarded("list_sites", || {
        if ctx.sites.is_empty() {
            return Ok(QueryOutcome::NoData("no sites recorded".to_string()));
        }
        Ok(QueryOutcome::Data(ctx.sites.clone()))
    })
}

pub fn get_timeline(ctx: &DashboardContext, site: Option<&str>) -> QueryOutcome<TimelineView> {
    guarded("get_timeline", || {
        let mut campaigns = Vec::new();
        let mut present = BTreeSet::new();

        for campaign in &ctx.campaigns {
            let entries: Vec<_> = campaign
                .entries
                .iter()
                .filter(|e| match site {
                    Some(site) => e.record.site.as_deref() == Some(site),
                    None => true,
                })
                .collect();
            if entries.is_empty() {
                continue;
            }

            let points: Vec<TimelinePoint> = entries
                .iter()
                .filter_map(|e| {
                    Some(TimelinePoint {
                        day_offset: e.day_offset?,
                        interaction_type: e.record.interaction_type?,
                        is_first_contact: e.record.is_first_contact(),
                        sequence: e.sequence,
                        activity: e.record.activity,
                        starts: e.record.start.display(),
                        ends: e.record.end.display(),
                    })
                })
                .collect();
            present.extend(points.iter().map(|p| p.interaction_type));

            campaigns.push(CampaignTimeline {
                campaign: campaign.name.clone(),
                span_days: entries.iter().filter_map(|e| e.day_offset).max(),
                points,
            });
        }

        if campaigns.is_empty() {
            let message = match site {
                Some(site) => format!("no interactions recorded at site `{site}`"),
                None => "no interactions to chart".to_string(),
            };
            return Ok(QueryOutcome::NoData(message));
        }

        let legend = InteractionType::ALL
            .into_iter()
            .filter(|kind| present.contains(kind))
            .map(|kind| {
                let style = style(kind);
                LegendEntry {
                    interaction_type: kind,
                    label: style.legend,
                    color: style.color,
                }
            })
            .collect();

        Ok(QueryOutcome::Data(TimelineView {
            site: site.map(str::to_string),
            max_offset: campaigns.iter().filter_map(|c| c.span_days).max(),
            campaigns,
            legend,
        }))
    })
}

/// `days_after` carries the offset of a clicked chart point into the view.
pub fn get_campaign_detail(
    ctx: &DashboardContext,
    campaign: &str,
    days_after: Option<i64>,
) -> QueryOutcome<CampaignDetail> {
    guarded("get_campaign_detail", || {
        let campaign = clean_campaign_name(campaign);
        let campaign = campaign.as_str();
        let Some(sub_campaigns) = summarize(&ctx.members, campaign) else {
            return Ok(QueryOutcome::NoData(format!(
                "no data available for campaign `{campaign}`"
            )));
        };
        let rows: Vec<&MemberRecord> = ctx
            .members
            .iter()
            .filter(|m| m.parent_campaign.as_deref() == Some(campaign))
            .collect();

        Ok(QueryOutcome::Data(CampaignDetail {
            campaign: campaign.to_string(),
            sub_campaigns,
            participant_count: rows.len(),
            distinct_affiliations: distinct_affiliations(rows.iter().copied()),
            days_after,
        }))
    })
}

pub fn get_summary_tiles(ctx: &DashboardContext) -> QueryOutcome<SummaryTiles> {
    guarded("get_summary_tiles", || Ok(QueryOutcome::Data(ctx.tiles)))
}
