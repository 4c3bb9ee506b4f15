use std::fmt::Write;

use crate::classify::style;
use crate::models::{CampaignDetail, CampaignTimeline, TimelinePoint, TimelineView};
use crate::query::{
    get_summary_tiles, get_timeline, list_parent_campaigns, DashboardContext, QueryOutcome,
};

const TICK_DAYS: i64 = 30;

/// X-axis ticks every 30 days, running one tick past the furthest offset.
pub fn axis_ticks(max_offset: Option<i64>) -> Vec<i64> {
    let end = max_offset.unwrap_or(0).max(0) + TICK_DAYS;
    (0..end).step_by(TICK_DAYS as usize).collect()
}

pub fn timeline_line(campaign: &CampaignTimeline) -> String {
    if campaign.points.is_empty() {
        return format!("- {}: no dated first contact", campaign.campaign);
    }
    let points: Vec<String> = campaign
        .points
        .iter()
        .filter(|p| p.day_offset >= 0)
        .map(|p| format!("day {} {}", p.day_offset, style(p.interaction_type).legend))
        .collect();
    format!(
        "- {} ({} days): {}",
        campaign.campaign,
        campaign.span_days.unwrap_or(0),
        points.join(", ")
    )
}

/// Hover text for one plotted point.
pub fn point_text(point: &TimelinePoint) -> String {
    let mut text = format!(
        "#{} day {} {} ({})",
        point.sequence,
        point.day_offset,
        style(point.interaction_type).legend,
        point.activity.label()
    );
    if let Some(starts) = &point.starts {
        let _ = write!(text, ", starts {starts}");
    }
    if let Some(ends) = &point.ends {
        let _ = write!(text, ", ends {ends}");
    }
    text
}

pub fn detail_text(detail: &CampaignDetail) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {}", detail.campaign);
    let _ = writeln!(
        output,
        "{} participants across {} affiliations",
        detail.participant_count, detail.distinct_affiliations
    );

    for (sub_campaign, affiliations) in &detail.sub_campaigns {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Campaign: {sub_campaign}");
        let _ = writeln!(output, "ECA Affiliations and Participants:");
        for (affiliation, names) in affiliations {
            let _ = writeln!(output, "- **{}**: {}", affiliation, names.join(", "));
        }
    }

    if let Some(days) = detail.days_after {
        let _ = writeln!(output);
        let _ = writeln!(output, "Days after first interaction: {days}");
    }
    output
}

fn write_timeline(output: &mut String, view: &TimelineView) {
    for campaign in &view.campaigns {
        let _ = writeln!(output, "{}", timeline_line(campaign));
        for point in campaign.points.iter().filter(|p| p.day_offset >= 0) {
            let _ = writeln!(output, "  - {}", point_text(point));
        }
    }

    let ticks: Vec<String> = axis_ticks(view.max_offset)
        .iter()
        .map(ToString::to_string)
        .collect();
    let _ = writeln!(output);
    let _ = writeln!(output, "Days since first interaction: {}", ticks.join(" | "));

    let _ = writeln!(output);
    let _ = writeln!(output, "### Interaction Types");
    for entry in &view.legend {
        let _ = writeln!(output, "- `{}` {}", entry.color, entry.label);
    }
}

/// Markdown rendering of the whole dashboard.
pub fn build_report(ctx: &DashboardContext, site: Option<&str>, source: &str) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# ECA Engagement Dashboard");
    let _ = writeln!(output, "First-Time Interactions Analysis");
    let _ = writeln!(output);

    let _ = writeln!(output, "## Summary");
    match get_summary_tiles(ctx) {
        QueryOutcome::Data(tiles) => {
            let _ = writeln!(output, "- Total First-Time Interactions: {}", tiles.total_first_time);
            let _ = writeln!(output, "- Unique ECA Affiliations: {}", tiles.unique_affiliations);
            let _ = writeln!(output, "- Parent Campaigns: {}", tiles.unique_campaigns);
        }
        QueryOutcome::NoData(message) | QueryOutcome::Failed(message) => {
            let _ = writeln!(output, "{message}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Parent Campaigns");
    match list_parent_campaigns(ctx) {
        QueryOutcome::Data(cards) => {
            for card in cards {
                let _ = writeln!(output, "- {}: people involved {}", card.name, card.participants);
            }
        }
        QueryOutcome::NoData(message) | QueryOutcome::Failed(message) => {
            let _ = writeln!(output, "{message}");
        }
    }

    let _ = writeln!(output);
    match site {
        Some(site) => {
            let _ = writeln!(output, "## Campaign Timeline ({site})");
        }
        None => {
            let _ = writeln!(output, "## Campaign Timeline");
        }
    }
    match get_timeline(ctx, site) {
        QueryOutcome::Data(view) => write_timeline(&mut output, &view),
        QueryOutcome::NoData(message) | QueryOutcome::Failed(message) => {
            let _ = writeln!(output, "{message}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Data source: {source}");
    output
}
