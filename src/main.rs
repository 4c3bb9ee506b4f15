use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod classify;
mod config;
mod error;
mod ingest;
mod models;
mod normalize;
mod query;
mod report;
mod summary;
mod timeline;

use config::{Config, SourceArgs};
use query::{DashboardContext, QueryOutcome};

#[derive(Parser)]
#[command(name = "eca-timeline")]
#[command(about = "Campaign engagement timelines from ECA spreadsheet exports", long_about = None)]
struct Cli {
    #[command(flatten)]
    sources: SourceArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List parent campaigns with people involved
    Campaigns {
        #[arg(long)]
        json: bool,
    },
    /// List the sites available as timeline filters
    Sites {
        #[arg(long)]
        json: bool,
    },
    /// Show each campaign's interactions as days since first contact
    Timeline {
        #[arg(long)]
        site: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show affiliations and participants for one parent campaign
    Detail {
        campaign: String,
        /// Offset of the clicked timeline point
        #[arg(long)]
        days_after: Option<i64>,
        #[arg(long)]
        json: bool,
    },
    /// Show the summary tiles
    Tiles {
        #[arg(long)]
        json: bool,
    },
    /// Write the full dashboard as markdown
    Report {
        #[arg(long)]
        site: Option<String>,
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
}

fn print_outcome<T: Serialize>(
    outcome: QueryOutcome<T>,
    json: bool,
    render: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    match &outcome {
        QueryOutcome::Data(data) => render(data),
        QueryOutcome::NoData(message) => println!("{message}"),
        QueryOutcome::Failed(message) => println!("Error: {message}"),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_args(&cli.sources);
    let ctx = DashboardContext::load(&config).context("failed to build dashboard tables")?;

    match cli.command {
        Commands::Campaigns { json } => {
            print_outcome(query::list_parent_campaigns(&ctx), json, |cards| {
                println!("Parent campaigns:");
                for card in cards {
                    println!("- {} (people involved: {})", card.name, card.participants);
                }
            })?;
        }
        Commands::Sites { json } => {
            print_outcome(query::list_sites(&ctx), json, |sites| {
                for site in sites {
                    println!("{site}");
                }
            })?;
        }
        Commands::Timeline { site, json } => {
            print_outcome(query::get_timeline(&ctx, site.as_deref()), json, |view| {
                for campaign in &view.campaigns {
                    println!("{}", report::timeline_line(campaign));
                    for point in campaign.points.iter().filter(|p| p.day_offset >= 0) {
                        println!("  - {}", report::point_text(point));
                    }
                }
            })?;
        }
        Commands::Detail {
            campaign,
            days_after,
            json,
        } => {
            print_outcome(
                query::get_campaign_detail(&ctx, &campaign, days_after),
                json,
                |detail| print!("{}", report::detail_text(detail)),
            )?;
        }
        Commands::Tiles { json } => {
            print_outcome(query::get_summary_tiles(&ctx), json, |tiles| {
                println!("Total first-time interactions: {}", tiles.total_first_time);
                println!("Unique ECA affiliations: {}", tiles.unique_affiliations);
                println!("Parent campaigns: {}", tiles.unique_campaigns);
            })?;
        }
        Commands::Report { site, out } => {
            let source = config
                .members
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| config.members.display().to_string());
            let report = report::build_report(&ctx, site.as_deref(), &source);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
