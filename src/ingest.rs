use std::fs::File;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use tracing::info;

use crate::classify::{classify, parse_interaction_type, RawActivityRow};
use crate::error::IngestError;
use crate::models::{InteractionRecord, MemberRecord};
use crate::normalize::{clean_campaign_name, normalize_headers};

/// Spreadsheet contents with normalized headers and blank cells as `None`.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn require(&self, name: &'static str) -> Result<usize, IngestError> {
        self.column(name).ok_or_else(|| IngestError::MissingColumn {
            path: self.path.clone(),
            column: name,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub dropped: usize,
    pub unparsed_dates: usize,
    pub uncategorized: usize,
}

pub fn read_table(path: &Path) -> Result<RawTable, IngestError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => read_csv(path),
        Some("xlsx" | "xlsm" | "xls" | "ods") => read_workbook(path),
        _ => Err(IngestError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn read_csv(path: &Path) -> Result<RawTable, IngestError> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader.headers().map_err(csv_error)?;
    if headers.is_empty() {
        return Err(IngestError::EmptySheet {
            path: path.to_path_buf(),
        });
    }
    let headers = normalize_headers(&headers.iter().collect::<Vec<_>>());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        rows.push(record.iter().map(non_blank).collect());
    }

    Ok(RawTable {
        path: path.to_path_buf(),
        headers,
        rows,
    })
}

fn read_workbook(path: &Path) -> Result<RawTable, IngestError> {
    let workbook_error = |message: String| IngestError::Workbook {
        path: path.to_path_buf(),
        message,
    };
    let empty = || IngestError::EmptySheet {
        path: path.to_path_buf(),
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(empty)?
        .map_err(|e| workbook_error(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(empty)?;
    let header: Vec<String> = header
        .iter()
        .map(|c| cell_text(c).unwrap_or_default())
        .collect();

    Ok(RawTable {
        path: path.to_path_buf(),
        headers: normalize_headers(&header),
        rows: rows.map(|r| r.iter().map(cell_text).collect()).collect(),
    })
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => non_blank(s),
        Data::Int(n) => Some(n.to_string()),
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        // Rendered back into the export's text shape so it splits like any other cell.
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|dt| dt.format("%m/%d/%Y, %I:%M %p").to_string()),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn cell(row: &[Option<String>], column: Option<usize>) -> Option<String> {
    column.and_then(|idx| row.get(idx).cloned().flatten())
}

pub fn load_activity(path: &Path) -> Result<(Vec<InteractionRecord>, LoadStats), IngestError> {
    let table = read_table(path)?;
    let parent = table.require("parentcampaignname")?;
    let interaction = table.require("interactiontype")?;
    let start = table.require("startdateandtime")?;
    let end = table.column("enddateandtime");
    let activity = table.column("ecaactivitytype");
    let site = table.column("site");

    let mut stats = LoadStats::default();
    let mut records = Vec::with_capacity(table.rows.len());

    for (idx, row) in table.rows.iter().enumerate() {
        stats.rows += 1;
        let raw = RawActivityRow {
            row: idx + 1,
            parent_campaign: cell(row, Some(parent)),
            activity_type: cell(row, activity),
            interaction_type: cell(row, Some(interaction)),
            start: cell(row, Some(start)),
            end: cell(row, end),
            site: cell(row, site),
        };
        match classify(raw) {
            Some((record, flags)) => {
                stats.unparsed_dates += usize::from(flags.unparsed_date);
                stats.uncategorized += usize::from(flags.uncategorized);
                records.push(record);
            }
            None => stats.dropped += 1,
        }
    }

    info!(
        path = %path.display(),
        rows = stats.rows,
        dropped = stats.dropped,
        unparsed_dates = stats.unparsed_dates,
        uncategorized = stats.uncategorized,
        "loaded activity sheet"
    );
    Ok((records, stats))
}

pub fn load_members(path: &Path) -> Result<Vec<MemberRecord>, IngestError> {
    let table = read_table(path)?;
    let parent = table.require("parentcampaign:campaignname")?;
    let interaction = table.require("interactiontype")?;
    let affiliation = table.column("ecaaffiliationname");
    let campaign_name = table.column("campaignname");
    let full_name = table.column("fullname");

    let members: Vec<MemberRecord> = table
        .rows
        .iter()
        .map(|row| MemberRecord {
            parent_campaign: cell(row, Some(parent))
                .map(|name| clean_campaign_name(&name))
                .filter(|name| !name.is_empty()),
            campaign_name: cell(row, campaign_name),
            affiliation: cell(row, affiliation),
            full_name: cell(row, full_name),
            interaction_type: cell(row, Some(interaction))
                .as_deref()
                .and_then(parse_interaction_type),
        })
        .collect();

    info!(path = %path.display(), rows = members.len(), "loaded members sheet");
    Ok(members)
}
