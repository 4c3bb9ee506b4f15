use std::path::{Path, PathBuf};

use clap::Args;

pub const DATA_DIR_ENV: &str = "ECA_DATA_DIR";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ACTIVITY: &str = "ECA_Campaigns_FY25_ALL_v2.xlsx";
const DEFAULT_MEMBERS: &str = "ECA_Campaign_Members_FY25_ALL.xlsx";

/// Where the three source spreadsheets live.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Directory holding the spreadsheets (falls back to $ECA_DATA_DIR, then ./data)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Campaign activity export
    #[arg(long, global = true)]
    pub activity: Option<PathBuf>,
    /// Campaign members export
    #[arg(long, global = true)]
    pub members: Option<PathBuf>,
    /// Full activity export used for the first-time interaction total (defaults to --activity)
    #[arg(long, global = true)]
    pub reference: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub activity: PathBuf,
    pub members: PathBuf,
    pub reference: PathBuf,
}

impl Config {
    pub fn from_args(args: &SourceArgs) -> Self {
        Self::resolve(args, std::env::var(DATA_DIR_ENV).ok())
    }

    fn resolve(args: &SourceArgs, env_data_dir: Option<String>) -> Self {
        let data_dir = args
            .data_dir
            .clone()
            .or_else(|| env_data_dir.filter(|d| !d.trim().is_empty()).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let activity = in_dir(&data_dir, args.activity.as_deref(), DEFAULT_ACTIVITY);
        let members = in_dir(&data_dir, args.members.as_deref(), DEFAULT_MEMBERS);
        let reference = match args.reference.as_deref() {
            Some(path) => data_dir.join(path),
            None => activity.clone(),
        };

        Self {
            activity,
            members,
            reference,
        }
    }
}

/// `Path::join` keeps absolute paths as given.
fn in_dir(data_dir: &Path, file: Option<&Path>, default: &str) -> PathBuf {
    data_dir.join(file.unwrap_or_else(|| Path::new(default)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_into_data_dir() {
        let config = Config::resolve(&SourceArgs::default(), None);
        assert_eq!(config.activity, Path::new("data").join(DEFAULT_ACTIVITY));
        assert_eq!(config.members, Path::new("data").join(DEFAULT_MEMBERS));
        assert_eq!(config.reference, config.activity);
    }

    #[test]
    fn env_dir_is_used_when_flag_is_absent() {
        let config = Config::resolve(&SourceArgs::default(), Some("/srv/eca".to_string()));
        assert_eq!(config.members, Path::new("/srv/eca").join(DEFAULT_MEMBERS));

        let args = SourceArgs {
            data_dir: Some(PathBuf::from("exports")),
            ..Default::default()
        };
        let config = Config::resolve(&args, Some("/srv/eca".to_string()));
        assert_eq!(config.members, Path::new("exports").join(DEFAULT_MEMBERS));
    }

    #[test]
    fn explicit_files_override_defaults() {
        let args = SourceArgs {
            data_dir: Some(PathBuf::from("exports")),
            activity: Some(PathBuf::from("activity.csv")),
            members: Some(PathBuf::from("/tmp/members.csv")),
            reference: Some(PathBuf::from("all.csv")),
        };
        let config = Config::resolve(&args, None);
        assert_eq!(config.activity, Path::new("exports/activity.csv"));
        assert_eq!(config.members, Path::new("/tmp/members.csv"));
        assert_eq!(config.reference, Path::new("exports/all.csv"));
    }
}
