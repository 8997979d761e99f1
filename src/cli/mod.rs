//! Command-line parsing for the drug review dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the data and binding code.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{YEAR_MAX, YEAR_MIN};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "drugdash", version, about = "Drug review dashboard with a missing-data lab")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the browser dashboard (default).
    Serve(ServeArgs),
    /// Launch the interactive terminal dashboard.
    Tui(SourceArgs),
    /// Print both bindings for one set of control values.
    Summary(SnapshotArgs),
    /// Write both bindings as JSON plus the imputation table as CSV.
    Export(ExportArgs),
}

/// Where to load reviews from, shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// UCI catalog id of the dataset (overrides `DRUGDASH_DATASET_ID`).
    #[arg(long)]
    pub dataset_id: Option<u32>,

    /// UCI dataset API endpoint (overrides `DRUGDASH_API_URL`).
    #[arg(long)]
    pub api_url: Option<String>,

    /// Read a local CSV copy instead of downloading.
    #[arg(long, value_name = "CSV", conflicts_with = "pick")]
    pub csv: Option<PathBuf>,

    /// Choose a local CSV interactively from the current directory tree.
    #[arg(long)]
    pub pick: bool,

    /// Seed the missing-data simulation for reproducible runs.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Args, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Interface to bind.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to bind.
    #[arg(short, long, default_value_t = 8050)]
    pub port: u16,
}

/// Control values for the non-interactive commands.
#[derive(Debug, Args, Clone)]
pub struct SnapshotArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// First year of the range (inclusive).
    #[arg(long, default_value_t = YEAR_MIN)]
    pub start: i32,

    /// Last year of the range (inclusive).
    #[arg(long, default_value_t = YEAR_MAX)]
    pub end: i32,

    /// Percentage of cells to remove (1-80). Omit for no removal.
    #[arg(long)]
    pub percent: Option<u32>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArgs,

    /// Output directory.
    #[arg(long, value_name = "DIR", default_value = "export")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summary_controls() {
        let cli = Cli::parse_from(["drugdash", "summary", "--start", "2010", "--percent", "20", "--seed", "4"]);
        let Command::Summary(args) = cli.command else {
            panic!("expected summary");
        };
        assert_eq!(args.start, 2010);
        assert_eq!(args.end, YEAR_MAX);
        assert_eq!(args.percent, Some(20));
        assert_eq!(args.source.seed, Some(4));
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::parse_from(["drugdash", "serve"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 8050);
        assert!(args.host.is_loopback());
        assert!(args.source.csv.is_none());
    }

    #[test]
    fn csv_and_pick_conflict() {
        assert!(Cli::try_parse_from(["drugdash", "tui", "--csv", "a.csv", "--pick"]).is_err());
    }
}
