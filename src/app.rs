//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - loads the review table (remote or local CSV)
//! - hands the dashboard to the chosen front-end

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::cli::{Command, ExportArgs, ServeArgs, SnapshotArgs, SourceArgs};
use crate::dashboard::{ImputationView, YearRangeView};
use crate::domain::{Percentage, YearRange};
use crate::error::AppError;
use crate::logging::{self, LogTarget};

pub mod pipeline;

/// Entry point for the `drugdash` binary.
pub fn run() -> Result<(), AppError> {
    // `drugdash` and `drugdash --csv x.csv` behave like `drugdash serve ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Serve(args) => handle_serve(args),
        Command::Tui(args) => handle_tui(args),
        Command::Summary(args) => handle_summary(args),
        Command::Export(args) => handle_export(args),
    }
}

fn handle_serve(args: ServeArgs) -> Result<(), AppError> {
    logging::init(LogTarget::Stderr)?;
    let config = pipeline::resolve_config(&args.source)?;
    let loaded = pipeline::load(&config)?;
    crate::web::serve(loaded.dashboard, SocketAddr::new(args.host, args.port))
}

fn handle_tui(args: SourceArgs) -> Result<(), AppError> {
    logging::init(LogTarget::File(PathBuf::from(logging::TUI_LOG_FILE)))?;
    // Resolve (and possibly prompt) before the TUI takes over the terminal.
    let config = pipeline::resolve_config(&args)?;
    let loaded = pipeline::load(&config)?;
    crate::tui::run(loaded.dashboard)
}

fn handle_summary(args: SnapshotArgs) -> Result<(), AppError> {
    logging::init(LogTarget::Stderr)?;
    let config = pipeline::resolve_config(&args.source)?;
    let loaded = pipeline::load(&config)?;
    let (years, imputation) = snapshot(&loaded, &args)?;

    println!("{}", crate::report::format_dataset_summary(&loaded.ingest));
    println!("{}", crate::report::format_year_range(&years));
    println!("{}", crate::report::format_imputation(&imputation));
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    logging::init(LogTarget::Stderr)?;
    let config = pipeline::resolve_config(&args.snapshot.source)?;
    let loaded = pipeline::load(&config)?;
    let (years, imputation) = snapshot(&loaded, &args.snapshot)?;

    let paths = crate::io::export::write_bundle(&args.out, &years, &imputation)?;
    println!("Wrote {}", paths.years_json.display());
    println!("Wrote {}", paths.imputation_json.display());
    println!("Wrote {}", paths.imputation_csv.display());
    Ok(())
}

/// Evaluate both bindings once for the control values on the command line.
fn snapshot(
    loaded: &pipeline::Loaded,
    args: &SnapshotArgs,
) -> Result<(YearRangeView, ImputationView), AppError> {
    let range = YearRange::new(args.start, args.end)?;
    let percent = args.percent.map(Percentage::new).transpose()?;
    let years = loaded.dashboard.year_range_view(range);
    let imputation = loaded.dashboard.imputation_view(percent)?;
    Ok((years, imputation))
}

/// Rewrite argv so `drugdash` defaults to `drugdash serve`.
///
/// Rules:
/// - `drugdash`                       -> `drugdash serve`
/// - `drugdash --port 9000 ...`       -> `drugdash serve --port 9000 ...`
/// - `drugdash --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("serve".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "serve" | "tui" | "summary" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "serve flags".
    if arg1.starts_with('-') {
        argv.insert(1, "serve".to_string());
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_serves() {
        assert_eq!(rewrite_args(argv(&["drugdash"])), argv(&["drugdash", "serve"]));
    }

    #[test]
    fn leading_flags_go_to_serve() {
        assert_eq!(
            rewrite_args(argv(&["drugdash", "--port", "9000"])),
            argv(&["drugdash", "serve", "--port", "9000"])
        );
    }

    #[test]
    fn subcommands_and_help_untouched() {
        for args in [&["drugdash", "tui"][..], &["drugdash", "--help"], &["drugdash", "export", "--out", "x"]] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }
}
