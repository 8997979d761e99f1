//! Interactive CSV picker for `--pick`.
//!
//! Searches for `*.csv` files under the current working directory and lists
//! the ones whose header looks like a drug review export first, so a local
//! copy of the dataset is easy to find among unrelated CSVs.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// A discovered CSV and whether its header has the review columns.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub looks_like_reviews: bool,
}

/// Prompt the user to select a CSV file from the current directory tree.
///
/// Accepts a number from the list or an explicit path; `q` cancels.
pub fn prompt_for_csv_path() -> Result<PathBuf, AppError> {
    let candidates = discover_candidates();
    if candidates.is_empty() {
        return Err(AppError::usage(
            "No .csv files found. Provide one with `--csv <file.csv>`.",
        ));
    }

    println!("Found {} CSV file(s):", candidates.len());
    for (idx, c) in candidates.iter().enumerate() {
        let marker = if c.looks_like_reviews { "*" } else { " " };
        println!("{:>3}) {marker} {}", idx + 1, pretty_path(&c.path));
    }
    println!("(* header matches the drug review columns)");

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", candidates.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::usage(format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::usage(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::usage(
                "No input received. Provide a CSV path with `--csv <file.csv>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::usage("Canceled."));
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=candidates.len()).contains(&choice) {
                return validate_csv_path(&candidates[choice - 1].path);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", candidates.len());
            continue;
        }

        match validate_csv_path(Path::new(input)) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::usage(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::usage(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::usage(format!(
            "Expected a .csv file (got: {}).",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

/// Discover CSVs under the current directory: review-shaped files first,
/// then by path.
pub fn discover_candidates() -> Vec<Candidate> {
    let mut paths = Vec::new();
    find_csv_files(Path::new("."), 0, DEFAULT_SEARCH_DEPTH, &mut paths);
    rank_candidates(paths)
}

fn rank_candidates(paths: Vec<PathBuf>) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = paths
        .into_iter()
        .map(|path| Candidate {
            looks_like_reviews: header_looks_like_reviews(&path),
            path,
        })
        .collect();
    out.sort_by(|a, b| {
        b.looks_like_reviews
            .cmp(&a.looks_like_reviews)
            .then_with(|| pretty_path(&a.path).cmp(&pretty_path(&b.path)))
    });
    out
}

fn header_looks_like_reviews(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut first = String::new();
    if BufReader::new(file).read_line(&mut first).is_err() {
        return false;
    }
    let header = first.to_ascii_lowercase();
    ["drugname", "condition", "rating", "usefulcount"]
        .iter()
        .all(|col| header.contains(col))
}

fn find_csv_files(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules" | "export")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_shaped_files_rank_first() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let other = dir.join("a_other.csv");
        let reviews = dir.join("z_reviews.csv");
        fs::write(&other, "x,y\n1,2\n").unwrap();
        fs::write(&reviews, "drugName,condition,review,rating,date,usefulCount\n").unwrap();

        let ranked = rank_candidates(vec![other.clone(), reviews.clone()]);
        assert_eq!(ranked[0].path, reviews);
        assert!(ranked[0].looks_like_reviews);
        assert!(!ranked[1].looks_like_reviews);

        let mut found = Vec::new();
        find_csv_files(dir, 0, 1, &mut found);
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn validate_rejects_non_csv() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let txt = dir.join("notes.txt");
        fs::write(&txt, "hi").unwrap();
        assert!(validate_csv_path(&txt).is_err());
        assert!(validate_csv_path(dir).is_err());
        assert!(validate_csv_path(&dir.join("missing.csv")).is_err());
    }
}
