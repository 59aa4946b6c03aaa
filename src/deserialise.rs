//! Loads a folder of station files, and the crop yield file, into the database.

use std::{
    fs::File,
    io::{self, BufRead},
    ops::AddAssign,
    path::{Path, PathBuf},
};

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::{
    cli::create_progress_bar,
    db::sqlite::{insert_daily, insert_yield, Inserted},
    error::{Error, Result},
    reading::{parse_line, DailyObservation, YieldRecord},
};

pub const STATION_FILE_EXTENSION: &str = "txt";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub inserted: u64,
    pub duplicates: u64,
    /// Lines with a wrong field count or non-integer values.
    pub skipped: u64,
}

impl LoadStats {
    fn record(&mut self, outcome: Inserted) {
        match outcome {
            Inserted::New => self.inserted += 1,
            Inserted::Duplicate => self.duplicates += 1,
        }
    }
}

impl AddAssign for LoadStats {
    fn add_assign(&mut self, other: Self) {
        self.inserted += other.inserted;
        self.duplicates += other.duplicates;
        self.skipped += other.skipped;
    }
}

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub files_loaded: usize,
    pub failures: Vec<FileFailure>,
    pub rows: LoadStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct YieldReport {
    pub inserted: u64,
    pub duplicates: u64,
    pub skipped: Vec<SkippedLine>,
}

/// Station id from a file name, e.g. `USC00110072.txt` -> `USC00110072`.
pub fn station_id(file_path: &Path) -> String {
    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    file_name
        .strip_suffix(&format!(".{STATION_FILE_EXTENSION}"))
        .unwrap_or(&*file_name)
        .to_string()
}

fn open_lines(file_path: &Path) -> Result<io::Lines<io::BufReader<File>>> {
    let file = File::open(file_path).map_err(|e| Error::io(file_path, e))?;
    Ok(io::BufReader::new(file).lines())
}

/// Loads one station file in a single transaction. Unparseable lines are
/// skipped; rows whose (station, date) already exists are left alone.
pub async fn load_station_file(file_path: &Path, pool: &SqlitePool) -> Result<LoadStats> {
    let station = station_id(file_path);
    let mut stats = LoadStats::default();
    let mut tx = pool.begin().await?;

    for (idx, line) in open_lines(file_path)?.enumerate() {
        let line = line.map_err(|e| Error::io(file_path, e))?;
        let Some(tokens) = parse_line(&line) else {
            if !line.trim().is_empty() {
                stats.skipped += 1;
            }
            continue;
        };

        match DailyObservation::from_tokens(&station, tokens) {
            Ok(obs) => stats.record(insert_daily(&mut tx, &obs).await?),
            Err(e) => {
                debug!(station = %station, line = idx + 1, "Skipping row: {e}");
                stats.skipped += 1;
            }
        }
    }

    tx.commit().await?;

    Ok(stats)
}

/// Station files in `dir`, sorted by name.
fn station_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in dir.read_dir().map_err(|e| Error::io(dir, e))? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {e}", dir.display());
                continue;
            }
        };

        let is_station_file =
            path.extension().and_then(|ext| ext.to_str()) == Some(STATION_FILE_EXTENSION);
        if path.is_file() && is_station_file {
            files.push(path);
        }
    }

    files.sort();

    Ok(files)
}

/// Loads every station file in `dir`. A file that fails is reported and the
/// rest are still loaded; only an unreadable `dir` is an error.
pub async fn ingest_directory(dir: &Path, pool: &SqlitePool) -> Result<IngestReport> {
    let files = station_files(dir)?;
    info!("Found {} station files in {}", files.len(), dir.display());

    let progress_bar = create_progress_bar(files.len() as u64, "Processing station files".to_string());
    let mut report = IngestReport::default();

    for file in files {
        match load_station_file(&file, pool).await {
            Ok(stats) => {
                report.files_loaded += 1;
                report.rows += stats;
            }
            Err(e) => {
                warn!("Error processing file {}: {e}", file.display());
                report.failures.push(FileFailure {
                    path: file,
                    reason: e.to_string(),
                });
            }
        }
        progress_bar.inc(1);
    }

    progress_bar.finish_with_message("Station files processed");

    Ok(report)
}

/// Loads `year<TAB>bushels` lines. Malformed lines are logged with their line
/// number and skipped. Failing to open the file is an error.
pub async fn load_yield_file(file_path: &Path, pool: &SqlitePool) -> Result<YieldReport> {
    let lines = open_lines(file_path)?;
    let mut report = YieldReport::default();
    let mut tx = pool.begin().await?;

    for (idx, line) in lines.enumerate() {
        let line = line.map_err(|e| Error::io(file_path, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(record) = YieldRecord::from_line(line) else {
            warn!(
                line = idx + 1,
                content = line,
                "Incorrect format in {}",
                file_path.display()
            );
            report.skipped.push(SkippedLine {
                line_number: idx + 1,
                content: line.to_string(),
            });
            continue;
        };

        match insert_yield(&mut tx, &record).await? {
            Inserted::New => report.inserted += 1,
            Inserted::Duplicate => report.duplicates += 1,
        }
    }

    tx.commit().await?;

    Ok(report)
}

// -- Tests -------------------------------------------------------------------
