use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{ImportRunManifest, Quarter, TrackerDocument};
use crate::store::DocumentStore;

const MANIFEST_PREFIXES: [&str; 2] = ["import_run_", "batch_run_"];

pub fn run(args: StatusArgs) -> Result<()> {
    let db_path = args.store.db_path();
    let manifest_dir = args.store.manifest_dir();

    info!(cache_root = %args.store.cache_root.display(), "status requested");

    if db_path.exists() {
        let store = DocumentStore::open(&db_path)?;
        let document = store.load()?;
        let summary = TrackerSummary::from_document(&document);

        info!(
            path = %db_path.display(),
            updated_at = %store.updated_at()?.unwrap_or_default(),
            open_tasks = summary.open_tasks,
            completed_tasks = summary.completed_tasks,
            archived_tasks = summary.archived_tasks,
            subjects = summary.subjects,
            assignments = summary.assignments,
            events = summary.events,
            streak = document.streak,
            total_completed = document.total_completed,
            "tracker status"
        );
    } else {
        warn!(path = %db_path.display(), "database file missing");
    }

    match latest_manifest(&manifest_dir)? {
        Some(path) => {
            let raw =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let manifest: ImportRunManifest = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                report_kind = %manifest.report_kind,
                status = %manifest.status,
                updated_at = %manifest.updated_at,
                added = manifest.counts.assignments_added + manifest.counts.tasks_added,
                skipped = manifest.counts.assignments_skipped + manifest.counts.tasks_skipped,
                warnings = manifest.warnings.len(),
                "last import run"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no import run manifests"),
    }

    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct TrackerSummary {
    open_tasks: usize,
    completed_tasks: usize,
    archived_tasks: usize,
    subjects: usize,
    assignments: usize,
    events: usize,
}

impl TrackerSummary {
    fn from_document(document: &TrackerDocument) -> Self {
        let completed_tasks = document.tasks.iter().filter(|task| task.completed).count();
        let assignments = document
            .grades
            .iter()
            .flat_map(|entry| {
                Quarter::ALL
                    .into_iter()
                    .filter_map(move |quarter| entry.quarter(quarter))
            })
            .map(|snapshot| snapshot.assignments.len())
            .sum();

        Self {
            open_tasks: document.tasks.len() - completed_tasks,
            completed_tasks,
            archived_tasks: document.archived_tasks.len(),
            subjects: document.grades.len(),
            assignments,
            events: document.events.len(),
        }
    }
}

fn latest_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to list {}", manifest_dir.display()))?;

    let mut newest: Option<(String, PathBuf)> = None;
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?
            .path();
        let Some(stamp) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(manifest_stamp)
        else {
            continue;
        };

        if newest
            .as_ref()
            .is_none_or(|(best, _)| stamp.as_str() > best.as_str())
        {
            newest = Some((stamp, path));
        }
    }

    Ok(newest.map(|(_, path)| path))
}

fn manifest_stamp(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(".json")?;
    MANIFEST_PREFIXES
        .iter()
        .find_map(|prefix| stem.strip_prefix(prefix))
        .map(str::to_string)
}
