use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::info;

use crate::cli::BatchArgs;
use crate::commands::manifest::{ImportRun, render_store_flags, write_manifest};
use crate::dedup::DedupPolicy;
use crate::merge::{MergeOutcome, merge_class_grades};
use crate::model::{BatchGradeImport, ImportCounts};
use crate::store::DocumentStore;
use crate::util::read_input;

pub fn run(args: BatchArgs) -> Result<()> {
    let run = ImportRun::start();
    let raw = read_input(&args.input)?;
    let payload = parse_payload(&raw)?;

    let extracted: usize = payload
        .class_grades
        .iter()
        .map(|import| import.assignments.len())
        .sum();
    info!(
        subjects = payload.class_grades.len(),
        assignments = extracted,
        default_quarter = %args.quarter,
        "class grades loaded"
    );

    let db_path = args.store.db_path();
    let mut store = DocumentStore::open(&db_path)?;
    let policy = DedupPolicy::default();
    let now = Utc::now();

    let outcome = if args.dry_run {
        let mut preview = store.load()?;
        merge_class_grades(
            &mut preview.grades,
            &payload.class_grades,
            args.quarter,
            now,
            &policy,
        )
    } else {
        store.update(|document| {
            Ok(merge_class_grades(
                &mut document.grades,
                &payload.class_grades,
                args.quarter,
                now,
                &policy,
            ))
        })?
    };
    let counts = batch_counts(extracted, outcome);
    info!(
        added = counts.assignments_added,
        skipped = counts.assignments_skipped,
        subjects_created = counts.subjects_created,
        subjects_updated = counts.subjects_updated,
        "class grades merged"
    );

    if args.dry_run {
        info!("dry run; tracker left unchanged");
        return Ok(());
    }

    let manifest_path = run.manifest_path(&args.store, args.manifest_path.as_deref(), "batch_run");
    let manifest = run.finish(
        render_batch_command(&args),
        "batch",
        &raw,
        &db_path,
        counts,
        Vec::new(),
    );
    write_manifest(&manifest_path, &manifest)
}

fn parse_payload(raw: &str) -> Result<BatchGradeImport> {
    let payload: BatchGradeImport = serde_json::from_str(raw)
        .context("invalid batch payload; expected {\"classGrades\": [...]}")?;
    if payload.class_grades.is_empty() {
        bail!("batch payload has no classGrades entries");
    }
    Ok(payload)
}

fn batch_counts(extracted: usize, outcome: MergeOutcome) -> ImportCounts {
    ImportCounts {
        assignments_extracted: extracted,
        assignments_added: outcome.added,
        assignments_skipped: outcome.skipped,
        subjects_created: outcome.subjects_created,
        subjects_updated: outcome.subjects_updated,
        ..ImportCounts::default()
    }
}

fn render_batch_command(args: &BatchArgs) -> String {
    let mut command = vec!["homeroom".to_string(), "batch".to_string()];
    render_store_flags(&mut command, &args.store);
    command.push("--input".to_string());
    command.push(args.input.display().to_string());
    command.push("--quarter".to_string());
    command.push(args.quarter.to_string());
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    command.join(" ")
}
