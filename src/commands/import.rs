use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ImportArgs;
use crate::commands::extract::{extract_report, log_summary};
use crate::commands::manifest::{ImportRun, render_store_flags, write_manifest};
use crate::merge::apply_extraction;
use crate::model::{ExtractionResult, ImportCounts};
use crate::store::DocumentStore;
use crate::util::{print_json_pretty, read_input};

pub fn run(args: ImportArgs) -> Result<()> {
    let run = ImportRun::start();
    let text = read_input(&args.report.input)?;
    let (result, options) = extract_report(&args.report, &text)?;
    log_summary(&result);

    if let Err(blocker) = result.readiness() {
        print_json_pretty(&result)?;
        warn!(
            kind = result.kind().as_str(),
            reason = %blocker,
            "import blocked; extraction printed so it can be corrected and re-run"
        );
        return Err(anyhow::Error::new(blocker)).context("nothing was imported");
    }

    let db_path = args.store.db_path();
    let mut store = DocumentStore::open(&db_path)?;
    info!(db = %db_path.display(), run_id = %run.run_id, dry_run = args.dry_run, "starting import");

    let counts = if args.dry_run {
        let mut preview = store.load()?;
        apply_extraction(&mut preview, &result, options.now, &options.policy)?
    } else {
        store.update(|document| {
            Ok(apply_extraction(
                document,
                &result,
                options.now,
                &options.policy,
            )?)
        })?
    };
    log_counts(&result, &counts);

    if args.dry_run {
        info!("dry run; tracker left unchanged");
        return Ok(());
    }

    let manifest_path = run.manifest_path(&args.store, args.manifest_path.as_deref(), "import_run");
    let manifest = run.finish(
        render_import_command(&args),
        result.kind().as_str(),
        &text,
        &db_path,
        counts,
        extraction_warnings(&result),
    );
    write_manifest(&manifest_path, &manifest)
}

fn log_counts(result: &ExtractionResult, counts: &ImportCounts) {
    match result {
        ExtractionResult::Grades(report) => info!(
            subject = %report.subject,
            quarter = %report.quarter,
            extracted = counts.assignments_extracted,
            added = counts.assignments_added,
            skipped = counts.assignments_skipped,
            subject_created = counts.subjects_created > 0,
            "grades merged"
        ),
        _ => info!(
            extracted = counts.homework_extracted,
            added = counts.tasks_added,
            skipped = counts.tasks_skipped,
            "homework merged"
        ),
    }
}

fn extraction_warnings(result: &ExtractionResult) -> Vec<String> {
    let mut warnings = Vec::new();
    if let ExtractionResult::Grades(report) = result {
        if report.overall_grade.is_none() {
            warnings.push("no term grade found; overall grade cleared".to_string());
        }
        if report.assignments.is_empty() {
            warnings.push("no assignment rows recognized".to_string());
        }
    }
    warnings
}

fn render_import_command(args: &ImportArgs) -> String {
    let mut command = vec!["homeroom".to_string(), "import".to_string()];
    render_store_flags(&mut command, &args.store);

    command.push("--input".to_string());
    command.push(args.report.input.display().to_string());
    if let Some(subject) = &args.report.subject {
        command.push("--subject".to_string());
        command.push(format!("{subject:?}"));
    }
    if let Some(quarter) = args.report.quarter {
        command.push("--quarter".to_string());
        command.push(quarter.to_string());
    }
    if let Some(name) = &args.report.student_name {
        command.push("--student-name".to_string());
        command.push(name.clone());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
