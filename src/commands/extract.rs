use anyhow::Result;
use tracing::{info, warn};

use crate::cli::{ExtractArgs, ReportArgs};
use crate::extract::{ExtractOptions, ReportExtractor, apply_overrides};
use crate::model::ExtractionResult;
use crate::util::{print_json_pretty, read_input};

pub fn run(args: ExtractArgs) -> Result<()> {
    let text = read_input(&args.report.input)?;
    let (result, _) = extract_report(&args.report, &text)?;

    match result.readiness() {
        Ok(()) => info!(kind = result.kind().as_str(), "extraction ready to import"),
        Err(blocker) => warn!(
            kind = result.kind().as_str(),
            reason = %blocker,
            "extraction not importable"
        ),
    }
    log_summary(&result);

    print_json_pretty(&result)
}

pub(crate) fn extract_report(
    args: &ReportArgs,
    text: &str,
) -> Result<(ExtractionResult, ExtractOptions)> {
    let options = ExtractOptions::current(args.student_name.clone(), args.min_chars);
    let extractor = ReportExtractor::new(options.clone())?;

    let mut result = extractor.extract(text);
    let corrected = apply_overrides(&mut result, args.subject.as_deref(), args.quarter);
    if !corrected && (args.subject.is_some() || args.quarter.is_some()) {
        warn!(
            kind = result.kind().as_str(),
            "--subject/--quarter only apply to grade reports; ignoring"
        );
    }

    Ok((result, options))
}

pub(crate) fn log_summary(result: &ExtractionResult) {
    match result {
        ExtractionResult::Grades(report) => info!(
            subject = %report.subject,
            quarter = %report.quarter,
            overall = %report.overall_grade.as_deref().unwrap_or(""),
            letter = %report.letter_grade.as_deref().unwrap_or(""),
            assessment_weight = report.assessment_weight,
            hwcw_weight = report.hwcw_weight,
            assignments = report.assignments.len(),
            "grade report extracted"
        ),
        ExtractionResult::Homework(report) => info!(
            homework = report.homework_tasks.len(),
            "homework listing extracted"
        ),
        ExtractionResult::Unknown => info!("nothing recognizable in the pasted text"),
    }
}
