use chrono::{DateTime, Utc};

use crate::dedup::DedupPolicy;
use crate::model::{ExtractionResult, ImportBlocker, ImportCounts, TrackerDocument};

mod grades;
mod homework;

pub use grades::{merge_class_grades, merge_grades};
pub use homework::merge_homework;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeOutcome {
    pub added: usize,
    pub skipped: usize,
    pub subjects_created: usize,
    pub subjects_updated: usize,
}

impl MergeOutcome {
    fn absorb(&mut self, other: MergeOutcome) {
        self.added += other.added;
        self.skipped += other.skipped;
        self.subjects_created += other.subjects_created;
        self.subjects_updated += other.subjects_updated;
    }
}

pub fn apply_extraction(
    document: &mut TrackerDocument,
    result: &ExtractionResult,
    now: DateTime<Utc>,
    policy: &DedupPolicy,
) -> Result<ImportCounts, ImportBlocker> {
    result.readiness()?;

    let mut counts = ImportCounts::default();
    match result {
        ExtractionResult::Grades(report) => {
            let outcome = merge_grades(&mut document.grades, report, now, policy);
            counts.assignments_extracted = report.assignments.len();
            counts.assignments_added = outcome.added;
            counts.assignments_skipped = outcome.skipped;
            counts.subjects_created = outcome.subjects_created;
            counts.subjects_updated = outcome.subjects_updated;
        }
        ExtractionResult::Homework(report) => {
            let outcome = merge_homework(&mut document.tasks, &report.homework_tasks, policy);
            counts.homework_extracted = report.homework_tasks.len();
            counts.tasks_added = outcome.added;
            counts.tasks_skipped = outcome.skipped;
        }
        ExtractionResult::Unknown => return Err(ImportBlocker::UnrecognizedReport),
    }

    Ok(counts)
}
