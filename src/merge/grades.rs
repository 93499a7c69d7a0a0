use chrono::{DateTime, Utc};
use tracing::debug;

use crate::dedup::DedupPolicy;
use crate::extract::{
    MAX_ASSIGNMENT_NAME_CHARS, MIN_ASSIGNMENT_NAME_CHARS, normalize, truncate_chars,
};
use crate::model::{
    AssignmentRecord, ClassGradeImport, DEFAULT_ASSESSMENT_WEIGHT, DEFAULT_HWCW_WEIGHT,
    GradeReport, Quarter, QuarterSnapshot, SubjectLedgerEntry,
};
use crate::util::new_record_id;

use super::MergeOutcome;

pub fn merge_grades(
    ledger: &mut Vec<SubjectLedgerEntry>,
    report: &GradeReport,
    now: DateTime<Utc>,
    policy: &DedupPolicy,
) -> MergeOutcome {
    let (snapshot, created) = quarter_snapshot_mut(ledger, &report.subject, report.quarter, now);

    let mut outcome = append_assignments(
        snapshot,
        report.assignments.iter().cloned(),
        |left, right| policy.same_assignment_name(left, right),
    );

    snapshot.overall = report.overall_grade.clone();
    snapshot.letter_grade = report.letter_grade.clone();
    snapshot.assessment_weight = report.assessment_weight;
    snapshot.hwcw_weight = report.hwcw_weight;

    mark_subject(&mut outcome, created);
    outcome
}

pub fn merge_class_grades(
    ledger: &mut Vec<SubjectLedgerEntry>,
    imports: &[ClassGradeImport],
    default_quarter: Quarter,
    now: DateTime<Utc>,
    policy: &DedupPolicy,
) -> MergeOutcome {
    let mut total = MergeOutcome::default();

    for import in imports {
        if normalize(&import.subject).is_empty() {
            debug!(subject = %import.subject, "skipping class grades without a usable subject");
            continue;
        }

        let quarter = import.quarter.unwrap_or(default_quarter);
        let (snapshot, created) = quarter_snapshot_mut(ledger, &import.subject, quarter, now);

        let incoming = import
            .assignments
            .iter()
            .filter_map(|assignment| {
                let name = assignment.name.trim();
                if name.chars().count() <= MIN_ASSIGNMENT_NAME_CHARS {
                    debug!(
                        subject = %import.subject,
                        name,
                        "skipping batch assignment without a usable name"
                    );
                    return None;
                }
                Some(AssignmentRecord {
                    id: new_record_id(),
                    name: truncate_chars(name, MAX_ASSIGNMENT_NAME_CHARS),
                    score_percent: assignment.score_percent,
                    category: assignment.category,
                    date_added: now,
                })
            });
        let mut outcome = append_assignments(snapshot, incoming, |left, right| {
            policy.is_same_assignment(left, right)
        });

        snapshot.overall = import.overall_grade.clone();
        snapshot.letter_grade = import.letter_grade.clone();
        snapshot.assessment_weight = import
            .assessment_weight
            .filter(|weight| *weight > 0)
            .unwrap_or(DEFAULT_ASSESSMENT_WEIGHT);
        snapshot.hwcw_weight = import
            .hwcw_weight
            .filter(|weight| *weight > 0)
            .unwrap_or(DEFAULT_HWCW_WEIGHT);

        mark_subject(&mut outcome, created);
        debug!(
            subject = %import.subject,
            quarter = %quarter,
            added = outcome.added,
            skipped = outcome.skipped,
            "merged class grades"
        );
        total.absorb(outcome);
    }

    total
}

fn quarter_snapshot_mut<'a>(
    ledger: &'a mut Vec<SubjectLedgerEntry>,
    subject: &str,
    quarter: Quarter,
    now: DateTime<Utc>,
) -> (&'a mut QuarterSnapshot, bool) {
    let key = normalize(subject);
    let existing = ledger
        .iter()
        .position(|entry| normalize(&entry.subject) == key);
    let (index, created) = match existing {
        Some(index) => (index, false),
        None => {
            ledger.push(SubjectLedgerEntry::new(
                new_record_id(),
                subject.trim().to_string(),
                now,
            ));
            (ledger.len() - 1, true)
        }
    };

    let entry = &mut ledger[index];
    entry.last_updated = now;
    let snapshot = entry
        .quarter_slot_mut(quarter)
        .get_or_insert_with(QuarterSnapshot::default);
    (snapshot, created)
}

fn append_assignments<I, F>(snapshot: &mut QuarterSnapshot, incoming: I, same: F) -> MergeOutcome
where
    I: IntoIterator<Item = AssignmentRecord>,
    F: Fn(&str, &str) -> bool,
{
    let mut outcome = MergeOutcome::default();

    for record in incoming {
        let duplicate = snapshot
            .assignments
            .iter()
            .any(|existing| same(&existing.name, &record.name));
        if duplicate {
            outcome.skipped += 1;
            continue;
        }
        snapshot.assignments.push(record);
        outcome.added += 1;
    }

    outcome
}

fn mark_subject(outcome: &mut MergeOutcome, created: bool) {
    if created {
        outcome.subjects_created += 1;
    } else {
        outcome.subjects_updated += 1;
    }
}
