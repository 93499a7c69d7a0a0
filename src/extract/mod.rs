use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::debug;

use crate::dedup::DedupPolicy;
use crate::model::{ExtractionResult, Quarter, ReportKind};

mod classify;
mod dates;
mod grades;
mod homework;
mod normalize;
#[cfg(test)]
mod tests;

pub use normalize::{normalize, normalized_prefix};

use classify::ReportClassifier;
use grades::GradeReportParser;
use homework::HomeworkReportParser;

pub(crate) use grades::{MAX_ASSIGNMENT_NAME_CHARS, MIN_ASSIGNMENT_NAME_CHARS};
pub(crate) use normalize::truncate_chars;

pub const MIN_REPORT_CHARS: usize = 50;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
    pub student_name: Option<String>,
    pub min_chars: usize,
    pub policy: DedupPolicy,
}

impl ExtractOptions {
    pub fn current(student_name: Option<String>, min_chars: usize) -> Self {
        Self {
            today: Local::now().date_naive(),
            now: Utc::now(),
            student_name,
            min_chars,
            policy: DedupPolicy::default(),
        }
    }
}

pub struct ReportExtractor {
    classifier: ReportClassifier,
    grades: GradeReportParser,
    homework: HomeworkReportParser,
    options: ExtractOptions,
}

impl ReportExtractor {
    pub fn new(options: ExtractOptions) -> Result<Self> {
        Ok(Self {
            classifier: ReportClassifier::new()?,
            grades: GradeReportParser::new()?,
            homework: HomeworkReportParser::new(options.student_name.as_deref())?,
            options,
        })
    }

    pub fn classify(&self, text: &str) -> ReportKind {
        if text.trim().chars().count() < self.options.min_chars {
            return ReportKind::Unknown;
        }
        self.classifier.classify(text)
    }

    pub fn extract(&self, text: &str) -> ExtractionResult {
        let kind = self.classify(text);
        debug!(
            kind = kind.as_str(),
            chars = text.len(),
            "classified report"
        );

        match kind {
            ReportKind::Grades => {
                ExtractionResult::Grades(self.grades.parse(text, self.options.now))
            }
            ReportKind::Homework => ExtractionResult::Homework(self.homework.parse(
                text,
                self.options.today,
                self.options.now,
                &self.options.policy,
            )),
            ReportKind::Unknown => ExtractionResult::Unknown,
        }
    }
}

pub fn apply_overrides(
    result: &mut ExtractionResult,
    subject: Option<&str>,
    quarter: Option<Quarter>,
) -> bool {
    let ExtractionResult::Grades(report) = result else {
        return false;
    };

    if let Some(subject) = subject.map(str::trim).filter(|value| !value.is_empty()) {
        report.subject = subject.to_string();
    }
    if let Some(quarter) = quarter {
        report.quarter = quarter;
    }
    true
}
