use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;
use tracing::debug;

use crate::dedup::DedupPolicy;
use crate::model::{HOMEWORK_CATEGORY, HomeworkReport, HomeworkTaskDraft};
use crate::util::new_record_id;

use super::dates::{DAY_HEADER_PATTERN, DateResolver};
use super::normalize::condense_whitespace;

/// Order matters: "Math 1" has to be tried before "Math".
pub(crate) const HOMEWORK_SUBJECTS: [&str; 10] = [
    "History",
    "Language Arts",
    "Math 1",
    "Math",
    "Science",
    "Spanish",
    "Bible",
    "Art",
    "Music",
    "PE",
];

const MIN_LINE_CHARS: usize = 15;
const MIN_TITLE_CHARS: usize = 10;
const MAX_TITLE_CHARS: usize = 300;

pub(crate) fn match_subject_header(line: &str) -> Option<&'static str> {
    HOMEWORK_SUBJECTS.iter().copied().find(|subject| {
        line == *subject
            || line
                .strip_prefix(subject)
                .is_some_and(|rest| rest.starts_with(' '))
            || line.eq_ignore_ascii_case(subject)
    })
}

struct TitleCleaner {
    due_parenthetical: Regex,
    due_slash: Regex,
    due_named: Regex,
    assigned_prefix: Regex,
    by_weekday: Regex,
}

impl TitleCleaner {
    fn new() -> Result<Self> {
        Ok(Self {
            due_parenthetical: Regex::new(r"(?i)\(due:?.*?\)")
                .context("failed to compile due parenthetical regex")?,
            due_slash: Regex::new(r"(?i)\bdue:?\s*\d{1,2}/\d{1,2}/\d{4}")
                .context("failed to compile due slash fragment regex")?,
            due_named: Regex::new(
                r"(?i)\bdue[:\s]*(?:\w+,?\s*)?(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s*\d{1,2}(?:st|nd|rd|th)?",
            )
            .context("failed to compile due named fragment regex")?,
            assigned_prefix: Regex::new(r"(?i)assigned:\s*")
                .context("failed to compile assigned prefix regex")?,
            by_weekday: Regex::new(
                r"(?i)\bby\s+(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)\s*\.?",
            )
            .context("failed to compile relative weekday fragment regex")?,
        })
    }

    fn clean(&self, line: &str) -> String {
        let title = self.due_parenthetical.replace_all(line, " ");
        let title = self.due_slash.replace_all(&title, " ");
        let title = self.due_named.replace_all(&title, " ");
        let title = self.assigned_prefix.replace_all(&title, "");
        let title = self.by_weekday.replace_all(&title, " ");
        condense_whitespace(&title)
    }
}

pub(crate) struct HomeworkReportParser {
    day_header: Regex,
    boilerplate: Regex,
    cleaner: TitleCleaner,
    dates: DateResolver,
}

impl HomeworkReportParser {
    pub(crate) fn new(student_name: Option<&str>) -> Result<Self> {
        let student_prefix = student_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| format!("|{}", regex::escape(name)))
            .unwrap_or_default();
        let boilerplate = format!(
            r"(?i)^(?:Print|Week of|Previous|Next|Student|Sort|Include{student_prefix}|\d{{1,2}}/\d{{1,2}}/\d{{4}}$)"
        );

        Ok(Self {
            day_header: Regex::new(DAY_HEADER_PATTERN)
                .context("failed to compile day header regex")?,
            boilerplate: Regex::new(&boilerplate)
                .context("failed to compile boilerplate prefix regex")?,
            cleaner: TitleCleaner::new()?,
            dates: DateResolver::new()?,
        })
    }

    pub(crate) fn parse(
        &self,
        text: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
        policy: &DedupPolicy,
    ) -> HomeworkReport {
        let mut current_subject: Option<&'static str> = None;
        let mut current_day_date: Option<NaiveDate> = None;
        let mut drafts = Vec::<HomeworkTaskDraft>::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();

            if let Some(captures) = self.day_header.captures(line) {
                current_day_date = captures
                    .name("date")
                    .and_then(|value| self.dates.resolve_slash_date(value.as_str()));
                current_subject = None;
                continue;
            }

            if let Some(subject) = match_subject_header(line) {
                current_subject = Some(subject);
                continue;
            }

            let Some(subject) = current_subject else {
                continue;
            };
            if line.chars().count() < MIN_LINE_CHARS || self.boilerplate.is_match(line) {
                continue;
            }

            let due_date = self
                .dates
                .resolve_line_due_date(line, current_day_date, today.year());
            let title = self.cleaner.clean(line);
            let title_chars = title.chars().count();
            if title_chars <= MIN_TITLE_CHARS || title_chars >= MAX_TITLE_CHARS {
                debug!(line, "skipping homework line with unusable title length");
                continue;
            }

            if policy.draft_already_seen(drafts.iter().map(|draft| draft.title.as_str()), &title) {
                debug!(title = %title, subject, "skipping repeated homework line");
                continue;
            }

            drafts.push(HomeworkTaskDraft {
                id: new_record_id(),
                title: format!("{title} ({subject})"),
                category: HOMEWORK_CATEGORY.to_string(),
                due_date,
                notes: String::new(),
                completed: false,
                created_at: now,
            });
        }

        HomeworkReport {
            homework_tasks: drafts,
        }
    }
}
