use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::debug;

use crate::model::{
    AssignmentCategory, AssignmentRecord, DEFAULT_ASSESSMENT_WEIGHT, DEFAULT_HWCW_WEIGHT,
    GradeReport, Quarter,
};
use crate::util::new_record_id;

use super::normalize::{normalize, truncate_chars};

pub(crate) const GRADE_SUBJECTS: [&str; 9] = [
    "Bible",
    "History",
    "Math",
    "Science",
    "Spanish",
    "Language Arts",
    "Art",
    "Music",
    "PE",
];

pub(crate) const MIN_ASSIGNMENT_NAME_CHARS: usize = 2;
pub(crate) const MAX_ASSIGNMENT_NAME_CHARS: usize = 100;

pub(crate) struct GradeReportParser {
    term_grade: Regex,
    assessment_weight: Regex,
    hwcw_weight: Regex,
    assignment_line: Regex,
}

impl GradeReportParser {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            term_grade: Regex::new(
                r"(?i)term\s*grade\s*(?P<score>\d+)(?:[ \t]*(?P<letter>[A-F][+-]?)(?:\s|$))?",
            )
            .context("failed to compile term grade regex")?,
            assessment_weight: Regex::new(r"(?is)Assessments.*?Weight\s*=\s*(?P<weight>\d+)")
                .context("failed to compile assessment weight regex")?,
            hwcw_weight: Regex::new(r"(?is)HW/CW.*?Weight\s*=\s*(?P<weight>\d+)")
                .context("failed to compile HW/CW weight regex")?,
            assignment_line: Regex::new(
                r"(?i)^(?P<name>.+?)\s+(?P<points>\d+)\s+(?P<max>\d+)\s+\d+\s+(?:valid|invalid)\b",
            )
            .context("failed to compile assignment line regex")?,
        })
    }

    pub(crate) fn parse(&self, text: &str, now: DateTime<Utc>) -> GradeReport {
        let (overall_grade, letter_grade) = self.term_grade(text);

        GradeReport {
            subject: detect_subject(text).unwrap_or_default().to_string(),
            quarter: detect_quarter(text),
            overall_grade,
            letter_grade,
            assessment_weight: capture_weight(&self.assessment_weight, text)
                .unwrap_or(DEFAULT_ASSESSMENT_WEIGHT),
            hwcw_weight: capture_weight(&self.hwcw_weight, text).unwrap_or(DEFAULT_HWCW_WEIGHT),
            assignments: self.parse_assignments(text, now),
        }
    }

    fn term_grade(&self, text: &str) -> (Option<String>, Option<String>) {
        let Some(captures) = self.term_grade.captures(text) else {
            return (None, None);
        };

        let score = captures
            .name("score")
            .map(|value| value.as_str().to_string());
        let letter = captures
            .name("letter")
            .map(|value| value.as_str().to_ascii_uppercase());
        (score, letter)
    }

    fn parse_assignments(&self, text: &str, now: DateTime<Utc>) -> Vec<AssignmentRecord> {
        let mut category = AssignmentCategory::Assessment;
        let mut seen = HashSet::<String>::new();
        let mut assignments = Vec::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();

            if line.starts_with("Assessments") {
                category = AssignmentCategory::Assessment;
                continue;
            }
            if line.starts_with("HW/CW") {
                category = AssignmentCategory::Hwcw;
                continue;
            }
            if line_is_grade_noise(line) {
                continue;
            }

            let Some(record) = self.parse_assignment_line(line, category, now) else {
                continue;
            };

            if !seen.insert(normalize(&record.name)) {
                debug!(name = %record.name, "skipping repeated assignment row");
                continue;
            }
            assignments.push(record);
        }

        assignments
    }

    fn parse_assignment_line(
        &self,
        line: &str,
        category: AssignmentCategory,
        now: DateTime<Utc>,
    ) -> Option<AssignmentRecord> {
        let captures = self.assignment_line.captures(line)?;
        let name = captures.name("name")?.as_str().trim();
        let points = captures.name("points")?.as_str().parse::<u32>().ok()?;
        let max = captures.name("max")?.as_str().parse::<u32>().ok()?;

        if max == 0 || name.chars().count() <= MIN_ASSIGNMENT_NAME_CHARS {
            return None;
        }

        Some(AssignmentRecord {
            id: new_record_id(),
            name: truncate_chars(name, MAX_ASSIGNMENT_NAME_CHARS),
            score_percent: score_percent(points, max),
            category,
            date_added: now,
        })
    }
}

pub(crate) fn detect_subject(text: &str) -> Option<&'static str> {
    GRADE_SUBJECTS
        .iter()
        .copied()
        .find(|subject| text.contains(subject))
}

/// Markers are checked Q1 through Q4; a report without one is assumed to be Q3.
pub(crate) fn detect_quarter(text: &str) -> Quarter {
    Quarter::ALL
        .into_iter()
        .find(|quarter| text.contains(quarter.report_marker()))
        .unwrap_or_default()
}

pub(super) fn score_percent(points: u32, max: u32) -> u8 {
    let ratio = f64::from(points) / f64::from(max) * 100.0;
    ratio.round().clamp(0.0, 100.0) as u8
}

fn capture_weight(pattern: &Regex, text: &str) -> Option<u32> {
    pattern
        .captures(text)?
        .name("weight")?
        .as_str()
        .parse::<u32>()
        .ok()
}

fn line_is_grade_noise(line: &str) -> bool {
    line.contains("Category Average")
        || line.contains("Term Grade")
        || (line.contains("Assignment") && line.contains("Pts") && line.contains("Max"))
}
