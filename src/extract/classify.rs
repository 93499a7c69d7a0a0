use anyhow::{Context, Result};
use regex::Regex;

use crate::model::ReportKind;

use super::dates::DAY_HEADER_PATTERN;
use super::homework::match_subject_header;

const GRADE_MARKERS: [&str; 3] = ["Term Grade", "Gradebook Report", "Weight ="];

pub(crate) struct ReportClassifier {
    day_header: Regex,
}

impl ReportClassifier {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            day_header: Regex::new(DAY_HEADER_PATTERN)
                .context("failed to compile day header regex")?,
        })
    }

    pub(crate) fn classify(&self, text: &str) -> ReportKind {
        if GRADE_MARKERS.iter().any(|marker| text.contains(marker)) {
            return ReportKind::Grades;
        }

        let has_homework_structure = text
            .lines()
            .map(str::trim)
            .any(|line| self.day_header.is_match(line) || match_subject_header(line).is_some());

        if has_homework_structure {
            ReportKind::Homework
        } else {
            ReportKind::Unknown
        }
    }
}
