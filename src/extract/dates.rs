use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use regex::Regex;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const MONTH_WORD: &str = r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*";
const WEEKDAY_WORD: &str = r"(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)";

pub(crate) const DAY_HEADER_PATTERN: &str = r"(?i)^(?P<weekday>monday|tuesday|wednesday|thursday|friday|saturday|sunday)\s+(?P<date>\d{1,2}/\d{1,2}/\d{4})";

pub(crate) struct DateResolver {
    slash_date: Regex,
    named_date: Regex,
    due_slash: Regex,
    due_named: Regex,
    by_weekday: Regex,
}

impl DateResolver {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            slash_date: Regex::new(r"(?P<month>\d{1,2})/(?P<day>\d{1,2})/(?P<year>\d{4})")
                .context("failed to compile slash date regex")?,
            named_date: Regex::new(&format!(
                r"(?i)\b(?P<month>{MONTH_WORD})\.?\s*(?P<day>\d{{1,2}})(?:st|nd|rd|th)?\b"
            ))
            .context("failed to compile named date regex")?,
            due_slash: Regex::new(r"(?i)\bdue[:\s]*(?P<date>\d{1,2}/\d{1,2}/\d{4})")
                .context("failed to compile due slash date regex")?,
            due_named: Regex::new(&format!(
                r"(?i)\bdue[:\s]*(?:\w+,?\s*)?(?P<date>{MONTH_WORD}\.?\s*\d{{1,2}})"
            ))
            .context("failed to compile due named date regex")?,
            by_weekday: Regex::new(&format!(r"(?i)\bby\s+(?P<weekday>{WEEKDAY_WORD})\b"))
                .context("failed to compile relative weekday regex")?,
        })
    }

    pub(crate) fn resolve_slash_date(&self, text: &str) -> Option<NaiveDate> {
        let captures = self.slash_date.captures(text)?;
        let month = captures.name("month")?.as_str().parse::<u32>().ok()?;
        let day = captures.name("day")?.as_str().parse::<u32>().ok()?;
        let year = captures.name("year")?.as_str().parse::<i32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// "Jan 16", "January 16th", "Sept. 3". The year is not on the page, so the
    /// caller's current year is assumed, which is wrong across a year boundary.
    pub(crate) fn resolve_named_date(&self, text: &str, year: i32) -> Option<NaiveDate> {
        self.named_date.captures_iter(text).find_map(|captures| {
            let month = month_number(captures.name("month")?.as_str())?;
            let day = captures.name("day")?.as_str().parse::<u32>().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
    }

    pub(crate) fn resolve_line_due_date(
        &self,
        line: &str,
        day_date: Option<NaiveDate>,
        year: i32,
    ) -> Option<NaiveDate> {
        if let Some(date) = self
            .due_slash
            .captures(line)
            .and_then(|captures| self.resolve_slash_date(captures.name("date")?.as_str()))
        {
            return Some(date);
        }

        if let Some(date) = self
            .due_named
            .captures(line)
            .and_then(|captures| self.resolve_named_date(captures.name("date")?.as_str(), year))
        {
            return Some(date);
        }

        if let (Some(reference), Some(weekday)) = (day_date, self.relative_weekday(line)) {
            return Some(resolve_relative_weekday(reference, weekday));
        }

        day_date
    }

    fn relative_weekday(&self, line: &str) -> Option<Weekday> {
        let captures = self.by_weekday.captures(line)?;
        parse_weekday(captures.name("weekday")?.as_str())
    }
}

pub fn resolve_relative_weekday(reference: NaiveDate, weekday: Weekday) -> NaiveDate {
    let target = i64::from(weekday.num_days_from_sunday());
    let current = i64::from(reference.weekday().num_days_from_sunday());

    let mut offset = target - current;
    if offset <= 0 {
        offset += 7;
    }

    reference + Duration::days(offset)
}

pub fn parse_weekday(name: &str) -> Option<Weekday> {
    name.trim().parse::<Weekday>().ok()
}

fn month_number(word: &str) -> Option<u32> {
    let word = word.to_ascii_lowercase();
    if word.len() < 3 {
        return None;
    }

    MONTHS
        .iter()
        .position(|month| month.starts_with(&word))
        .map(|index| index as u32 + 1)
}
