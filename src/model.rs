use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ASSESSMENT_WEIGHT: u32 = 55;
pub const DEFAULT_HWCW_WEIGHT: u32 = 45;
pub const HOMEWORK_CATEGORY: &str = "homework";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Quarter {
    #[value(alias = "1")]
    Q1,
    #[value(alias = "2")]
    Q2,
    #[default]
    #[value(alias = "3")]
    Q3,
    #[value(alias = "4")]
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Q1 => "q1",
            Self::Q2 => "q2",
            Self::Q3 => "q3",
            Self::Q4 => "q4",
        }
    }

    pub fn report_marker(self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentCategory {
    #[default]
    Assessment,
    #[serde(alias = "hw/cw", alias = "hwCw")]
    Hwcw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    #[serde(deserialize_with = "record_id::deserialize")]
    pub id: String,
    pub name: String,
    #[serde(alias = "grade", deserialize_with = "score::deserialize")]
    pub score_percent: u8,
    #[serde(default)]
    pub category: AssignmentCategory,
    pub date_added: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterSnapshot {
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub overall: Option<String>,
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub letter_grade: Option<String>,
    #[serde(default = "default_assessment_weight")]
    pub assessment_weight: u32,
    #[serde(default = "default_hwcw_weight")]
    pub hwcw_weight: u32,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
}

impl Default for QuarterSnapshot {
    fn default() -> Self {
        Self {
            overall: None,
            letter_grade: None,
            assessment_weight: DEFAULT_ASSESSMENT_WEIGHT,
            hwcw_weight: DEFAULT_HWCW_WEIGHT,
            assignments: Vec::new(),
        }
    }
}

fn default_assessment_weight() -> u32 {
    DEFAULT_ASSESSMENT_WEIGHT
}

fn default_hwcw_weight() -> u32 {
    DEFAULT_HWCW_WEIGHT
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectLedgerEntry {
    #[serde(deserialize_with = "record_id::deserialize")]
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub q1: Option<QuarterSnapshot>,
    #[serde(default)]
    pub q2: Option<QuarterSnapshot>,
    #[serde(default)]
    pub q3: Option<QuarterSnapshot>,
    #[serde(default)]
    pub q4: Option<QuarterSnapshot>,
    #[serde(default)]
    pub last_updated: DateTime<Utc>,
}

impl SubjectLedgerEntry {
    pub fn new(id: String, subject: String, last_updated: DateTime<Utc>) -> Self {
        Self {
            id,
            subject,
            q1: None,
            q2: None,
            q3: None,
            q4: None,
            last_updated,
        }
    }

    pub fn quarter(&self, quarter: Quarter) -> Option<&QuarterSnapshot> {
        match quarter {
            Quarter::Q1 => self.q1.as_ref(),
            Quarter::Q2 => self.q2.as_ref(),
            Quarter::Q3 => self.q3.as_ref(),
            Quarter::Q4 => self.q4.as_ref(),
        }
    }

    pub fn quarter_slot_mut(&mut self, quarter: Quarter) -> &mut Option<QuarterSnapshot> {
        match quarter {
            Quarter::Q1 => &mut self.q1,
            Quarter::Q2 => &mut self.q2,
            Quarter::Q3 => &mut self.q3,
            Quarter::Q4 => &mut self.q4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkTaskDraft {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(with = "due_date")]
    pub due_date: Option<NaiveDate>,
    pub notes: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "record_id::deserialize")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<HomeworkTaskDraft> for Task {
    fn from(draft: HomeworkTaskDraft) -> Self {
        Self {
            id: draft.id,
            title: draft.title,
            category: draft.category,
            due_date: draft.due_date,
            notes: draft.notes,
            completed: draft.completed,
            created_at: draft.created_at,
            completed_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(deserialize_with = "record_id::deserialize")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrackerDocument {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub archived_tasks: Vec<Task>,
    #[serde(default)]
    pub grades: Vec<SubjectLedgerEntry>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub total_completed: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    pub tasks: Option<Vec<Task>>,
    pub archived_tasks: Option<Vec<Task>>,
    pub grades: Option<Vec<SubjectLedgerEntry>>,
    pub events: Option<Vec<CalendarEvent>>,
    pub streak: Option<u32>,
    pub total_completed: Option<u32>,
}

impl DocumentPatch {
    pub fn is_empty(&self) -> bool {
        self.provided_fields().is_empty()
    }

    pub fn provided_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.tasks.is_some() {
            fields.push("tasks");
        }
        if self.archived_tasks.is_some() {
            fields.push("archivedTasks");
        }
        if self.grades.is_some() {
            fields.push("grades");
        }
        if self.events.is_some() {
            fields.push("events");
        }
        if self.streak.is_some() {
            fields.push("streak");
        }
        if self.total_completed.is_some() {
            fields.push("totalCompleted");
        }
        fields
    }

    pub fn apply_to(self, document: &mut TrackerDocument) {
        if let Some(tasks) = self.tasks {
            document.tasks = tasks;
        }
        if let Some(archived_tasks) = self.archived_tasks {
            document.archived_tasks = archived_tasks;
        }
        if let Some(grades) = self.grades {
            document.grades = grades;
        }
        if let Some(events) = self.events {
            document.events = events;
        }
        if let Some(streak) = self.streak {
            document.streak = streak;
        }
        if let Some(total_completed) = self.total_completed {
            document.total_completed = total_completed;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeReport {
    pub subject: String,
    pub quarter: Quarter,
    pub overall_grade: Option<String>,
    pub letter_grade: Option<String>,
    pub assessment_weight: u32,
    pub hwcw_weight: u32,
    pub assignments: Vec<AssignmentRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeworkReport {
    pub homework_tasks: Vec<HomeworkTaskDraft>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExtractionResult {
    Grades(GradeReport),
    Homework(HomeworkReport),
    Unknown,
}

impl ExtractionResult {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Grades(_) => ReportKind::Grades,
            Self::Homework(_) => ReportKind::Homework,
            Self::Unknown => ReportKind::Unknown,
        }
    }

    pub fn readiness(&self) -> Result<(), ImportBlocker> {
        match self {
            Self::Grades(report) if report.subject.trim().is_empty() => {
                Err(ImportBlocker::MissingSubject)
            }
            Self::Grades(_) => Ok(()),
            Self::Homework(report) if report.homework_tasks.is_empty() => {
                Err(ImportBlocker::NoHomework)
            }
            Self::Homework(_) => Ok(()),
            Self::Unknown => Err(ImportBlocker::UnrecognizedReport),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Grades,
    Homework,
    Unknown,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grades => "grades",
            Self::Homework => "homework",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ImportBlocker {
    #[error("no subject detected in the grade report; pass --subject to choose one")]
    MissingSubject,
    #[error("no homework assignments were found in the pasted text")]
    NoHomework,
    #[error("text does not look like a gradebook report or a homework listing")]
    UnrecognizedReport,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGradeImport {
    #[serde(default)]
    pub class_grades: Vec<ClassGradeImport>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGradeImport {
    pub subject: String,
    #[serde(default)]
    pub quarter: Option<Quarter>,
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub overall_grade: Option<String>,
    #[serde(default, deserialize_with = "optional_text::deserialize")]
    pub letter_grade: Option<String>,
    #[serde(default)]
    pub assessment_weight: Option<u32>,
    #[serde(default)]
    pub hwcw_weight: Option<u32>,
    #[serde(default)]
    pub assignments: Vec<ClassGradeAssignment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGradeAssignment {
    pub name: String,
    #[serde(alias = "grade", deserialize_with = "score::deserialize")]
    pub score_percent: u8,
    #[serde(default)]
    pub category: AssignmentCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ImportCounts {
    pub assignments_extracted: usize,
    pub assignments_added: usize,
    pub assignments_skipped: usize,
    pub subjects_created: usize,
    pub subjects_updated: usize,
    pub homework_extracted: usize,
    pub tasks_added: usize,
    pub tasks_skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub command: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub report_kind: String,
    pub source_sha256: String,
    pub source_chars: usize,
    pub db_path: String,
    pub counts: ImportCounts,
    pub warnings: Vec<String>,
}

mod record_id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(value) => value,
            RawId::Int(value) => value.to_string(),
            RawId::Float(value) => value.to_string(),
        })
    }
}

mod score {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match RawScore::deserialize(deserializer)? {
            RawScore::Int(value) => value as f64,
            RawScore::Float(value) => value,
            RawScore::Text(value) => value
                .trim()
                .trim_end_matches('%')
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("invalid score: {value}")))?,
        };
        Ok(value.round().clamp(0.0, 100.0) as u8)
    }
}

mod optional_text {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawText {
        Text(String),
        Int(i64),
        Float(f64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<RawText>::deserialize(deserializer)?.map(|raw| match raw {
            RawText::Text(value) => value,
            RawText::Int(value) => value.to_string(),
            RawText::Float(value) => value.to_string(),
        });
        Ok(value.filter(|text| !text.trim().is_empty()))
    }
}

pub mod due_date {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDate::parse_from_str(text, FORMAT)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid due date: {text}"))),
        }
    }
}
