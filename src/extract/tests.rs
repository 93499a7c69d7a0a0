use chrono::{NaiveDate, TimeZone, Utc, Weekday};

use super::dates::{DateResolver, parse_weekday, resolve_relative_weekday};
use super::grades::score_percent;
use super::*;
use crate::model::{AssignmentCategory, ExtractionResult, Quarter, ReportKind};

const GRADE_REPORT: &str = "Gradebook Report
Student: Sample Student
Class: Science 7 - Q2
Term Grade 91 A-
Assessments Weight = 60
Assignment Pts Max Avg Status Due
Unit 1 Test 45 50 45 Valid 01/07
Essay Draft 80 100 80 Valid 01/09
Category Average 85
HW/CW Weight = 40
Assignment Pts Max Avg Status Due
Lab Worksheet 9 10 9 Valid 01/08
Extra Credit 0 0 0 Valid 01/10
Missing Item 0 10 0 Invalid 01/11
Ok 5 5 5 Valid
Category Average 93
";

const HOMEWORK_LISTING: &str = "Print
Week of 1/5/2026
Previous Next
Monday 01/05/2026
Science
Read Chapter 5 (Due: 01/16/2026)
Submit essay by Friday
Math
Worksheet 3.2 problems 1-20 due Fri, Jan 9th
Short line
Tuesday 01/06/2026
History
Assigned: Timeline of the Revolution project
Tristan Sample 1/5/2026 weekly view
Math
Worksheet 3.2 problems 1-20 due Fri, Jan 9th
";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

fn options() -> ExtractOptions {
    ExtractOptions {
        today: date(2026, 1, 5),
        now: Utc
            .with_ymd_and_hms(2026, 1, 5, 15, 30, 0)
            .single()
            .expect("valid test timestamp"),
        student_name: Some("Tristan".to_string()),
        min_chars: MIN_REPORT_CHARS,
        policy: DedupPolicy::default(),
    }
}

fn extractor() -> ReportExtractor {
    ReportExtractor::new(options()).expect("extractor builds")
}

fn grade_parser() -> GradeReportParser {
    GradeReportParser::new().expect("grade parser builds")
}

fn homework_drafts(text: &str) -> Vec<crate::model::HomeworkTaskDraft> {
    let parser = HomeworkReportParser::new(Some("Tristan")).expect("homework parser builds");
    let options = options();
    parser
        .parse(text, options.today, options.now, &options.policy)
        .homework_tasks
}

#[test]
fn normalize_keeps_only_lowercase_alphanumerics() {
    assert_eq!(
        normalize("Read Chapter 5 (Science)!"),
        "readchapter5science"
    );
    assert_eq!(normalize("  HW/CW — Quiz #3  "), "hwcwquiz3");
    assert_eq!(normalize("Ünit Tëst"), "nittst");
    assert_eq!(normalize(""), "");
}

#[test]
fn normalize_is_idempotent() {
    for sample in [
        "Essay Draft",
        "Read Chapter 5 (Due: 01/16/2026)",
        "  mixed CASE\twith\ttabs ",
        "ÀÉÎ accents ÕÜ",
        "1/2/2026",
    ] {
        let once = normalize(sample);
        assert_eq!(
            normalize(&once),
            once,
            "normalize({sample:?}) not idempotent"
        );
    }
}

#[test]
fn normalized_prefix_counts_normalized_characters() {
    assert_eq!(normalized_prefix("A-B-C-D-E", 3), "abc");
    assert_eq!(normalized_prefix("ab", 30), "ab");
}

#[test]
fn classify_detects_grade_markers() {
    let extractor = extractor();
    assert_eq!(extractor.classify(GRADE_REPORT), ReportKind::Grades);

    let weights_only = "Some class page without the usual title\nHW/CW Weight = 45\nmore text here";
    assert_eq!(extractor.classify(weights_only), ReportKind::Grades);
}

#[test]
fn classify_requires_homework_structure() {
    let extractor = extractor();
    assert_eq!(extractor.classify(HOMEWORK_LISTING), ReportKind::Homework);

    let unrelated =
        "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor.";
    assert_eq!(extractor.classify(unrelated), ReportKind::Unknown);
}

#[test]
fn classify_is_deterministic() {
    let extractor = extractor();
    for text in [GRADE_REPORT, HOMEWORK_LISTING, "short"] {
        assert_eq!(extractor.classify(text), extractor.classify(text));
    }
}

#[test]
fn classify_ignores_text_below_minimum_length() {
    let extractor = extractor();
    assert_eq!(extractor.classify("Term Grade 91 A-"), ReportKind::Unknown);
    assert_eq!(
        extractor.extract("Term Grade 91 A-"),
        ExtractionResult::Unknown
    );
}

#[test]
fn grade_report_fields_are_extracted() {
    let report = grade_parser().parse(GRADE_REPORT, options().now);

    assert_eq!(report.subject, "Science");
    assert_eq!(report.quarter, Quarter::Q2);
    assert_eq!(report.overall_grade.as_deref(), Some("91"));
    assert_eq!(report.letter_grade.as_deref(), Some("A-"));
    assert_eq!(report.assessment_weight, 60);
    assert_eq!(report.hwcw_weight, 40);

    let rows: Vec<(&str, u8, AssignmentCategory)> = report
        .assignments
        .iter()
        .map(|record| (record.name.as_str(), record.score_percent, record.category))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Unit 1 Test", 90, AssignmentCategory::Assessment),
            ("Essay Draft", 80, AssignmentCategory::Assessment),
            ("Lab Worksheet", 90, AssignmentCategory::Hwcw),
            ("Missing Item", 0, AssignmentCategory::Hwcw),
        ]
    );
    assert!(
        report
            .assignments
            .iter()
            .all(|record| record.date_added == options().now)
    );
}

#[test]
fn assignment_line_after_assessments_header() {
    let text = "Assessments\nEssay Draft 80 100 80 Valid 01/07";
    let report = grade_parser().parse(text, options().now);

    assert_eq!(report.assignments.len(), 1);
    let record = &report.assignments[0];
    assert_eq!(record.name, "Essay Draft");
    assert_eq!(record.score_percent, 80);
    assert_eq!(record.category, AssignmentCategory::Assessment);
}

#[test]
fn term_grade_with_letter() {
    let report = grade_parser().parse("Math\nTerm Grade 91 A-\n", options().now);
    assert_eq!(report.overall_grade.as_deref(), Some("91"));
    assert_eq!(report.letter_grade.as_deref(), Some("A-"));
}

#[test]
fn term_grade_accepts_lowercase_letter() {
    let report = grade_parser().parse("Art\nterm grade 91 a-\n", options().now);
    assert_eq!(report.overall_grade.as_deref(), Some("91"));
    assert_eq!(report.letter_grade.as_deref(), Some("A-"));
}

#[test]
fn term_grade_letter_does_not_swallow_next_heading() {
    let report = grade_parser().parse("Term Grade 88\nAssessments Weight = 50", options().now);
    assert_eq!(report.overall_grade.as_deref(), Some("88"));
    assert!(report.letter_grade.is_none());
    assert_eq!(report.assessment_weight, 50);
    assert_eq!(report.hwcw_weight, 45);
}

#[test]
fn grade_defaults_apply_when_markers_missing() {
    let report = grade_parser().parse(
        "Gradebook Report\nUnknown course page\nQuiz Retake 7 10 7 valid",
        options().now,
    );

    assert!(report.subject.is_empty());
    assert_eq!(report.quarter, Quarter::Q3);
    assert!(report.overall_grade.is_none());
    assert_eq!(report.assessment_weight, 55);
    assert_eq!(report.hwcw_weight, 45);
    assert_eq!(report.assignments.len(), 1);
    assert_eq!(report.assignments[0].score_percent, 70);
}

#[test]
fn assignment_scores_round_and_cap() {
    assert_eq!(score_percent(2, 3), 67);
    assert_eq!(score_percent(1, 8), 13);
    assert_eq!(score_percent(12, 10), 100);
}

#[test]
fn assignment_names_are_truncated_and_repeats_dropped() {
    let long_name = "Research Paper ".repeat(10);
    let text = format!(
        "Assessments\n{long_name} 90 100 90 Valid\nQuiz 1 8 10 8 Valid\nQUIZ 1 9 10 9 Valid\n"
    );
    let report = grade_parser().parse(&text, options().now);

    assert_eq!(report.assignments.len(), 2);
    assert_eq!(report.assignments[0].name.chars().count(), 100);
    assert_eq!(report.assignments[1].name, "Quiz 1");
    assert_eq!(report.assignments[1].score_percent, 80);
}

#[test]
fn slash_dates_are_zero_padded_and_validated() {
    let dates = DateResolver::new().expect("date resolver builds");
    assert_eq!(
        dates.resolve_slash_date("due 1/6/2026"),
        Some(date(2026, 1, 6))
    );
    assert_eq!(dates.resolve_slash_date("13/40/2026"), None);
    assert_eq!(dates.resolve_slash_date("no date here"), None);
}

#[test]
fn named_dates_assume_supplied_year() {
    let dates = DateResolver::new().expect("date resolver builds");
    assert_eq!(
        dates.resolve_named_date("Jan 16th", 2026),
        Some(date(2026, 1, 16))
    );
    assert_eq!(
        dates.resolve_named_date("September 3", 2025),
        Some(date(2025, 9, 3))
    );
    assert_eq!(
        dates.resolve_named_date("Sept. 3", 2026),
        Some(date(2026, 9, 3))
    );
    assert_eq!(dates.resolve_named_date("Marching 5", 2026), None);
}

#[test]
fn relative_weekday_is_strictly_after_reference() {
    let monday = date(2026, 1, 5);
    assert_eq!(
        resolve_relative_weekday(monday, Weekday::Fri),
        date(2026, 1, 9)
    );
    assert_eq!(
        resolve_relative_weekday(monday, Weekday::Mon),
        date(2026, 1, 12)
    );

    let friday = date(2026, 1, 9);
    assert_eq!(
        resolve_relative_weekday(friday, Weekday::Tue),
        date(2026, 1, 13)
    );
    assert_eq!(parse_weekday("thursday"), Some(Weekday::Thu));
}

#[test]
fn line_due_date_precedence() {
    let dates = DateResolver::new().expect("date resolver builds");
    let monday = Some(date(2026, 1, 5));

    assert_eq!(
        dates.resolve_line_due_date("Quiz review due 01/20/2026 by Friday", monday, 2026),
        Some(date(2026, 1, 20))
    );
    assert_eq!(
        dates.resolve_line_due_date("Project outline due Jan 22 by Friday", monday, 2026),
        Some(date(2026, 1, 22))
    );
    assert_eq!(
        dates.resolve_line_due_date("Finish the packet by Thursday", monday, 2026),
        Some(date(2026, 1, 8))
    );
    assert_eq!(
        dates.resolve_line_due_date("Finish the packet carefully", monday, 2026),
        monday
    );
    assert_eq!(
        dates.resolve_line_due_date("Finish the packet by Thursday", None, 2026),
        None
    );
}

#[test]
fn homework_listing_produces_cleaned_drafts() {
    let drafts = homework_drafts(HOMEWORK_LISTING);

    let rows: Vec<(&str, Option<NaiveDate>)> = drafts
        .iter()
        .map(|draft| (draft.title.as_str(), draft.due_date))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Read Chapter 5 (Science)", Some(date(2026, 1, 16))),
            ("Submit essay (Science)", Some(date(2026, 1, 9))),
            ("Worksheet 3.2 problems 1-20 (Math)", Some(date(2026, 1, 9))),
            (
                "Timeline of the Revolution project (History)",
                Some(date(2026, 1, 6))
            ),
        ]
    );

    for draft in &drafts {
        assert_eq!(draft.category, "homework");
        assert!(!draft.completed);
        assert!(draft.notes.is_empty());
        assert_eq!(draft.created_at, options().now);
    }
}

#[test]
fn homework_line_with_explicit_due_date() {
    let drafts = homework_drafts(
        "Monday 01/12/2026\nScience\nRead Chapter 5 (Due: 01/16/2026)\n",
    );
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "Read Chapter 5 (Science)");
    assert_eq!(drafts[0].due_date, Some(date(2026, 1, 16)));
}

#[test]
fn homework_by_weekday_resolves_within_same_week() {
    let drafts = homework_drafts("Monday 01/05/2026\nScience\nSubmit essay by Friday\n");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].due_date, Some(date(2026, 1, 9)));
}

#[test]
fn homework_lines_need_a_subject_and_length() {
    let drafts = homework_drafts(
        "Monday 01/05/2026\nThis line has no subject yet\nScience\nToo short\nStudent Portal navigation bar\n",
    );
    assert!(drafts.is_empty());
}

#[test]
fn non_latin_line_is_kept_after_another_draft() {
    let drafts = homework_drafts(
        "Science\nRead Chapter 5 of the textbook\nПрочитать главу пять дома\n",
    );
    let titles: Vec<&str> = drafts.iter().map(|draft| draft.title.as_str()).collect();
    assert_eq!(
        titles,
        [
            "Read Chapter 5 of the textbook (Science)",
            "Прочитать главу пять дома (Science)",
        ]
    );
}

#[test]
fn day_header_resets_subject() {
    let drafts = homework_drafts(
        "Monday 01/05/2026\nScience\nLab safety contract signed\nTuesday 01/06/2026\nOrphan line without subject\n",
    );
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "Lab safety contract signed (Science)");
}

#[test]
fn math_1_subject_wins_over_math() {
    let drafts = homework_drafts("Math 1 - Period 3\nPractice set 4.1 odd problems\n");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].title, "Practice set 4.1 odd problems (Math 1)");
    assert!(drafts[0].due_date.is_none());
}

#[test]
fn extraction_is_repeatable() {
    let extractor = extractor();
    let first = extractor.extract(HOMEWORK_LISTING);
    let second = extractor.extract(HOMEWORK_LISTING);

    let (ExtractionResult::Homework(first), ExtractionResult::Homework(second)) = (first, second)
    else {
        panic!("expected homework results");
    };
    let titles = |report: &crate::model::HomeworkReport| {
        report
            .homework_tasks
            .iter()
            .map(|draft| (draft.title.clone(), draft.due_date))
            .collect::<Vec<_>>()
    };
    assert_eq!(titles(&first), titles(&second));
}

#[test]
fn overrides_only_touch_grade_results() {
    let extractor = extractor();
    let mut grades = extractor.extract(GRADE_REPORT);
    assert!(apply_overrides(
        &mut grades,
        Some("Biology"),
        Some(Quarter::Q4)
    ));
    let ExtractionResult::Grades(report) = &grades else {
        panic!("expected grade result");
    };
    assert_eq!(report.subject, "Biology");
    assert_eq!(report.quarter, Quarter::Q4);

    let mut homework = extractor.extract(HOMEWORK_LISTING);
    assert!(!apply_overrides(&mut homework, Some("Biology"), None));
}
