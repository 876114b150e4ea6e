use serde::{Deserialize, Serialize};
use std::fmt;

/// Per sub-item mark ceilings, in column order:
/// FA, Speaking, Basic Knowledge, Writing, Corrections, Behaviour, Activity.
pub const MAX_MARKS: [u32; 7] = [20, 5, 5, 5, 5, 5, 5];

pub const SUB_ITEMS: [&str; 7] = [
    "FA",
    "Speaking",
    "Basic Knowledge",
    "Writing",
    "Corrections",
    "Behaviour",
    "Activity",
];

/// Maximum attainable total for one subject (sum of MAX_MARKS).
pub const SUBJECT_MAX_TOTAL: u32 = 50;
/// Maximum attainable grand total across the five subjects.
pub const GRAND_MAX_TOTAL: u32 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Telugu,
    Hindi,
    English,
    Mathematics,
    Evs,
}

impl Subject {
    pub const ALL: [Subject; 5] = [
        Subject::Telugu,
        Subject::Hindi,
        Subject::English,
        Subject::Mathematics,
        Subject::Evs,
    ];

    /// Key used in the wire/persisted record shape.
    pub fn key(self) -> &'static str {
        match self {
            Subject::Telugu => "telugu",
            Subject::Hindi => "hindi",
            Subject::English => "english",
            Subject::Mathematics => "mathematics",
            Subject::Evs => "evs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subject::Telugu => "Telugu",
            Subject::Hindi => "Hindi",
            Subject::English => "English",
            Subject::Mathematics => "Mathematics",
            Subject::Evs => "EVS",
        }
    }

    pub fn from_key(key: &str) -> Option<Subject> {
        Subject::ALL
            .into_iter()
            .find(|s| s.key().eq_ignore_ascii_case(key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    D,
    C,
    B,
    #[serde(rename = "B+")]
    BPlus,
    A,
    #[serde(rename = "A+")]
    APlus,
}

/// One subject's sheet columns: seven raw sub-marks plus the derived
/// total/grade/SGPA. The derived fields are only ever written by
/// `recompute_subject`; an unset slot is a cell the teacher has not
/// filled in yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    pub marks: [Option<u32>; 7],
    pub total: u32,
    pub grade: Grade,
    pub sgpa: f64,
}

impl Default for SubjectRecord {
    fn default() -> Self {
        SubjectRecord {
            marks: [None; 7],
            total: 0,
            grade: Grade::D,
            sgpa: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub sno: i64,
    pub student_name: String,
    pub pen_number: String,
    pub telugu: SubjectRecord,
    pub hindi: SubjectRecord,
    pub english: SubjectRecord,
    pub mathematics: SubjectRecord,
    pub evs: SubjectRecord,
    pub grand_total: u32,
    pub total_grade: Grade,
    pub gpa: f64,
    pub percentage: f64,
}

impl StudentRecord {
    pub fn new(sno: i64, student_name: String, pen_number: String) -> Self {
        StudentRecord {
            sno,
            student_name,
            pen_number,
            telugu: SubjectRecord::default(),
            hindi: SubjectRecord::default(),
            english: SubjectRecord::default(),
            mathematics: SubjectRecord::default(),
            evs: SubjectRecord::default(),
            grand_total: 0,
            total_grade: Grade::D,
            gpa: 0.0,
            percentage: 0.0,
        }
    }

    pub fn subject(&self, subject: Subject) -> &SubjectRecord {
        match subject {
            Subject::Telugu => &self.telugu,
            Subject::Hindi => &self.hindi,
            Subject::English => &self.english,
            Subject::Mathematics => &self.mathematics,
            Subject::Evs => &self.evs,
        }
    }

    pub fn subject_mut(&mut self, subject: Subject) -> &mut SubjectRecord {
        match subject {
            Subject::Telugu => &mut self.telugu,
            Subject::Hindi => &mut self.hindi,
            Subject::English => &mut self.english,
            Subject::Mathematics => &mut self.mathematics,
            Subject::Evs => &mut self.evs,
        }
    }
}

/// A submitted mark fell outside its sub-item's allowed range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkRangeError {
    pub value: i64,
    pub max: u32,
    pub sub_index: usize,
}

impl MarkRangeError {
    pub fn sub_item(&self) -> &'static str {
        SUB_ITEMS[self.sub_index]
    }
}

impl fmt::Display for MarkRangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mark {} out of range for {}: maximum allowed is {}",
            self.value,
            self.sub_item(),
            self.max
        )
    }
}

/// Half-up 2-decimal rounding used for SGPA/GPA/percentage:
/// `Int(100*x + 0.5) / 100`
pub fn round_off_2_decimals(x: f64) -> f64 {
    ((100.0 * x) + 0.5).floor() / 100.0
}

/// Sum of the filled sub-marks; an unset slot contributes 0.
pub fn subject_total(marks: &[Option<u32>; 7]) -> u32 {
    marks.iter().map(|m| m.unwrap_or(0)).sum()
}

/// Grade band edges on the canonical 0-50 subject scale. A total belongs
/// to the first band whose (exclusive) upper edge it falls below.
const BAND_EDGES: [(u32, Grade); 5] = [
    (10, Grade::D),
    (20, Grade::C),
    (30, Grade::B),
    (40, Grade::BPlus),
    (46, Grade::A),
];

/// Piecewise-threshold classifier. Edges are calibrated on the 0-50
/// subject scale and rescaled proportionally for any other `max_total`,
/// so the 0-250 grand total gets bands five times as wide instead of the
/// absolute subject thresholds.
pub fn grade_for(total: u32, max_total: u32) -> Grade {
    for (edge, grade) in BAND_EDGES {
        if (total as u64) * (SUBJECT_MAX_TOTAL as u64) < (edge as u64) * (max_total as u64) {
            return grade;
        }
    }
    Grade::APlus
}

pub fn sgpa(subject_total: u32) -> f64 {
    round_off_2_decimals(subject_total as f64 / SUBJECT_MAX_TOTAL as f64 * 10.0)
}

pub fn gpa(grand_total: u32) -> f64 {
    round_off_2_decimals(grand_total as f64 / GRAND_MAX_TOTAL as f64 * 10.0)
}

pub fn percentage(grand_total: u32) -> f64 {
    round_off_2_decimals(grand_total as f64 / GRAND_MAX_TOTAL as f64 * 100.0)
}

/// Range-check a submitted mark before it touches a record. Returns the
/// typed mark on success so callers never store an unvalidated value.
pub fn validate_mark(value: i64, sub_index: usize) -> Result<u32, MarkRangeError> {
    let max = MAX_MARKS[sub_index];
    if value < 0 || value > max as i64 {
        return Err(MarkRangeError {
            value,
            max,
            sub_index,
        });
    }
    Ok(value as u32)
}

/// Derive total/grade/SGPA from the raw slots. Always a full recompute,
/// never an incremental patch.
pub fn recompute_subject(subject: &mut SubjectRecord) {
    subject.total = subject_total(&subject.marks);
    subject.grade = grade_for(subject.total, SUBJECT_MAX_TOTAL);
    subject.sgpa = sgpa(subject.total);
}

/// Derive the aggregate columns from the five subject totals. Must run
/// after any `recompute_subject` on one of the student's subjects.
pub fn recompute_student(student: &mut StudentRecord) {
    let grand: u32 = Subject::ALL
        .into_iter()
        .map(|s| student.subject(s).total)
        .sum();
    student.grand_total = grand;
    student.total_grade = grade_for(grand, GRAND_MAX_TOTAL);
    student.gpa = gpa(grand);
    student.percentage = percentage(grand);
}

/// The sheet is complete when every raw slot of every subject of every
/// student is filled in.
pub fn sheet_complete(students: &[StudentRecord]) -> bool {
    students.iter().all(|st| {
        Subject::ALL
            .into_iter()
            .all(|s| st.subject(s).marks.iter().all(|m| m.is_some()))
    })
}
