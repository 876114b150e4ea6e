use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::grading::StudentRecord;

/// The five real schools, in the fixed enumeration order the ALL sheet
/// concatenates them in.
pub const SCHOOLS: [&str; 5] = [
    "Talaricheruvu",
    "Boyareddypalli",
    "Mantapampalli",
    "Ganesh Pahad",
    "Tandur",
];

/// Pseudo-school combining every real school's roster.
pub const ALL_SCHOOLS: &str = "ALL";

pub const ROSTER_FILE: &str = "studentsData.json";

pub fn is_known_school(name: &str) -> bool {
    name == ALL_SCHOOLS || SCHOOLS.contains(&name)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RosterEntry {
    student_name: String,
    pen_number: String,
}

/// Roster document: school name -> enrolled students, read once per load
/// from `studentsData.json` in the workspace.
#[derive(Debug, Clone)]
pub struct RosterDoc {
    by_school: HashMap<String, Vec<(String, String)>>,
}

impl RosterDoc {
    pub fn read(workspace: &Path) -> anyhow::Result<RosterDoc> {
        let path = workspace.join(ROSTER_FILE);
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("read roster file {}", path.display()))?;
        let raw: HashMap<String, Vec<RosterEntry>> =
            serde_json::from_str(&text).context("parse roster file")?;
        let by_school = raw
            .into_iter()
            .map(|(school, entries)| {
                let names = entries
                    .into_iter()
                    .map(|e| (e.student_name, e.pen_number))
                    .collect();
                (school, names)
            })
            .collect();
        Ok(RosterDoc { by_school })
    }

    /// Fresh records for one sheet: raw marks unset, serial numbers
    /// assigned from 1. A school absent from the document yields an
    /// empty roster; ALL concatenates the real schools in order and
    /// numbers the combined sheet sequentially.
    pub fn records_for(&self, school: &str) -> anyhow::Result<Vec<StudentRecord>> {
        if !is_known_school(school) {
            return Err(anyhow!("unknown school: {}", school));
        }
        let mut records = Vec::new();
        if school == ALL_SCHOOLS {
            for real in SCHOOLS {
                self.push_school(real, &mut records);
            }
        } else {
            self.push_school(school, &mut records);
        }
        Ok(records)
    }

    fn push_school(&self, school: &str, out: &mut Vec<StudentRecord>) {
        let Some(entries) = self.by_school.get(school) else {
            return;
        };
        for (name, pen) in entries {
            let sno = out.len() as i64 + 1;
            out.push(StudentRecord::new(sno, name.clone(), pen.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_workspace(doc: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "marksheet-roster-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        std::fs::write(p.join(ROSTER_FILE), doc).expect("write roster");
        p
    }

    #[test]
    fn loads_single_school_with_serials_from_one() {
        let ws = temp_workspace(
            r#"{
                "Tandur": [
                    {"studentName": "Anil", "penNumber": "T001"},
                    {"studentName": "Bhavani", "penNumber": "T002"}
                ]
            }"#,
        );
        let doc = RosterDoc::read(&ws).expect("read roster");
        let records = doc.records_for("Tandur").expect("records");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sno, 1);
        assert_eq!(records[0].student_name, "Anil");
        assert_eq!(records[1].sno, 2);
        assert!(records[1].telugu.marks.iter().all(|m| m.is_none()));
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn all_concatenates_schools_in_enumeration_order() {
        let ws = temp_workspace(
            r#"{
                "Tandur": [{"studentName": "Z Last", "penNumber": "T001"}],
                "Talaricheruvu": [{"studentName": "A First", "penNumber": "TC01"}]
            }"#,
        );
        let doc = RosterDoc::read(&ws).expect("read roster");
        let records = doc.records_for(ALL_SCHOOLS).expect("records");
        // Talaricheruvu enumerates before Tandur regardless of document order.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].student_name, "A First");
        assert_eq!(records[1].student_name, "Z Last");
        assert_eq!(records[1].sno, 2);
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn missing_school_yields_empty_roster() {
        let ws = temp_workspace(r#"{}"#);
        let doc = RosterDoc::read(&ws).expect("read roster");
        assert!(doc.records_for("Mantapampalli").expect("records").is_empty());
        assert!(doc.records_for("Nowhere").is_err());
        let _ = std::fs::remove_dir_all(ws);
    }
}
