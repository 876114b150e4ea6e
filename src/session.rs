use crate::grading::{
    recompute_student, recompute_subject, sheet_complete, validate_mark, MarkRangeError,
    StudentRecord, Subject,
};

/// The loaded sheet: selected school, its record collection, and the
/// editable flag. Owns the only mutable copy of the records between
/// edits; everything persisted is a snapshot of this state.
pub struct Session {
    pub school: String,
    pub students: Vec<StudentRecord>,
    pub editable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The sheet is complete and has not been re-enabled for editing.
    ReadOnly,
    NoSuchRow { row: usize, rows: usize },
    Range(MarkRangeError),
}

impl Session {
    pub fn new(school: impl Into<String>, students: Vec<StudentRecord>) -> Self {
        Session {
            school: school.into(),
            students,
            editable: true,
        }
    }

    pub fn complete(&self) -> bool {
        sheet_complete(&self.students)
    }

    /// Full edit pipeline for one cell: validate, mutate the raw slot,
    /// recompute the subject, recompute the student aggregates. `None`
    /// clears the slot. On any error the records are untouched.
    pub fn apply_mark(
        &mut self,
        row: usize,
        subject: Subject,
        sub_index: usize,
        value: Option<i64>,
    ) -> Result<&StudentRecord, EditError> {
        if !self.editable {
            return Err(EditError::ReadOnly);
        }
        let rows = self.students.len();
        let Some(student) = self.students.get_mut(row) else {
            return Err(EditError::NoSuchRow { row, rows });
        };

        let mark = match value {
            Some(v) => Some(validate_mark(v, sub_index).map_err(EditError::Range)?),
            None => None,
        };

        let record = student.subject_mut(subject);
        record.marks[sub_index] = mark;
        recompute_subject(record);
        recompute_student(student);

        Ok(&self.students[row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Grade;

    fn session_with_one_student() -> Session {
        Session::new(
            "Tandur",
            vec![StudentRecord::new(1, "Anil".into(), "T001".into())],
        )
    }

    #[test]
    fn accepted_edit_recomputes_subject_and_aggregates() {
        let mut session = session_with_one_student();
        let student = session
            .apply_mark(0, Subject::Telugu, 0, Some(20))
            .expect("edit");
        assert_eq!(student.telugu.marks[0], Some(20));
        assert_eq!(student.telugu.total, 20);
        assert_eq!(student.telugu.grade, Grade::B);
        assert_eq!(student.telugu.sgpa, 4.0);
        assert_eq!(student.grand_total, 20);
    }

    #[test]
    fn rejected_edit_leaves_record_unchanged() {
        let mut session = session_with_one_student();
        session
            .apply_mark(0, Subject::Evs, 1, Some(3))
            .expect("edit");
        let before = session.students[0].clone();

        // Sub-item 1 (Speaking) caps at 5.
        let err = session
            .apply_mark(0, Subject::Evs, 1, Some(6))
            .unwrap_err();
        match err {
            EditError::Range(r) => {
                assert_eq!(r.value, 6);
                assert_eq!(r.max, 5);
            }
            other => panic!("expected range error, got {:?}", other),
        }
        assert_eq!(session.students[0], before);
    }

    #[test]
    fn clearing_a_slot_recomputes() {
        let mut session = session_with_one_student();
        session
            .apply_mark(0, Subject::Hindi, 3, Some(5))
            .expect("edit");
        let student = session
            .apply_mark(0, Subject::Hindi, 3, None)
            .expect("clear");
        assert_eq!(student.hindi.marks[3], None);
        assert_eq!(student.hindi.total, 0);
        assert_eq!(student.grand_total, 0);
    }

    #[test]
    fn read_only_session_rejects_edits() {
        let mut session = session_with_one_student();
        session.editable = false;
        assert_eq!(
            session.apply_mark(0, Subject::Telugu, 0, Some(1)),
            Err(EditError::ReadOnly)
        );
    }

    #[test]
    fn unknown_row_is_reported_with_sheet_size() {
        let mut session = session_with_one_student();
        assert_eq!(
            session.apply_mark(5, Subject::Telugu, 0, Some(1)),
            Err(EditError::NoSuchRow { row: 5, rows: 1 })
        );
    }
}
