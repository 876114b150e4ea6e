use crate::db;
use crate::grading::{Subject, MAX_MARKS};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::session::EditError;
use serde_json::json;

/// Explicit parse of the submitted cell value: an integer is a mark,
/// null or an empty string clears the slot, anything else is rejected
/// before it can touch a record.
fn parse_cell_value(raw: Option<&serde_json::Value>) -> Result<Option<i64>, String> {
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| "value must be an integer".to_string()),
        Some(serde_json::Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() {
                Ok(None)
            } else {
                t.parse::<i64>()
                    .map(Some)
                    .map_err(|_| format!("value is not an integer: {}", t))
            }
        }
        Some(_) => Err("value must be an integer, an empty string, or null".to_string()),
    }
}

fn handle_marks_update_cell(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(session) = state.session.as_mut() else {
        return err(&req.id, "no_session", "load a roster first", None);
    };

    let row = match req.params.get("row").and_then(|v| v.as_u64()) {
        Some(v) => v as usize,
        None => return err(&req.id, "bad_params", "missing/invalid row", None),
    };
    let subject = match req
        .params
        .get("subject")
        .and_then(|v| v.as_str())
        .and_then(Subject::from_key)
    {
        Some(s) => s,
        None => {
            return err(
                &req.id,
                "bad_params",
                "subject must be one of: telugu, hindi, english, mathematics, evs",
                None,
            )
        }
    };
    let sub_index = match req.params.get("subIndex").and_then(|v| v.as_u64()) {
        Some(v) if (v as usize) < MAX_MARKS.len() => v as usize,
        _ => {
            return err(
                &req.id,
                "bad_params",
                "subIndex must be in 0..=6",
                None,
            )
        }
    };
    let value = match parse_cell_value(req.params.get("value")) {
        Ok(v) => v,
        Err(msg) => return err(&req.id, "bad_params", msg, None),
    };

    if let Err(e) = session.apply_mark(row, subject, sub_index, value) {
        return match e {
            EditError::ReadOnly => err(
                &req.id,
                "read_only",
                "sheet is complete; use sheet.edit to re-enable editing",
                None,
            ),
            EditError::NoSuchRow { row, rows } => err(
                &req.id,
                "not_found",
                "student row not found",
                Some(json!({ "row": row, "rows": rows })),
            ),
            EditError::Range(r) => err(
                &req.id,
                "out_of_range",
                format!("{}", r),
                Some(json!({
                    "value": r.value,
                    "max": r.max,
                    "subIndex": r.sub_index,
                    "subItem": r.sub_item()
                })),
            ),
        };
    }

    // Auto-save the accepted edit before reporting it back.
    if let Err(e) = db::snapshot_save(conn, &session.school, &session.students) {
        return err(&req.id, "db_insert_failed", format!("{e:#}"), None);
    }

    let complete = session.complete();
    if complete {
        session.editable = false;
    }

    ok(
        &req.id,
        json!({
            "row": row,
            "student": serde_json::to_value(&session.students[row]).unwrap_or_else(|_| json!(null)),
            "saved": true,
            "complete": complete,
            "editable": session.editable
        }),
    )
}

fn handle_sheet_edit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_mut() else {
        return err(&req.id, "no_session", "load a roster first", None);
    };
    session.editable = true;
    ok(
        &req.id,
        json!({
            "editable": true,
            "complete": session.complete()
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "marks.updateCell" => Some(handle_marks_update_cell(state, req)),
        "sheet.edit" => Some(handle_sheet_edit(state, req)),
        _ => None,
    }
}
