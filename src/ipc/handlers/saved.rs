use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::roster::sheet_json;
use crate::ipc::types::{AppState, Request};
use crate::roster::{self, ALL_SCHOOLS};
use crate::session::Session;
use serde_json::json;

fn handle_saved_view(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let school = match req.params.get("school").and_then(|v| v.as_str()) {
        Some(v) => v.to_string(),
        None => return err(&req.id, "bad_params", "missing school", None),
    };
    if !roster::is_known_school(&school) {
        return err(
            &req.id,
            "not_found",
            format!("unknown school: {}", school),
            Some(json!({ "school": school })),
        );
    }

    let students = if school == ALL_SCHOOLS {
        // The combined view is the per-school snapshots concatenated in
        // enumeration order, not the students_ALL key.
        let mut combined = Vec::new();
        let mut found_any = false;
        for real in roster::SCHOOLS {
            match db::snapshot_load(conn, real) {
                Ok(Some(records)) => {
                    found_any = true;
                    combined.extend(records);
                }
                Ok(None) => {}
                Err(e) => return err(&req.id, "bad_snapshot", format!("{e:#}"), None),
            }
        }
        if !found_any {
            return err(&req.id, "no_saved_data", "no saved data found", None);
        }
        combined
    } else {
        match db::snapshot_load(conn, &school) {
            Ok(Some(records)) => records,
            Ok(None) => {
                return err(
                    &req.id,
                    "no_saved_data",
                    "no saved data found for the selected school",
                    Some(json!({ "school": school })),
                )
            }
            Err(e) => return err(&req.id, "bad_snapshot", format!("{e:#}"), None),
        }
    };

    let session = Session::new(school, students);
    let resp = ok(&req.id, sheet_json(&session));
    state.session = Some(session);
    resp
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "saved.view" => Some(handle_saved_view(state, req)),
        _ => None,
    }
}
