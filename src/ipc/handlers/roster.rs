use crate::db;
use crate::grading::{MAX_MARKS, SUB_ITEMS, Subject};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster::{self, RosterDoc};
use crate::session::Session;
use serde_json::json;

pub(super) fn sheet_json(session: &Session) -> serde_json::Value {
    json!({
        "school": session.school,
        "students": serde_json::to_value(&session.students).unwrap_or_else(|_| json!([])),
        "editable": session.editable,
        "complete": session.complete()
    })
}

fn handle_schools_list(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut schools: Vec<&str> = roster::SCHOOLS.to_vec();
    schools.push(roster::ALL_SCHOOLS);
    ok(
        &req.id,
        json!({
            "schools": schools,
            "subjects": Subject::ALL.map(|s| json!({ "key": s.key(), "label": s.label() })),
            "subItems": SUB_ITEMS,
            "maxMarks": MAX_MARKS
        }),
    )
}

fn handle_roster_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(workspace) = state.workspace.clone() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
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

    let doc = match RosterDoc::read(&workspace) {
        Ok(d) => d,
        Err(e) => return err(&req.id, "roster_load_failed", format!("{e:#}"), None),
    };
    let fresh = match doc.records_for(&school) {
        Ok(r) => r,
        Err(e) => return err(&req.id, "roster_load_failed", format!("{e:#}"), None),
    };

    // A saved snapshot for the same school wins over the fresh roster,
    // so reopening a sheet resumes where the last session left off.
    let students = match db::snapshot_load(conn, &school) {
        Ok(Some(saved)) => saved,
        Ok(None) => fresh,
        Err(e) => return err(&req.id, "bad_snapshot", format!("{e:#}"), None),
    };

    let session = Session::new(school, students);
    let resp = ok(&req.id, sheet_json(&session));
    state.session = Some(session);
    resp
}

fn handle_sheet_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(session) = state.session.as_ref() else {
        return err(&req.id, "no_session", "load a roster first", None);
    };
    ok(&req.id, sheet_json(session))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schools.list" => Some(handle_schools_list(state, req)),
        "roster.load" => Some(handle_roster_load(state, req)),
        "sheet.get" => Some(handle_sheet_get(state, req)),
        _ => None,
    }
}
