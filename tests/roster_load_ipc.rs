mod test_support;

use serde_json::json;
use test_support::{spawn_sidecar, temp_dir};

#[test]
fn roster_list_reports_gwa_and_generated_ids() {
    let mut sc = spawn_sidecar();
    let _ = sc.load_fixture_roster();

    let list = sc.request_ok("roster.list", json!({}));
    let students = list
        .get("students")
        .and_then(|v| v.as_array())
        .cloned()
        .expect("students");
    assert_eq!(students.len(), 3);

    let john = &students[0];
    assert_eq!(john.get("id").and_then(|v| v.as_str()), Some("1"));
    assert_eq!(john.get("gwaDisplay").and_then(|v| v.as_str()), Some("88.50"));
    assert_eq!(john.get("tier").and_then(|v| v.as_str()), Some("VeryGood"));

    let guest = &students[2];
    let guest_id = guest.get("id").and_then(|v| v.as_str()).expect("guest id");
    assert!(!guest_id.is_empty());
    assert!(guest.get("gwa").map(|v| v.is_null()).unwrap_or(false));
}

#[test]
fn malformed_snapshots_are_rejected_and_keep_the_old_roster() {
    let mut sc = spawn_sidecar();
    let _ = sc.load_fixture_roster();

    assert_eq!(
        sc.request_err("roster.load", json!({ "snapshot": { "pupils": [] } })),
        "roster_format"
    );
    assert_eq!(
        sc.request_err("roster.load", json!({ "snapshot": { "students": "all" } })),
        "roster_format"
    );

    let dir = temp_dir("gradebookd-roster-bad");
    let bad = dir.join("students.json");
    std::fs::write(&bad, "{ nope").expect("write bad roster");
    assert_eq!(
        sc.request_err("roster.load", json!({ "path": bad.to_string_lossy() })),
        "roster_format"
    );
    assert_eq!(
        sc.request_err(
            "roster.load",
            json!({ "path": dir.join("missing.json").to_string_lossy() })
        ),
        "source_unavailable"
    );
    assert_eq!(sc.request_err("roster.load", json!({})), "bad_params");

    let health = sc.request_ok("health", json!({}));
    assert_eq!(health.get("studentCount").and_then(|v| v.as_u64()), Some(3));
}

#[test]
fn inline_snapshot_replaces_roster() {
    let mut sc = spawn_sidecar();
    let _ = sc.load_fixture_roster();
    let loaded = sc.request_ok(
        "roster.load",
        json!({ "snapshot": { "students": [ { "id": "s-1", "name": "Solo", "subjects": [] } ] } }),
    );
    assert_eq!(loaded.get("source").and_then(|v| v.as_str()), Some("inline"));
    let list = sc.request_ok("roster.list", json!({}));
    assert_eq!(
        list.get("students").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(1)
    );
}

#[test]
fn off_scale_snapshot_scores_fail_the_load() {
    let mut sc = spawn_sidecar();
    let _ = sc.load_fixture_roster();
    for bad in [json!(101), json!(-1), json!("150")] {
        let snapshot = json!({ "students": [ { "id": "s-1", "name": "Solo", "subjects": [
            { "subject": "Mathematics", "code": "MATH101", "assignments": bad, "quizzes": 80, "projects": 80, "exams": 80 }
        ] } ] });
        assert_eq!(
            sc.request_err("roster.load", json!({ "snapshot": snapshot })),
            "roster_format"
        );
    }
    let health = sc.request_ok("health", json!({}));
    assert_eq!(health.get("studentCount").and_then(|v| v.as_u64()), Some(3));
}
