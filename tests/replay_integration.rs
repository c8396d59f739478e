use notesync::replay::{self, Script};
use notesync::sync::SyncConfig;

fn run(raw: &str) -> replay::Report {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, raw).unwrap();
    let script = Script::load(&path).unwrap();
    replay::run_script(&script, &SyncConfig::default())
}

#[test]
fn test_session_from_file_produces_report() {
    let report = run(r#"{
        "activeWindow": "main",
        "events": [
            { "at": 0, "type": "type", "text": "Hello" },
            { "at": 20, "type": "type", "text": "\nSecond" },
            { "at": 300, "type": "signal",
              "signal": { "action": "send-to-notes", "windowId": "main", "text": "clip" } },
            { "at": 600, "type": "teardown" }
        ]
    }"#);

    assert_eq!(report.editor_content, "<p>Hello</p><p>Second</p><p>clip</p>");
    assert_eq!(report.notes.len(), 1);
    assert_eq!(report.notes[0].content, report.editor_content);
    assert_eq!(report.settles, 2);
    assert_eq!(report.metrics_emitted, 2);
    assert!(report.errors.is_empty());
}

#[test]
fn test_report_serializes_operations() {
    let report = run(r#"{ "events": [ { "at": 0, "type": "type", "text": "Hi" } ] }"#);
    let json: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();

    let operations = json["operations"].as_array().unwrap();
    assert_eq!(operations[0]["op"], "create");
    assert_eq!(operations[0]["content"], "<p>Hi</p>");
    assert_eq!(operations[0]["origin"], "sidebar");
    assert_eq!(operations[1]["op"], "focus");
    assert_eq!(json["note"]["id"], "note-1");
    assert_eq!(json["metricsEmitted"], 1);
}

#[test]
fn test_switching_notes_mid_edit_keeps_both_intact() {
    let report = run(r#"{
        "note": { "id": "a", "content": "<p>Alpha</p>" },
        "editor": "<p>Alpha</p>",
        "events": [
            { "at": 0, "type": "type", "text": "!" },
            { "at": 10, "type": "switchNote", "note": { "id": "b", "content": "<p>Beta</p>" } }
        ]
    }"#);

    assert_eq!(report.editor_content, "<p>Beta</p>");
    assert_eq!(report.note.id.as_ref().map(|id| id.as_str()), Some("b"));
    assert!(report.operations.is_empty());
}

#[test]
fn test_unfocused_typing_is_not_saved() {
    let report = run(r#"{
        "note": { "id": "a", "content": "<p>Alpha</p>" },
        "editor": "<p>Alpha</p>",
        "events": [
            { "at": 0, "type": "blur" },
            { "at": 0, "type": "type", "text": "x" }
        ]
    }"#);
    assert!(report.operations.is_empty());
    assert_eq!(report.settles, 0);
}

#[test]
fn test_offline_store_reports_error() {
    let report = run(r#"{
        "events": [
            { "at": 0, "type": "offline", "offline": true },
            { "at": 0, "type": "type", "text": "Hi" }
        ]
    }"#);
    assert_eq!(report.errors, vec!["create request failed: store unavailable"]);
    assert!(report.notes.is_empty());
}

#[test]
fn test_trace_log_records_store_requests_on_logical_clock() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("sync.log");
    notesync::perf::open_timeline(&log).unwrap();
    let report = run(r#"{ "events": [ { "at": 0, "type": "type", "text": "Hi" } ] }"#);
    notesync::perf::close_timeline().unwrap();

    assert_eq!(report.notes.len(), 1);
    let timeline = std::fs::read_to_string(&log).unwrap();
    assert!(timeline.starts_with("notesync timeline"));
    assert!(timeline.contains("      50 ms  sync.settle   timer=2 focused=true"));
    assert!(timeline.contains("      50 ms  store.create  request=1 origin=sidebar"));
    assert!(timeline.contains("      50 ms  store.focus   id=note-1"));
}
