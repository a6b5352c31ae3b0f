use userfeed::error::FeedError;
use userfeed::models::{Snapshot, UserRecord};
use userfeed::render::{
    HtmlTable, LiveTable, RenderOptions, RenderTarget, Row, TerminalTable, PASSWORD_MASK,
};

fn live_table() -> LiveTable<HtmlTable> {
    LiveTable::new(HtmlTable::new(), RenderOptions::default()).unwrap()
}

fn body_cells(rows: &[Row]) -> Vec<(String, String)> {
    rows[1..]
        .iter()
        .map(|r| (r.cells[0].clone(), r.cells[1].clone()))
        .collect()
}

#[test]
fn test_scenario_replaces_previous_snapshot() {
    let mut table = live_table();
    assert_eq!(table.target().row_count(), 1);

    table
        .apply_payload(r#"[{"email":"a@x.com","password":"p1"}]"#)
        .unwrap();
    assert_eq!(table.target().row_count(), 2);
    assert_eq!(table.target().rows()[1], Row::new(["a@x.com", "p1"]));

    table
        .apply_payload(
            r#"[{"email":"b@x.com","password":"p2"},{"email":"c@x.com","password":"p3"}]"#,
        )
        .unwrap();
    assert_eq!(table.target().row_count(), 3);
    assert_eq!(table.target().rows()[1], Row::new(["b@x.com", "p2"]));
    assert_eq!(table.target().rows()[2], Row::new(["c@x.com", "p3"]));
    assert!(!table.target().rows().iter().any(|r| r.contains("a@x.com")));
}

#[test]
fn test_row_count_matches_snapshot_in_order() {
    let mut table = live_table();
    let records: Vec<UserRecord> = (0..5)
        .map(|i| UserRecord::new(format!("u{}@x.com", i), format!("p{}", i)))
        .collect();
    let rendered = table.render(&Snapshot::new(records.clone())).unwrap();

    assert_eq!(rendered, 5);
    assert_eq!(table.target().row_count(), records.len() + 1);
    let expected: Vec<(String, String)> = records
        .iter()
        .map(|r| (r.email.clone(), r.password.clone()))
        .collect();
    assert_eq!(body_cells(table.target().rows()), expected);
}

#[test]
fn test_same_snapshot_twice_is_idempotent() {
    let mut table = live_table();
    let payload = r#"[{"email":"a@x.com","password":"p1"},{"email":"a@x.com","password":"p1"}]"#;
    table.apply_payload(payload).unwrap();
    let first = table.target().rows().to_vec();
    table.apply_payload(payload).unwrap();
    assert_eq!(table.target().rows(), &first[..]);
    assert_eq!(table.applied(), 2);
}

#[test]
fn test_shorter_snapshot_leaves_no_residue() {
    let mut table = live_table();
    table
        .apply_payload(concat!(
            r#"[{"email":"a@x.com","password":"1"},"#,
            r#"{"email":"b@x.com","password":"2"},"#,
            r#"{"email":"c@x.com","password":"3"}]"#,
        ))
        .unwrap();
    table
        .apply_payload(r#"[{"email":"d@x.com","password":"4"}]"#)
        .unwrap();
    assert_eq!(table.target().row_count(), 2);
    assert_eq!(table.target().rows()[1], Row::new(["d@x.com", "4"]));
}

#[test]
fn test_header_is_preserved() {
    let mut table = live_table();
    let header = table.target().rows()[0].clone();
    for payload in [
        r#"[{"email":"a@x.com","password":"p1"}]"#,
        "[]",
        r#"[{"email":"Email","password":"Password"}]"#,
    ] {
        table.apply_payload(payload).unwrap();
        assert_eq!(table.target().rows()[0], header);
    }
}

#[test]
fn test_empty_snapshot_leaves_only_header() {
    let mut table = live_table();
    table
        .apply_payload(r#"[{"email":"a@x.com","password":"p1"}]"#)
        .unwrap();
    assert_eq!(table.apply_payload("[]").unwrap(), 0);
    assert_eq!(table.target().row_count(), 1);
}

#[test]
fn test_malformed_payload_keeps_previous_rows() {
    let mut table = live_table();
    table
        .apply_payload(r#"[{"email":"a@x.com","password":"p1"}]"#)
        .unwrap();
    let before = table.target().rows().to_vec();

    for bad in ["not json", r#"{"email":"b@x.com"}"#, r#"[{"email":1,"password":"x"}]"#] {
        assert!(matches!(table.apply_payload(bad), Err(FeedError::MalformedPayload(_))));
    }
    assert_eq!(table.target().rows(), &before[..]);
    assert_eq!(table.applied(), 1);
}

#[test]
fn test_missing_header_is_an_error() {
    assert!(matches!(
        LiveTable::new(HtmlTable::empty("user-list"), RenderOptions::default()),
        Err(FeedError::MissingHeader)
    ));
}

#[test]
fn test_masked_passwords() {
    let options = RenderOptions { mask_passwords: true };
    let mut table = LiveTable::new(TerminalTable::new(), options).unwrap();
    table
        .apply_payload(r#"[{"email":"a@x.com","password":"hunter2"}]"#)
        .unwrap();
    assert_eq!(table.target().rows()[1], Row::new(["a@x.com", PASSWORD_MASK]));
    assert!(!table.target().to_string().contains("hunter2"));
}

#[test]
fn test_html_output_escapes_untrusted_fields() {
    let mut table = live_table();
    table
        .apply_payload(r#"[{"email":"<img src=x onerror=alert(1)>","password":"a&b"}]"#)
        .unwrap();
    let html = table.target().to_html().unwrap();
    assert!(html.contains("&lt;img"));
    assert!(html.contains("a&amp;b"));
    assert!(!html.contains("<img"));
}
