//! Scenarii for the splitting of whole documents

use calfeed::ical::{escape, scan, unescape, ScanError};

const CALENDAR: &str = "BEGIN:VCALENDAR\r\n\
    VERSION:2.0\r\n\
    PRODID:-//Nextcloud Tasks v0.13.6\r\n\
    BEGIN:VTIMEZONE\r\n\
    TZID:Europe/Paris\r\n\
    BEGIN:STANDARD\r\n\
    TZOFFSETFROM:+0200\r\n\
    TZOFFSETTO:+0100\r\n\
    END:STANDARD\r\n\
    END:VTIMEZONE\r\n\
    BEGIN:VTODO\r\n\
    UID:0633de27-8c32-42be-bcb8-63bc879c6185\r\n\
    SUMMARY:Call Mom\r\n\
    END:VTODO\r\n\
    BEGIN:VEVENT\r\n\
    UID:2013-06-30@geohash.invalid\r\n\
    BEGIN:VALARM\r\n\
    ACTION:DISPLAY\r\n\
    END:VALARM\r\n\
    END:VEVENT\r\n\
    BEGIN:VTODO\r\n\
    UID:1633de27-8c32-42be-bcb8-63bc879c6185\r\n\
    SUMMARY:Buy a gift for Mom\r\n\
    END:VTODO\r\n\
    END:VCALENDAR\r\n";

#[test]
fn test_entries_follow_document_order() {
    let _ = env_logger::builder().is_test(true).try_init();

    let entries = scan(CALENDAR).unwrap();
    let types: Vec<&str> = entries.iter().map(|e| e.entry_type()).collect();
    assert_eq!(types, vec!["VTIMEZONE", "VTODO", "VEVENT", "VTODO"]);

    // Every line of the root block that belongs to a component ends up in exactly one entry
    let captured: usize = entries.iter().map(|e| e.lines().count() - 1).sum();
    assert_eq!(captured, CALENDAR.split("\r\n").count() - 1 - 4);

    for entry in &entries {
        let lines: Vec<&str> = entry.lines().collect();
        assert_eq!(lines[0], format!("BEGIN:{}", entry.entry_type()));
        assert_eq!(lines[lines.len() - 2], format!("END:{}", entry.entry_type()));
        assert_eq!(lines[lines.len() - 1], "");
    }
}

#[test]
fn test_summaries_are_unescaped() {
    let entries = scan(CALENDAR).unwrap();
    let summaries: Vec<String> = entries.iter()
        .flat_map(|e| e.lines())
        .filter_map(|line| line.strip_prefix("SUMMARY:"))
        .map(unescape)
        .collect();
    assert_eq!(summaries, vec!["Call Mom", "Buy a gift for Mom"]);
    assert_eq!(escape("Call Mom, then Dad"), "Call Mom\\, then Dad");
}

#[test]
fn test_mismatched_close_in_nested_block() {
    let document = CALENDAR.replace("END:VALARM", "END:VEVENT");
    match scan(&document) {
        Err(ScanError::UnmatchedClose { block_type, line, stack }) => {
            assert_eq!(block_type, "VEVENT");
            assert_eq!(line, 19);
            assert_eq!(stack, vec!["VCALENDAR", "VEVENT", "VALARM"]);
        },
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_truncated_document() {
    let document = CALENDAR.trim_end_matches("END:VCALENDAR\r\n");
    assert_eq!(scan(document), Err(ScanError::Unterminated { stack: vec!["VCALENDAR".to_string()] }));
}
