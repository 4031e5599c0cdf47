use almanac_core::sports::{parse_sports_ics, write_events_atomic};
use almanac_shared::event::{Event, TAG_SPORTS};
use tempfile::tempdir;

const FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//Test//Sports//EN\r
BEGIN:VEVENT\r
UID:game-1@example.edu\r
DTSTART:20250302T013000Z\r
DTEND:20250302T040000Z\r
SUMMARY:Men's Hockey vs. Lakeview\r
LOCATION:Ice Arena\\, Champaign\r
DESCRIPTION:Men's Hockey vs. Lakeview\\n\\n\\nTickets: https://tickets.exa\r
 mple.edu/hockey\\nFree for students &amp; staff\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:meet-2@example.edu\r
DTSTART;VALUE=DATE:20250315\r
SUMMARY:Track Invitational\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:broken@example.edu\r
SUMMARY:No start\r
END:VEVENT\r
END:VCALENDAR\r
";

#[test]
fn ics_feed_becomes_sports_events() {
    let events = parse_sports_ics(FEED, chrono_tz::America::Chicago).expect("parse feed");
    assert_eq!(events.len(), 2);

    let game = &events[0];
    assert_eq!(game.date, "2025-03-01");
    assert_eq!(game.title, "Men's Hockey vs. Lakeview");
    assert_eq!(game.tag.as_deref(), Some(TAG_SPORTS));
    assert_eq!(game.start.as_deref(), Some("7:30pm"));
    assert_eq!(game.end.as_deref(), Some("10:00pm"));
    assert_eq!(game.location.as_deref(), Some("Ice Arena, Champaign"));
    assert_eq!(
        game.description.as_deref(),
        Some("Tickets: https://tickets.example.edu/hockey\nFree for students & staff")
    );

    let meet = &events[1];
    assert_eq!(meet.date, "2025-03-15");
    assert_eq!(meet.start, None);
    assert_eq!(meet.all_day_event, Some(true));
}

#[test]
fn generated_file_reads_back_as_events() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("data").join("sports_events.json");
    let events = parse_sports_ics(FEED, chrono_tz::America::Chicago).expect("parse feed");

    write_events_atomic(&path, &events).expect("write");

    let text = std::fs::read_to_string(&path).expect("read");
    let back: Vec<Event> = serde_json::from_str(&text).expect("json");
    assert_eq!(back, events);
    assert!(!text.contains("\"id\""));
}
