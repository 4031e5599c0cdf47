//! Offline generator for the sports feed:
//! ICS in, `sports_events.json` out.

use std::io::{
  BufReader,
  Write
};
use std::path::Path;

use almanac_shared::date::format_date;
use almanac_shared::event::{
  Event,
  TAG_SPORTS
};
use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  LocalResult,
  NaiveDate,
  NaiveDateTime,
  TimeZone,
  Timelike,
  Utc
};
use chrono_tz::Tz;
use ical::IcalParser;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;
use tempfile::NamedTempFile;
use tracing::{
  debug,
  info,
  warn
};

/// Residue some feeds leave in
/// descriptions.
const TASK_ARTIFACT: &str =
  "System.Threading.Tasks.Task`1[System.String]";

#[tracing::instrument(skip(client))]
pub async fn generate(
  client: &reqwest::Client,
  url: &str,
  output: &Path,
  timezone: Tz
) -> anyhow::Result<usize> {
  info!("fetching sports ICS feed");
  let text =
    crate::sources::fetch_text(client, url)
      .await?;
  let events = parse_sports_ics(&text, timezone)?;
  write_events_atomic(output, &events)?;
  info!(
    count = events.len(),
    output = %output.display(),
    "generated sports events"
  );
  Ok(events.len())
}

/// One event per VEVENT that has both a
/// start date and a summary.
pub fn parse_sports_ics(
  ics_text: &str,
  timezone: Tz
) -> anyhow::Result<Vec<Event>> {
  let reader =
    BufReader::new(ics_text.as_bytes());
  let mut events = Vec::new();

  for calendar in IcalParser::new(reader) {
    let calendar = calendar.context(
      "failed parsing iCalendar payload"
    )?;
    for raw in &calendar.events {
      if let Some(event) =
        sports_event(raw, timezone)
      {
        events.push(event);
      }
    }
  }

  debug!(count = events.len(), "parsed sports ICS");
  Ok(events)
}

fn sports_event(
  raw: &IcalEvent,
  timezone: Tz
) -> Option<Event> {
  let summary =
    property_value(&raw.properties, "SUMMARY")
      .map(|s| unescape_text(&s))
      .filter(|s| !s.is_empty())?;

  let start = find_property(
    &raw.properties,
    "DTSTART"
  )
  .and_then(|p| {
    parse_ics_moment(p, timezone)
  });
  let Some(start) = start else {
    warn!(title = %summary, "skipping sports event without a usable DTSTART");
    return None;
  };
  let end = find_property(
    &raw.properties,
    "DTEND"
  )
  .and_then(|p| {
    parse_ics_moment(p, timezone)
  });

  let location = property_value(
    &raw.properties,
    "LOCATION"
  )
  .map(|l| clean_location(&l))
  .filter(|l| !l.is_empty());
  let description = property_value(
    &raw.properties,
    "DESCRIPTION"
  )
  .map(|d| clean_description(&d, &summary))
  .filter(|d| !d.is_empty());

  let mut event = Event::new(
    format_date(start.date),
    summary,
    TAG_SPORTS
  );
  event.start = start.time;
  event.end = end.and_then(|e| e.time);
  event.location = location;
  event.description = description;
  if event.start.is_none() {
    event.all_day_event = Some(true);
  }
  Some(event)
}

/// Calendar day and optional `h:mmam`
/// label, both in the target timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcsMoment {
  pub date: NaiveDate,
  pub time: Option<String>
}

fn parse_ics_moment(
  property: &Property,
  timezone: Tz
) -> Option<IcsMoment> {
  let raw = property.value.as_deref()?;
  parse_ics_value(
    raw,
    property_tzid(property),
    timezone
  )
}

/// Date-only values stay all-day. `Z`
/// values are UTC; other datetimes are
/// read in their TZID, or the target zone
/// when none is given.
pub fn parse_ics_value(
  raw: &str,
  tzid: Option<Tz>,
  timezone: Tz
) -> Option<IcsMoment> {
  let raw = raw.trim();

  if raw.len() == 8 {
    let date = NaiveDate::parse_from_str(
      raw, "%Y%m%d"
    )
    .ok()?;
    return Some(IcsMoment {
      date,
      time: None
    });
  }

  let utc = if let Some(stripped) =
    raw.strip_suffix('Z')
  {
    let naive = parse_naive(stripped)?;
    DateTime::<Utc>::from_naive_utc_and_offset(
      naive, Utc
    )
  } else {
    let naive = parse_naive(raw)?;
    local_naive_to_utc(
      tzid.unwrap_or(timezone),
      naive
    )?
  };

  let local = utc.with_timezone(&timezone);
  Some(IcsMoment {
    date: local.date_naive(),
    time: Some(clock_label(
      local.hour(),
      local.minute()
    ))
  })
}

fn parse_naive(
  raw: &str
) -> Option<NaiveDateTime> {
  NaiveDateTime::parse_from_str(
    raw,
    "%Y%m%dT%H%M%S"
  )
  .or_else(|_| {
    NaiveDateTime::parse_from_str(
      raw, "%Y%m%dT%H%M"
    )
  })
  .ok()
}

fn local_naive_to_utc(
  timezone: Tz,
  naive: NaiveDateTime
) -> Option<DateTime<Utc>> {
  match timezone.from_local_datetime(&naive)
  {
    | LocalResult::Single(dt) => {
      Some(dt.with_timezone(&Utc))
    }
    | LocalResult::Ambiguous(first, _) => {
      Some(first.with_timezone(&Utc))
    }
    | LocalResult::None => None
  }
}

/// `7:05pm`, `12:00am`.
pub fn clock_label(
  hour: u32,
  minute: u32
) -> String {
  let suffix =
    if hour >= 12 { "pm" } else { "am" };
  let display = match hour % 12 {
    | 0 => 12,
    | h => h
  };
  format!("{display}:{minute:02}{suffix}")
}

fn property_tzid(
  property: &Property
) -> Option<Tz> {
  let params = property.params.as_ref()?;
  let (_, values) = params
    .iter()
    .find(|(key, _)| key == "TZID")?;
  let value = values.first()?;
  match value.trim().parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(error) => {
      warn!(tzid = %value, %error, "unknown TZID; using target timezone");
      None
    }
  }
}

fn find_property<'a>(
  properties: &'a [Property],
  name: &str
) -> Option<&'a Property> {
  properties
    .iter()
    .find(|property| property.name == name)
}

fn property_value(
  properties: &[Property],
  name: &str
) -> Option<String> {
  find_property(properties, name)?
    .value
    .as_ref()
    .map(|value| value.trim().to_string())
}

fn unescape_text(raw: &str) -> String {
  raw
    .replace("\\n", "\n")
    .replace("\\N", "\n")
    .replace("\\,", ",")
    .replace("\\;", ";")
    .replace("\\\\", "\\")
    .replace("&amp;", "&")
    .trim()
    .to_string()
}

pub fn clean_location(raw: &str) -> String {
  unescape_text(raw)
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Unescapes, strips feed residue, drops a
/// first line that only repeats the
/// summary and keeps at most one blank
/// line between paragraphs.
pub fn clean_description(
  raw: &str,
  summary: &str
) -> String {
  let text = unescape_text(raw)
    .replace(TASK_ARTIFACT, "");
  let mut lines: Vec<&str> =
    text.lines().map(str::trim).collect();

  if lines
    .first()
    .is_some_and(|first| first.starts_with(summary))
  {
    lines.remove(0);
  }

  let mut out = String::new();
  let mut blank_run = 0;
  for line in lines {
    if line.is_empty() {
      blank_run += 1;
      continue;
    }
    if !out.is_empty() {
      out.push_str(if blank_run > 0 {
        "\n\n"
      } else {
        "\n"
      });
    }
    out.push_str(line);
    blank_run = 0;
  }
  out
}

#[tracing::instrument(skip(events))]
pub fn write_events_atomic(
  path: &Path,
  events: &[Event]
) -> anyhow::Result<()> {
  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));
  std::fs::create_dir_all(dir)
    .with_context(|| {
      format!(
        "failed to create {}",
        dir.display()
      )
    })?;

  let mut temp = NamedTempFile::new_in(dir)?;
  serde_json::to_writer_pretty(
    &mut temp, events
  )?;
  writeln!(temp)?;
  temp.flush()?;
  temp.persist(path).map_err(|err| {
    anyhow!(
      "failed to persist {}: {}",
      path.display(),
      err
    )
  })?;
  Ok(())
}
