//! ACIS daily CSV feeds turned into
//! synthetic calendar events.

use tracing::{
  debug,
  trace
};

use crate::date::has_iso_day_shape;
use crate::event::{
  Event,
  PillStyle,
  TAG_WEATHER
};

/// Rows dated before this day are
/// ignored.
pub const WEATHER_CUTOFF: &str =
  "2020-01-01";
pub const HOT_AVG_F: f64 = 80.0;
pub const COLD_AVG_F: f64 = 32.0;
pub const HEAVY_RAIN_IN: f64 = 0.5;
pub const HEAVY_RAIN_GLYPH: &str = "☔";

/// Parses `date,avgt,maxt,mint` rows.
pub fn parse_temperature_csv(
  text: &str
) -> Vec<Event> {
  let events: Vec<Event> = data_rows(text)
    .filter_map(|fields| {
      let avgt = reading(fields.get(1)?)?;
      let maxt = fields
        .get(2)
        .and_then(|raw| reading(raw));
      let mint = fields
        .get(3)
        .and_then(|raw| reading(raw));

      let mut title =
        format!("Avg {avgt}°F");
      if let (Some(hi), Some(lo)) =
        (maxt, mint)
      {
        title.push_str(&format!(
          " (H {hi} / L {lo})"
        ));
      }

      let mut event = Event::new(
        fields[0].clone(),
        title,
        TAG_WEATHER
      );
      event.avgt = Some(avgt);
      event.maxt = maxt;
      event.mint = mint;
      event.style = temperature_style(avgt);
      Some(event)
    })
    .collect();

  debug!(
    count = events.len(),
    "parsed temperature rows"
  );
  events
}

/// Parses `date,pcpn` rows.
pub fn parse_precipitation_csv(
  text: &str
) -> Vec<Event> {
  let events: Vec<Event> = data_rows(text)
    .filter_map(|fields| {
      let raw = fields.get(1)?;
      let trace = raw.eq_ignore_ascii_case("T");
      let pcpn = reading(raw)?;

      let heavy = pcpn >= HEAVY_RAIN_IN;
      let amount = if trace {
        "trace".to_string()
      } else {
        format!("{pcpn} in")
      };
      let title = if heavy {
        format!(
          "{HEAVY_RAIN_GLYPH} Precip \
           {amount}"
        )
      } else {
        format!("Precip {amount}")
      };

      let mut event = Event::new(
        fields[0].clone(),
        title,
        TAG_WEATHER
      );
      event.pcpn = Some(pcpn);
      event.style = heavy
        .then_some(PillStyle::HeavyRain);
      Some(event)
    })
    .collect();

  debug!(
    count = events.len(),
    "parsed precipitation rows"
  );
  events
}

pub fn temperature_style(
  avgt: f64
) -> Option<PillStyle> {
  if avgt >= HOT_AVG_F {
    Some(PillStyle::Hot)
  } else if avgt <= COLD_AVG_F {
    Some(PillStyle::Cold)
  } else {
    None
  }
}

/// Rows that start with an ISO day on or
/// after the cutoff. Header lines, station
/// metadata and malformed records are
/// skipped.
fn data_rows(
  text: &str
) -> impl Iterator<Item = Vec<String>> + '_
{
  csv::ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(text.as_bytes())
    .into_records()
    .filter_map(|record| match record {
      | Ok(record) => Some(record),
      | Err(error) => {
        trace!(%error, "skipping malformed csv record");
        None
      }
    })
    .map(|record| {
      record
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>()
    })
    .filter(|fields| {
      fields.first().is_some_and(|date| {
        has_iso_day_shape(date)
          && date.as_str() >= WEATHER_CUTOFF
      })
    })
}

/// ACIS writes `M` for missing and `T`
/// for a trace amount.
fn reading(raw: &str) -> Option<f64> {
  let raw = raw.trim();
  if raw.eq_ignore_ascii_case("T") {
    return Some(0.0);
  }
  raw.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hot_day_becomes_weather_event() {
    let events =
      parse_temperature_csv("2021-07-04,85,95,75\n");
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.date, "2021-07-04");
    assert_eq!(
      event.tag.as_deref(),
      Some(TAG_WEATHER)
    );
    assert_eq!(
      event.style,
      Some(PillStyle::Hot)
    );
    assert_eq!(event.avgt, Some(85.0));
    assert_eq!(
      event.title,
      "Avg 85°F (H 95 / L 75)"
    );
  }

  #[test]
  fn drops_rows_before_cutoff_and_headers() {
    let text = "\
Chicago Area,ThreadEx\n\
2019-12-31,20,25,15\n\
2020-01-01,30,35,25\n\
2020-01-02,M,M,M\n\
2020-01-03,50,60,40\n";
    let events = parse_temperature_csv(text);
    let dates: Vec<_> = events
      .iter()
      .map(|e| e.date.as_str())
      .collect();
    assert_eq!(
      dates,
      vec!["2020-01-01", "2020-01-03"]
    );
    assert_eq!(
      events[0].style,
      Some(PillStyle::Cold)
    );
    assert_eq!(events[1].style, None);
  }

  #[test]
  fn heavy_rain_gets_glyph_and_style() {
    let text =
      "2023-05-01,0.75\n2023-05-02,T\n2023-05-03,0.10\n";
    let events = parse_precipitation_csv(text);
    assert_eq!(events.len(), 3);
    assert!(
      events[0]
        .title
        .starts_with(HEAVY_RAIN_GLYPH)
    );
    assert_eq!(
      events[0].style,
      Some(PillStyle::HeavyRain)
    );
    assert_eq!(events[1].pcpn, Some(0.0));
    assert_eq!(events[1].title, "Precip trace");
    assert_eq!(events[2].style, None);
  }
}
