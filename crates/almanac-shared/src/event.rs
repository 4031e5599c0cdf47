use serde::{
  Deserialize,
  Serialize
};

pub const TAG_HOLIDAY: &str = "Holiday";
pub const TAG_WEATHER: &str = "Weather";
pub const TAG_SPORTS: &str =
  "Sports Events";
pub const TAG_ACADEMIC: &str =
  "Academic Calendar";
pub const TAG_PERSONAL: &str =
  "Personal";

/// Tags offered by the filter bar and
/// the create form, in display order.
pub const KNOWN_TAGS: [&str; 5] = [
  TAG_HOLIDAY,
  TAG_WEATHER,
  TAG_SPORTS,
  TAG_ACADEMIC,
  TAG_PERSONAL
];

pub const USER_SOURCE: &str = "user";

/// Visual tint applied to a pill on top
/// of its tag color.
#[derive(
  Debug,
  Clone,
  Copy,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
#[serde(rename_all = "kebab-case")]
pub enum PillStyle {
  Hot,
  Cold,
  HeavyRain
}

impl PillStyle {
  pub fn class(self) -> &'static str {
    match self {
      | PillStyle::Hot => "weather-hot",
      | PillStyle::Cold => {
        "weather-cold"
      }
      | PillStyle::HeavyRain => {
        "weather-heavy-rain"
      }
    }
  }
}

/// One entry on the calendar. Every
/// source adapter produces this shape.
#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
)]
#[serde(rename_all = "camelCase")]
pub struct Event {
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub id:            Option<i64>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub source:        Option<String>,
  pub date:          String,
  pub title:         String,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub tag:           Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub start:         Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub end:           Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub location:      Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub details:       Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub description:   Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub sport:         Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub avgt:          Option<f64>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub maxt:          Option<f64>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub mint:          Option<f64>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub pcpn:          Option<f64>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub end_date:      Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub all_day_event: Option<bool>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub style:         Option<PillStyle>
}

impl Event {
  pub fn new(
    date: impl Into<String>,
    title: impl Into<String>,
    tag: impl Into<String>
  ) -> Self {
    Self {
      date: date.into(),
      title: title.into(),
      tag: Some(tag.into()),
      ..Self::default()
    }
  }

  pub fn is_user_event(&self) -> bool {
    self.source.as_deref()
      == Some(USER_SOURCE)
      && self.id.is_some()
  }

  /// Free-text body. User events write
  /// `details`, imported feeds write
  /// `description`.
  pub fn body(&self) -> Option<&str> {
    self
      .details
      .as_deref()
      .or(self.description.as_deref())
      .filter(|text| {
        !text.trim().is_empty()
      })
  }

  /// `start - end`, `start`, or nothing.
  pub fn time_label(
    &self
  ) -> Option<String> {
    let start = non_empty(
      self.start.as_deref()
    );
    let end =
      non_empty(self.end.as_deref());
    match (start, end) {
      | (Some(start), Some(end)) => {
        Some(format!("{start} - {end}"))
      }
      | (Some(start), None) => {
        Some(start.to_string())
      }
      | _ => None
    }
  }

  pub fn matches_query(
    &self,
    query: &str
  ) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
      return true;
    }

    [
      Some(self.title.as_str()),
      self.location.as_deref(),
      self.details.as_deref(),
      self.description.as_deref(),
      self.sport.as_deref()
    ]
    .into_iter()
    .flatten()
    .any(|field| {
      field
        .to_lowercase()
        .contains(&needle)
    })
  }
}

/// CSS class for a tag: `tag-` plus the
/// lowercased tag with whitespace runs
/// collapsed to `-`.
pub fn tag_class(tag: &str) -> String {
  let slug = tag
    .split_whitespace()
    .collect::<Vec<_>>()
    .join("-")
    .to_lowercase();
  format!("tag-{slug}")
}

fn non_empty(
  value: Option<&str>
) -> Option<&str> {
  value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tag_class_slugifies_whitespace() {
    assert_eq!(
      tag_class("Sports Events"),
      "tag-sports-events"
    );
    assert_eq!(
      tag_class("Academic  Calendar"),
      "tag-academic-calendar"
    );
  }

  #[test]
  fn deserializes_client_field_names() {
    let raw = r#"{
      "date": "2025-01-20",
      "title": "Spring classes begin",
      "tag": "Academic Calendar",
      "endDate": "2025-01-24",
      "allDayEvent": true
    }"#;
    let event: Event =
      serde_json::from_str(raw)
        .expect("valid event json");
    assert_eq!(
      event.end_date.as_deref(),
      Some("2025-01-24")
    );
    assert_eq!(
      event.all_day_event,
      Some(true)
    );

    let back = serde_json::to_value(&event)
      .expect("serialize");
    assert!(back.get("endDate").is_some());
    assert!(back.get("sport").is_none());
  }

  #[test]
  fn body_prefers_details_and_skips_blank() {
    let mut event = Event::new(
      "2025-03-01",
      "Game",
      TAG_SPORTS
    );
    event.description =
      Some("from feed".to_string());
    assert_eq!(
      event.body(),
      Some("from feed")
    );
    event.details =
      Some("typed by user".to_string());
    assert_eq!(
      event.body(),
      Some("typed by user")
    );
    event.details = Some("  ".to_string());
    event.description = None;
    assert_eq!(event.body(), None);
  }

  #[test]
  fn time_label_joins_start_and_end() {
    let mut event =
      Event::new("2025-03-01", "x", "y");
    assert_eq!(event.time_label(), None);
    event.start = Some("7:00pm".into());
    assert_eq!(
      event.time_label().as_deref(),
      Some("7:00pm")
    );
    event.end = Some("9:00pm".into());
    assert_eq!(
      event.time_label().as_deref(),
      Some("7:00pm - 9:00pm")
    );
  }
}
