use std::collections::{
  BTreeMap,
  BTreeSet
};

use serde::{
  Deserialize,
  Serialize
};
use tracing::debug;

use crate::date::parse_iso_day;
use crate::event::{
  Event,
  KNOWN_TAGS
};

/// Independent providers merged by the
/// aggregator.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
pub enum SourceKind {
  Holidays,
  WeatherTemperature,
  WeatherPrecipitation,
  Sports,
  User,
  Academic
}

impl SourceKind {
  pub const ALL: [SourceKind; 6] = [
    SourceKind::Holidays,
    SourceKind::WeatherTemperature,
    SourceKind::WeatherPrecipitation,
    SourceKind::Sports,
    SourceKind::User,
    SourceKind::Academic
  ];

  pub fn label(self) -> &'static str {
    match self {
      | SourceKind::Holidays => "holidays",
      | SourceKind::WeatherTemperature => {
        "weather-temperature"
      }
      | SourceKind::WeatherPrecipitation => {
        "weather-precipitation"
      }
      | SourceKind::Sports => "sports",
      | SourceKind::User => "user",
      | SourceKind::Academic => "academic"
    }
  }
}

/// Inclusive day range, always stored
/// with `start <= end`.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
pub struct DateRange {
  pub start: String,
  pub end:   String
}

impl DateRange {
  /// Builds a range, swapping the bounds
  /// when they were entered reversed.
  pub fn new(
    start: impl Into<String>,
    end: impl Into<String>
  ) -> Self {
    let start = start.into();
    let end = end.into();
    if start <= end {
      Self {
        start,
        end
      }
    } else {
      Self {
        start: end,
        end:   start
      }
    }
  }

  pub fn contains(
    &self,
    date: &str
  ) -> bool {
    self.start.as_str() <= date
      && date <= self.end.as_str()
  }
}

/// In-memory union of every loaded
/// source plus the active filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregator {
  sources:     BTreeMap<SourceKind, Vec<Event>>,
  active_tags: BTreeSet<String>,
  range:       Option<DateRange>,
  query:       String
}

impl Default for Aggregator {
  fn default() -> Self {
    Self {
      sources:     BTreeMap::new(),
      active_tags: KNOWN_TAGS
        .iter()
        .map(|tag| tag.to_string())
        .collect(),
      range:       None,
      query:       String::new()
    }
  }
}

impl Aggregator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replaces one source's array. Events
  /// whose date is not a real day are
  /// dropped.
  pub fn set_source(
    &mut self,
    kind: SourceKind,
    events: Vec<Event>
  ) {
    let before = events.len();
    let kept: Vec<Event> = events
      .into_iter()
      .filter(|event| {
        parse_iso_day(&event.date)
          .is_some()
      })
      .collect();
    if kept.len() != before {
      tracing::warn!(
        source = kind.label(),
        dropped = before - kept.len(),
        "dropped events with invalid dates"
      );
    }
    debug!(
      source = kind.label(),
      count = kept.len(),
      "source loaded"
    );
    self.sources.insert(kind, kept);
  }

  pub fn clear_source(
    &mut self,
    kind: SourceKind
  ) {
    self.sources.insert(kind, Vec::new());
  }

  pub fn source(
    &self,
    kind: SourceKind
  ) -> &[Event] {
    self
      .sources
      .get(&kind)
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  pub fn push_user_event(
    &mut self,
    event: Event
  ) {
    self
      .sources
      .entry(SourceKind::User)
      .or_default()
      .push(event);
  }

  /// Splices a user event out by id;
  /// returns whether one was removed.
  pub fn remove_user_event(
    &mut self,
    id: i64
  ) -> bool {
    let Some(events) =
      self.sources.get_mut(&SourceKind::User)
    else {
      return false;
    };
    let before = events.len();
    events.retain(|event| {
      event.id != Some(id)
    });
    events.len() != before
  }

  /// Every loaded event, unfiltered.
  pub fn all_events(
    &self
  ) -> Vec<&Event> {
    self
      .sources
      .values()
      .flatten()
      .collect()
  }

  pub fn active_tags(
    &self
  ) -> &BTreeSet<String> {
    &self.active_tags
  }

  pub fn set_tag_active(
    &mut self,
    tag: &str,
    active: bool
  ) {
    if active {
      self
        .active_tags
        .insert(tag.to_string());
    } else {
      self.active_tags.remove(tag);
    }
  }

  pub fn set_active_tags<I, S>(
    &mut self,
    tags: I
  ) where
    I: IntoIterator<Item = S>,
    S: Into<String>
  {
    self.active_tags = tags
      .into_iter()
      .map(Into::into)
      .collect();
  }

  pub fn range(
    &self
  ) -> Option<&DateRange> {
    self.range.as_ref()
  }

  pub fn set_range(
    &mut self,
    start: &str,
    end: &str
  ) {
    self.range =
      Some(DateRange::new(start, end));
  }

  pub fn clear_range(&mut self) {
    self.range = None;
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  pub fn set_query(
    &mut self,
    query: impl Into<String>
  ) {
    self.query = query.into();
  }

  pub fn is_in_range(
    &self,
    date: &str
  ) -> bool {
    match &self.range {
      | None => true,
      | Some(range) => range.contains(date)
    }
  }

  /// Events on `date` whose tag is active
  /// and which match the search query.
  pub fn events_for_date(
    &self,
    date: &str
  ) -> Vec<&Event> {
    self
      .sources
      .values()
      .flatten()
      .filter(|event| event.date == date)
      .filter(|event| {
        event
          .tag
          .as_deref()
          .is_some_and(|tag| {
            self.active_tags.contains(tag)
          })
      })
      .filter(|event| {
        event.matches_query(&self.query)
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::{
    TAG_HOLIDAY,
    TAG_SPORTS,
    TAG_WEATHER
  };

  fn loaded() -> Aggregator {
    let mut agg = Aggregator::new();
    agg.set_source(
      SourceKind::Holidays,
      vec![Event::new(
        "2025-01-20",
        "MLK Day",
        TAG_HOLIDAY
      )]
    );
    agg.set_source(
      SourceKind::Sports,
      vec![
        Event::new(
          "2025-01-20",
          "Hockey vs. Duluth",
          TAG_SPORTS
        ),
        Event::new(
          "2025-01-21",
          "Swim meet",
          TAG_SPORTS
        ),
      ]
    );
    agg.set_source(
      SourceKind::WeatherTemperature,
      vec![Event::new(
        "2025-01-20",
        "Avg 12°F",
        TAG_WEATHER
      )]
    );
    agg
  }

  #[test]
  fn events_for_date_matches_day_and_tag() {
    let mut agg = loaded();
    assert_eq!(
      agg.events_for_date("2025-01-20").len(),
      3
    );
    assert_eq!(agg.all_events().len(), 4);

    agg.set_tag_active(TAG_SPORTS, false);
    let titles: Vec<_> = agg
      .events_for_date("2025-01-20")
      .into_iter()
      .map(|e| e.title.as_str())
      .collect();
    assert_eq!(titles.len(), 2);
    assert!(!titles.contains(
      &"Hockey vs. Duluth"
    ));
    assert!(
      agg
        .events_for_date("2025-01-21")
        .is_empty()
    );
  }

  #[test]
  fn untagged_events_are_never_active() {
    let mut agg = Aggregator::new();
    let mut event = Event::new(
      "2025-01-20",
      "Loose",
      TAG_HOLIDAY
    );
    event.tag = None;
    agg.set_source(
      SourceKind::User,
      vec![event]
    );
    assert!(
      agg
        .events_for_date("2025-01-20")
        .is_empty()
    );
  }

  #[test]
  fn reversed_range_is_swapped() {
    let mut agg = Aggregator::new();
    assert!(agg.is_in_range("1999-01-01"));
    agg.set_range("2025-01-10", "2025-01-05");
    let range = agg.range().expect("range");
    assert_eq!(range.start, "2025-01-05");
    assert_eq!(range.end, "2025-01-10");
    assert!(agg.is_in_range("2025-01-05"));
    assert!(agg.is_in_range("2025-01-10"));
    assert!(!agg.is_in_range("2025-01-11"));
    agg.clear_range();
    assert!(agg.is_in_range("2025-01-11"));
  }

  #[test]
  fn search_query_narrows_results() {
    let mut agg = loaded();
    agg.set_query("duluth");
    let hits =
      agg.events_for_date("2025-01-20");
    assert_eq!(hits.len(), 1);
    assert_eq!(
      hits[0].title,
      "Hockey vs. Duluth"
    );
  }

  #[test]
  fn invalid_dates_are_dropped_on_load() {
    let mut agg = Aggregator::new();
    agg.set_source(
      SourceKind::Holidays,
      vec![
        Event::new(
          "2025-02-30",
          "bogus",
          TAG_HOLIDAY
        ),
        Event::new(
          "2025-02-14",
          "Valentine's",
          TAG_HOLIDAY
        ),
      ]
    );
    assert_eq!(
      agg.source(SourceKind::Holidays).len(),
      1
    );
  }

  #[test]
  fn user_event_splice() {
    let mut agg = Aggregator::new();
    let mut event = Event::new(
      "2025-03-01",
      "Study Session",
      "Academic Calendar"
    );
    event.id = Some(7);
    agg.push_user_event(event);
    assert!(!agg.remove_user_event(8));
    assert!(agg.remove_user_event(7));
    assert!(
      agg.source(SourceKind::User).is_empty()
    );
  }
}
