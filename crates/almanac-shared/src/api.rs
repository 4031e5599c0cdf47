use std::fmt;

use serde::{
  Deserialize,
  Serialize
};

use crate::date::{
  normalize_date_value,
  parse_iso_day
};
use crate::event::{
  Event,
  TAG_SPORTS,
  USER_SOURCE
};

pub const EVENTS_PATH: &str = "/api/events";
pub const ACADEMIC_EVENTS_PATH: &str =
  "/api/academic-events";

/// Body of `POST /api/events`. Every field
/// is optional on the wire so that missing
/// ones produce a 400 rather than a
/// deserialization failure.
#[derive(
  Debug,
  Clone,
  Default,
  Serialize,
  Deserialize,
  PartialEq,
)]
pub struct NewEvent {
  #[serde(default)]
  pub title:       Option<String>,
  #[serde(default)]
  pub date:        Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub start:       Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub end:         Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub location:    Option<String>,
  #[serde(default)]
  pub tag:         Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub sport:       Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub details:     Option<String>,
  #[serde(
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub description: Option<String>
}

/// A create request that passed
/// validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidNewEvent {
  pub title:    String,
  pub date:     String,
  pub start:    Option<String>,
  pub end:      Option<String>,
  pub location: Option<String>,
  pub tag:      String,
  pub sport:    Option<String>,
  pub details:  Option<String>
}

impl ValidNewEvent {
  /// The stored row, once the store has
  /// assigned an id.
  pub fn into_event(self, id: i64) -> Event {
    Event {
      id: Some(id),
      source: Some(USER_SOURCE.to_string()),
      date: self.date,
      title: self.title,
      tag: Some(self.tag),
      start: self.start,
      end: self.end,
      location: self.location,
      sport: self.sport,
      details: self.details,
      ..Event::default()
    }
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum ValidationError {
  MissingRequired,
  InvalidDate(String),
  MissingSport
}

impl fmt::Display for ValidationError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | ValidationError::MissingRequired => {
        f.write_str(
          "title, date, and tag are \
           required"
        )
      }
      | ValidationError::InvalidDate(date) => {
        write!(
          f,
          "date must be a calendar day \
           (YYYY-MM-DD), got {date:?}"
        )
      }
      | ValidationError::MissingSport => {
        f.write_str(
          "sport is required for Sports \
           Events"
        )
      }
    }
  }
}

impl std::error::Error
  for ValidationError
{
}

impl NewEvent {
  pub fn validate(
    self
  ) -> Result<ValidNewEvent, ValidationError>
  {
    let title = required(self.title);
    let date = required(self.date);
    let tag = required(self.tag);
    let (Some(title), Some(date), Some(tag)) =
      (title, date, tag)
    else {
      return Err(
        ValidationError::MissingRequired
      );
    };

    let date = normalize_date_value(&date);
    if parse_iso_day(&date).is_none() {
      return Err(
        ValidationError::InvalidDate(date)
      );
    }

    let sport = required(self.sport);
    if tag == TAG_SPORTS && sport.is_none() {
      return Err(
        ValidationError::MissingSport
      );
    }

    Ok(ValidNewEvent {
      title,
      date,
      start: required(self.start),
      end: required(self.end),
      location: required(self.location),
      tag,
      sport,
      details: required(self.details)
        .or_else(|| {
          required(self.description)
        })
    })
  }
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct ErrorBody {
  pub error: String
}

#[derive(
  Debug,
  Clone,
  Serialize,
  Deserialize,
  PartialEq,
  Eq,
)]
pub struct DeleteResponse {
  pub success: bool
}

fn required(
  value: Option<String>
) -> Option<String> {
  value
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn validate_requires_title_date_tag() {
    let body: NewEvent = serde_json::from_str(
      r#"{"title":"Study Session","date":"2025-03-01"}"#
    )
    .expect("json");
    assert_eq!(
      body.validate(),
      Err(ValidationError::MissingRequired)
    );
  }

  #[test]
  fn validate_requires_sport_for_sports_tag()
  {
    let body = NewEvent {
      title: Some("Game".into()),
      date: Some("2025-03-01".into()),
      tag: Some(TAG_SPORTS.into()),
      ..NewEvent::default()
    };
    assert_eq!(
      body.clone().validate(),
      Err(ValidationError::MissingSport)
    );

    let body = NewEvent {
      sport: Some("Hockey".into()),
      ..body
    };
    assert!(body.validate().is_ok());
  }

  #[test]
  fn validate_rejects_impossible_dates() {
    let body = |date: &str| NewEvent {
      title: Some("Bogus".into()),
      date: Some(date.into()),
      tag: Some("Personal".into()),
      ..NewEvent::default()
    };
    assert_eq!(
      body("2025-02-30").validate(),
      Err(ValidationError::InvalidDate(
        "2025-02-30".into()
      ))
    );
    assert!(matches!(
      body("someday").validate(),
      Err(ValidationError::InvalidDate(_))
    ));

    let valid = body("3/1/2025")
      .validate()
      .expect("us date normalizes");
    assert_eq!(valid.date, "2025-03-01");
  }

  #[test]
  fn description_fills_details() {
    let body = NewEvent {
      title: Some("Study Session".into()),
      date: Some("2025-03-01".into()),
      tag: Some("Academic Calendar".into()),
      description: Some("bring notes".into()),
      ..NewEvent::default()
    };
    let valid = body.validate().expect("valid");
    let event = valid.into_event(9);
    assert_eq!(event.id, Some(9));
    assert!(event.is_user_event());
    assert_eq!(
      event.details.as_deref(),
      Some("bring notes")
    );
  }
}
