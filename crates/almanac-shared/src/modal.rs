//! Modal views as a single state value.
//! Opening one view replaces whatever was
//! open, so two overlays never coexist.

use std::fmt;

use crate::api::NewEvent;
use crate::event::{
  Event,
  TAG_PERSONAL,
  TAG_SPORTS
};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Modal {
  #[default]
  Closed,
  EventDetail(Event),
  /// The list itself is read from the
  /// aggregator on every render.
  DayEvents {
    date: String
  },
  CreateEdit(EventForm)
}

impl Modal {
  pub fn is_open(&self) -> bool {
    !matches!(self, Modal::Closed)
  }

  pub fn name(&self) -> &'static str {
    match self {
      | Modal::Closed => "closed",
      | Modal::EventDetail(_) => {
        "event-detail"
      }
      | Modal::DayEvents { .. } => {
        "day-events"
      }
      | Modal::CreateEdit(_) => {
        "create-edit"
      }
    }
  }
}

/// Draft values of the create/edit form.
#[derive(
  Debug, Clone, Default, PartialEq,
)]
pub struct EventForm {
  /// Id of the user event being edited.
  pub editing:  Option<i64>,
  pub title:    String,
  pub date:     String,
  pub start:    String,
  pub end:      String,
  pub location: String,
  pub tag:      String,
  pub sport:    String,
  pub details:  String
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum FormError {
  MissingTitleOrDate,
  MissingSport
}

impl fmt::Display for FormError {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    match self {
      | FormError::MissingTitleOrDate => {
        f.write_str(
          "Please enter at least Title \
           and Date."
        )
      }
      | FormError::MissingSport => {
        f.write_str(
          "Please choose a sport for \
           Sports Events."
        )
      }
    }
  }
}

impl std::error::Error for FormError {}

/// Network work a valid submit turns
/// into. Edits have no update endpoint,
/// so they delete then recreate.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitPlan {
  Create(NewEvent),
  Replace {
    delete_id: i64,
    create:    NewEvent
  }
}

impl SubmitPlan {
  pub fn payload(&self) -> &NewEvent {
    match self {
      | SubmitPlan::Create(create)
      | SubmitPlan::Replace {
        create,
        ..
      } => create
    }
  }
}

impl EventForm {
  pub fn for_date(date: &str) -> Self {
    Self {
      date: date.to_string(),
      tag: TAG_PERSONAL.to_string(),
      ..Self::default()
    }
  }

  /// Prefills the form from an existing
  /// user event.
  pub fn from_event(event: &Event) -> Self {
    let text = |value: &Option<String>| {
      value.clone().unwrap_or_default()
    };
    Self {
      editing:  event.id,
      title:    event.title.clone(),
      date:     event.date.clone(),
      start:    text(&event.start),
      end:      text(&event.end),
      location: text(&event.location),
      tag:      event
        .tag
        .clone()
        .unwrap_or_else(|| {
          TAG_PERSONAL.to_string()
        }),
      sport:    text(&event.sport),
      details:  event
        .body()
        .unwrap_or_default()
        .to_string()
    }
  }

  pub fn validate(
    &self
  ) -> Result<SubmitPlan, FormError> {
    if self.title.trim().is_empty()
      || self.date.trim().is_empty()
    {
      return Err(
        FormError::MissingTitleOrDate
      );
    }
    if self.tag == TAG_SPORTS
      && self.sport.trim().is_empty()
    {
      return Err(FormError::MissingSport);
    }

    let optional = |value: &str| {
      let trimmed = value.trim();
      (!trimmed.is_empty())
        .then(|| trimmed.to_string())
    };
    let create = NewEvent {
      title:       optional(&self.title),
      date:        optional(&self.date),
      start:       optional(&self.start),
      end:         optional(&self.end),
      location:    optional(&self.location),
      tag:         optional(&self.tag),
      sport:       optional(&self.sport),
      details:     optional(&self.details),
      description: None
    };

    Ok(match self.editing {
      | Some(delete_id) => {
        SubmitPlan::Replace {
          delete_id,
          create
        }
      }
      | None => SubmitPlan::Create(create)
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::TAG_ACADEMIC;

  #[test]
  fn requires_title_and_date() {
    let mut form =
      EventForm::for_date("2025-03-01");
    assert_eq!(
      form.validate(),
      Err(FormError::MissingTitleOrDate)
    );
    form.title = "Study Session".into();
    form.date.clear();
    assert_eq!(
      form.validate(),
      Err(FormError::MissingTitleOrDate)
    );
  }

  #[test]
  fn sports_tag_requires_sport() {
    let mut form =
      EventForm::for_date("2025-03-01");
    form.title = "Pickup game".into();
    form.tag = TAG_SPORTS.into();
    assert_eq!(
      form.validate(),
      Err(FormError::MissingSport)
    );
    form.sport = "Basketball".into();
    assert!(form.validate().is_ok());
  }

  #[test]
  fn edit_plans_delete_then_create() {
    let mut event = Event::new(
      "2025-03-01",
      "Study Session",
      TAG_ACADEMIC
    );
    event.id = Some(42);
    event.details =
      Some("room 204".to_string());

    let mut form =
      EventForm::from_event(&event);
    form.title = "Study Session (moved)".into();

    match form.validate() {
      | Ok(SubmitPlan::Replace {
        delete_id,
        create
      }) => {
        assert_eq!(delete_id, 42);
        assert_eq!(
          create.title.as_deref(),
          Some("Study Session (moved)")
        );
        assert_eq!(
          create.details.as_deref(),
          Some("room 204")
        );
        assert_eq!(create.start, None);
      }
      | other => {
        panic!("unexpected plan: {other:?}")
      }
    }
  }
}
