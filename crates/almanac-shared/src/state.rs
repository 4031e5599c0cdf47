//! Application state and the actions that
//! mutate it. Rendering reads the state,
//! never the other way around.

use chrono::NaiveDate;
use tracing::{
  debug,
  warn
};

use crate::aggregate::{
  Aggregator,
  SourceKind
};
use crate::date::{
  YearMonth,
  format_date,
  parse_iso_day
};
use crate::event::Event;
use crate::grid::{
  GridLayout,
  MonthGrid,
  build_month_grid
};
use crate::modal::{
  EventForm,
  Modal
};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
  PrevMonth,
  NextMonth,
  GoToday,
  SetMonth(u32),
  SetYear(i32),
  SetTagActive {
    tag:    String,
    active: bool
  },
  SetRange {
    start: String,
    end:   String
  },
  ClearRange,
  SetSearch(String),
  /// Click on the empty area of a cell:
  /// select the day and open its list.
  SelectDate(String),
  SourceLoaded {
    kind:   SourceKind,
    events: Vec<Event>
  },
  SourceFailed {
    kind:  SourceKind,
    error: String
  },
  OpenEvent(Event),
  OpenDay(String),
  OpenCreate,
  OpenEdit(Event),
  UpdateForm(EventForm),
  CloseModal,
  UserEventCreated(Event),
  UserEventDeleted(i64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarState {
  pub view:       YearMonth,
  pub today:      NaiveDate,
  pub selected:   Option<String>,
  pub aggregator: Aggregator,
  pub modal:      Modal,
  pub layout:     GridLayout
}

impl CalendarState {
  pub fn new(today: NaiveDate) -> Self {
    Self {
      view: YearMonth::of(today),
      today,
      selected: None,
      aggregator: Aggregator::new(),
      modal: Modal::Closed,
      layout: GridLayout::Compact
    }
  }

  pub fn apply(&mut self, action: Action) {
    match action {
      | Action::PrevMonth => {
        self.view = self.view.shift(-1);
      }
      | Action::NextMonth => {
        self.view = self.view.shift(1);
      }
      | Action::GoToday => {
        self.view = YearMonth::of(self.today);
      }
      | Action::SetMonth(month) => {
        self.view =
          YearMonth::new(self.view.year, month);
      }
      | Action::SetYear(year) => {
        self.view =
          YearMonth::new(year, self.view.month);
      }
      | Action::SetTagActive {
        tag,
        active
      } => {
        self
          .aggregator
          .set_tag_active(&tag, active);
      }
      | Action::SetRange {
        start,
        end
      } => {
        if parse_iso_day(&start).is_some()
          && parse_iso_day(&end).is_some()
        {
          self.aggregator.set_range(&start, &end);
        } else {
          warn!(%start, %end, "ignoring range with invalid bounds");
        }
      }
      | Action::ClearRange => {
        self.aggregator.clear_range();
      }
      | Action::SetSearch(query) => {
        self.aggregator.set_query(query);
      }
      | Action::SelectDate(date) => {
        self.selected = Some(date.clone());
        self.open_day(date);
      }
      | Action::SourceLoaded {
        kind,
        events
      } => {
        self.aggregator.set_source(kind, events);
      }
      | Action::SourceFailed {
        kind,
        error
      } => {
        warn!(source = kind.label(), %error, "event source failed; showing it as empty");
        self.aggregator.clear_source(kind);
      }
      | Action::OpenEvent(event) => {
        self.modal = Modal::EventDetail(event);
      }
      | Action::OpenDay(date) => {
        self.open_day(date);
      }
      | Action::OpenCreate => {
        let date = self
          .selected
          .clone()
          .unwrap_or_else(|| {
            format_date(self.today)
          });
        self.modal = Modal::CreateEdit(
          EventForm::for_date(&date)
        );
      }
      | Action::OpenEdit(event) => {
        if event.is_user_event() {
          self.modal = Modal::CreateEdit(
            EventForm::from_event(&event)
          );
        } else {
          warn!(title = %event.title, "only user events can be edited");
        }
      }
      | Action::UpdateForm(form) => {
        if let Modal::CreateEdit(_) =
          self.modal
        {
          self.modal = Modal::CreateEdit(form);
        }
      }
      | Action::CloseModal => {
        self.modal = Modal::Closed;
      }
      | Action::UserEventCreated(event) => {
        self.aggregator.push_user_event(event);
        self.modal = Modal::Closed;
      }
      | Action::UserEventDeleted(id) => {
        let removed =
          self.aggregator.remove_user_event(id);
        debug!(id, removed, "user event removed");
        if let Modal::EventDetail(open) =
          &self.modal
          && open.id == Some(id)
        {
          self.modal = Modal::Closed;
        }
      }
    }
  }

  fn open_day(&mut self, date: String) {
    self.modal = Modal::DayEvents { date };
  }

  /// What the day list shows for `date`:
  /// the same events as the grid cell, so
  /// nothing outside the range filter.
  pub fn day_events(
    &self,
    date: &str
  ) -> Vec<Event> {
    if !self.aggregator.is_in_range(date) {
      return Vec::new();
    }
    self
      .aggregator
      .events_for_date(date)
      .into_iter()
      .cloned()
      .collect()
  }

  pub fn grid(&self) -> MonthGrid {
    build_month_grid(
      &self.aggregator,
      self.view,
      self.today,
      self.selected.as_deref(),
      self.layout
    )
  }
}
