use chrono::NaiveDate;

use crate::aggregate::Aggregator;
use crate::date::{
  WEEKDAY_LABELS,
  YearMonth,
  format_date,
  format_ymd
};
use crate::event::{
  Event,
  PillStyle,
  tag_class
};

/// Pills shown inline before the
/// "+N more" control takes over.
pub const MAX_VISIBLE_EVENTS: usize = 3;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum GridLayout {
  /// Trailing blanks up to the next
  /// multiple of 7.
  Compact,
  /// Always 6 rows (42 cells).
  Fixed
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pill {
  pub label: String,
  pub class: String,
  pub style: Option<PillStyle>,
  pub event: Event
}

impl Pill {
  fn from_event(event: &Event) -> Self {
    let class = event
      .tag
      .as_deref()
      .map(tag_class)
      .unwrap_or_default();
    Self {
      label: event.title.clone(),
      class,
      style: event.style,
      event: event.clone()
    }
  }

  /// Every CSS class the pill needs.
  pub fn classes(&self) -> String {
    let mut out = String::from("event-pill");
    if !self.class.is_empty() {
      out.push(' ');
      out.push_str(&self.class);
    }
    if let Some(style) = self.style {
      out.push(' ');
      out.push_str(style.class());
    }
    out
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
  pub day:         u32,
  pub date:        String,
  pub is_today:    bool,
  pub is_selected: bool,
  pub in_range:    bool,
  pub pills:       Vec<Pill>,
  /// Events beyond the visible cap.
  pub overflow:    usize
}

impl DayCell {
  pub fn total_events(&self) -> usize {
    self.pills.len() + self.overflow
  }

  pub fn overflow_label(
    &self
  ) -> Option<String> {
    (self.overflow > 0).then(|| {
      format!("+{} more", self.overflow)
    })
  }

  pub fn classes(&self) -> String {
    let mut out = String::from("cell");
    if self.total_events() > 0 {
      out.push_str(" has-event");
    }
    if self.is_today {
      out.push_str(" today");
    }
    if self.is_selected {
      out.push_str(" selected");
    }
    if !self.in_range {
      out.push_str(" out-of-range");
    }
    out
  }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridCell {
  Blank,
  Day(DayCell)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
  pub month:    YearMonth,
  pub title:    String,
  pub weekdays: [&'static str; 7],
  pub cells:    Vec<GridCell>
}

impl MonthGrid {
  pub fn day_cells(
    &self
  ) -> impl Iterator<Item = &DayCell> {
    self.cells.iter().filter_map(|cell| {
      match cell {
        | GridCell::Day(day) => Some(day),
        | GridCell::Blank => None
      }
    })
  }

  pub fn day(
    &self,
    date: &str
  ) -> Option<&DayCell> {
    self
      .day_cells()
      .find(|cell| cell.date == date)
  }

  pub fn leading_blanks(&self) -> usize {
    self
      .cells
      .iter()
      .take_while(|cell| {
        matches!(cell, GridCell::Blank)
      })
      .count()
  }

  pub fn weeks(
    &self
  ) -> impl Iterator<Item = &[GridCell]> {
    self.cells.chunks(7)
  }
}

/// Builds the month view model from the
/// aggregator's current filters.
pub fn build_month_grid(
  aggregator: &Aggregator,
  month: YearMonth,
  today: NaiveDate,
  selected: Option<&str>,
  layout: GridLayout
) -> MonthGrid {
  let offset =
    month.first_weekday_offset() as usize;
  let days = month.days();
  let today = format_date(today);

  let mut cells = Vec::with_capacity(42);
  cells.extend(
    std::iter::repeat_n(
      GridCell::Blank,
      offset
    )
  );

  for day in 1..=days {
    let date =
      format_ymd(month.year, month.month, day);
    let in_range =
      aggregator.is_in_range(&date);
    let events = if in_range {
      aggregator.events_for_date(&date)
    } else {
      Vec::new()
    };
    let pills: Vec<Pill> = events
      .iter()
      .take(MAX_VISIBLE_EVENTS)
      .map(|event| Pill::from_event(event))
      .collect();
    let overflow = events
      .len()
      .saturating_sub(MAX_VISIBLE_EVENTS);

    cells.push(GridCell::Day(DayCell {
      day,
      is_today: date == today,
      is_selected: selected
        == Some(date.as_str()),
      in_range,
      pills,
      overflow,
      date
    }));
  }

  let target = match layout {
    | GridLayout::Compact => {
      cells.len().div_ceil(7) * 7
    }
    | GridLayout::Fixed => {
      cells.len().max(42)
    }
  };
  cells.resize(target, GridCell::Blank);

  MonthGrid {
    month,
    title: month.title(),
    weekdays: WEEKDAY_LABELS,
    cells
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::aggregate::SourceKind;
  use crate::event::{
    TAG_HOLIDAY,
    TAG_SPORTS
  };

  fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn cell_counts_for_every_month() {
    let agg = Aggregator::new();
    for year in [2023, 2024, 2025] {
      for m in 1..=12 {
        let month = YearMonth::new(year, m);
        let grid = build_month_grid(
          &agg,
          month,
          day(2025, 1, 1),
          None,
          GridLayout::Compact
        );
        assert_eq!(
          grid.leading_blanks(),
          month.first_weekday_offset()
            as usize
        );
        assert_eq!(
          grid.day_cells().count(),
          month.days() as usize
        );
        assert_eq!(grid.cells.len() % 7, 0);

        let fixed = build_month_grid(
          &agg,
          month,
          day(2025, 1, 1),
          None,
          GridLayout::Fixed
        );
        assert_eq!(fixed.cells.len(), 42);
      }
    }
  }

  #[test]
  fn overflow_shows_cap_and_remainder() {
    let mut agg = Aggregator::new();
    let events = (1..=5)
      .map(|n| {
        Event::new(
          "2025-03-14",
          format!("Game {n}"),
          TAG_SPORTS
        )
      })
      .collect();
    agg.set_source(SourceKind::Sports, events);

    let grid = build_month_grid(
      &agg,
      YearMonth::new(2025, 3),
      day(2025, 3, 1),
      None,
      GridLayout::Compact
    );
    let cell =
      grid.day("2025-03-14").expect("cell");
    assert_eq!(
      cell.pills.len(),
      MAX_VISIBLE_EVENTS
    );
    assert_eq!(cell.overflow, 2);
    assert_eq!(
      cell.overflow_label().as_deref(),
      Some("+2 more")
    );
    assert_eq!(cell.total_events(), 5);
  }

  #[test]
  fn today_selected_and_range_flags() {
    let mut agg = Aggregator::new();
    agg.set_source(
      SourceKind::Holidays,
      vec![
        Event::new(
          "2025-07-04",
          "Independence Day",
          TAG_HOLIDAY
        ),
        Event::new(
          "2025-07-20",
          "Later",
          TAG_HOLIDAY
        ),
      ]
    );
    agg.set_range("2025-07-10", "2025-07-01");

    let grid = build_month_grid(
      &agg,
      YearMonth::new(2025, 7),
      day(2025, 7, 2),
      Some("2025-07-04"),
      GridLayout::Compact
    );

    let selected: Vec<_> = grid
      .day_cells()
      .filter(|c| c.is_selected)
      .collect();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].date, "2025-07-04");
    assert_eq!(selected[0].pills.len(), 1);
    assert_eq!(
      selected[0].pills[0].classes(),
      "event-pill tag-holiday"
    );

    let today = grid
      .day("2025-07-02")
      .expect("today cell");
    assert!(today.is_today);
    assert!(today.classes().contains("today"));

    let later =
      grid.day("2025-07-20").expect("cell");
    assert!(!later.in_range);
    assert!(later.pills.is_empty());
  }
}
