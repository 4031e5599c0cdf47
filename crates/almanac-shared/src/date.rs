use chrono::{
  Datelike,
  NaiveDate
};
use serde::{
  Deserialize,
  Serialize
};

pub const MONTH_NAMES: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December"
];

pub const WEEKDAY_LABELS: [&str; 7] = [
  "Sun", "Mon", "Tue", "Wed", "Thu",
  "Fri", "Sat"
];

/// `YYYY-MM-DD` with zero padding.
/// `month` is 1-based.
pub fn format_ymd(
  year: i32,
  month: u32,
  day: u32
) -> String {
  format!("{year:04}-{month:02}-{day:02}")
}

pub fn format_date(
  date: NaiveDate
) -> String {
  format_ymd(
    date.year(),
    date.month(),
    date.day()
  )
}

/// Strict ISO day parse; rejects
/// anything but exactly `YYYY-MM-DD`.
pub fn parse_iso_day(
  raw: &str
) -> Option<NaiveDate> {
  if !has_iso_day_shape(raw) {
    return None;
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d")
    .ok()
}

pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  if month == 12 {
    return 31;
  }
  NaiveDate::from_ymd_opt(year, month + 1, 1)
    .and_then(|first| first.pred_opt())
    .map(|last| last.day())
    .unwrap_or(30)
}

/// Weekday of the 1st, Sunday = 0.
pub fn first_weekday_offset(
  year: i32,
  month: u32
) -> u32 {
  NaiveDate::from_ymd_opt(year, month, 1)
    .map(|first| {
      first
        .weekday()
        .num_days_from_sunday()
    })
    .unwrap_or(0)
}

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
pub struct YearMonth {
  pub year:  i32,
  /// 1-based.
  pub month: u32
}

impl YearMonth {
  pub fn new(
    year: i32,
    month: u32
  ) -> Self {
    Self {
      year,
      month: month.clamp(1, 12)
    }
  }

  pub fn of(date: NaiveDate) -> Self {
    Self::new(date.year(), date.month())
  }

  /// Moves by whole months. A result
  /// past the `i32` year range leaves the
  /// view where it was.
  pub fn shift(
    self,
    months: i32
  ) -> Self {
    let index = i64::from(self.year) * 12
      + i64::from(self.month)
      - 1
      + i64::from(months);
    match i32::try_from(index.div_euclid(12))
    {
      | Ok(year) => Self {
        year,
        month: index.rem_euclid(12) as u32
          + 1
      },
      | Err(_) => self
    }
  }

  pub fn title(&self) -> String {
    format!(
      "{} {}",
      MONTH_NAMES
        [(self.month - 1) as usize],
      self.year
    )
  }

  pub fn days(&self) -> u32 {
    days_in_month(self.year, self.month)
  }

  pub fn first_weekday_offset(
    &self
  ) -> u32 {
    first_weekday_offset(
      self.year, self.month
    )
  }
}

/// Reduces an incoming date value to an
/// ISO day where the shape is known:
/// an ISO datetime keeps its first 10
/// characters, `MM/DD/YYYY` is reordered,
/// anything else passes through.
pub fn normalize_date_value(
  raw: &str
) -> String {
  let trimmed = raw.trim();

  if trimmed.len() > 10
    && trimmed.is_char_boundary(10)
    && has_iso_day_shape(&trimmed[..10])
    && matches!(
      trimmed.as_bytes()[10],
      b'T' | b' '
    )
  {
    return trimmed[..10].to_string();
  }

  if let Some(iso) = us_date_to_iso(trimmed)
  {
    return iso;
  }

  trimmed.to_string()
}

fn us_date_to_iso(
  raw: &str
) -> Option<String> {
  let mut parts = raw.split('/');
  let month = parts.next()?;
  let day = parts.next()?;
  let year = parts.next()?;
  if parts.next().is_some()
    || !(1..=2).contains(&month.len())
    || !(1..=2).contains(&day.len())
    || year.len() != 4
  {
    return None;
  }

  let month = month.parse::<u32>().ok()?;
  let day = day.parse::<u32>().ok()?;
  let year = year.parse::<i32>().ok()?;
  Some(format_ymd(year, month, day))
}

/// Minutes since midnight for a free-text
/// start such as `7:30pm`, `12am`, `9:05`
/// or `14:00`. `None` when the text is not
/// a clock time.
pub fn time_of_day_minutes(
  raw: &str
) -> Option<u32> {
  let lower = raw.trim().to_ascii_lowercase();
  let (clock, meridiem) =
    if let Some(rest) = lower.strip_suffix("am")
    {
      (rest.trim_end(), Some(false))
    } else if let Some(rest) =
      lower.strip_suffix("pm")
    {
      (rest.trim_end(), Some(true))
    } else {
      (lower.as_str(), None)
    };

  let (hour, minute) = match clock
    .split_once(':')
  {
    | Some((h, m)) if m.len() == 2 => {
      (
        h.parse::<u32>().ok()?,
        m.parse::<u32>().ok()?
      )
    }
    | Some(_) => return None,
    | None if meridiem.is_some() => {
      (clock.parse::<u32>().ok()?, 0)
    }
    | None => return None
  };
  if minute > 59 {
    return None;
  }

  let hour = match meridiem {
    | Some(pm) if (1..=12).contains(&hour) => {
      hour % 12 + if pm { 12 } else { 0 }
    }
    | Some(_) => return None,
    | None if hour <= 23 => hour,
    | None => return None
  };
  Some(hour * 60 + minute)
}

pub(crate) fn has_iso_day_shape(
  raw: &str
) -> bool {
  let bytes = raw.as_bytes();
  bytes.len() == 10
    && bytes.iter().enumerate().all(
      |(idx, b)| match idx {
        | 4 | 7 => *b == b'-',
        | _ => b.is_ascii_digit()
      }
    )
}
