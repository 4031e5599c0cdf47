use std::io::{self, IsTerminal, Write};

use almanac_shared::event::{
    PillStyle, TAG_ACADEMIC, TAG_HOLIDAY, TAG_PERSONAL, TAG_SPORTS, TAG_WEATHER,
};
use almanac_shared::grid::{DayCell, GridCell, MonthGrid, Pill};
use unicode_width::UnicodeWidthStr;

const CELL_WIDTH: usize = 5;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Color only when asked for and stdout is a terminal.
    pub fn for_stdout(no_color: bool) -> Self {
        Self::new(!no_color && io::stdout().is_terminal())
    }

    #[tracing::instrument(skip(self, grid), fields(title = %grid.title))]
    pub fn print_month(&self, grid: &MonthGrid) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_month(&mut out, grid)
    }

    pub fn write_month<W: Write>(&self, mut out: W, grid: &MonthGrid) -> anyhow::Result<()> {
        let line_width = CELL_WIDTH * 7;
        let title_pad = line_width.saturating_sub(UnicodeWidthStr::width(grid.title.as_str())) / 2;
        writeln!(out, "{}{}", " ".repeat(title_pad), grid.title)?;

        for label in grid.weekdays {
            write!(out, "{label:>width$}", width = CELL_WIDTH)?;
        }
        writeln!(out)?;

        for week in grid.weeks() {
            for cell in week {
                match cell {
                    GridCell::Blank => write!(out, "{}", " ".repeat(CELL_WIDTH))?,
                    GridCell::Day(day) => write!(out, "{}", self.day_marker(day))?,
                }
            }
            writeln!(out)?;
        }

        let busy: Vec<&DayCell> = grid
            .day_cells()
            .filter(|day| day.total_events() > 0)
            .collect();
        if busy.is_empty() {
            writeln!(out)?;
            writeln!(out, "No events.")?;
            return Ok(());
        }

        let tag_width = busy
            .iter()
            .flat_map(|day| day.pills.iter())
            .map(|pill| UnicodeWidthStr::width(tag_of(pill)))
            .max()
            .unwrap_or(0);

        writeln!(out)?;
        for day in busy {
            for (idx, pill) in day.pills.iter().enumerate() {
                let date = if idx == 0 { day.date.as_str() } else { "" };
                let tag = tag_of(pill);
                let padding = tag_width.saturating_sub(UnicodeWidthStr::width(tag));
                let time = pill.event.time_label().unwrap_or_default();
                writeln!(
                    out,
                    "{date:<10}  {}{}  {}{}",
                    self.paint(tag, pill_color(pill)),
                    " ".repeat(padding),
                    if time.is_empty() {
                        String::new()
                    } else {
                        format!("{time}  ")
                    },
                    pill.label
                )?;
            }
            if let Some(more) = day.overflow_label() {
                writeln!(out, "{:<10}  {more}", "")?;
            }
        }

        Ok(())
    }

    /// Day number, `*` when it has events, brackets for today.
    fn day_marker(&self, day: &DayCell) -> String {
        let mark = if day.total_events() > 0 { "*" } else { " " };
        let text = if day.is_today {
            format!("[{:>2}]", day.day)
        } else {
            format!(" {:>2}{mark}", day.day)
        };
        let text = format!("{text:>width$}", width = CELL_WIDTH);
        if !day.in_range {
            self.paint(&text, "2")
        } else if day.is_selected {
            self.paint(&text, "7")
        } else {
            text
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn tag_of(pill: &Pill) -> &str {
    pill.event.tag.as_deref().unwrap_or("-")
}

fn pill_color(pill: &Pill) -> &'static str {
    match pill.style {
        Some(PillStyle::Hot) => return "31",
        Some(PillStyle::Cold) => return "34",
        Some(PillStyle::HeavyRain) => return "1;34",
        None => {}
    }
    match tag_of(pill) {
        TAG_HOLIDAY => "31",
        TAG_WEATHER => "36",
        TAG_SPORTS => "32",
        TAG_ACADEMIC => "35",
        TAG_PERSONAL => "33",
        _ => "0",
    }
}

#[cfg(test)]
mod tests {
    use almanac_shared::aggregate::{Aggregator, SourceKind};
    use almanac_shared::date::YearMonth;
    use almanac_shared::event::Event;
    use almanac_shared::grid::{GridLayout, build_month_grid};
    use chrono::NaiveDate;

    use super::*;

    fn render(agg: &Aggregator) -> String {
        let grid = build_month_grid(
            agg,
            YearMonth::new(2025, 3),
            NaiveDate::from_ymd_opt(2025, 3, 12).expect("date"),
            None,
            GridLayout::Compact,
        );
        let mut buf = Vec::new();
        Renderer::new(false)
            .write_month(&mut buf, &grid)
            .expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn empty_month_says_so() {
        let text = render(&Aggregator::new());
        assert!(text.contains("March 2025"));
        assert!(text.contains("[12]"));
        assert!(text.trim_end().ends_with("No events."));
    }

    #[test]
    fn overflow_is_listed_after_three_pills() {
        let mut agg = Aggregator::new();
        agg.set_source(
            SourceKind::Holidays,
            (1..=5)
                .map(|n| Event::new("2025-03-17", format!("Event {n}"), TAG_HOLIDAY))
                .collect(),
        );
        let text = render(&agg);
        assert!(text.contains("Event 3"));
        assert!(!text.contains("Event 4"));
        assert!(text.contains("+2 more"));
        assert!(text.contains(" 17*"));
    }
}
