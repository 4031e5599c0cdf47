use almanac_shared::grid::{
  DayCell,
  GridCell,
  MonthGrid
};
use almanac_shared::state::Action;
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct MonthViewProps {
  pub grid:      MonthGrid,
  pub on_action: Callback<Action>
}

#[function_component(MonthView)]
pub fn month_view(
  props: &MonthViewProps
) -> Html {
  html! {
      <div class="month">
          <div class="month-title">{ props.grid.title.clone() }</div>
          <div class="calendar-grid">
              {
                  for props.grid.weekdays.iter().map(|label| html! {
                      <div class="weekday">{ *label }</div>
                  })
              }
              {
                  for props.grid.cells.iter().map(|cell| match cell {
                      | GridCell::Blank => html! { <div class="cell empty"></div> },
                      | GridCell::Day(day) => day_cell(day, &props.on_action)
                  })
              }
          </div>
      </div>
  }
}

/// Clicking the cell selects the day and
/// lists its events. Pill and overflow
/// clicks stop there so the cell does not
/// also react.
fn day_cell(
  day: &DayCell,
  on_action: &Callback<Action>
) -> Html {
  let on_cell = {
    let on_action = on_action.clone();
    let date = day.date.clone();
    Callback::from(move |_: MouseEvent| {
      on_action
        .emit(Action::SelectDate(date.clone()))
    })
  };

  let pills = day.pills.iter().map(|pill| {
    let on_action = on_action.clone();
    let event = pill.event.clone();
    let onclick =
      Callback::from(move |e: MouseEvent| {
        e.stop_propagation();
        on_action
          .emit(Action::OpenEvent(event.clone()));
      });
    html! {
        <div class={pill.classes()} title={pill.label.clone()} {onclick}>
            { pill.label.clone() }
        </div>
    }
  });

  let overflow = day.overflow_label().map(|label| {
    let on_action = on_action.clone();
    let date = day.date.clone();
    let onclick =
      Callback::from(move |e: MouseEvent| {
        e.stop_propagation();
        on_action
          .emit(Action::OpenDay(date.clone()));
      });
    html! {
        <div class="more-events" {onclick}>{ label }</div>
    }
  });

  html! {
      <div class={day.classes()} data-date={day.date.clone()} onclick={on_cell}>
          <div class="day-number">{ day.day.to_string() }</div>
          { for pills }
          { for overflow }
      </div>
  }
}
