use std::collections::BTreeSet;

use almanac_shared::aggregate::DateRange;
use almanac_shared::date::{
  MONTH_NAMES,
  YearMonth
};
use almanac_shared::event::{
  KNOWN_TAGS,
  tag_class
};
use almanac_shared::state::Action;
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement
};
use yew::{
  Callback,
  Html,
  MouseEvent,
  Properties,
  TargetCast,
  classes,
  function_component,
  html,
  use_state
};

/// Years offered around the visible one.
const YEAR_SPAN: i32 = 5;

#[derive(Properties, PartialEq)]
pub struct ToolbarProps {
  pub view:        YearMonth,
  pub active_tags: BTreeSet<String>,
  pub range:       Option<DateRange>,
  pub query:       String,
  pub on_action:   Callback<Action>
}

#[function_component(Toolbar)]
pub fn toolbar(
  props: &ToolbarProps
) -> Html {
  let range_from = use_state(|| {
    props
      .range
      .as_ref()
      .map(|r| r.start.clone())
      .unwrap_or_default()
  });
  let range_to = use_state(|| {
    props
      .range
      .as_ref()
      .map(|r| r.end.clone())
      .unwrap_or_default()
  });

  let emit = |action: Action| {
    let on_action = props.on_action.clone();
    Callback::from(move |_: MouseEvent| {
      on_action.emit(action.clone())
    })
  };

  let on_month = {
    let on_action = props.on_action.clone();
    Callback::from(move |e: yew::Event| {
      let select: HtmlSelectElement =
        e.target_unchecked_into();
      if let Ok(month) =
        select.value().parse::<u32>()
      {
        on_action.emit(Action::SetMonth(month));
      }
    })
  };

  let on_year = {
    let on_action = props.on_action.clone();
    Callback::from(move |e: yew::Event| {
      let select: HtmlSelectElement =
        e.target_unchecked_into();
      if let Ok(year) =
        select.value().parse::<i32>()
      {
        on_action.emit(Action::SetYear(year));
      }
    })
  };

  let on_search = {
    let on_action = props.on_action.clone();
    Callback::from(
      move |e: yew::InputEvent| {
        let input: HtmlInputElement =
          e.target_unchecked_into();
        on_action
          .emit(Action::SetSearch(input.value()));
      }
    )
  };

  let on_from = {
    let range_from = range_from.clone();
    Callback::from(move |e: yew::Event| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      range_from.set(input.value());
    })
  };
  let on_to = {
    let range_to = range_to.clone();
    Callback::from(move |e: yew::Event| {
      let input: HtmlInputElement =
        e.target_unchecked_into();
      range_to.set(input.value());
    })
  };

  let on_apply_range = {
    let on_action = props.on_action.clone();
    let range_from = range_from.clone();
    let range_to = range_to.clone();
    Callback::from(move |_: MouseEvent| {
      if range_from.is_empty()
        || range_to.is_empty()
      {
        gloo::dialogs::alert(
          "Please choose both a start and \
           an end date."
        );
        return;
      }
      on_action.emit(Action::SetRange {
        start: (*range_from).clone(),
        end:   (*range_to).clone()
      });
    })
  };

  let on_clear_range = {
    let on_action = props.on_action.clone();
    let range_from = range_from.clone();
    let range_to = range_to.clone();
    Callback::from(move |_: MouseEvent| {
      range_from.set(String::new());
      range_to.set(String::new());
      on_action.emit(Action::ClearRange);
    })
  };

  let year = props.view.year;

  html! {
      <div class="toolbar">
          <div class="nav">
              <button class="btn" onclick={emit(Action::PrevMonth)}>{ "‹" }</button>
              <select onchange={on_month}>
                  {
                      for MONTH_NAMES.iter().enumerate().map(|(idx, name)| {
                          let month = idx as u32 + 1;
                          html! {
                              <option value={month.to_string()} selected={month == props.view.month}>
                                  { *name }
                              </option>
                          }
                      })
                  }
              </select>
              <select onchange={on_year}>
                  {
                      for (year - YEAR_SPAN..=year + YEAR_SPAN).map(|y| html! {
                          <option value={y.to_string()} selected={y == year}>{ y.to_string() }</option>
                      })
                  }
              </select>
              <button class="btn" onclick={emit(Action::NextMonth)}>{ "›" }</button>
              <button class="btn" onclick={emit(Action::GoToday)}>{ "Today" }</button>
              <button class="btn primary" onclick={emit(Action::OpenCreate)}>{ "+ New event" }</button>
          </div>

          <div class="tags">
              {
                  for KNOWN_TAGS.iter().map(|tag| {
                      let active = props.active_tags.contains(*tag);
                      let on_action = props.on_action.clone();
                      let tag_name = tag.to_string();
                      let onchange = Callback::from(move |e: yew::Event| {
                          let input: HtmlInputElement = e.target_unchecked_into();
                          on_action.emit(Action::SetTagActive {
                              tag: tag_name.clone(),
                              active: input.checked()
                          });
                      });
                      html! {
                          <label class={classes!("tag-toggle", tag_class(tag))}>
                              <input type="checkbox" checked={active} {onchange} />
                              { *tag }
                          </label>
                      }
                  })
              }
          </div>

          <div class="range">
              <input type="date" value={(*range_from).clone()} onchange={on_from} />
              <span>{ "to" }</span>
              <input type="date" value={(*range_to).clone()} onchange={on_to} />
              <button class="btn" onclick={on_apply_range}>{ "Apply" }</button>
              <button class="btn" onclick={on_clear_range}>{ "Clear" }</button>
          </div>

          <input
              class="search"
              type="search"
              placeholder="Search events"
              value={props.query.clone()}
              oninput={on_search}
          />
      </div>
  }
}
