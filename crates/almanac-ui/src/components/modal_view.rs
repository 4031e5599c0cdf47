use almanac_shared::date::parse_iso_day;
use almanac_shared::event::{
  Event,
  KNOWN_TAGS,
  TAG_SPORTS,
  tag_class
};
use almanac_shared::modal::{
  EventForm,
  Modal
};
use almanac_shared::state::Action;
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement
};
use yew::{
  AttrValue,
  Callback,
  Html,
  MouseEvent,
  Properties,
  SubmitEvent,
  TargetCast,
  classes,
  function_component,
  html
};

use super::Linkified;
use crate::app::modal_class;

#[derive(Properties, PartialEq)]
pub struct ModalViewProps {
  pub modal:      Modal,
  /// Current events of the listed day
  /// while `DayEvents` is open.
  pub day_events: Vec<Event>,
  pub on_action:  Callback<Action>,
  pub on_submit:  Callback<EventForm>,
  pub on_delete:  Callback<Event>
}

#[function_component(ModalView)]
pub fn modal_view(
  props: &ModalViewProps
) -> Html {
  let close = {
    let on_action = props.on_action.clone();
    Callback::from(move |_: MouseEvent| {
      on_action.emit(Action::CloseModal)
    })
  };
  let keep_open =
    Callback::from(|e: MouseEvent| {
      e.stop_propagation()
    });

  let body = match &props.modal {
    | Modal::Closed => return html! {},
    | Modal::EventDetail(event) => {
      event_detail(event, props)
    }
    | Modal::DayEvents { date } => {
      day_events(date, &props.day_events, props)
    }
    | Modal::CreateEdit(form) => {
      event_form(form, props)
    }
  };

  html! {
      <div class="modal-overlay" onclick={close.clone()}>
          <div class={modal_class(&props.modal)} onclick={keep_open}>
              <button class="modal-close" onclick={close}>{ "×" }</button>
              { body }
          </div>
      </div>
  }
}

fn event_detail(
  event: &Event,
  props: &ModalViewProps
) -> Html {
  let row = |label: &str,
             value: Option<String>| {
    value.map(|value| {
      html! {
          <p class="detail-row">
              <strong>{ format!("{label}: ") }</strong>
              { value }
          </p>
      }
    })
  };

  let actions = event.is_user_event().then(|| {
    let on_edit = {
      let on_action = props.on_action.clone();
      let event = event.clone();
      Callback::from(move |_: MouseEvent| {
        on_action
          .emit(Action::OpenEdit(event.clone()))
      })
    };
    let on_delete = {
      let on_delete = props.on_delete.clone();
      let event = event.clone();
      Callback::from(move |_: MouseEvent| {
        on_delete.emit(event.clone())
      })
    };
    html! {
        <div class="modal-actions">
            <button class="btn" onclick={on_edit}>{ "Edit" }</button>
            <button class="btn danger" onclick={on_delete}>{ "Delete" }</button>
        </div>
    }
  });

  let tag = event.tag.clone();
  let date = long_date(&event.date);

  html! {
      <div class="event-detail">
          <h2>{ event.title.clone() }</h2>
          {
              for tag.map(|tag| html! {
                  <span class={classes!("tag-badge", tag_class(&tag))}>{ tag.clone() }</span>
              })
          }
          { for row("Date", Some(date)) }
          { for row("Time", event.time_label()) }
          { for row("Location", event.location.clone()) }
          { for row("Sport", event.sport.clone()) }
          {
              for event.body().map(|text| html! {
                  <div class="detail-body">
                      <Linkified text={AttrValue::from(text.to_string())} />
                  </div>
              })
          }
          { for actions }
      </div>
  }
}

fn day_events(
  date: &str,
  events: &[Event],
  props: &ModalViewProps
) -> Html {
  let heading = long_date(date);

  let items = events.iter().map(|event| {
    let on_action = props.on_action.clone();
    let opened = event.clone();
    let onclick =
      Callback::from(move |_: MouseEvent| {
        on_action
          .emit(Action::OpenEvent(opened.clone()))
      });
    let class = event
      .tag
      .as_deref()
      .map(tag_class)
      .unwrap_or_default();
    html! {
        <li class={classes!("day-event", class)} {onclick}>
            {
                for event.time_label().map(|time| html! {
                    <span class="day-event-time">{ time }</span>
                })
            }
            <span class="day-event-title">{ event.title.clone() }</span>
        </li>
    }
  });

  html! {
      <div class="day-events">
          <h2>{ heading }</h2>
          {
              if events.is_empty() {
                  html! { <p class="empty">{ "No events." }</p> }
              } else {
                  html! { <ul>{ for items }</ul> }
              }
          }
      </div>
  }
}

/// `Saturday, March 1, 2025`, or the raw
/// value when it is not an ISO day.
fn long_date(raw: &str) -> String {
  parse_iso_day(raw)
    .map(|day| {
      day.format("%A, %B %-d, %Y").to_string()
    })
    .unwrap_or_else(|| raw.to_string())
}

/// One change handler per field; each emits
/// the whole updated draft.
fn field_update<E: TargetCast + 'static>(
  form: &EventForm,
  on_action: &Callback<Action>,
  read: fn(&E) -> String,
  write: fn(&mut EventForm, String)
) -> Callback<E> {
  let form = form.clone();
  let on_action = on_action.clone();
  Callback::from(move |e: E| {
    let mut next = form.clone();
    write(&mut next, read(&e));
    on_action.emit(Action::UpdateForm(next));
  })
}

fn input_value<E: TargetCast>(
  e: &E
) -> String {
  e.target_unchecked_into::<HtmlInputElement>()
    .value()
}

fn select_value<E: TargetCast>(
  e: &E
) -> String {
  e.target_unchecked_into::<HtmlSelectElement>()
    .value()
}

fn textarea_value<E: TargetCast>(
  e: &E
) -> String {
  e.target_unchecked_into::<HtmlTextAreaElement>()
    .value()
}

fn event_form(
  form: &EventForm,
  props: &ModalViewProps
) -> Html {
  let on_action = &props.on_action;
  let on_title = field_update::<yew::InputEvent>(
    form,
    on_action,
    input_value,
    |f, v| f.title = v
  );
  let on_date = field_update::<yew::Event>(
    form,
    on_action,
    input_value,
    |f, v| f.date = v
  );
  let on_start = field_update::<yew::InputEvent>(
    form,
    on_action,
    input_value,
    |f, v| f.start = v
  );
  let on_end = field_update::<yew::InputEvent>(
    form,
    on_action,
    input_value,
    |f, v| f.end = v
  );
  let on_location =
    field_update::<yew::InputEvent>(
      form,
      on_action,
      input_value,
      |f, v| f.location = v
    );
  let on_tag = field_update::<yew::Event>(
    form,
    on_action,
    select_value,
    |f, v| f.tag = v
  );
  let on_sport = field_update::<yew::InputEvent>(
    form,
    on_action,
    input_value,
    |f, v| f.sport = v
  );
  let on_details =
    field_update::<yew::InputEvent>(
      form,
      on_action,
      textarea_value,
      |f, v| f.details = v
    );

  let onsubmit = {
    let on_submit = props.on_submit.clone();
    let form = form.clone();
    Callback::from(move |e: SubmitEvent| {
      e.prevent_default();
      on_submit.emit(form.clone());
    })
  };
  let on_cancel = {
    let on_action = props.on_action.clone();
    Callback::from(move |_: MouseEvent| {
      on_action.emit(Action::CloseModal)
    })
  };

  let heading = if form.editing.is_some() {
    "Edit event"
  } else {
    "New event"
  };

  html! {
      <form class="event-form" {onsubmit}>
          <h2>{ heading }</h2>
          <label>
              { "Title" }
              <input type="text" value={form.title.clone()} oninput={on_title} />
          </label>
          <label>
              { "Date" }
              <input type="date" value={form.date.clone()} onchange={on_date} />
          </label>
          <div class="form-row">
              <label>
                  { "Start" }
                  <input type="text" placeholder="7:00pm" value={form.start.clone()} oninput={on_start} />
              </label>
              <label>
                  { "End" }
                  <input type="text" placeholder="8:30pm" value={form.end.clone()} oninput={on_end} />
              </label>
          </div>
          <label>
              { "Location" }
              <input type="text" value={form.location.clone()} oninput={on_location} />
          </label>
          <label>
              { "Tag" }
              <select onchange={on_tag}>
                  {
                      for KNOWN_TAGS.iter().map(|tag| html! {
                          <option value={*tag} selected={form.tag == *tag}>{ *tag }</option>
                      })
                  }
              </select>
          </label>
          {
              if form.tag == TAG_SPORTS {
                  html! {
                      <label>
                          { "Sport" }
                          <input type="text" value={form.sport.clone()} oninput={on_sport} />
                      </label>
                  }
              } else {
                  html! {}
              }
          }
          <label>
              { "Details" }
              <textarea value={form.details.clone()} oninput={on_details} />
          </label>
          <div class="modal-actions">
              <button type="button" class="btn" onclick={on_cancel}>{ "Cancel" }</button>
              <button type="submit" class="btn primary">{ "Save" }</button>
          </div>
      </form>
  }
}
