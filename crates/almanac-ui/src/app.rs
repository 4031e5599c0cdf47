use std::rc::Rc;

use almanac_shared::aggregate::SourceKind;
use almanac_shared::event::Event;
use almanac_shared::modal::{
  EventForm,
  Modal,
  SubmitPlan
};
use almanac_shared::state::{
  Action,
  CalendarState
};
use chrono::Local;
use gloo::dialogs::{
  alert,
  confirm
};
use yew::{
  Callback,
  Html,
  Reducible,
  UseReducerDispatcher,
  function_component,
  html,
  use_effect_with,
  use_reducer
};

use crate::api;
use crate::components::{
  MonthView,
  ModalView,
  Toolbar
};

/// Reducer wrapper so the shared state
/// machine drives Yew re-renders.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarStore(pub CalendarState);

impl Default for CalendarStore {
  fn default() -> Self {
    Self(CalendarState::new(
      Local::now().date_naive()
    ))
  }
}

impl Reducible for CalendarStore {
  type Action = Action;

  fn reduce(
    self: Rc<Self>,
    action: Action
  ) -> Rc<Self> {
    let mut next = (*self).clone();
    next.0.apply(action);
    Rc::new(next)
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let store =
    use_reducer(CalendarStore::default);

  {
    let dispatcher = store.dispatcher();
    use_effect_with((), move |_| {
      for kind in SourceKind::ALL {
        let dispatcher = dispatcher.clone();
        wasm_bindgen_futures::spawn_local(
          async move {
            let action =
              match api::load_source(kind)
                .await
              {
                | Ok(events) => {
                  tracing::info!(
                    source = kind.label(),
                    count = events.len(),
                    "source loaded"
                  );
                  Action::SourceLoaded {
                    kind,
                    events
                  }
                }
                | Err(error) => {
                  tracing::error!(
                    source = kind.label(),
                    %error,
                    "source failed"
                  );
                  Action::SourceFailed {
                    kind,
                    error
                  }
                }
              };
            dispatcher.dispatch(action);
          }
        );
      }
      || ()
    });
  }

  let dispatch = {
    let dispatcher = store.dispatcher();
    Callback::from(move |action: Action| {
      dispatcher.dispatch(action)
    })
  };

  let on_submit = {
    let dispatcher = store.dispatcher();
    Callback::from(move |form: EventForm| {
      submit_form(dispatcher.clone(), &form)
    })
  };

  let on_delete = {
    let dispatcher = store.dispatcher();
    Callback::from(move |event: Event| {
      delete_user_event(
        dispatcher.clone(),
        &event
      )
    })
  };

  let state = &store.0;
  let grid = state.grid();
  let day_events = match &state.modal {
    | Modal::DayEvents { date } => {
      state.day_events(date)
    }
    | _ => Vec::new()
  };

  html! {
      <div class="calendar-app">
          <Toolbar
              view={state.view}
              active_tags={state.aggregator.active_tags().clone()}
              range={state.aggregator.range().cloned()}
              query={state.aggregator.query().to_string()}
              on_action={dispatch.clone()}
          />
          <MonthView grid={grid} on_action={dispatch.clone()} />
          {
              if state.modal.is_open() {
                  html! {
                      <ModalView
                          modal={state.modal.clone()}
                          day_events={day_events}
                          on_action={dispatch}
                          on_submit={on_submit}
                          on_delete={on_delete}
                      />
                  }
              } else {
                  html! {}
              }
          }
      </div>
  }
}

/// Validates locally, then creates, or for
/// an edit deletes and recreates.
fn submit_form(
  dispatcher: UseReducerDispatcher<
    CalendarStore
  >,
  form: &EventForm
) {
  let plan = match form.validate() {
    | Ok(plan) => plan,
    | Err(err) => {
      alert(&err.to_string());
      return;
    }
  };

  wasm_bindgen_futures::spawn_local(
    async move {
      if let SubmitPlan::Replace {
        delete_id,
        ..
      } = &plan
      {
        if let Err(error) =
          api::delete_event(*delete_id).await
        {
          tracing::error!(%error, "failed replacing event");
          alert(&format!(
            "Could not save event: {error}"
          ));
          return;
        }
        dispatcher.dispatch(
          Action::UserEventDeleted(*delete_id)
        );
      }

      match api::create_event(plan.payload())
        .await
      {
        | Ok(event) => {
          tracing::info!(id = ?event.id, "event saved");
          dispatcher.dispatch(
            Action::UserEventCreated(event)
          );
        }
        | Err(error) => {
          tracing::error!(%error, "failed creating event");
          alert(&format!(
            "Could not save event: {error}"
          ));
        }
      }
    }
  );
}

fn delete_user_event(
  dispatcher: UseReducerDispatcher<
    CalendarStore
  >,
  event: &Event
) {
  let Some(id) = event.id else {
    return;
  };
  if !event.is_user_event()
    || !confirm(&format!(
      "Delete \"{}\"?",
      event.title
    ))
  {
    return;
  }

  wasm_bindgen_futures::spawn_local(
    async move {
      match api::delete_event(id).await {
        | Ok(()) => {
          dispatcher.dispatch(
            Action::UserEventDeleted(id)
          );
        }
        | Err(error) => {
          tracing::error!(%error, id, "failed deleting event");
          alert(&format!(
            "Could not delete event: {error}"
          ));
        }
      }
    }
  );
}

/// Container class, one per modal kind.
pub fn modal_class(modal: &Modal) -> String {
  format!("modal modal-{}", modal.name())
}
