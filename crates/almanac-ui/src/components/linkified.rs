use almanac_shared::text::{
  Segment,
  linkify
};
use yew::{
  AttrValue,
  Html,
  Properties,
  function_component,
  html
};

#[derive(Properties, PartialEq)]
pub struct LinkifiedProps {
  pub text: AttrValue
}

/// Free text with URLs turned into links
/// that open in a new tab.
#[function_component(Linkified)]
pub fn linkified(
  props: &LinkifiedProps
) -> Html {
  html! {
      <div class="event-body">
          {
              for linkify(&props.text).into_iter().map(|segment| match segment {
                  | Segment::Text(text) => html! { <span>{ text }</span> },
                  | Segment::Link(url) => html! {
                      <a href={url.clone()} target="_blank" rel="noopener noreferrer">{ url }</a>
                  }
              })
          }
      </div>
  }
}
