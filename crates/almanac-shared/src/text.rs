use std::sync::OnceLock;

use regex::Regex;

#[derive(
  Debug, Clone, PartialEq, Eq,
)]
pub enum Segment {
  Text(String),
  Link(String)
}

fn url_pattern() -> Option<&'static Regex>
{
  static URL: OnceLock<Option<Regex>> =
    OnceLock::new();
  URL
    .get_or_init(|| {
      Regex::new(r#"https?://[^\s<>"']+"#)
        .ok()
    })
    .as_ref()
}

/// Splits free text into plain runs and
/// URLs so the view can render anchors.
/// Trailing sentence punctuation stays
/// outside the link.
pub fn linkify(text: &str) -> Vec<Segment> {
  let mut out = Vec::new();
  let mut cursor = 0;
  let Some(pattern) = url_pattern() else {
    if !text.is_empty() {
      out.push(Segment::Text(
        text.to_string()
      ));
    }
    return out;
  };

  for found in pattern.find_iter(text) {
    let url = found
      .as_str()
      .trim_end_matches(['.', ',', ')', ';', ':', '!', '?']);
    if url.len() <= "https://".len() {
      continue;
    }
    let start = found.start();
    let end = start + url.len();

    if start > cursor {
      out.push(Segment::Text(
        text[cursor..start].to_string()
      ));
    }
    out.push(Segment::Link(url.to_string()));
    cursor = end;
  }

  if cursor < text.len() {
    out.push(Segment::Text(
      text[cursor..].to_string()
    ));
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn splits_urls_out_of_text() {
    let segments = linkify(
      "Tickets: https://tickets.example.edu/hockey. Doors at 6."
    );
    assert_eq!(
      segments,
      vec![
        Segment::Text("Tickets: ".into()),
        Segment::Link(
          "https://tickets.example.edu/hockey"
            .into()
        ),
        Segment::Text(". Doors at 6.".into()),
      ]
    );
  }

  #[test]
  fn plain_text_is_one_segment() {
    assert_eq!(
      linkify("no links here"),
      vec![Segment::Text(
        "no links here".into()
      )]
    );
    assert!(linkify("").is_empty());
  }
}
