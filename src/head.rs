//! Document patching used when the host hands over the final page markup.

use regex::Regex;

/// Insert `markup` right after the opening `<head>` tag.
///
/// Documents without a head are returned unchanged.
pub fn inject_after_head_open(document: &str, markup: &str) -> String {
  if markup.is_empty() {
    return document.to_string();
  }
  let head_pattern = Regex::new(r"(?i)<head(\s[^>]*)?>").expect("invalid head regex");
  match head_pattern.find(document) {
    Some(found) => splice(document, found.end(), markup),
    None => document.to_string(),
  }
}

/// Insert `markup` right before the first `</head>`.
pub fn inject_before_head_close(document: &str, markup: &str) -> String {
  if markup.is_empty() {
    return document.to_string();
  }
  match closing_tag_pattern("head").find(document) {
    Some(found) => splice(document, found.start(), markup),
    None => document.to_string(),
  }
}

/// Insert `markup` right before the last `</body>`.
pub fn inject_before_body_close(document: &str, markup: &str) -> String {
  if markup.is_empty() {
    return document.to_string();
  }
  match closing_tag_pattern("body").find_iter(document).last() {
    Some(found) => splice(document, found.start(), markup),
    None => document.to_string(),
  }
}

fn closing_tag_pattern(tag: &str) -> Regex {
  Regex::new(&format!(r"(?i)</{}\s*>", regex::escape(tag))).expect("invalid closing tag regex")
}

fn splice(document: &str, at: usize, markup: &str) -> String {
  let mut patched = String::with_capacity(document.len() + markup.len());
  patched.push_str(&document[..at]);
  patched.push_str(markup);
  patched.push_str(&document[at..]);
  patched
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str = "<html><HEAD lang=\"en\"><title>t</title></head><body><p>x</p></body></html>";

  #[test]
  fn injects_after_opening_head_with_attributes() {
    let patched = inject_after_head_open(PAGE, "<link rel='preload' href='a.css' />");
    assert!(patched.contains("<HEAD lang=\"en\"><link rel='preload' href='a.css' /><title>"));
  }

  #[test]
  fn does_not_mistake_header_for_head() {
    let document = "<body><header>x</header></body>";
    assert_eq!(inject_after_head_open(document, "<link />"), document);
  }

  #[test]
  fn injects_before_closing_tags() {
    let patched = inject_before_head_close(PAGE, "<script src='a.js'></script>");
    assert!(patched.contains("<title>t</title><script src='a.js'></script></head>"));

    let patched = inject_before_body_close(PAGE, "<script src='b.js'></script>");
    assert!(patched.contains("<p>x</p><script src='b.js'></script></body>"));
  }

  #[test]
  fn head_uses_first_close_and_body_uses_last() {
    let document = "<head></head><body><template><body></body></template></body>";
    assert_eq!(
      inject_before_head_close("<head></head><head></head>", "<x>"),
      "<head><x></head><head></head>"
    );
    assert_eq!(
      inject_before_body_close(document, "<x>"),
      "<head></head><body><template><body></body></template><x></body>"
    );
  }

  #[test]
  fn leaves_documents_without_anchors_unchanged() {
    let fragment = "<p>fragment</p>";
    assert_eq!(inject_before_head_close(fragment, "<script></script>"), fragment);
    assert_eq!(inject_before_body_close(fragment, "<script></script>"), fragment);
    assert_eq!(inject_after_head_open(PAGE, ""), PAGE);
  }
}
