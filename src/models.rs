//! Typed rule records read from the optimizer configuration.

use std::fmt;

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

/// Per-script optimization rule keyed by the host's script handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CriticalScriptRule {
  /// Handle of the registered script the rule applies to.
  #[serde(default, deserialize_with = "text")]
  pub script_key: String,
  /// Source URL that replaces the registered one when non-empty.
  #[serde(default, deserialize_with = "text")]
  pub replacement_url: String,
  /// Print the script with the footer group instead of the head.
  #[serde(default, deserialize_with = "flag")]
  pub move_to_footer: bool,
  /// Add a `defer` attribute to the emitted script tag.
  #[serde(default, deserialize_with = "flag")]
  pub defer_loading: bool,
  /// Drop the script when the request comes from a Lighthouse audit.
  #[serde(default, deserialize_with = "flag")]
  pub disable_on_speed_check: bool,
}

/// Resource the page head should announce with a preload hint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PreloadLinkRule {
  /// Target URL. Rules with an empty URL emit nothing.
  #[serde(default, deserialize_with = "text")]
  pub resource_url: String,
  /// Value of the `as` attribute.
  #[serde(default, rename = "type", deserialize_with = "preload_type")]
  pub kind: PreloadType,
  /// Position of the rule in the configured list.
  #[serde(skip)]
  pub index: usize,
}

/// Destination category of a preloaded resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreloadType {
  /// `audio`
  Audio,
  /// `document`
  Document,
  /// `embed`
  Embed,
  /// `fetch`
  Fetch,
  /// `font`
  Font,
  /// `image`
  Image,
  /// `object`
  Object,
  /// `script`
  Script,
  /// `style`
  Style,
  /// `track`
  Track,
  /// `worker`
  Worker,
  /// `video`
  Video,
  /// No category; the hint is emitted without an `as` attribute.
  #[default]
  #[serde(other)]
  Unknown,
}

impl PreloadType {
  /// Attribute value for the hint, `None` for [`PreloadType::Unknown`].
  pub fn as_attr(self) -> Option<&'static str> {
    let value = match self {
      Self::Unknown => return None,
      Self::Audio => "audio",
      Self::Document => "document",
      Self::Embed => "embed",
      Self::Fetch => "fetch",
      Self::Font => "font",
      Self::Image => "image",
      Self::Object => "object",
      Self::Script => "script",
      Self::Style => "style",
      Self::Track => "track",
      Self::Worker => "worker",
      Self::Video => "video",
    };
    Some(value)
  }
}

impl fmt::Display for PreloadType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_attr().unwrap_or("unknown"))
  }
}

/// Placement group of a registered script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadGroup {
  /// Printed inside `<head>`.
  #[default]
  Head,
  /// Printed right before `</body>`.
  Footer,
}

/// Checkbox values as stored by the admin UI: `"yes"` when ticked, `""` otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  let value = Option::<FlagValue>::deserialize(deserializer)?;
  Ok(match value {
    Some(FlagValue::Bool(value)) => value,
    Some(FlagValue::Int(value)) => value != 0,
    Some(FlagValue::Float(value)) => value != 0.0,
    Some(FlagValue::Text(value)) => matches!(
      value.trim().to_ascii_lowercase().as_str(),
      "yes" | "true" | "1" | "on"
    ),
    None => false,
  })
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any string is a category name; other shapes carry no category.
#[derive(Deserialize)]
#[serde(untagged)]
enum TypeValue {
  Named(PreloadType),
  Other(IgnoredAny),
}

fn preload_type<'de, D>(deserializer: D) -> Result<PreloadType, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Option::<TypeValue>::deserialize(deserializer)? {
    Some(TypeValue::Named(kind)) => kind,
    Some(TypeValue::Other(_)) | None => PreloadType::Unknown,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn missing_fields_default_to_inert_rule() {
    let rule: CriticalScriptRule = serde_json::from_value(json!({})).unwrap();
    assert_eq!(rule, CriticalScriptRule::default());
  }

  #[test]
  fn checkbox_values_are_read_as_flags() {
    let rule: CriticalScriptRule = serde_json::from_value(json!({
      "script_key": "jquery",
      "replacement_url": null,
      "move_to_footer": "yes",
      "defer_loading": "",
      "disable_on_speed_check": true,
    }))
    .unwrap();

    assert_eq!(rule.script_key, "jquery");
    assert!(rule.replacement_url.is_empty());
    assert!(rule.move_to_footer);
    assert!(!rule.defer_loading);
    assert!(rule.disable_on_speed_check);
  }

  #[test]
  fn numeric_flags_follow_truthiness() {
    let rule: CriticalScriptRule =
      serde_json::from_value(json!({ "move_to_footer": 1, "defer_loading": 0 })).unwrap();
    assert!(rule.move_to_footer);
    assert!(!rule.defer_loading);
  }

  #[test]
  fn unrecognised_preload_type_is_unknown() {
    let rule: PreloadLinkRule =
      serde_json::from_value(json!({ "resource_url": "a.bin", "type": "blob" })).unwrap();
    assert_eq!(rule.kind, PreloadType::Unknown);

    let rule: PreloadLinkRule = serde_json::from_value(json!({ "type": null })).unwrap();
    assert_eq!(rule.kind, PreloadType::Unknown);
    assert!(rule.resource_url.is_empty());
  }

  #[test]
  fn non_string_preload_type_keeps_the_link() {
    for kind in [json!(5), json!(true), json!(["font"]), json!({ "value": "font" })] {
      let rule: PreloadLinkRule =
        serde_json::from_value(json!({ "resource_url": "a.css", "type": kind })).unwrap();
      assert_eq!(rule.resource_url, "a.css");
      assert_eq!(rule.kind, PreloadType::Unknown);
    }
  }

  #[test]
  fn preload_type_names_round_trip_through_attr() {
    let rule: PreloadLinkRule =
      serde_json::from_value(json!({ "resource_url": "a.woff2", "type": "font" })).unwrap();
    assert_eq!(rule.kind, PreloadType::Font);
    assert_eq!(rule.kind.as_attr(), Some("font"));
    assert_eq!(PreloadType::Unknown.as_attr(), None);
    assert_eq!(PreloadType::Worker.to_string(), "worker");
  }
}
