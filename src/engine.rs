//! Applies critical script rules to the host registry and its emitted tags.

use std::borrow::Cow;

use crate::config::{ConfigSource, load_critical_script_rules};
use crate::models::{CriticalScriptRule, LoadGroup};
use crate::registry::ResourceRegistry;
use crate::request::RequestContext;

/// Per-render cache of the critical script rules.
///
/// Until [`ScriptRuleEngine::load`] runs the engine holds no rules and every
/// operation is a no-op.
#[derive(Debug, Clone, Default)]
pub struct ScriptRuleEngine {
  rules: Option<Vec<CriticalScriptRule>>,
}

impl ScriptRuleEngine {
  /// Create an engine with nothing loaded.
  pub fn new() -> Self {
    Self::default()
  }

  /// Create an engine over an already loaded rule list.
  pub fn with_rules(rules: Vec<CriticalScriptRule>) -> Self {
    Self { rules: Some(rules) }
  }

  /// Read the rule list from `source`, replacing whatever was cached.
  pub fn load<S: ConfigSource + ?Sized>(&mut self, source: &S) {
    self.rules = Some(load_critical_script_rules(source));
  }

  /// Returns `true` once rules have been loaded for this render.
  pub fn is_loaded(&self) -> bool {
    self.rules.is_some()
  }

  /// Cached rules, empty before [`ScriptRuleEngine::load`].
  pub fn rules(&self) -> &[CriticalScriptRule] {
    self.rules.as_deref().unwrap_or_default()
  }

  /// Apply relocation, URL replacement and speed-check removal, one rule at a time.
  pub fn on_resources_registered<R>(&self, registry: &mut R, request: &RequestContext)
  where
    R: ResourceRegistry + ?Sized,
  {
    for rule in self.rules() {
      let key = rule.script_key.as_str();

      if rule.move_to_footer && registry.set_group(key, LoadGroup::Footer) {
        tracing::trace!(handle = key, "moved script to footer");
      }

      if !rule.replacement_url.is_empty() && registry.set_source(key, &rule.replacement_url) {
        tracing::trace!(handle = key, src = %rule.replacement_url, "replaced script source");
      }

      if rule.disable_on_speed_check && request.is_speed_check() && registry.remove(key) {
        tracing::trace!(handle = key, "removed script for speed check");
      }
    }
  }

  /// Add `defer` to `tag` when the first deferring rule for `handle` exists.
  pub fn on_tag_emit<'a>(&self, tag: &'a str, handle: &str) -> Cow<'a, str> {
    let deferred = self
      .rules()
      .iter()
      .any(|rule| rule.defer_loading && rule.script_key == handle);

    if deferred {
      tracing::trace!(handle, "deferring script tag");
      Cow::Owned(defer_tag(tag))
    } else {
      Cow::Borrowed(tag)
    }
  }
}

/// Insert the defer marker before every ` src` token of `tag`.
pub fn defer_tag(tag: &str) -> String {
  tag.replace(" src", " defer src")
}
