//! Host-side script registry the rule engine mutates during a render.

use crate::models::LoadGroup;

/// Mutation interface over the host's registered scripts.
///
/// Every operation reports whether `handle` was registered; unknown handles
/// are left alone.
pub trait ResourceRegistry {
  /// Overwrite the source URL of `handle`.
  fn set_source(&mut self, handle: &str, src: &str) -> bool;
  /// Move `handle` into `group`.
  fn set_group(&mut self, handle: &str, group: LoadGroup) -> bool;
  /// Deregister `handle` so it is not printed at all.
  fn remove(&mut self, handle: &str) -> bool;
}

/// Script registered with the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredScript {
  /// Unique handle the script was registered under.
  pub handle: String,
  /// Source URL printed in the tag.
  pub src: String,
  /// Where the tag is printed.
  pub group: LoadGroup,
}

/// Ordered in-memory registry used by hosts without their own script table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptRegistry {
  scripts: Vec<RegisteredScript>,
}

impl ScriptRegistry {
  /// Create an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Register `handle` in the head group. Re-registering keeps the first entry.
  pub fn register(&mut self, handle: impl Into<String>, src: impl Into<String>) -> &mut Self {
    let handle = handle.into();
    if self.get(&handle).is_none() {
      self.scripts.push(RegisteredScript {
        handle,
        src: src.into(),
        group: LoadGroup::Head,
      });
    }
    self
  }

  /// Look up a registered script.
  pub fn get(&self, handle: &str) -> Option<&RegisteredScript> {
    self.scripts.iter().find(|script| script.handle == handle)
  }

  fn get_mut(&mut self, handle: &str) -> Option<&mut RegisteredScript> {
    self.scripts.iter_mut().find(|script| script.handle == handle)
  }

  /// Registered scripts in registration order.
  pub fn iter(&self) -> impl Iterator<Item = &RegisteredScript> {
    self.scripts.iter()
  }

  /// Scripts printed in `group`, in registration order.
  pub fn in_group(&self, group: LoadGroup) -> impl Iterator<Item = &RegisteredScript> {
    self.scripts.iter().filter(move |script| script.group == group)
  }

  /// Number of registered scripts.
  pub fn len(&self) -> usize {
    self.scripts.len()
  }

  /// Returns `true` when nothing is registered.
  pub fn is_empty(&self) -> bool {
    self.scripts.is_empty()
  }

  /// Markup the host prints for `handle`.
  pub fn script_tag(&self, handle: &str) -> Option<String> {
    self
      .get(handle)
      .map(|script| format!("<script src='{}' id='{}-js'></script>\n", script.src, script.handle))
  }
}

impl ResourceRegistry for ScriptRegistry {
  fn set_source(&mut self, handle: &str, src: &str) -> bool {
    match self.get_mut(handle) {
      Some(script) => {
        script.src = src.to_string();
        true
      }
      None => false,
    }
  }

  fn set_group(&mut self, handle: &str, group: LoadGroup) -> bool {
    match self.get_mut(handle) {
      Some(script) => {
        script.group = group;
        true
      }
      None => false,
    }
  }

  fn remove(&mut self, handle: &str) -> bool {
    let before = self.scripts.len();
    self.scripts.retain(|script| script.handle != handle);
    self.scripts.len() != before
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn registry() -> ScriptRegistry {
    let mut registry = ScriptRegistry::new();
    registry
      .register("jquery", "/js/jquery.js")
      .register("app", "/js/app.js");
    registry
  }

  #[test]
  fn keeps_registration_order_and_first_source() {
    let mut registry = registry();
    registry.register("jquery", "/js/other.js");

    let handles: Vec<&str> = registry.iter().map(|script| script.handle.as_str()).collect();
    assert_eq!(handles, vec!["jquery", "app"]);
    assert_eq!(registry.get("jquery").unwrap().src, "/js/jquery.js");
  }

  #[test]
  fn mutations_ignore_unknown_handles() {
    let mut registry = registry();
    let before = registry.clone();

    assert!(!registry.set_source("missing", "/x.js"));
    assert!(!registry.set_group("missing", LoadGroup::Footer));
    assert!(!registry.remove("missing"));
    assert_eq!(registry, before);
  }

  #[test]
  fn groups_and_removal_apply_to_known_handles() {
    let mut registry = registry();
    assert!(registry.set_group("jquery", LoadGroup::Footer));
    assert!(registry.remove("app"));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.in_group(LoadGroup::Footer).count(), 1);
    assert_eq!(registry.in_group(LoadGroup::Head).count(), 0);
  }

  #[test]
  fn renders_host_tag_shape() {
    let registry = registry();
    assert_eq!(
      registry.script_tag("app").unwrap(),
      "<script src='/js/app.js' id='app-js'></script>\n"
    );
    assert!(registry.script_tag("missing").is_none());
  }
}
