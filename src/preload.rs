//! Preload hints printed at the top of the page head.

use std::io::Write;

use anyhow::{Context, Result};

use crate::config::{ConfigSource, load_preload_link_rules};
use crate::models::PreloadLinkRule;

/// Prefix of the `id` attribute carried by every emitted hint.
pub const PRELOAD_ID_PREFIX: &str = "g-optimizer-preload-";

/// Turns preload link rules into `<link rel='preload'>` markup.
#[derive(Debug, Clone, Default)]
pub struct PreloadEmitter {
  rules: Vec<PreloadLinkRule>,
}

impl PreloadEmitter {
  /// Emitter over an already loaded rule list.
  pub fn new(rules: Vec<PreloadLinkRule>) -> Self {
    Self { rules }
  }

  /// Read the rule list from `source`.
  pub fn load<S: ConfigSource + ?Sized>(source: &S) -> Self {
    Self::new(load_preload_link_rules(source))
  }

  /// Lazily render one hint per rule, skipping rules without a URL.
  pub fn links(&self) -> PreloadLinks<'_> {
    PreloadLinks {
      rules: self.rules.iter(),
    }
  }

  /// Write every hint to the host's output stream.
  pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
    for link in self.links() {
      out
        .write_all(link.as_bytes())
        .context("failed to write preload link")?;
    }
    Ok(())
  }
}

/// Iterator returned by [`PreloadEmitter::links`].
#[derive(Debug, Clone)]
pub struct PreloadLinks<'a> {
  rules: std::slice::Iter<'a, PreloadLinkRule>,
}

impl Iterator for PreloadLinks<'_> {
  type Item = String;

  fn next(&mut self) -> Option<Self::Item> {
    self
      .rules
      .by_ref()
      .find(|rule| !rule.resource_url.is_empty())
      .map(render_link)
  }
}

/// Markup for a single rule. The URL is printed verbatim.
pub fn render_link(rule: &PreloadLinkRule) -> String {
  match rule.kind.as_attr() {
    Some(kind) => format!(
      "<link id='{PRELOAD_ID_PREFIX}{index}' rel='preload' href='{url}' as='{kind}' />",
      index = rule.index,
      url = rule.resource_url,
    ),
    None => format!(
      "<link id='{PRELOAD_ID_PREFIX}{index}' rel='preload' href='{url}' />",
      index = rule.index,
      url = rule.resource_url,
    ),
  }
}
