//! Host wiring: the long-lived optimizer and the per-render pass it hands out.

use std::borrow::Cow;
use std::io::Write;

use anyhow::Result;

use crate::config::ConfigSource;
use crate::engine::ScriptRuleEngine;
use crate::head::{inject_after_head_open, inject_before_body_close, inject_before_head_close};
use crate::models::LoadGroup;
use crate::preload::PreloadEmitter;
use crate::registry::{ResourceRegistry, ScriptRegistry};
use crate::request::RequestContext;

/// Extension points the host calls during a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
  /// All scripts are registered; no tag has been printed yet.
  ResourcesRegistered,
  /// A script tag is about to be printed. Called once per tag.
  TagEmit,
  /// The host is writing `<head>`.
  HeadEmit,
}

/// Optimizer registered once by the host at startup.
#[derive(Debug, Clone)]
pub struct Optimizer<S> {
  source: S,
}

impl<S: ConfigSource> Optimizer<S> {
  /// Order in which the host must invoke the hooks of a [`RenderPass`].
  pub const HOOKS: [HookPoint; 3] = [
    HookPoint::ResourcesRegistered,
    HookPoint::TagEmit,
    HookPoint::HeadEmit,
  ];

  /// Create an optimizer reading its rules from `source`.
  pub fn new(source: S) -> Self {
    Self { source }
  }

  /// Start a render for `request`.
  ///
  /// Each pass owns its rule cache; concurrent renders use separate passes.
  pub fn begin_render(&self, request: RequestContext) -> RenderPass<'_, S> {
    RenderPass {
      source: &self.source,
      request,
      engine: ScriptRuleEngine::new(),
    }
  }
}

/// State of a single page render.
#[derive(Debug)]
pub struct RenderPass<'a, S> {
  source: &'a S,
  request: RequestContext,
  engine: ScriptRuleEngine,
}

impl<S: ConfigSource> RenderPass<'_, S> {
  /// Rule engine holding this render's cached rules.
  pub fn engine(&self) -> &ScriptRuleEngine {
    &self.engine
  }

  /// [`HookPoint::ResourcesRegistered`]: load the script rules and apply them.
  pub fn on_resources_registered<R>(&mut self, registry: &mut R)
  where
    R: ResourceRegistry + ?Sized,
  {
    self.engine.load(self.source);
    self.engine.on_resources_registered(registry, &self.request);
  }

  /// [`HookPoint::TagEmit`]: possibly rewritten `tag` for `handle`.
  pub fn on_tag_emit<'t>(&self, tag: &'t str, handle: &str) -> Cow<'t, str> {
    self.engine.on_tag_emit(tag, handle)
  }

  /// [`HookPoint::HeadEmit`]: write preload hints to the host's output stream.
  pub fn emit_head<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
    PreloadEmitter::load(self.source).write_to(out)
  }

  /// Run every hook against `registry` and collect the markup the host would print.
  pub fn render(&mut self, registry: &mut ScriptRegistry) -> RenderedPage {
    self.on_resources_registered(registry);

    let head_scripts = self.group_tags(registry, LoadGroup::Head);
    let footer_scripts = self.group_tags(registry, LoadGroup::Footer);
    let preload_links = PreloadEmitter::load(self.source).links().collect();

    RenderedPage {
      preload_links,
      head_scripts,
      footer_scripts,
    }
  }

  fn group_tags(&self, registry: &ScriptRegistry, group: LoadGroup) -> String {
    registry
      .in_group(group)
      .filter_map(|script| {
        registry
          .script_tag(&script.handle)
          .map(|tag| self.on_tag_emit(&tag, &script.handle).into_owned())
      })
      .collect()
  }
}

/// Markup produced by [`RenderPass::render`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
  /// Preload hints, in configuration order.
  pub preload_links: String,
  /// Script tags printed inside `<head>`.
  pub head_scripts: String,
  /// Script tags printed before `</body>`.
  pub footer_scripts: String,
}

impl RenderedPage {
  /// Patch a complete HTML document with the rendered markup.
  pub fn apply_to_document(&self, document: &str) -> String {
    let patched = inject_after_head_open(document, &self.preload_links);
    let patched = inject_before_head_close(&patched, &self.head_scripts);
    inject_before_body_close(&patched, &self.footer_scripts)
  }
}
